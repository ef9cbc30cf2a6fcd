pub mod block;
pub mod compressed;

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub use block::{BlockReader, BlockWriter};
pub use compressed::{CompressedReader, CompressedWriter};

/// Transfer mode selected with the MODE command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeType {
    Stream,
    Block,
    Compressed,
}

/// Write side of a data channel, wrapped in the codec of the session's mode.
pub enum DataWriter<W> {
    Stream(W),
    Block(BlockWriter<W>),
    Compressed(CompressedWriter<W>),
}

impl<W: AsyncWrite + Unpin> DataWriter<W> {
    pub fn new(mode: ModeType, inner: W) -> Self {
        match mode {
            ModeType::Stream => DataWriter::Stream(inner),
            ModeType::Block => DataWriter::Block(BlockWriter::new(inner)),
            ModeType::Compressed => DataWriter::Compressed(CompressedWriter::new(inner)),
        }
    }

    pub async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        match self {
            DataWriter::Stream(w) => w.write_all(data).await,
            DataWriter::Block(w) => w.write_all(data).await,
            DataWriter::Compressed(w) => w.write_all(data).await,
        }
    }

    /// Terminates the transfer: emits the codec's end-of-data marker where one
    /// exists, flushes, and shuts the write side down.
    pub async fn finish(self) -> io::Result<()> {
        let mut inner = match self {
            DataWriter::Stream(mut w) => {
                w.flush().await?;
                w
            }
            DataWriter::Block(w) => w.finish().await?,
            DataWriter::Compressed(w) => w.finish().await?,
        };
        inner.shutdown().await
    }
}

/// Read side of a data channel, wrapped in the codec of the session's mode.
pub enum DataReader<R> {
    Stream(R),
    Block(BlockReader<R>),
    Compressed(CompressedReader<R>),
}

impl<R: AsyncRead + Unpin> DataReader<R> {
    pub fn new(mode: ModeType, inner: R) -> Self {
        match mode {
            ModeType::Stream => DataReader::Stream(inner),
            ModeType::Block => DataReader::Block(BlockReader::new(inner)),
            ModeType::Compressed => DataReader::Compressed(CompressedReader::new(inner)),
        }
    }

    /// Reads decoded bytes; `Ok(0)` means end of data.
    pub async fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        match self {
            DataReader::Stream(r) => r.read(out).await,
            DataReader::Block(r) => r.read(out).await,
            DataReader::Compressed(r) => r.read(out).await,
        }
    }
}
