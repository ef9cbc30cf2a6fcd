//! Block-mode framing: each record is a three-byte header `D S1 S2` followed
//! by `(S1 << 8) | S2` payload bytes. Descriptor bit 6 marks the final frame.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::constants::BLOCK_FRAME_MAX;

/// Descriptor bit for the end-of-data frame.
pub const DESC_EOF: u8 = 0x40;

pub struct BlockWriter<W> {
    inner: W,
    buf: Vec<u8>,
}

impl<W: AsyncWrite + Unpin> BlockWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(BLOCK_FRAME_MAX),
        }
    }

    pub async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let mut rest = data;
        while !rest.is_empty() {
            let can_take = (BLOCK_FRAME_MAX - self.buf.len()).min(rest.len());
            self.buf.extend_from_slice(&rest[..can_take]);
            rest = &rest[can_take..];
            if self.buf.len() == BLOCK_FRAME_MAX {
                self.write_frame(0).await?;
            }
        }
        Ok(())
    }

    /// Emits the terminal frame (possibly empty) and flushes.
    pub async fn finish(mut self) -> io::Result<W> {
        self.write_frame(DESC_EOF).await?;
        self.inner.flush().await?;
        Ok(self.inner)
    }

    async fn write_frame(&mut self, descriptor: u8) -> io::Result<()> {
        let size = self.buf.len();
        let header = [descriptor, (size >> 8) as u8, (size & 0xFF) as u8];
        self.inner.write_all(&header).await?;
        self.inner.write_all(&self.buf).await?;
        self.buf.clear();
        Ok(())
    }
}

pub struct BlockReader<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
}

impl<R: AsyncRead + Unpin> BlockReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            pos: 0,
            eof: false,
        }
    }

    /// Reads decoded payload bytes; `Ok(0)` means end of data.
    pub async fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.pos < self.buf.len() {
                let n = (self.buf.len() - self.pos).min(out.len());
                out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            if self.eof {
                return Ok(0);
            }
            self.read_frame().await?;
        }
    }

    async fn read_frame(&mut self) -> io::Result<()> {
        self.buf.clear();
        self.pos = 0;
        let mut header = [0u8; 3];
        match self.inner.read_exact(&mut header).await {
            Ok(_) => {}
            // A peer that closes without a terminal frame still ends the stream.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                self.eof = true;
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        if header[0] & DESC_EOF != 0 {
            self.eof = true;
        }
        let size = ((header[1] as usize) << 8) | header[2] as usize;
        if size > 0 {
            self.buf.resize(size, 0);
            self.inner.read_exact(&mut self.buf).await?;
        }
        Ok(())
    }
}
