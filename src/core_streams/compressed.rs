//! Run-length compressed mode. Records start with a descriptor byte `D`:
//! `D == 0` is followed by the `0x40` end-of-data marker; `D & 0x80 == 0`
//! means `D` literal bytes follow; `D & 0xC0 == 0x80` is a run of
//! `D & 0x3F` copies of the next byte; `D & 0xC0 == 0xC0` is a run of
//! `D & 0x3F` spaces with no payload byte.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::constants::{COMPRESS_LITERAL_MAX, COMPRESS_RUN_MAX};

const END_OF_DATA: u8 = 0x40;

pub struct CompressedWriter<W> {
    inner: W,
    /// Literal bytes accumulated while no run is pending.
    lit: Vec<u8>,
    /// Pending byte and how many times it has been seen. Run detection only
    /// starts from a single pending byte; `lit` is empty whenever this is set.
    run: Option<(u8, usize)>,
}

impl<W: AsyncWrite + Unpin> CompressedWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            lit: Vec::with_capacity(COMPRESS_LITERAL_MAX),
            run: None,
        }
    }

    pub async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        for &c in data {
            self.write_byte(c).await?;
        }
        Ok(())
    }

    /// Emits any pending run or literal record, then the `0x00 0x40`
    /// terminator, and flushes.
    pub async fn finish(mut self) -> io::Result<W> {
        match self.run.take() {
            Some((b, n)) if n >= 2 => self.write_run(b, n).await?,
            Some((b, _)) => self.lit.push(b),
            None => {}
        }
        if !self.lit.is_empty() {
            self.write_literal().await?;
        }
        self.inner.write_all(&[0, END_OF_DATA]).await?;
        self.inner.flush().await?;
        Ok(self.inner)
    }

    async fn write_byte(&mut self, c: u8) -> io::Result<()> {
        match self.run {
            Some((b, n)) if b == c => {
                if n + 1 == COMPRESS_RUN_MAX {
                    self.write_run(b, COMPRESS_RUN_MAX).await?;
                    self.run = None;
                } else {
                    self.run = Some((b, n + 1));
                }
            }
            Some((b, n)) if n >= 2 => {
                self.write_run(b, n).await?;
                self.run = Some((c, 1));
            }
            Some((b, _)) => {
                // Two different bytes in a row: fall back to literal mode.
                self.run = None;
                self.lit.push(b);
                self.push_literal(c).await?;
            }
            None if self.lit.is_empty() => self.run = Some((c, 1)),
            None => self.push_literal(c).await?,
        }
        Ok(())
    }

    async fn push_literal(&mut self, c: u8) -> io::Result<()> {
        self.lit.push(c);
        if self.lit.len() == COMPRESS_LITERAL_MAX {
            self.write_literal().await?;
        }
        Ok(())
    }

    async fn write_run(&mut self, b: u8, len: usize) -> io::Result<()> {
        debug_assert!(len >= 1 && len <= COMPRESS_RUN_MAX);
        if b == b' ' {
            self.inner.write_all(&[0xC0 | len as u8]).await
        } else {
            self.inner.write_all(&[0x80 | len as u8, b]).await
        }
    }

    async fn write_literal(&mut self) -> io::Result<()> {
        self.inner.write_all(&[self.lit.len() as u8]).await?;
        self.inner.write_all(&self.lit).await?;
        self.lit.clear();
        Ok(())
    }
}

pub struct CompressedReader<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
}

impl<R: AsyncRead + Unpin> CompressedReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            pos: 0,
            eof: false,
        }
    }

    /// Reads decoded bytes; `Ok(0)` means the terminator has been consumed.
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
            self.read_record().await?;
        }
    }

    async fn read_record(&mut self) -> io::Result<()> {
        self.buf.clear();
        self.pos = 0;
        let mut descriptor = [0u8; 1];
        match self.inner.read_exact(&mut descriptor).await {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                self.eof = true;
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        let descriptor = descriptor[0];
        if descriptor == 0 {
            let mut marker = [0u8; 1];
            self.inner.read_exact(&mut marker).await?;
            if marker[0] != END_OF_DATA {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "missing end-of-data marker after zero descriptor",
                ));
            }
            self.eof = true;
            return Ok(());
        }
        if descriptor & 0x80 == 0 {
            self.buf.resize(descriptor as usize, 0);
            self.inner.read_exact(&mut self.buf).await?;
            return Ok(());
        }
        let len = (descriptor & 0x3F) as usize;
        if len == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "zero-length run record",
            ));
        }
        if descriptor & 0x40 == 0 {
            let mut b = [0u8; 1];
            self.inner.read_exact(&mut b).await?;
            self.buf.resize(len, b[0]);
        } else {
            self.buf.resize(len, b' ');
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    async fn encode(payload: &[u8]) -> Vec<u8> {
        let (tx, mut rx) = tokio::io::duplex(1 << 20);
        let mut writer = CompressedWriter::new(tx);
        writer.write_all(payload).await.unwrap();
        drop(writer.finish().await.unwrap());
        let mut encoded = Vec::new();
        rx.read_to_end(&mut encoded).await.unwrap();
        encoded
    }

    async fn decode(encoded: &[u8]) -> io::Result<Vec<u8>> {
        let mut reader = CompressedReader::new(encoded);
        let mut decoded = Vec::new();
        let mut buf = [0u8; 64];
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                return Ok(decoded);
            }
            decoded.extend_from_slice(&buf[..n]);
        }
    }

    #[tokio::test]
    async fn space_runs_collapse_to_one_byte() {
        for n in [2usize, 40, 63] {
            let encoded = encode(&vec![b' '; n]).await;
            assert_eq!(encoded, vec![0xC0 | n as u8, 0, END_OF_DATA], "n = {}", n);
        }
    }

    #[tokio::test]
    async fn repeated_bytes_use_the_two_byte_record() {
        assert_eq!(encode(b"aa").await, vec![0x82, b'a', 0, END_OF_DATA]);
        assert_eq!(encode(&[b'z'; 9]).await, vec![0x89, b'z', 0, END_OF_DATA]);
    }

    #[tokio::test]
    async fn single_byte_is_a_literal_record() {
        assert_eq!(encode(b"a").await, vec![1, b'a', 0, END_OF_DATA]);
        assert_eq!(encode(b" ").await, vec![1, b' ', 0, END_OF_DATA]);
    }

    #[tokio::test]
    async fn empty_input_is_just_the_terminator() {
        assert_eq!(encode(b"").await, vec![0, END_OF_DATA]);
    }

    #[tokio::test]
    async fn long_runs_split_at_the_cap() {
        let encoded = encode(&[b' '; 126]).await;
        assert_eq!(encoded, vec![0xFF, 0xFF, 0, END_OF_DATA]);
    }

    #[tokio::test]
    async fn roundtrip_covers_runs_literals_and_chunking() {
        let mut payload = Vec::new();
        payload.extend_from_slice(b"literal prefix");
        payload.extend_from_slice(&[b' '; 200]);
        payload.extend((0..300u32).map(|i| (i % 7) as u8 + b'a'));
        payload.extend_from_slice(&[0u8; 100]);
        let encoded = encode(&payload).await;
        assert_eq!(decode(&encoded).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn decoder_rejects_a_bad_terminator() {
        let err = decode(&[0x00, 0x41]).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn decoder_rejects_zero_length_runs() {
        let err = decode(&[0x80, b'a']).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
