use core::cmp;
use std::io::{self, BufRead, Read};

use tracing::debug;

use crate::lzo1x_decompress::Lzo1xDecompressor;

/// Reader over a raw lzo1x stream.
///
/// Raw lzo1x has no framing, so nothing can be decoded until the whole input
/// is known. The first read drains `reader` to EOF, decodes once, and later
/// reads are served from the decoded buffer. A read or decode failure is
/// returned once; after that the reader reports EOF.
pub struct Lzo1xReader<R> {
    inner: R,
    decompressor: Lzo1xDecompressor,
    buf_decompressed: Vec<u8>,
    pos: usize,
    cap: usize,
    state: State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Pending,
    Decoded,
    Failed,
}

impl<R: Read> Lzo1xReader<R> {
    pub fn new(reader: R) -> Lzo1xReader<R> {
        Lzo1xReader::with_decompressor(reader, Lzo1xDecompressor::new())
    }

    pub fn with_decompressor(reader: R, decompressor: Lzo1xDecompressor) -> Lzo1xReader<R> {
        Lzo1xReader {
            inner: reader,
            decompressor,
            buf_decompressed: Vec::new(),
            pos: 0,
            cap: 0,
            state: State::Pending,
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill_buf_decompressed(&mut self) -> io::Result<()> {
        let mut buf_compressed = Vec::new();
        if let Err(err) = self.inner.read_to_end(&mut buf_compressed) {
            debug!(error = %err, "lzo1x source read failed");
            self.state = State::Failed;
            return Err(err);
        }

        // decoded output is usually a few times larger than the input
        let capacity_hint = buf_compressed.len().saturating_mul(4);
        match self
            .decompressor
            .decompress_to_vec(&buf_compressed, capacity_hint)
        {
            Ok(decompressed) => {
                debug!(
                    compressed_len = buf_compressed.len(),
                    decompressed_len = decompressed.len(),
                    "lzo1x reader decoded source"
                );
                self.cap = decompressed.len();
                self.buf_decompressed = decompressed;
                self.pos = 0;
                self.state = State::Decoded;
                Ok(())
            }
            Err(err) => {
                debug!(error = %err, "lzo1x reader failed to decode source");
                self.state = State::Failed;
                Err(err.into())
            }
        }
    }
}

impl<R: Read> Read for Lzo1xReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let bytes_read = {
            let mut rem = self.fill_buf()?;
            rem.read(buf)?
        };
        self.consume(bytes_read);
        Ok(bytes_read)
    }
}

impl<R: Read> BufRead for Lzo1xReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self.state {
            State::Pending => self.fill_buf_decompressed()?,
            State::Decoded => {}
            State::Failed => return Ok(&[]),
        }
        Ok(&self.buf_decompressed[self.pos..self.cap])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = cmp::min(self.pos + amt, self.cap);
    }
}
