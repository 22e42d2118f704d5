use tracing::debug;

use crate::error::DecodeError;
use crate::lzo1x_copy::{apply, OutputBuffer, SliceOutput, VecOutput};
use crate::lzo1x_opcode::{Cursor, Instruction, MIN_STREAM_LEN};

/// Decodes a raw lzo1x stream into `dst`, returning the number of bytes written.
///
/// `dst` has to hold the whole output, otherwise the call fails with
/// [`CopyError::BufferTooSmall`](crate::CopyError::BufferTooSmall).
pub fn lzo1x_decompress(src: &[u8], dst: &mut [u8]) -> Result<usize, DecodeError> {
    Lzo1xDecompressor::new().decompress(src, dst)
}

/// Decodes a raw lzo1x stream into a freshly allocated vector.
pub fn lzo1x_decompress_to_vec(src: &[u8], capacity_hint: usize) -> Result<Vec<u8>, DecodeError> {
    Lzo1xDecompressor::new().decompress_to_vec(src, capacity_hint)
}

/// Decode options. The defaults follow the reference decoder: no size limit,
/// and input left over after the end marker is an error.
#[derive(Debug, Clone, Default)]
pub struct Lzo1xDecompressor {
    size_limit: Option<usize>,
    allow_trailing_input: bool,
}

impl Lzo1xDecompressor {
    pub fn new() -> Lzo1xDecompressor {
        Lzo1xDecompressor::default()
    }

    /// Caps the size of growable output. Has no effect on [`decompress`](Self::decompress),
    /// where the slice length is the cap.
    pub fn with_size_limit(mut self, limit: usize) -> Self {
        self.size_limit = Some(limit);
        self
    }

    /// Ignore bytes after the end marker instead of failing.
    pub fn with_trailing_input(mut self, allow: bool) -> Self {
        self.allow_trailing_input = allow;
        self
    }

    pub fn size_limit(&self) -> Option<usize> {
        self.size_limit
    }

    pub fn allows_trailing_input(&self) -> bool {
        self.allow_trailing_input
    }

    pub fn decompress(&self, src: &[u8], dst: &mut [u8]) -> Result<usize, DecodeError> {
        let mut output = SliceOutput::new(dst);
        self.run(src, &mut output)?;
        Ok(output.len())
    }

    pub fn decompress_to_vec(&self, src: &[u8], capacity_hint: usize) -> Result<Vec<u8>, DecodeError> {
        let mut output = VecOutput::with_capacity(capacity_hint, self.size_limit);
        self.run(src, &mut output)?;
        Ok(output.into_inner())
    }

    fn run<O: OutputBuffer>(&self, src: &[u8], output: &mut O) -> Result<(), DecodeError> {
        if src.len() < MIN_STREAM_LEN {
            debug!(input_len = src.len(), "lzo1x input too short to hold an instruction");
            return Ok(());
        }

        let mut cursor = Cursor::new();
        loop {
            match cursor.next_instruction(src)? {
                Instruction::EndOfStream => break,
                instruction => apply(instruction, output)?,
            }
        }

        let remaining = src.len() - cursor.position();
        if remaining > 0 && !self.allow_trailing_input {
            return Err(DecodeError::TrailingInput { remaining });
        }

        debug!(
            input_len = src.len(),
            output_len = output.len(),
            "lzo1x stream decoded"
        );
        Ok(())
    }
}
