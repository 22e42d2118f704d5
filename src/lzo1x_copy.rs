use core::cmp;

use crate::error::CopyError;
use crate::lzo1x_opcode::Instruction;

/// Destination for decoded bytes.
pub trait OutputBuffer {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push_literals(&mut self, bytes: &[u8]) -> Result<(), CopyError>;

    // distance is already checked against len()
    fn push_match(&mut self, distance: usize, length: usize) -> Result<(), CopyError>;
}

pub fn apply<O: OutputBuffer + ?Sized>(instruction: Instruction<'_>, output: &mut O) -> Result<(), CopyError> {
    match instruction {
        Instruction::LiteralRun(bytes) => output.push_literals(bytes),
        Instruction::Match { length, distance } => {
            let available = output.len();
            if distance == 0 || distance > available {
                return Err(CopyError::DistanceOutOfRange { distance, available });
            }
            output.push_match(distance, length)
        }
        Instruction::EndOfStream => Ok(()),
    }
}

/// Caller-provided, fixed-size output.
pub struct SliceOutput<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceOutput<'a> {
    pub fn new(buf: &'a mut [u8]) -> SliceOutput<'a> {
        SliceOutput { buf, pos: 0 }
    }

    fn reserve(&self, n: usize) -> Result<usize, CopyError> {
        let capacity = self.buf.len();
        match self.pos.checked_add(n) {
            Some(end) if end <= capacity => Ok(end),
            _ => Err(CopyError::BufferTooSmall {
                required: self.pos.saturating_add(n),
                capacity,
            }),
        }
    }
}

impl OutputBuffer for SliceOutput<'_> {
    fn len(&self) -> usize {
        self.pos
    }

    fn push_literals(&mut self, bytes: &[u8]) -> Result<(), CopyError> {
        let end = self.reserve(bytes.len())?;
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    fn push_match(&mut self, distance: usize, length: usize) -> Result<(), CopyError> {
        let end = self.reserve(length)?;
        let ref_pos = self.pos - distance;

        if distance >= length {
            // non-overlapping
            let (src, dst) = self.buf.split_at_mut(self.pos);
            dst[..length].copy_from_slice(&src[ref_pos..ref_pos + length]);
        } else {
            // overlapping, later reads see bytes written by this same copy
            for i in 0..length {
                self.buf[self.pos + i] = self.buf[ref_pos + i];
            }
        }

        self.pos = end;
        Ok(())
    }
}

/// Output that grows as needed, optionally up to a limit.
#[derive(Debug, Default)]
pub struct VecOutput {
    buf: Vec<u8>,
    limit: Option<usize>,
}

impl VecOutput {
    pub fn with_capacity(capacity: usize, limit: Option<usize>) -> VecOutput {
        let capacity = match limit {
            Some(limit) => cmp::min(capacity, limit),
            None => capacity,
        };
        VecOutput {
            buf: Vec::with_capacity(capacity),
            limit,
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    fn check_limit(&self, n: usize) -> Result<(), CopyError> {
        match self.limit {
            Some(limit) if self.buf.len().saturating_add(n) > limit => {
                Err(CopyError::SizeLimitExceeded { limit })
            }
            _ => Ok(()),
        }
    }
}

impl OutputBuffer for VecOutput {
    fn len(&self) -> usize {
        self.buf.len()
    }

    fn push_literals(&mut self, bytes: &[u8]) -> Result<(), CopyError> {
        self.check_limit(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn push_match(&mut self, distance: usize, length: usize) -> Result<(), CopyError> {
        self.check_limit(length)?;
        self.buf.reserve(length);

        // Copy in chunks no longer than `distance`, so every chunk reads only
        // bytes that are already in place.
        let mut ref_pos = self.buf.len() - distance;
        let mut remaining = length;
        while remaining > 0 {
            let chunk = cmp::min(distance, remaining);
            self.buf.extend_from_within(ref_pos..ref_pos + chunk);
            ref_pos += chunk;
            remaining -= chunk;
        }
        Ok(())
    }
}
