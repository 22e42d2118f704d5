use std::io::{self, ErrorKind};

use thiserror::Error;

/// Failure while classifying the next instruction of a stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Stream ends in the middle of an instruction.
    #[error("lzo1x stream truncated: {needed} more byte(s) needed at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    /// Leading byte is not valid in the current history state.
    #[error("invalid lzo1x opcode 0x{opcode:02x} at offset {offset}")]
    InvalidOpcode { opcode: u8, offset: usize },

    /// Continuation bytes describe a length that does not fit in `usize`.
    #[error("lzo1x length overflow at offset {offset}")]
    LengthOverflow { offset: usize },
}

/// Failure while executing a decoded instruction against the output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CopyError {
    #[error("lzo1x match distance {distance} exceeds {available} decoded byte(s)")]
    DistanceOutOfRange { distance: usize, available: usize },

    #[error("output buffer too small: need {required} bytes, got {capacity}")]
    BufferTooSmall { required: usize, capacity: usize },

    #[error("decompressed size exceeds limit of {limit} bytes")]
    SizeLimitExceeded { limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Copy(#[from] CopyError),

    /// Bytes follow the end marker and the decompressor was not told to ignore them.
    #[error("{remaining} byte(s) of input left after the lzo1x end marker")]
    TrailingInput { remaining: usize },
}

impl From<DecodeError> for io::Error {
    fn from(err: DecodeError) -> io::Error {
        io::Error::new(ErrorKind::InvalidData, err)
    }
}
