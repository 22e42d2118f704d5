//! LZO1X decompressor in pure safe Rust.
//!
//! Raw lzo1x streams carry no length header, the end marker in the bytecode
//! is the only terminator. Use [`lzo1x_decompress`] when the output size is
//! bounded and known, [`lzo1x_decompress_to_vec`] otherwise, and
//! [`Lzo1xReader`] to plug a stream into `std::io`.
//!
//! ```
//! let compressed = b"\x1dShort stack!\x11\x00\x00";
//! let mut dst = [0u8; 32];
//! let n = paku_lzo::lzo1x_decompress(compressed, &mut dst)?;
//! assert_eq!(&dst[..n], b"Short stack!");
//! # Ok::<(), paku_lzo::DecodeError>(())
//! ```

mod error;
pub mod lzo1x;
pub mod lzo1x_copy;
pub mod lzo1x_decompress;
pub mod lzo1x_opcode;

pub use crate::error::{CopyError, DecodeError, ParseError};
pub use crate::lzo1x::Lzo1xReader;
pub use crate::lzo1x_decompress::{lzo1x_decompress, lzo1x_decompress_to_vec, Lzo1xDecompressor};
