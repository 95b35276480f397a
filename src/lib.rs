//! # zenpng
//!
//! Minimal PNG codec for 8-bit truecolor images held as `f32` samples.
//!
//! Decoding parses the chunk container, verifies every chunk's CRC-32,
//! concatenates the IDAT chunks, inflates them and strips the per-row filter
//! byte. Encoding writes IHDR, a single IDAT compressed at zlib level 9, and
//! IEND.
//!
//! ## Supported
//!
//! - 8-bit truecolor (color type 2), non-interlaced, scanline filter 0
//! - any number of IDAT chunks; unknown chunks are CRC-checked and kept
//! - header-only probing that stops at the IHDR chunk
//!
//! ## Non-Goals
//!
//! Grayscale, palette and alpha images, other bit depths, interlacing and
//! scanline filters 1–4 are rejected with [`PngError::Unsupported`] instead
//! of producing wrong pixels. Ancillary chunks are never interpreted.
//!
//! ## Usage
//!
//! ```
//! use zenpng::{PixelBuffer, Unstoppable};
//!
//! let image = PixelBuffer::rgb(2, 1, vec![255.0, 0.0, 0.0, 0.0, 0.0, 255.0])?;
//! let png = zenpng::encode_to_vec(&image, Unstoppable)?;
//!
//! // Probe without decoding
//! let header = zenpng::probe(&png[..])?;
//! assert_eq!((header.width, header.height, header.bit_depth), (2, 1, 8));
//!
//! let decoded = zenpng::decode(&png[..], Unstoppable)?;
//! assert_eq!(decoded, image);
//! # Ok::<(), zenpng::PngError>(())
//! ```

#![forbid(unsafe_code)]

mod chunk;
mod codec;
mod crc;
mod decode;
mod encode;
mod error;
mod header;
mod limits;
mod pixel;

use std::io::{Read, Write};

// Re-exports
pub use chunk::{Chunk, ChunkType, Chunks, SIGNATURE};
pub use codec::{ImageDecoder, ImageEncoder, PngCodec};
pub use crc::crc32;
pub use decode::DecodeRequest;
pub use encode::EncodeRequest;
pub use enough::{Stop, Unstoppable};
pub use error::{ErrorKind, PngError};
pub use header::{ImageHeader, probe};
pub use limits::Limits;
pub use pixel::PixelBuffer;

/// Decode a PNG stream with no limits.
pub fn decode<R: Read>(reader: R, stop: impl Stop) -> Result<PixelBuffer, PngError> {
    DecodeRequest::new(reader).decode(stop)
}

/// Encode at maximum compression into `writer`.
pub fn encode<W: Write>(image: &PixelBuffer, writer: W, stop: impl Stop) -> Result<(), PngError> {
    EncodeRequest::new().encode(image, writer, stop)
}

/// Encode at maximum compression into a new byte vector.
pub fn encode_to_vec(image: &PixelBuffer, stop: impl Stop) -> Result<Vec<u8>, PngError> {
    EncodeRequest::new().encode_to_vec(image, stop)
}
