//! PNG encoder: signature, IHDR, one IDAT, IEND.

use std::io::Write;

use enough::Stop;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use log::debug;

use crate::chunk::{ChunkType, ChunkWriter};
use crate::decode::MAX_DIMENSION;
use crate::error::PngError;
use crate::header::Ihdr;
use crate::pixel::PixelBuffer;

/// Encode builder.
///
/// Output is always 8-bit truecolor, non-interlaced, every scanline with
/// filter type 0. Samples are clamped to 0–255 and truncated toward zero;
/// out-of-range values are not an error.
#[derive(Clone, Debug)]
pub struct EncodeRequest {
    level: u32,
}

impl Default for EncodeRequest {
    fn default() -> Self {
        Self { level: 9 }
    }
}

impl EncodeRequest {
    /// Encoder at maximum compression (zlib level 9).
    pub fn new() -> Self {
        Self::default()
    }

    /// zlib compression level, 0 (stored) to 9 (best). Higher values clamp to 9.
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.level = level.min(9);
        self
    }

    /// Write the PNG to `writer`.
    ///
    /// The writer is neither flushed nor closed. On error it holds an
    /// incomplete stream that must be discarded.
    pub fn encode<W: Write>(
        &self,
        image: &PixelBuffer,
        mut writer: W,
        stop: impl Stop,
    ) -> Result<(), PngError> {
        encode_truecolor(image, &mut writer, self.level, &stop)
    }

    /// Encode into a new byte vector.
    pub fn encode_to_vec(&self, image: &PixelBuffer, stop: impl Stop) -> Result<Vec<u8>, PngError> {
        let mut out = Vec::new();
        self.encode(image, &mut out, stop)?;
        Ok(out)
    }
}

/// Clamp a sample into a byte: `[0, 255]`, truncated toward zero, `NaN` to 0.
pub(crate) fn clamp_sample(sample: f32) -> u8 {
    // Float-to-int `as` saturates and maps NaN to 0.
    sample.clamp(0.0, 255.0) as u8
}

fn encode_truecolor<W: Write + ?Sized>(
    image: &PixelBuffer,
    writer: &mut W,
    level: u32,
    stop: &dyn Stop,
) -> Result<(), PngError> {
    let (width, height) = (image.width(), image.height());
    if image.channels() != PixelBuffer::RGB_CHANNELS {
        return Err(PngError::Unsupported(format!(
            "cannot encode {} channels (only RGB is supported)",
            image.channels()
        )));
    }
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(PngError::InvalidBuffer(format!(
            "PNG dimensions must be 1..=2^31-1, got {width}x{height}"
        )));
    }

    let idat = compress_scanlines(image, level, stop)?;
    debug!("{width}x{height} image, {} IDAT bytes at level {level}", idat.len());

    let mut out = ChunkWriter::new(writer);
    out.write_signature()?;
    out.write_chunk(ChunkType::IHDR, &Ihdr::truecolor8(width, height).to_bytes())?;
    out.write_chunk(ChunkType::IDAT, &idat)?;
    out.write_chunk(ChunkType::IEND, &[])?;
    Ok(())
}

/// zlib stream of every row, each prefixed with filter type 0.
fn compress_scanlines(
    image: &PixelBuffer,
    level: u32,
    stop: &dyn Stop,
) -> Result<Vec<u8>, PngError> {
    let row_samples = image.width() as usize * 3;
    let mut zlib = ZlibEncoder::new(Vec::new(), Compression::new(level));
    let mut row = Vec::with_capacity(row_samples + 1);
    for (y, samples) in image.samples().chunks_exact(row_samples).enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        row.clear();
        row.push(0);
        row.extend(samples.iter().map(|&s| clamp_sample(s)));
        zlib.write_all(&row)?;
    }
    Ok(zlib.finish()?)
}
