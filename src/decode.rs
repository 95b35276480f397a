//! IDAT inflation and scanline unpacking for 8-bit truecolor images.

use std::io::{self, Read};

use enough::Stop;
use flate2::read::ZlibDecoder;
use log::{debug, warn};

use crate::chunk::{self, ChunkType, Chunks};
use crate::error::PngError;
use crate::header::{COLOR_TYPE_TRUECOLOR, Ihdr};
use crate::limits::Limits;
use crate::pixel::{self, PixelBuffer};

/// Largest width or height the format allows (2^31 - 1).
pub(crate) const MAX_DIMENSION: u32 = i32::MAX as u32;

/// Decode builder over a byte source.
///
/// ```no_run
/// use zenpng::{DecodeRequest, Limits, Unstoppable};
///
/// let file = std::fs::File::open("image.png")?;
/// let limits = Limits::default().with_max_pixels(64 * 1024 * 1024);
/// let image = DecodeRequest::new(std::io::BufReader::new(file))
///     .with_limits(&limits)
///     .decode(Unstoppable)?;
/// println!("{}x{}", image.width(), image.height());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct DecodeRequest<'a, R> {
    reader: R,
    limits: Option<&'a Limits>,
}

impl<'a, R: Read> DecodeRequest<'a, R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            limits: None,
        }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Check the signature and read every chunk, verifying CRCs, without
    /// decoding pixels.
    pub fn read_chunks(mut self) -> Result<Chunks, PngError> {
        chunk::read_signature(&mut self.reader)?;
        chunk::read_chunks(&mut self.reader)
    }

    /// Decode to a three-channel [`PixelBuffer`].
    ///
    /// Either the whole image is returned or an error; there is no partial
    /// result.
    pub fn decode(self, stop: impl Stop) -> Result<PixelBuffer, PngError> {
        let limits = self.limits;
        let chunks = self.read_chunks()?;
        decode_chunks(&chunks, limits, &stop)
    }
}

/// Byte sizes derived from a validated IHDR.
#[derive(Debug)]
struct Geometry {
    width: u32,
    height: u32,
    /// Data bytes per row, excluding the filter byte.
    row_bytes: usize,
    /// Total inflated size: `height * (1 + row_bytes)`.
    inflated_len: usize,
    samples: usize,
}

impl Geometry {
    fn new(ihdr: &Ihdr) -> Result<Self, PngError> {
        let (width, height) = (ihdr.width, ihdr.height);
        if width == 0 || height == 0 {
            return Err(PngError::InvalidHeader(format!(
                "zero image dimension {width}x{height}"
            )));
        }
        let too_large = PngError::DimensionsTooLarge { width, height };
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(too_large);
        }
        let Some(samples) = pixel::sample_count(width, height, PixelBuffer::RGB_CHANNELS) else {
            return Err(too_large);
        };
        // The f32 output must be a single allocation.
        if samples
            .checked_mul(size_of::<f32>())
            .is_none_or(|bytes| bytes > isize::MAX as usize)
        {
            return Err(too_large);
        }
        let row_bytes = width as usize * 3;
        let Some(inflated_len) = (row_bytes + 1).checked_mul(height as usize) else {
            return Err(too_large);
        };
        Ok(Self {
            width,
            height,
            row_bytes,
            inflated_len,
            samples,
        })
    }
}

/// Reject every IHDR this decoder cannot reconstruct exactly.
fn check_supported(ihdr: &Ihdr) -> Result<(), PngError> {
    if ihdr.interlace != 0 {
        return Err(PngError::Unsupported(format!(
            "interlace method {} (only non-interlaced images are supported)",
            ihdr.interlace
        )));
    }
    if ihdr.bit_depth != 8 || ihdr.color_type != COLOR_TYPE_TRUECOLOR {
        return Err(PngError::Unsupported(format!(
            "color type {} at bit depth {} (only 8-bit truecolor is supported)",
            ihdr.color_type, ihdr.bit_depth
        )));
    }
    if ihdr.compression != 0 {
        return Err(PngError::Unsupported(format!(
            "compression method {}",
            ihdr.compression
        )));
    }
    if ihdr.filter != 0 {
        return Err(PngError::Unsupported(format!(
            "filter method {}",
            ihdr.filter
        )));
    }
    Ok(())
}

pub(crate) fn decode_chunks(
    chunks: &Chunks,
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<PixelBuffer, PngError> {
    let ihdr = Ihdr::from_chunks(chunks)?;
    let geometry = Geometry::new(&ihdr)?;
    if let Some(limits) = limits {
        limits.check_dimensions(geometry.width, geometry.height)?;
        limits.check_memory(geometry.samples * size_of::<f32>())?;
    }
    check_supported(&ihdr)?;

    if chunks.first(ChunkType::IDAT).is_none() {
        return Err(PngError::MissingChunk(ChunkType::IDAT));
    }
    let compressed: Vec<u8> = chunks
        .of_type(ChunkType::IDAT)
        .flat_map(|c| c.data().iter().copied())
        .collect();
    debug!(
        "{}x{} image, {} IDAT bytes",
        geometry.width,
        geometry.height,
        compressed.len()
    );

    stop.check()?;
    let raw = inflate(&compressed, geometry.inflated_len)?;
    let samples = unpack_scanlines(&raw, &geometry, stop)?;
    Ok(PixelBuffer::from_decoded(
        geometry.width,
        geometry.height,
        samples,
    ))
}

/// Inflate the zlib stream, producing exactly `expected` bytes.
///
/// The whole stream is inflated so its Adler-32 trailer is always checked,
/// but only `expected + 1` bytes are ever held in memory.
fn inflate(compressed: &[u8], expected: usize) -> Result<Vec<u8>, PngError> {
    let corrupt = |e: io::Error| PngError::Compression(e.to_string());
    let mut decoder = ZlibDecoder::new(compressed);
    let mut raw = Vec::new();
    // One byte past `expected` is enough to notice surplus data.
    Read::take(&mut decoder, expected as u64 + 1)
        .read_to_end(&mut raw)
        .map_err(corrupt)?;
    if raw.len() < expected {
        return Err(PngError::Compression(format!(
            "image data ended after {} of {expected} bytes",
            raw.len()
        )));
    }
    if raw.len() > expected {
        let rest = io::copy(&mut decoder, &mut io::sink()).map_err(corrupt)?;
        warn!(
            "ignoring {} inflated bytes past the last scanline",
            rest + (raw.len() - expected) as u64
        );
        raw.truncate(expected);
    }
    Ok(raw)
}

/// Strip each row's filter byte and widen the samples to `f32`.
fn unpack_scanlines(
    raw: &[u8],
    geometry: &Geometry,
    stop: &dyn Stop,
) -> Result<Vec<f32>, PngError> {
    let stride = geometry.row_bytes + 1;
    let mut samples = Vec::with_capacity(geometry.samples);
    for (y, row) in raw.chunks_exact(stride).enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        let filter = row[0];
        if filter != 0 {
            return Err(PngError::Unsupported(format!(
                "{} scanline filter on row {y} (only filter type 0 is supported)",
                filter_name(filter)
            )));
        }
        samples.extend(row[1..].iter().map(|&b| f32::from(b)));
    }
    Ok(samples)
}

fn filter_name(filter: u8) -> &'static str {
    match filter {
        1 => "Sub",
        2 => "Up",
        3 => "Average",
        4 => "Paeth",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enough::Unstoppable;

    fn ihdr(width: u32, height: u32) -> Ihdr {
        Ihdr::truecolor8(width, height)
    }

    #[test]
    fn geometry_sizes() {
        let g = Geometry::new(&ihdr(5, 4)).unwrap();
        assert_eq!(g.row_bytes, 15);
        assert_eq!(g.inflated_len, 64);
        assert_eq!(g.samples, 60);
    }

    #[test]
    fn geometry_rejects_zero_and_huge() {
        assert!(matches!(
            Geometry::new(&ihdr(0, 4)),
            Err(PngError::InvalidHeader(_))
        ));
        assert!(matches!(
            Geometry::new(&ihdr(u32::MAX, 1)),
            Err(PngError::DimensionsTooLarge { .. })
        ));
        assert!(matches!(
            Geometry::new(&ihdr(MAX_DIMENSION, MAX_DIMENSION)),
            Err(PngError::DimensionsTooLarge { .. })
        ));
    }

    #[test]
    fn each_unsupported_field_is_reported() {
        let base = ihdr(1, 1);
        for bad in [
            Ihdr { interlace: 1, ..base },
            Ihdr { bit_depth: 16, ..base },
            Ihdr { color_type: 6, ..base },
            Ihdr { color_type: 0, ..base },
            Ihdr { compression: 1, ..base },
            Ihdr { filter: 1, ..base },
        ] {
            assert!(
                matches!(check_supported(&bad), Err(PngError::Unsupported(_))),
                "{bad:?}"
            );
        }
        assert!(check_supported(&base).is_ok());
    }

    #[test]
    fn unpack_strips_filter_bytes() {
        let g = Geometry::new(&ihdr(1, 2)).unwrap();
        let raw = [0, 1, 2, 3, 0, 4, 5, 6];
        let samples = unpack_scanlines(&raw, &g, &Unstoppable).unwrap();
        assert_eq!(samples, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn unpack_names_the_filter() {
        let g = Geometry::new(&ihdr(1, 2)).unwrap();
        let raw = [0, 1, 2, 3, 4, 4, 5, 6];
        let err = unpack_scanlines(&raw, &g, &Unstoppable).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Paeth") && msg.contains("row 1"), "{msg}");
    }

    #[test]
    fn inflate_checks_the_trailer_past_the_cap() {
        let mut zlib = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
        io::Write::write_all(&mut zlib, &[7u8; 4096]).unwrap();
        let mut stream = zlib.finish().unwrap();
        assert_eq!(inflate(&stream, 10).unwrap(), [7u8; 10]);

        let last = stream.len() - 1;
        stream[last] ^= 0x55;
        assert!(matches!(inflate(&stream, 10), Err(PngError::Compression(_))));
    }

    #[test]
    fn inflate_rejects_garbage() {
        let err = inflate(&[0xFF; 16], 4).unwrap_err();
        assert!(matches!(err, PngError::Compression(_)));
    }
}
