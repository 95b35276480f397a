//! Stream builders and pixel patterns shared by the integration tests.
#![allow(dead_code)]

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use zenpng::{Chunk, ChunkType, SIGNATURE};

pub fn ihdr(width: u32, height: u32, bit_depth: u8, color_type: u8, interlace: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[bit_depth, color_type, 0, 0, interlace]);
    data
}

pub fn zlib(raw: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(raw).unwrap();
    enc.finish().unwrap()
}

/// Prefix every `width * 3` bytes of `rgb` with `filter`.
pub fn scanlines(rgb: &[u8], width: usize, filter: u8) -> Vec<u8> {
    let mut out = Vec::new();
    for row in rgb.chunks_exact(width * 3) {
        out.push(filter);
        out.extend_from_slice(row);
    }
    out
}

/// Split into exactly `parts` pieces (some may be empty).
pub fn split_even(data: &[u8], parts: usize) -> Vec<&[u8]> {
    let len = data.len();
    (0..parts)
        .map(|i| &data[i * len / parts..(i + 1) * len / parts])
        .collect()
}

pub fn png_from_chunks(chunks: &[Chunk]) -> Vec<u8> {
    let mut out = SIGNATURE.to_vec();
    for chunk in chunks {
        chunk.write_to(&mut out).unwrap();
    }
    out
}

/// 8-bit truecolor PNG with the compressed data spread over `idat_parts` IDATs.
pub fn rgb_png(width: u32, height: u32, rgb: &[u8], idat_parts: usize) -> Vec<u8> {
    let compressed = zlib(&scanlines(rgb, width as usize, 0));
    let mut chunks = vec![Chunk::new(ChunkType::IHDR, ihdr(width, height, 8, 2, 0))];
    for part in split_even(&compressed, idat_parts) {
        chunks.push(Chunk::new(ChunkType::IDAT, part.to_vec()));
    }
    chunks.push(Chunk::new(ChunkType::IEND, vec![]));
    png_from_chunks(&chunks)
}

/// Byte offsets of one chunk inside an encoded stream.
#[derive(Clone, Copy, Debug)]
pub struct ChunkSpan {
    pub chunk_type: ChunkType,
    /// Offset of the type tag.
    pub start: usize,
    /// Offset of the CRC trailer (one past the data).
    pub crc: usize,
}

pub fn chunk_spans(png: &[u8]) -> Vec<ChunkSpan> {
    let mut spans = Vec::new();
    let mut pos = SIGNATURE.len();
    while pos + 12 <= png.len() {
        let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
        let start = pos + 4;
        let chunk_type = ChunkType(png[start..start + 4].try_into().unwrap());
        let crc = start + 4 + len;
        spans.push(ChunkSpan {
            chunk_type,
            start,
            crc,
        });
        pos = crc + 4;
    }
    spans
}

/// Recompute the CRC trailer of `span` over its current bytes.
pub fn fix_crc(png: &mut [u8], span: &ChunkSpan) {
    let chunk_type = ChunkType(png[span.start..span.start + 4].try_into().unwrap());
    let crc = zenpng::crc32(chunk_type, &png[span.start + 4..span.crc]);
    png[span.crc..span.crc + 4].copy_from_slice(&crc.to_be_bytes());
}

pub fn checkerboard(w: usize, h: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h * 3];
    for y in 0..h {
        for x in 0..w {
            let off = (y * w + x) * 3;
            for c in 0..3 {
                pixels[off + c] = if (x + y) % 2 == 0 {
                    200 + (c as u8 * 20)
                } else {
                    10 + (c as u8 * 30)
                };
            }
        }
    }
    pixels
}

pub fn noise_pattern(w: usize, h: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h * 3];
    let mut state: u32 = 0xDEAD_BEEF;
    for p in pixels.iter_mut() {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        *p = state as u8;
    }
    pixels
}

pub fn gradient(w: usize, h: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(w * h * 3);
    for y in 0..h {
        for x in 0..w {
            pixels.push((x * 255 / (w - 1).max(1)) as u8);
            pixels.push((y * 255 / (h - 1).max(1)) as u8);
            pixels.push(((x + y) % 256) as u8);
        }
    }
    pixels
}
