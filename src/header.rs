//! IHDR parsing and the header-only probe.

use std::io::Read;

use log::debug;

use crate::chunk::{self, ChunkReader, ChunkType, Chunks};
use crate::error::PngError;

/// Color type 2: three samples per pixel, no palette, no alpha.
pub(crate) const COLOR_TYPE_TRUECOLOR: u8 = 2;

/// Image metadata available without decoding pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageHeader {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
}

impl ImageHeader {
    /// Probe an in-memory PNG. See [`probe`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, PngError> {
        probe(data)
    }
}

/// Read width, height and bit depth from the first IHDR chunk.
///
/// Returns as soon as the IHDR has been read and its CRC checked. Chunks in
/// front of it are skipped unread, and nothing after it is touched, so a
/// stream with missing or corrupt IDAT data still probes fine. This is a
/// probe, not a validator: color type, compression, filter and interlace
/// fields are not checked here.
pub fn probe<R: Read>(mut reader: R) -> Result<ImageHeader, PngError> {
    chunk::read_signature(&mut reader)?;
    let mut stream = ChunkReader::new(&mut reader);
    while let Some((chunk_type, len)) = stream.next_header()? {
        match chunk_type {
            ChunkType::IHDR => {
                let chunk = stream.read_body(chunk_type, len)?;
                return Ok(Ihdr::parse(chunk.data())?.header());
            }
            ChunkType::IEND => break,
            _ => stream.skip_body(chunk_type, len)?,
        }
    }
    Err(PngError::MissingChunk(ChunkType::IHDR))
}

/// Full IHDR record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Ihdr {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: u8,
    pub compression: u8,
    pub filter: u8,
    pub interlace: u8,
}

impl Ihdr {
    pub const LEN: usize = 13;

    /// The header this crate writes: 8-bit truecolor, deflate, no interlace.
    pub fn truecolor8(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bit_depth: 8,
            color_type: COLOR_TYPE_TRUECOLOR,
            compression: 0,
            filter: 0,
            interlace: 0,
        }
    }

    /// Parse an IHDR payload. Bytes past the first 13 are ignored.
    pub fn parse(data: &[u8]) -> Result<Self, PngError> {
        let Some(fields) = data.get(..Self::LEN) else {
            return Err(PngError::InvalidHeader(format!(
                "IHDR is {} bytes, expected {}",
                data.len(),
                Self::LEN
            )));
        };
        let ihdr = Self {
            width: u32::from_be_bytes([fields[0], fields[1], fields[2], fields[3]]),
            height: u32::from_be_bytes([fields[4], fields[5], fields[6], fields[7]]),
            bit_depth: fields[8],
            color_type: fields[9],
            compression: fields[10],
            filter: fields[11],
            interlace: fields[12],
        };
        debug!("{ihdr:?}");
        Ok(ihdr)
    }

    /// IHDR of the first IHDR chunk in `chunks`.
    pub fn from_chunks(chunks: &Chunks) -> Result<Self, PngError> {
        let chunk = chunks
            .first(ChunkType::IHDR)
            .ok_or(PngError::MissingChunk(ChunkType::IHDR))?;
        Self::parse(chunk.data())
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..4].copy_from_slice(&self.width.to_be_bytes());
        out[4..8].copy_from_slice(&self.height.to_be_bytes());
        out[8] = self.bit_depth;
        out[9] = self.color_type;
        out[10] = self.compression;
        out[11] = self.filter;
        out[12] = self.interlace;
        out
    }

    pub fn header(&self) -> ImageHeader {
        ImageHeader {
            width: self.width,
            height: self.height,
            bit_depth: self.bit_depth,
        }
    }
}

impl Chunks {
    /// Header of the first IHDR chunk in the collection.
    pub fn header(&self) -> Result<ImageHeader, PngError> {
        Ihdr::from_chunks(self).map(|ihdr| ihdr.header())
    }
}
