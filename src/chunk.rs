//! PNG chunk container: signature, length-prefixed typed chunks, CRC trailers.
//!
//! ```text
//! 89 50 4E 47 0D 0A 1A 0A                   signature
//! [length: u32 BE][type: 4][data][crc: u32 BE]  repeated until IEND
//! ```

use core::fmt;
use std::io::{self, Read, Write};

use log::{trace, warn};

use crate::crc::ChunkCrc;
use crate::error::PngError;

/// The eight bytes every PNG stream starts with.
pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Largest chunk data length the format allows (2^31 - 1).
pub(crate) const MAX_CHUNK_LEN: u32 = i32::MAX as u32;

/// Critical chunks a truecolor decoder understands. PLTE is an optional
/// suggested palette there.
const KNOWN_CRITICAL: [ChunkType; 4] = [
    ChunkType::IHDR,
    ChunkType(*b"PLTE"),
    ChunkType::IDAT,
    ChunkType::IEND,
];

/// Four-byte chunk type tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkType(pub [u8; 4]);

impl ChunkType {
    pub const IHDR: Self = Self(*b"IHDR");
    pub const IDAT: Self = Self(*b"IDAT");
    pub const IEND: Self = Self(*b"IEND");

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Critical chunks have an uppercase first letter (bit 5 clear).
    pub fn is_critical(&self) -> bool {
        self.0[0] & 0x20 == 0
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkType(\"{self}\")")
    }
}

/// One parsed chunk. The CRC trailer is not stored; it was verified on read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    chunk_type: ChunkType,
    data: Vec<u8>,
}

impl Chunk {
    pub fn new(chunk_type: ChunkType, data: Vec<u8>) -> Self {
        Self { chunk_type, data }
    }

    pub fn chunk_type(&self) -> ChunkType {
        self.chunk_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// CRC-32 this chunk carries on the wire.
    pub fn crc(&self) -> u32 {
        crate::crc::crc32(self.chunk_type, &self.data)
    }

    /// Serialize as `[length][type][data][crc]`.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), PngError> {
        ChunkWriter::new(writer).write_chunk(self.chunk_type, &self.data)
    }
}

/// Chunks of one stream, in stream order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Chunks {
    chunks: Vec<Chunk>,
}

impl Chunks {
    pub(crate) fn push(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    /// First chunk of the given type.
    pub fn first(&self, chunk_type: ChunkType) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.chunk_type == chunk_type)
    }

    /// All chunks of the given type, in stream order.
    pub fn of_type(&self, chunk_type: ChunkType) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.iter().filter(move |c| c.chunk_type == chunk_type)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Chunk> {
        self.chunks.iter()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl<'a> IntoIterator for &'a Chunks {
    type Item = &'a Chunk;
    type IntoIter = core::slice::Iter<'a, Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}

// ── Reading ─────────────────────────────────────────────────────────

/// Consume and check the 8-byte signature.
pub(crate) fn read_signature<R: Read + ?Sized>(reader: &mut R) -> Result<(), PngError> {
    let mut magic = [0u8; 8];
    match reader.read_exact(&mut magic) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Err(PngError::BadSignature),
        Err(e) => return Err(e.into()),
    }
    if magic != SIGNATURE {
        return Err(PngError::BadSignature);
    }
    Ok(())
}

/// Read every chunk up to and including IEND, verifying each CRC.
///
/// Expects the signature to have been consumed already. Bytes after IEND are
/// left unread.
pub(crate) fn read_chunks<R: Read + ?Sized>(reader: &mut R) -> Result<Chunks, PngError> {
    let mut chunks = Chunks::default();
    let mut stream = ChunkReader::new(reader);
    while let Some((chunk_type, len)) = stream.next_header()? {
        let chunk = stream.read_body(chunk_type, len)?;
        if chunk_type.is_critical() && !KNOWN_CRITICAL.contains(&chunk_type) {
            warn!("critical chunk {chunk_type} is kept but not interpreted");
        }
        chunks.push(chunk);
        if chunk_type == ChunkType::IEND {
            return Ok(chunks);
        }
    }
    warn!("PNG stream ended without an IEND chunk");
    Ok(chunks)
}

/// Sequential access to the chunks of a stream.
pub(crate) struct ChunkReader<'r, R: ?Sized> {
    reader: &'r mut R,
}

impl<'r, R: Read + ?Sized> ChunkReader<'r, R> {
    pub(crate) fn new(reader: &'r mut R) -> Self {
        Self { reader }
    }

    /// Read the length and type of the next chunk.
    ///
    /// Returns `None` on a clean end of stream at a chunk boundary.
    pub(crate) fn next_header(&mut self) -> Result<Option<(ChunkType, u32)>, PngError> {
        let mut len_bytes = [0u8; 4];
        if !fill_or_eof(&mut *self.reader, &mut len_bytes)? {
            return Ok(None);
        }
        let len = u32::from_be_bytes(len_bytes);
        if len > MAX_CHUNK_LEN {
            return Err(PngError::InvalidChunk(format!(
                "chunk length {len} exceeds 2^31-1"
            )));
        }
        let mut type_bytes = [0u8; 4];
        self.reader
            .read_exact(&mut type_bytes)
            .map_err(|e| truncated(e, "chunk type"))?;
        let chunk_type = ChunkType(type_bytes);
        trace!("chunk {chunk_type}, {len} bytes");
        Ok(Some((chunk_type, len)))
    }

    /// Read the data and CRC of a chunk whose header was just read.
    pub(crate) fn read_body(&mut self, chunk_type: ChunkType, len: u32) -> Result<Chunk, PngError> {
        // Grow with the data actually present instead of trusting `len` up front.
        let mut data = Vec::new();
        Read::take(&mut *self.reader, u64::from(len)).read_to_end(&mut data)?;
        if data.len() != len as usize {
            return Err(PngError::InvalidChunk(format!(
                "truncated {chunk_type} chunk: {} of {len} data bytes",
                data.len()
            )));
        }

        let mut crc_bytes = [0u8; 4];
        self.reader
            .read_exact(&mut crc_bytes)
            .map_err(|e| truncated(e, "chunk CRC"))?;
        let stored = u32::from_be_bytes(crc_bytes);
        let computed = crate::crc::crc32(chunk_type, &data);
        if stored != computed {
            return Err(PngError::CrcMismatch {
                chunk_type,
                stored,
                computed,
            });
        }
        Ok(Chunk::new(chunk_type, data))
    }

    /// Skip the data and CRC of a chunk without reading them into memory.
    pub(crate) fn skip_body(&mut self, chunk_type: ChunkType, len: u32) -> Result<(), PngError> {
        let want = u64::from(len) + 4;
        let skipped = io::copy(&mut Read::take(&mut *self.reader, want), &mut io::sink())?;
        if skipped != want {
            return Err(PngError::InvalidChunk(format!(
                "truncated {chunk_type} chunk while skipping"
            )));
        }
        Ok(())
    }
}

/// Fill `buf` completely, or report a clean EOF if no byte was available.
fn fill_or_eof<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<bool, PngError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    match filled {
        0 => Ok(false),
        n if n == buf.len() => Ok(true),
        n => Err(PngError::InvalidChunk(format!(
            "truncated chunk length: {n} of {} bytes",
            buf.len()
        ))),
    }
}

fn truncated(e: io::Error, what: &str) -> PngError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        PngError::InvalidChunk(format!("stream ended inside {what}"))
    } else {
        PngError::Io(e)
    }
}

// ── Writing ─────────────────────────────────────────────────────────

/// Writes chunks with a checksum that is reset at the start of every chunk.
pub(crate) struct ChunkWriter<'w, W: ?Sized> {
    writer: &'w mut W,
    crc: ChunkCrc,
}

impl<'w, W: Write + ?Sized> ChunkWriter<'w, W> {
    pub(crate) fn new(writer: &'w mut W) -> Self {
        Self {
            writer,
            crc: ChunkCrc::new(),
        }
    }

    pub(crate) fn write_signature(&mut self) -> Result<(), PngError> {
        self.writer.write_all(&SIGNATURE)?;
        Ok(())
    }

    pub(crate) fn write_chunk(
        &mut self,
        chunk_type: ChunkType,
        data: &[u8],
    ) -> Result<(), PngError> {
        let len = u32::try_from(data.len())
            .ok()
            .filter(|&len| len <= MAX_CHUNK_LEN)
            .ok_or_else(|| {
                PngError::InvalidChunk(format!(
                    "{chunk_type} data of {} bytes exceeds 2^31-1",
                    data.len()
                ))
            })?;
        trace!("writing chunk {chunk_type}, {len} bytes");

        self.writer.write_all(&len.to_be_bytes())?;
        self.crc.reset();
        self.write_checked(chunk_type.as_bytes())?;
        self.write_checked(data)?;
        self.writer.write_all(&self.crc.finish().to_be_bytes())?;
        Ok(())
    }

    fn write_checked(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)?;
        self.crc.update(bytes);
        Ok(())
    }
}
