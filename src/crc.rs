//! CRC-32 over chunk type and data.
//!
//! PNG uses the IEEE 802.3 polynomial (reflected `0xEDB88320`, init and final
//! xor `0xFFFFFFFF`), the same checksum as zlib and gzip. The table-driven
//! implementation comes from `crc32fast`.

use crc32fast::Hasher;

use crate::chunk::ChunkType;

/// CRC-32 of `chunk_type ∥ data`, as stored in a chunk trailer.
pub fn crc32(chunk_type: ChunkType, data: &[u8]) -> u32 {
    let mut crc = ChunkCrc::new();
    crc.update(chunk_type.as_bytes());
    crc.update(data);
    crc.finish()
}

/// Running checksum scoped to a single chunk.
///
/// Every chunk starts from a fresh state; nothing carries over between chunks.
#[derive(Clone, Default)]
pub(crate) struct ChunkCrc {
    hasher: Hasher,
}

impl ChunkCrc {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        self.hasher.reset();
    }

    pub(crate) fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Value of the checksum over everything fed since the last reset.
    pub(crate) fn finish(&self) -> u32 {
        self.hasher.clone().finalize()
    }
}
