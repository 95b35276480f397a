use enough::StopReason;

use crate::chunk::ChunkType;

/// Errors from PNG decoding and encoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PngError {
    #[error("PNG signature not found")]
    BadSignature,

    #[error("invalid chunk: {0}")]
    InvalidChunk(String),

    #[error("invalid IHDR: {0}")]
    InvalidHeader(String),

    #[error("image too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("CRC mismatch in {chunk_type} chunk: stored {stored:#010x}, computed {computed:#010x}")]
    CrcMismatch {
        chunk_type: ChunkType,
        stored: u32,
        computed: u32,
    },

    #[error("missing {0} chunk")]
    MissingChunk(ChunkType),

    #[error("corrupt image data: {0}")]
    Compression(String),

    #[error("unsupported PNG feature: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

/// Coarse classification of a [`PngError`].
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Signature mismatch, malformed chunk framing, bad IHDR, oversized image.
    Format,
    /// CRC-32 mismatch on a parsed chunk.
    Integrity,
    /// A chunk the operation depends on is absent.
    MissingChunk,
    /// The concatenated IDAT stream failed to inflate.
    Compression,
    /// Interlacing, scanline filters, or a color mode other than 8-bit RGB.
    Unsupported,
    /// The underlying reader or writer failed.
    Io,
    /// The caller handed in a pixel buffer that cannot be encoded.
    InvalidInput,
    /// A configured [`crate::Limits`] bound was exceeded.
    LimitExceeded,
    /// The [`enough::Stop`] token requested cancellation.
    Cancelled,
}

impl PngError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadSignature
            | Self::InvalidChunk(_)
            | Self::InvalidHeader(_)
            | Self::DimensionsTooLarge { .. } => ErrorKind::Format,
            Self::CrcMismatch { .. } => ErrorKind::Integrity,
            Self::MissingChunk(_) => ErrorKind::MissingChunk,
            Self::Compression(_) => ErrorKind::Compression,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Io(_) => ErrorKind::Io,
            Self::InvalidBuffer(_) => ErrorKind::InvalidInput,
            Self::LimitExceeded(_) => ErrorKind::LimitExceeded,
            Self::Cancelled(_) => ErrorKind::Cancelled,
        }
    }
}

impl From<StopReason> for PngError {
    fn from(r: StopReason) -> Self {
        PngError::Cancelled(r)
    }
}
