use crate::error::PngError;

/// Resource caps applied by decode once the IHDR has been read.
///
/// All fields default to `None` (no limit). IDAT payloads are buffered in
/// memory before inflating, so callers reading untrusted input should set at
/// least `max_pixels` or `max_memory_bytes`.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum bytes for the decoded `f32` sample buffer.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    pub fn with_max_dimensions(mut self, width: u64, height: u64) -> Self {
        self.max_width = Some(width);
        self.max_height = Some(height);
        self
    }

    pub fn with_max_pixels(mut self, pixels: u64) -> Self {
        self.max_pixels = Some(pixels);
        self
    }

    pub fn with_max_memory_bytes(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    pub(crate) fn check_dimensions(&self, width: u32, height: u32) -> Result<(), PngError> {
        let exceeded = |what: &str, value: u64, max: u64| {
            PngError::LimitExceeded(format!("{what} {value} exceeds limit {max}"))
        };
        if let Some(max) = self.max_width.filter(|&m| u64::from(width) > m) {
            return Err(exceeded("width", width.into(), max));
        }
        if let Some(max) = self.max_height.filter(|&m| u64::from(height) > m) {
            return Err(exceeded("height", height.into(), max));
        }
        let pixels = u64::from(width) * u64::from(height);
        if let Some(max) = self.max_pixels.filter(|&m| pixels > m) {
            return Err(exceeded("pixel count", pixels, max));
        }
        Ok(())
    }

    pub(crate) fn check_memory(&self, bytes: usize) -> Result<(), PngError> {
        if let Some(max) = self.max_memory_bytes.filter(|&m| bytes as u64 > m) {
            return Err(PngError::LimitExceeded(format!(
                "allocation {bytes} bytes exceeds memory limit {max}"
            )));
        }
        Ok(())
    }
}
