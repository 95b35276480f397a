use crate::error::PngError;

/// Floating-point image: row-major, channel-interleaved samples.
///
/// Each sample is an 8-bit intensity stored as `f32` (0.0–255.0). Decoding
/// always yields three channels in R, G, B order. The sample count always
/// equals `width * height * channels`.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: u32,
    samples: Vec<f32>,
}

impl PixelBuffer {
    /// Channels in a truecolor buffer.
    pub const RGB_CHANNELS: u32 = 3;

    /// Wrap `samples`, rejecting a length that does not match the dimensions.
    pub fn new(
        width: u32,
        height: u32,
        channels: u32,
        samples: Vec<f32>,
    ) -> Result<Self, PngError> {
        let expected = sample_count(width, height, channels).ok_or_else(|| {
            PngError::InvalidBuffer(format!(
                "{width}x{height}x{channels} samples do not fit in memory"
            ))
        })?;
        if samples.len() != expected {
            return Err(PngError::InvalidBuffer(format!(
                "expected {expected} samples for {width}x{height}x{channels}, got {}",
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    /// Three-channel buffer from `f32` samples.
    pub fn rgb(width: u32, height: u32, samples: Vec<f32>) -> Result<Self, PngError> {
        Self::new(width, height, Self::RGB_CHANNELS, samples)
    }

    /// Three-channel buffer from packed RGB bytes.
    pub fn from_rgb8(width: u32, height: u32, bytes: &[u8]) -> Result<Self, PngError> {
        Self::rgb(width, height, bytes.iter().map(|&b| f32::from(b)).collect())
    }

    /// Caller guarantees the length invariant.
    pub(crate) fn from_decoded(width: u32, height: u32, samples: Vec<f32>) -> Self {
        debug_assert_eq!(
            Some(samples.len()),
            sample_count(width, height, Self::RGB_CHANNELS)
        );
        Self {
            width,
            height,
            channels: Self::RGB_CHANNELS,
            samples,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Sample of channel `c` at `(x, y)`, or `None` when out of bounds.
    pub fn sample(&self, x: u32, y: u32, c: u32) -> Option<f32> {
        if x >= self.width || y >= self.height || c >= self.channels {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * self.channels as usize
            + c as usize;
        self.samples.get(idx).copied()
    }

    /// Reinterpret as typed RGB pixels, clamping each sample to a byte.
    ///
    /// Returns [`PngError::Unsupported`] unless the buffer has three channels.
    #[cfg(feature = "rgb")]
    pub fn to_rgb8(&self) -> Result<Vec<rgb::RGB8>, PngError> {
        self.require_rgb()?;
        let mut pixels = Vec::with_capacity(self.pixel_count());
        pixels.extend(self.samples.chunks_exact(3).map(|px| {
            rgb::RGB8::new(
                crate::encode::clamp_sample(px[0]),
                crate::encode::clamp_sample(px[1]),
                crate::encode::clamp_sample(px[2]),
            )
        }));
        Ok(pixels)
    }

    /// Three-channel buffer from typed RGB pixels.
    #[cfg(feature = "rgb")]
    pub fn from_rgb_pixels(
        width: u32,
        height: u32,
        pixels: &[rgb::RGB8],
    ) -> Result<Self, PngError> {
        let samples = pixels
            .iter()
            .flat_map(|px| [f32::from(px.r), f32::from(px.g), f32::from(px.b)])
            .collect();
        Self::rgb(width, height, samples)
    }

    /// Copy into an [`imgref::ImgVec`] of `f32` RGB pixels.
    #[cfg(feature = "imgref")]
    pub fn to_imgvec(&self) -> Result<imgref::ImgVec<rgb::RGB<f32>>, PngError> {
        self.require_rgb()?;
        let mut pixels = Vec::with_capacity(self.pixel_count());
        pixels.extend(
            self.samples
                .chunks_exact(3)
                .map(|px| rgb::RGB::new(px[0], px[1], px[2])),
        );
        Ok(imgref::ImgVec::new(
            pixels,
            self.width as usize,
            self.height as usize,
        ))
    }

    /// Three-channel buffer from an [`imgref::ImgRef`] of `f32` RGB pixels.
    #[cfg(feature = "imgref")]
    pub fn from_imgref(img: imgref::ImgRef<'_, rgb::RGB<f32>>) -> Result<Self, PngError> {
        let (Ok(width), Ok(height)) = (u32::try_from(img.width()), u32::try_from(img.height()))
        else {
            return Err(PngError::InvalidBuffer(format!(
                "{}x{} does not fit in u32 dimensions",
                img.width(),
                img.height()
            )));
        };
        let samples = img.pixels().flat_map(|px| [px.r, px.g, px.b]).collect();
        Self::rgb(width, height, samples)
    }

    #[cfg(feature = "rgb")]
    fn require_rgb(&self) -> Result<(), PngError> {
        if self.channels != Self::RGB_CHANNELS {
            return Err(PngError::Unsupported(format!(
                "{} channels, only RGB is supported",
                self.channels
            )));
        }
        Ok(())
    }
}

/// `width * height * channels`, or `None` on overflow.
pub(crate) fn sample_count(width: u32, height: u32, channels: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(channels as usize)
}
