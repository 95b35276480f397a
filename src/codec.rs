//! Object-safe decoder/encoder traits for callers that hold codecs by format.

use std::io::{Read, Write};

use enough::Unstoppable;

use crate::decode::DecodeRequest;
use crate::encode::EncodeRequest;
use crate::error::PngError;
use crate::header::{self, ImageHeader};
use crate::pixel::PixelBuffer;

/// Reads images from a byte source.
pub trait ImageDecoder {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Width, height and bit depth, without decoding pixels.
    fn decode_header(&self, input: &mut dyn Read) -> Result<ImageHeader, Self::Error>;

    fn decode_image(&self, input: &mut dyn Read) -> Result<PixelBuffer, Self::Error>;
}

/// Writes images to a byte sink.
pub trait ImageEncoder {
    type Error: std::error::Error + Send + Sync + 'static;

    fn encode_image(&self, image: &PixelBuffer, output: &mut dyn Write) -> Result<(), Self::Error>;
}

/// The PNG codec with default settings. Carries no state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PngCodec;

impl ImageDecoder for PngCodec {
    type Error = PngError;

    fn decode_header(&self, input: &mut dyn Read) -> Result<ImageHeader, PngError> {
        header::probe(input)
    }

    fn decode_image(&self, input: &mut dyn Read) -> Result<PixelBuffer, PngError> {
        DecodeRequest::new(input).decode(Unstoppable)
    }
}

impl ImageEncoder for PngCodec {
    type Error = PngError;

    fn encode_image(&self, image: &PixelBuffer, output: &mut dyn Write) -> Result<(), PngError> {
        EncodeRequest::new().encode(image, output, Unstoppable)
    }
}
