use bytes::{Bytes, BytesMut};
use image::codecs::jpeg::JpegEncoder;
use image::ColorType;
use log::debug;

use handstream_core::error::EncodeError;
use handstream_core::traits::FrameEncoder;
use handstream_core::types::Frame;

pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Compresses RGB8 frames to JPEG for the image channel.
pub struct JpegFrameEncoder {
    quality: u8,
}

impl JpegFrameEncoder {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

impl Default for JpegFrameEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl FrameEncoder for JpegFrameEncoder {
    fn encode(&mut self, frame: &Frame) -> Result<Bytes, EncodeError> {
        if frame.pixels.len() != frame.expected_len() {
            return Err(EncodeError::BadDimensions {
                width: frame.width,
                height: frame.height,
            });
        }

        let mut output = Vec::new();
        JpegEncoder::new_with_quality(&mut output, self.quality)
            .encode(&frame.pixels, frame.width, frame.height, ColorType::Rgb8)
            .map_err(|error| EncodeError::Codec(error.to_string()))?;

        debug!(
            "Encoded {}x{} frame into {} bytes (quality {})",
            frame.width,
            frame.height,
            output.len(),
            self.quality
        );
        Ok(Bytes::from(output))
    }
}

/// Decodes one received JPEG datagram back into an RGB8 frame.
pub struct JpegFrameDecoder;

impl JpegFrameDecoder {
    pub fn decode(&self, payload: &[u8]) -> Result<Frame, EncodeError> {
        let image = image::load_from_memory_with_format(payload, image::ImageFormat::Jpeg)
            .map_err(|error| EncodeError::Codec(error.to_string()))?;

        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let mut pixels = BytesMut::with_capacity(rgb.len());
        pixels.extend_from_slice(rgb.as_raw());

        Ok(Frame::new(width, height, pixels))
    }
}
