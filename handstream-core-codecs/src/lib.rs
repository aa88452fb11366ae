//! JPEG codec for the handstream image channel, one complete image per
//! datagram.

pub mod jpeg;

pub use jpeg::{JpegFrameDecoder, JpegFrameEncoder, DEFAULT_JPEG_QUALITY};
