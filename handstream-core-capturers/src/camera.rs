use async_trait::async_trait;
use bytes::BytesMut;
use log::{debug, info};
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
    Camera,
};

use handstream_core::error::SessionError;
use handstream_core::traits::FrameSource;
use handstream_core::types::Frame;

/// Webcam frame source backed by `nokhwa`. Resolution and frame-rate are
/// hints: the device picks the closest format it supports.
pub struct NokhwaFrameSource {
    index: u32,
    width: u32,
    height: u32,
    frame_rate: u32,
    camera: Option<Camera>,
}

impl NokhwaFrameSource {
    pub fn new(index: u32, width: u32, height: u32, frame_rate: u32) -> Self {
        Self {
            index,
            width,
            height,
            frame_rate,
            camera: None,
        }
    }
}

#[async_trait]
impl FrameSource for NokhwaFrameSource {
    async fn open(&mut self) -> Result<(), SessionError> {
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(self.width, self.height),
                FrameFormat::MJPEG,
                self.frame_rate,
            ),
        ));

        let mut camera = Camera::new(CameraIndex::Index(self.index), requested)
            .map_err(|error| SessionError::DeviceUnavailable(error.to_string()))?;
        camera
            .open_stream()
            .map_err(|error| SessionError::DeviceUnavailable(error.to_string()))?;

        let resolution = camera.resolution();
        self.width = resolution.width();
        self.height = resolution.height();
        info!(
            "Camera {} streaming at {}x{}",
            self.index, self.width, self.height
        );

        self.camera = Some(camera);
        Ok(())
    }

    async fn read(&mut self) -> Result<Frame, SessionError> {
        let camera = self
            .camera
            .as_mut()
            .ok_or_else(|| SessionError::ReadFailed("camera is not open".to_string()))?;

        let buffer = camera
            .frame()
            .map_err(|error| SessionError::ReadFailed(error.to_string()))?;
        let image = buffer
            .decode_image::<RgbFormat>()
            .map_err(|error| SessionError::ReadFailed(error.to_string()))?;

        let (width, height) = image.dimensions();
        let mut pixels = BytesMut::with_capacity(image.len());
        pixels.extend_from_slice(image.as_raw());

        Ok(Frame::new(width, height, pixels))
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(error) = camera.stop_stream() {
                debug!("Camera {} stop reported: {}", self.index, error);
            }
            info!("Camera {} released", self.index);
        }
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
