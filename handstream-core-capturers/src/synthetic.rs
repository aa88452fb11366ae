use async_trait::async_trait;
use bytes::BytesMut;
use log::info;
use rand::Rng;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};

use handstream_core::error::SessionError;
use handstream_core::traits::FrameSource;
use handstream_core::types::Frame;

/// Generates a moving color gradient without touching any hardware. Used for
/// demo runs against a live receiver and for end-to-end tests.
///
/// A frame rate of 0 disables pacing and produces frames as fast as the
/// session asks for them.
pub struct SyntheticFrameSource {
    width: u32,
    height: u32,
    frame_rate: u32,
    max_frames: Option<u64>,

    ticker: Option<Interval>,
    produced: u64,
    phase: u8,
    open: bool,
}

impl SyntheticFrameSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_rate: 30,
            max_frames: None,
            ticker: None,
            produced: 0,
            phase: 0,
            open: false,
        }
    }

    // Building functions

    pub fn frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Report end of stream after this many frames.
    pub fn max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    fn render(&self) -> BytesMut {
        let mut pixels = BytesMut::with_capacity(self.width as usize * self.height as usize * 3);
        for y in 0..self.height {
            for x in 0..self.width {
                pixels.extend_from_slice(&[
                    (x as u8).wrapping_add(self.phase),
                    (y as u8).wrapping_sub(self.phase),
                    self.phase,
                ]);
            }
        }
        pixels
    }
}

#[async_trait]
impl FrameSource for SyntheticFrameSource {
    async fn open(&mut self) -> Result<(), SessionError> {
        if self.width == 0 || self.height == 0 {
            return Err(SessionError::Unsupported(format!(
                "degenerate resolution {}x{}",
                self.width, self.height
            )));
        }

        if self.frame_rate > 0 {
            let mut ticker = interval(Duration::from_secs(1) / self.frame_rate);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            self.ticker = Some(ticker);
        }

        self.phase = rand::thread_rng().gen();
        self.open = true;
        info!(
            "Synthetic source open ({}x{} @ {} fps)",
            self.width, self.height, self.frame_rate
        );
        Ok(())
    }

    async fn read(&mut self) -> Result<Frame, SessionError> {
        if !self.open {
            return Err(SessionError::ReadFailed("source is not open".to_string()));
        }
        if let Some(max) = self.max_frames {
            if self.produced >= max {
                return Err(SessionError::EndOfStream);
            }
        }

        if let Some(ticker) = self.ticker.as_mut() {
            ticker.tick().await;
        }

        self.produced += 1;
        self.phase = self.phase.wrapping_add(1);
        Ok(Frame::new(self.width, self.height, self.render()))
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.ticker = None;
            info!("Synthetic source closed after {} frames", self.produced);
        }
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
