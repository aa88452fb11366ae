use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{EncodeError, SendError, SessionError};
use crate::session::TickReport;
use crate::stats::SessionStats;
use crate::types::{Frame, HandPose};

/// Produces raw frames for a capture session.
#[async_trait]
pub trait FrameSource {
    /// Opens the underlying device and applies best-effort resolution and
    /// frame-rate hints. Failure here is terminal for the session.
    async fn open(&mut self) -> Result<(), SessionError>;

    /// Waits for the next frame. [`SessionError::EndOfStream`] ends the
    /// session cleanly, any other error ends it with a fault.
    async fn read(&mut self) -> Result<Frame, SessionError>;

    /// Releases the device. Must be idempotent.
    fn close(&mut self);

    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

#[async_trait]
impl FrameSource for Box<dyn FrameSource + Send> {
    async fn open(&mut self) -> Result<(), SessionError> {
        (**self).open().await
    }

    async fn read(&mut self) -> Result<Frame, SessionError> {
        (**self).read().await
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }
}

/// Inference seam: turns a frame into zero or more hand poses. The actual
/// model is an external collaborator; this crate only ships debug
/// implementations (see [`crate::extractors`]).
pub trait LandmarkExtractor {
    fn extract(&mut self, frame: &Frame) -> Vec<HandPose>;
}

/// Codec seam used by the session to produce the image channel payload.
pub trait FrameEncoder {
    fn encode(&mut self, frame: &Frame) -> Result<Bytes, EncodeError>;
}

/// Fire-and-forget datagram transmission.
#[async_trait]
pub trait PayloadSender {
    /// Transmits one payload as a single datagram. Payloads over the safe
    /// datagram size fail without touching the socket; transmit errors are
    /// reported, never retried.
    async fn send(&mut self, payload: &[u8]) -> Result<(), SendError>;

    /// Releases the socket. Must be idempotent.
    fn close(&mut self);
}

/// Per-iteration side channel for debug display and extra logging, decoupled
/// from the send path so the session stays testable without either.
pub trait SessionObserver {
    fn on_tick(&mut self, tick: &TickReport);

    fn on_close(&mut self, stats: &SessionStats) {
        let _ = stats;
    }
}
