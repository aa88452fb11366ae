use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::error::{SendError, SessionError};
use crate::stats::{SessionStats, SUMMARY_INTERVAL};
use crate::traits::{FrameEncoder, FrameSource, LandmarkExtractor, PayloadSender, SessionObserver};
use crate::types::{Frame, FrameRecord};

/// Lifecycle of a capture session.
///
/// `Idle → CameraOpen → Streaming → ShuttingDown → Closed`; shutdown runs on
/// every exit path, including device-open failures and read errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    CameraOpen,
    Streaming,
    ShuttingDown,
    Closed,
}

/// Cloneable handle that requests a cooperative stop. The session checks it
/// once per iteration; there is no mid-iteration preemption.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Snapshot handed to observers once per loop iteration.
pub struct TickReport<'a> {
    pub frame: &'a Frame,
    pub record: &'a FrameRecord,
}

/// The capture loop: source → (optional) extractor → encode → send, one
/// sequential worker, no internal parallelism. The session owns its senders
/// exclusively; nothing is shared across threads.
pub struct CaptureSession {
    source: Box<dyn FrameSource + Send>,
    extractor: Option<Box<dyn LandmarkExtractor + Send>>,
    encoder: Option<Box<dyn FrameEncoder + Send>>,
    frame_channel: Option<Box<dyn PayloadSender + Send>>,
    landmark_channel: Option<Box<dyn PayloadSender + Send>>,
    observers: Vec<Box<dyn SessionObserver + Send>>,

    stop: StopHandle,
    state: SessionState,
    stats: SessionStats,
}

impl CaptureSession {
    pub fn new<S>(source: S) -> Self
    where
        S: FrameSource + Send + 'static,
    {
        Self {
            source: Box::new(source),
            extractor: None,
            encoder: None,
            frame_channel: None,
            landmark_channel: None,
            observers: Vec::new(),
            stop: StopHandle::new(),
            state: SessionState::Idle,
            stats: SessionStats::new(),
        }
    }

    // Building functions

    pub fn extractor<E>(mut self, extractor: E) -> Self
    where
        E: LandmarkExtractor + Send + 'static,
    {
        self.extractor = Some(Box::new(extractor));
        self
    }

    /// Attaches the JPEG image channel: every frame is encoded and sent as a
    /// single datagram.
    pub fn image_channel<E, P>(mut self, encoder: E, sender: P) -> Self
    where
        E: FrameEncoder + Send + 'static,
        P: PayloadSender + Send + 'static,
    {
        self.encoder = Some(Box::new(encoder));
        self.frame_channel = Some(Box::new(sender));
        self
    }

    /// Attaches the landmark channel: every frame produces one JSON record.
    pub fn landmark_channel<P>(mut self, sender: P) -> Self
    where
        P: PayloadSender + Send + 'static,
    {
        self.landmark_channel = Some(Box::new(sender));
        self
    }

    pub fn observer<O>(mut self, observer: O) -> Self
    where
        O: SessionObserver + Send + 'static,
    {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Drives the session to completion. Cleanup runs on every exit path;
    /// after return the state is always [`SessionState::Closed`].
    ///
    /// End of stream and cooperative stops return `Ok`; device-open and read
    /// failures return the fatal error after cleanup.
    pub async fn run(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::Unsupported(
                "session already consumed".to_string(),
            ));
        }

        let outcome = match self.stream().await {
            Err(SessionError::EndOfStream) => {
                info!("Frame source reached end of stream");
                Ok(())
            }
            other => other,
        };

        self.shutdown();
        outcome
    }

    async fn stream(&mut self) -> Result<(), SessionError> {
        self.source.open().await?;
        self.state = SessionState::CameraOpen;
        info!(
            "Source open ({}x{})",
            self.source.width(),
            self.source.height()
        );

        self.state = SessionState::Streaming;
        while !self.stop.is_stopped() {
            let frame = self.source.read().await?;
            self.stats.frames += 1;

            let hands = match self.extractor.as_mut() {
                Some(extractor) => extractor.extract(&frame),
                None => Vec::new(),
            };
            if !hands.is_empty() {
                self.stats.frames_with_hands += 1;
            }

            let record = FrameRecord::new(self.stats.frames, hands);

            self.send_image(&frame).await;
            self.send_record(&record).await;

            let tick = TickReport {
                frame: &frame,
                record: &record,
            };
            for observer in &mut self.observers {
                observer.on_tick(&tick);
            }

            if self.stats.frames % SUMMARY_INTERVAL == 0 {
                self.stats.log_summary();
            }
        }

        info!("Stop requested, leaving streaming state");
        Ok(())
    }

    async fn send_image(&mut self, frame: &Frame) {
        let (encoder, sender) = match (self.encoder.as_mut(), self.frame_channel.as_mut()) {
            (Some(encoder), Some(sender)) => (encoder, sender),
            _ => return,
        };

        let encoded = match encoder.encode(frame) {
            Ok(encoded) => encoded,
            Err(error) => {
                warn!("Dropping frame {}: {}", self.stats.frames, error);
                self.stats.dropped_frames += 1;
                return;
            }
        };

        match sender.send(&encoded).await {
            Ok(()) => self.stats.packets_sent += 1,
            Err(SendError::OversizedPayload { size }) => {
                warn!(
                    "Dropping frame {}: encoded payload of {} bytes exceeds the datagram cap",
                    self.stats.frames, size
                );
                self.stats.dropped_frames += 1;
            }
            Err(error) => {
                debug!("Image send failed: {}", error);
                self.stats.send_failures += 1;
            }
        }
    }

    async fn send_record(&mut self, record: &FrameRecord) {
        let sender = match self.landmark_channel.as_mut() {
            Some(sender) => sender,
            None => return,
        };

        let payload = match serde_json::to_vec(record) {
            Ok(payload) => payload,
            Err(error) => {
                warn!("Dropping landmark record {}: {}", record.frame_number, error);
                self.stats.dropped_frames += 1;
                return;
            }
        };

        match sender.send(&payload).await {
            Ok(()) => self.stats.packets_sent += 1,
            Err(SendError::OversizedPayload { size }) => {
                warn!(
                    "Dropping landmark record {}: payload of {} bytes exceeds the datagram cap",
                    record.frame_number, size
                );
                self.stats.dropped_frames += 1;
            }
            Err(error) => {
                debug!("Landmark send failed: {}", error);
                self.stats.send_failures += 1;
            }
        }
    }

    fn shutdown(&mut self) {
        self.state = SessionState::ShuttingDown;
        info!("Shutting down capture session");

        self.source.close();
        if let Some(sender) = self.frame_channel.as_mut() {
            sender.close();
        }
        if let Some(sender) = self.landmark_channel.as_mut() {
            sender.close();
        }

        for observer in &mut self.observers {
            observer.on_close(&self.stats);
        }

        self.stats.log_final();
        self.state = SessionState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EncodeError, SendError};
    use crate::extractors::{synthetic_pose, ScriptedExtractor};
    use crate::types::Handedness;

    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::{Bytes, BytesMut};

    struct MockSource {
        frames_left: Option<u64>,
        fail_open: bool,
        fail_read: bool,
        close_calls: Arc<AtomicUsize>,
    }

    impl MockSource {
        fn finite(frames: u64) -> Self {
            Self {
                frames_left: Some(frames),
                fail_open: false,
                fail_read: false,
                close_calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn endless() -> Self {
            Self {
                frames_left: None,
                ..Self::finite(0)
            }
        }

        fn close_calls(&self) -> Arc<AtomicUsize> {
            self.close_calls.clone()
        }
    }

    #[async_trait]
    impl FrameSource for MockSource {
        async fn open(&mut self) -> Result<(), SessionError> {
            if self.fail_open {
                return Err(SessionError::DeviceUnavailable("mock device".to_string()));
            }
            Ok(())
        }

        async fn read(&mut self) -> Result<Frame, SessionError> {
            if self.fail_read {
                return Err(SessionError::ReadFailed("mock read".to_string()));
            }
            if let Some(left) = self.frames_left.as_mut() {
                if *left == 0 {
                    return Err(SessionError::EndOfStream);
                }
                *left -= 1;
            }
            Ok(Frame::new(4, 4, BytesMut::from(&[127u8; 48][..])))
        }

        fn close(&mut self) {
            self.close_calls.fetch_add(1, Ordering::Relaxed);
        }

        fn width(&self) -> u32 {
            4
        }

        fn height(&self) -> u32 {
            4
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSender {
        payloads: Arc<Mutex<Vec<Vec<u8>>>>,
        fail_io: bool,
        close_calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PayloadSender for RecordingSender {
        async fn send(&mut self, payload: &[u8]) -> Result<(), SendError> {
            if self.fail_io {
                return Err(SendError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "mock transmit",
                )));
            }
            self.payloads.lock().unwrap().push(payload.to_vec());
            Ok(())
        }

        fn close(&mut self) {
            self.close_calls.fetch_add(1, Ordering::Relaxed);
        }
    }

    struct FixedEncoder;

    impl FrameEncoder for FixedEncoder {
        fn encode(&mut self, _frame: &Frame) -> Result<Bytes, EncodeError> {
            Ok(Bytes::from_static(b"jpeg"))
        }
    }

    struct StopAfter {
        ticks: u64,
        handle: StopHandle,
    }

    impl SessionObserver for StopAfter {
        fn on_tick(&mut self, tick: &TickReport) {
            if tick.record.frame_number >= self.ticks {
                self.handle.stop();
            }
        }
    }

    #[tokio::test]
    async fn session_reaches_closed_on_end_of_stream() {
        let source = MockSource::finite(2);
        let close_calls = source.close_calls();
        let sender = RecordingSender::default();
        let payloads = sender.payloads.clone();

        let mut session = CaptureSession::new(source).landmark_channel(sender);
        session.run().await.expect("end of stream is a clean exit");

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(session.stats().frames, 2);
        assert_eq!(session.stats().packets_sent, 2);
        assert_eq!(close_calls.load(Ordering::Relaxed), 1);
        assert_eq!(payloads.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn cooperative_stop_releases_source_exactly_once() {
        let source = MockSource::endless();
        let close_calls = source.close_calls();

        let session = CaptureSession::new(source).landmark_channel(RecordingSender::default());
        let handle = session.stop_handle();
        let mut session = session.observer(StopAfter { ticks: 3, handle });

        session.run().await.expect("stop is a clean exit");

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(session.stats().frames, 3);
        assert_eq!(close_calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn open_failure_is_terminal_but_still_cleans_up() {
        let source = MockSource {
            fail_open: true,
            ..MockSource::endless()
        };
        let close_calls = source.close_calls();

        let mut session = CaptureSession::new(source);
        let outcome = session.run().await;

        assert!(matches!(outcome, Err(SessionError::DeviceUnavailable(_))));
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(close_calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn read_failure_ends_streaming_with_a_fault() {
        let source = MockSource {
            fail_read: true,
            ..MockSource::endless()
        };

        let mut session = CaptureSession::new(source);
        let outcome = session.run().await;

        assert!(matches!(outcome, Err(SessionError::ReadFailed(_))));
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(session.stats().frames, 0);
    }

    #[tokio::test]
    async fn transmit_failures_are_counted_not_fatal() {
        let sender = RecordingSender {
            fail_io: true,
            ..RecordingSender::default()
        };

        let mut session = CaptureSession::new(MockSource::finite(5))
            .image_channel(FixedEncoder, sender.clone())
            .landmark_channel(sender);

        session.run().await.expect("transmit errors are absorbed");

        assert_eq!(session.stats().frames, 5);
        assert_eq!(session.stats().packets_sent, 0);
        assert_eq!(session.stats().send_failures, 10);
    }

    #[tokio::test]
    async fn extractor_detections_reach_the_landmark_channel() {
        let sender = RecordingSender::default();
        let payloads = sender.payloads.clone();

        let extractor = ScriptedExtractor::new(vec![
            Vec::new(),
            vec![synthetic_pose(0, Handedness::Left, 0.9)],
        ]);

        let mut session = CaptureSession::new(MockSource::finite(2))
            .extractor(extractor)
            .landmark_channel(sender);
        session.run().await.unwrap();

        assert_eq!(session.stats().frames_with_hands, 1);

        let payloads = payloads.lock().unwrap();
        let first: FrameRecord = serde_json::from_slice(&payloads[0]).unwrap();
        let second: FrameRecord = serde_json::from_slice(&payloads[1]).unwrap();
        assert_eq!(first.hands_detected, 0);
        assert_eq!(second.hands_detected, 1);
        assert_eq!(second.hands[0].label, Handedness::Left);
    }

    #[tokio::test]
    async fn session_runs_only_once() {
        let mut session = CaptureSession::new(MockSource::finite(0));
        session.run().await.unwrap();

        assert!(matches!(
            session.run().await,
            Err(SessionError::Unsupported(_))
        ));
    }
}
