use std::time::Instant;

use log::info;

/// Number of frames between periodic summary lines.
pub const SUMMARY_INTERVAL: u64 = 30;

/// Per-session counters. Owned by the session and passed by reference,
/// never ambient or global.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Frames read from the source.
    pub frames: u64,
    /// Frames on which the extractor reported at least one hand.
    pub frames_with_hands: u64,
    /// Datagrams handed to the OS across both channels.
    pub packets_sent: u64,
    /// Transmit calls that errored.
    pub send_failures: u64,
    /// Frames dropped before transmission (encode failure or oversize).
    pub dropped_frames: u64,

    started: Instant,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            frames: 0,
            frames_with_hands: 0,
            packets_sent: 0,
            send_failures: 0,
            dropped_frames: 0,
            started: Instant::now(),
        }
    }

    /// Share of frames with at least one detected hand, in percent.
    pub fn detection_rate(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        self.frames_with_hands as f64 / self.frames as f64 * 100.0
    }

    pub fn fps(&self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        info!(
            "Frames: {} | Detections: {} | Rate: {:.1}% | FPS: {:.1} | Packets: {} | Failures: {}",
            self.frames,
            self.frames_with_hands,
            self.detection_rate(),
            self.fps(),
            self.packets_sent,
            self.send_failures
        );
    }

    pub fn log_final(&self) {
        info!("Final session statistics");
        info!("Total frames: {}", self.frames);
        info!("Frames with detected hands: {}", self.frames_with_hands);
        info!("Detection rate: {:.1}%", self.detection_rate());
        info!("Packets sent: {}", self.packets_sent);
        info!("Send failures: {}", self.send_failures);
        info!("Dropped frames: {}", self.dropped_frames);
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}
