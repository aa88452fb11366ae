use bytes::BytesMut;
use serde::{Deserialize, Serialize};

use crate::helpers::time::now_timestamp_secs;

/// Number of landmark points reported for every detected hand.
pub const LANDMARKS_PER_HAND: usize = 21;

/// Largest payload accepted for a single UDP datagram. Anything bigger is
/// dropped rather than fragmented.
pub const MAX_DATAGRAM_SIZE: usize = 60000;

/// Default destination port of the JPEG image channel.
pub const DEFAULT_FRAME_PORT: u16 = 8383;

/// Default destination port of the landmark channel.
pub const DEFAULT_LANDMARK_PORT: u16 = 8384;

/// One captured frame: tightly packed RGB8 pixels, row-major.
///
/// A frame lives for a single loop iteration, it is consumed by the landmark
/// extractor and the image channel and then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: BytesMut,
}

impl Frame {
    pub fn new(width: u32, height: u32, pixels: BytesMut) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Buffer length a well-formed RGB8 frame of these dimensions must have.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// Classification of a detected hand, with the labels the wire format uses.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
}

impl std::fmt::Display for Handedness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handedness::Left => write!(f, "Left"),
            Handedness::Right => write!(f, "Right"),
        }
    }
}

/// One of the 21 anatomical reference points of a hand. `x` and `y` are
/// normalized image coordinates in [0, 1], `z` is relative depth.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub visibility: f32,
}

/// A detected hand pose: handedness, detection confidence and the ordered
/// landmark sequence. Produced once per frame, never mutated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HandPose {
    pub hand_index: u32,
    pub label: Handedness,
    pub confidence: f32,
    pub landmarks: Vec<Landmark>,
}

/// The landmark channel payload for one processed frame.
///
/// `hands_detected` always equals `hands.len()`; construct records through
/// [`FrameRecord::new`] to keep the invariant.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub timestamp: f64,
    pub frame_number: u64,
    pub hands_detected: usize,
    pub hands: Vec<HandPose>,
}

impl FrameRecord {
    pub fn new(frame_number: u64, hands: Vec<HandPose>) -> Self {
        Self {
            timestamp: now_timestamp_secs(),
            frame_number,
            hands_detected: hands.len(),
            hands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::synthetic_pose;

    #[test]
    fn empty_record_serializes_with_zero_hands() {
        let record = FrameRecord::new(7, Vec::new());
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();

        assert_eq!(json["frame_number"], 7);
        assert_eq!(json["hands_detected"], 0);
        assert_eq!(json["hands"].as_array().unwrap().len(), 0);
        assert!(json["timestamp"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn record_serializes_all_hands_and_landmarks() {
        let hands = vec![
            synthetic_pose(0, Handedness::Left, 0.9),
            synthetic_pose(1, Handedness::Right, 0.75),
        ];
        let record = FrameRecord::new(1, hands);
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();

        assert_eq!(json["hands_detected"], 2);
        let hands = json["hands"].as_array().unwrap();
        assert_eq!(hands.len(), 2);
        assert_eq!(hands[0]["label"], "Left");
        assert_eq!(hands[1]["label"], "Right");
        for hand in hands {
            let landmarks = hand["landmarks"].as_array().unwrap();
            assert_eq!(landmarks.len(), LANDMARKS_PER_HAND);
            for landmark in landmarks {
                for field in ["x", "y", "z", "visibility"] {
                    assert!(landmark[field].is_number(), "missing field {}", field);
                }
            }
        }
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = FrameRecord::new(42, vec![synthetic_pose(0, Handedness::Right, 0.5)]);
        let payload = serde_json::to_vec(&record).unwrap();
        let decoded: FrameRecord = serde_json::from_slice(&payload).unwrap();

        assert_eq!(decoded.frame_number, record.frame_number);
        assert_eq!(decoded.hands_detected, record.hands_detected);
        assert_eq!(decoded.hands, record.hands);
        assert!((decoded.timestamp - record.timestamp).abs() < 1e-9);
    }
}
