//! Debug implementations of the landmark extraction seam. A real inference
//! backend plugs in through [`LandmarkExtractor`]; these stand-ins exist to
//! exercise the landmark channel without a model or a camera.

use std::collections::VecDeque;

use crate::traits::LandmarkExtractor;
use crate::types::{Frame, HandPose, Handedness, Landmark, LANDMARKS_PER_HAND};

/// Builds a plausible hand pose with the full landmark sequence, laid out on
/// a small grid around the image center.
pub fn synthetic_pose(hand_index: u32, label: Handedness, confidence: f32) -> HandPose {
    let landmarks = (0..LANDMARKS_PER_HAND)
        .map(|point| Landmark {
            x: 0.4 + 0.01 * (point % 5) as f32 + 0.1 * hand_index as f32,
            y: 0.4 + 0.01 * (point / 5) as f32,
            z: -0.02 * (point % 3) as f32,
            visibility: 0.0,
        })
        .collect();

    HandPose {
        hand_index,
        label,
        confidence,
        landmarks,
    }
}

/// Extractor that never detects anything. Stands in when no inference
/// backend is wired up.
pub struct NullExtractor;

impl LandmarkExtractor for NullExtractor {
    fn extract(&mut self, _frame: &Frame) -> Vec<HandPose> {
        Vec::new()
    }
}

/// Replays a pre-programmed sequence of detections, one entry per frame, then
/// reports empty frames.
pub struct ScriptedExtractor {
    script: VecDeque<Vec<HandPose>>,
}

impl ScriptedExtractor {
    pub fn new(script: Vec<Vec<HandPose>>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl LandmarkExtractor for ScriptedExtractor {
    fn extract(&mut self, _frame: &Frame) -> Vec<HandPose> {
        self.script.pop_front().unwrap_or_default()
    }
}

/// Emits one right hand swaying side to side, for demo runs against a live
/// receiver.
pub struct WavingExtractor {
    tick: u64,
}

impl WavingExtractor {
    pub fn new() -> Self {
        Self { tick: 0 }
    }
}

impl Default for WavingExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmarkExtractor for WavingExtractor {
    fn extract(&mut self, _frame: &Frame) -> Vec<HandPose> {
        self.tick += 1;
        let sway = (self.tick as f32 / 15.0).sin() * 0.2;

        let mut pose = synthetic_pose(0, Handedness::Right, 0.95);
        for landmark in &mut pose.landmarks {
            landmark.x = (landmark.x + sway).clamp(0.0, 1.0);
        }
        vec![pose]
    }
}
