//! Types crossing the detector boundary.
//!
//! A detection result is a tagged record of independently-optional landmark
//! sets; presence is expressed with `Option`, never with ad hoc shape checks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single detected 3D point in the detector's normalized output range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One frame's landmark detection.
///
/// Each region is absent when the detector did not track it in this frame.
/// Present regions are positional lists; the detector may return fewer
/// points than the nominal count and downstream code treats the missing
/// indices as untracked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Detection {
    pub left_hand: Option<Vec<LandmarkPoint>>,
    pub right_hand: Option<Vec<LandmarkPoint>>,
    pub pose: Option<Vec<LandmarkPoint>>,
}

impl Detection {
    /// A detection with nothing tracked.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether any region was tracked at all.
    pub fn any_present(&self) -> bool {
        self.left_hand.is_some() || self.right_hand.is_some() || self.pose.is_some()
    }
}

/// Identity a submitted frame carries through the detector and back.
///
/// The session id is what lets the loop discard results that belong to a
/// capture that has since stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTag {
    /// Capture session the frame was submitted under
    pub session: Uuid,
    /// 1-based frame counter within that session
    pub frame_index: u64,
}

/// A completed detection delivered on the detector's results channel.
#[derive(Debug, Clone)]
pub struct DetectionMessage {
    pub tag: FrameTag,
    pub outcome: Result<Detection, DetectorError>,
}

/// Errors reported by the detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectorError {
    /// The detector failed internally while processing a frame.
    Internal(String),
    /// The results channel is gone; no further results can be delivered.
    ChannelClosed,
}

impl std::fmt::Display for DetectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectorError::Internal(msg) => write!(f, "Detector error: {msg}"),
            DetectorError::ChannelClosed => write!(f, "Detector results channel closed"),
        }
    }
}

impl std::error::Error for DetectorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_detection() {
        let detection = Detection::empty();
        assert!(!detection.any_present());
        assert!(detection.left_hand.is_none());
    }

    #[test]
    fn test_detection_region_presence() {
        let detection = Detection {
            pose: Some(vec![LandmarkPoint::new(0.5, 0.5, 0.0)]),
            ..Detection::empty()
        };
        assert!(detection.any_present());
        assert!(detection.left_hand.is_none());
        assert_eq!(detection.pose.as_ref().map(|p| p.len()), Some(1));
    }
}
