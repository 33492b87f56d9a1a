//! Landmark detector abstraction.
//!
//! The body/hand landmark model is an external collaborator: the pipeline
//! submits frames and receives results asynchronously on a channel, one per
//! submitted frame, in submission order. The detector serializes internally;
//! the loop never blocks on inference.

pub mod scripted;
pub mod types;

// Re-export commonly used types
pub use scripted::{synthetic_hand, synthetic_pose, ScriptedDetector};
pub use types::{Detection, DetectionMessage, DetectorError, FrameTag, LandmarkPoint};

use crate::source::VideoFrame;
use crossbeam_channel::Receiver;

/// An asynchronous landmark detector.
pub trait Detector {
    /// Submit one frame for detection. The result arrives later on
    /// `results()`; `submit` returns as soon as the frame is accepted.
    fn submit(&mut self, frame: VideoFrame, tag: FrameTag) -> Result<(), DetectorError>;

    /// Channel on which completed detections are delivered, tagged with the
    /// identity of the frame that produced them.
    fn results(&self) -> &Receiver<DetectionMessage>;
}
