//! Scripted detector implementation.
//!
//! This exists so the pipeline can run end-to-end without the real landmark
//! model: a script maps each frame index to a detection result. Results are
//! delivered only via the channel, preserving the asynchronous shape of the
//! real detector, and always in submission order.

use crate::detect::types::{Detection, DetectionMessage, DetectorError, FrameTag, LandmarkPoint};
use crate::detect::Detector;
use crate::source::VideoFrame;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::collections::VecDeque;

/// Nominal landmark count for a tracked hand.
const HAND_POINTS: usize = 21;

/// Nominal landmark count for a tracked body pose.
const POSE_POINTS: usize = 33;

/// A detector whose output is computed from the submitted frame index.
pub struct ScriptedDetector {
    script: Box<dyn FnMut(u64) -> Result<Detection, DetectorError> + Send>,
    /// Results not yet released to the channel (models inference latency).
    pending: VecDeque<DetectionMessage>,
    /// How many submissions a result lags behind. 0 delivers on submit.
    delay: usize,
    sender: Sender<DetectionMessage>,
    receiver: Receiver<DetectionMessage>,
}

impl ScriptedDetector {
    /// Create a detector driven by the given per-frame script.
    pub fn new(
        script: impl FnMut(u64) -> Result<Detection, DetectorError> + Send + 'static,
    ) -> Self {
        let (sender, receiver) = bounded(1024);
        Self {
            script: Box::new(script),
            pending: VecDeque::new(),
            delay: 0,
            sender,
            receiver,
        }
    }

    /// Hold each result back until `delay` further frames have been
    /// submitted, approximating a model with in-flight latency.
    pub fn with_delay(mut self, delay: usize) -> Self {
        self.delay = delay;
        self
    }

    /// A detector that tracks both hands and the full pose on every frame,
    /// with landmark values that vary smoothly per frame.
    pub fn full_body() -> Self {
        Self::new(|frame_index| {
            let phase = (frame_index % 100) as f32 / 100.0;
            Ok(Detection {
                left_hand: Some(synthetic_hand(0.25 + 0.05 * phase)),
                right_hand: Some(synthetic_hand(0.65 + 0.05 * phase)),
                pose: Some(synthetic_pose(0.40 + 0.02 * phase)),
            })
        })
    }

    fn release_ready(&mut self) -> Result<(), DetectorError> {
        while self.pending.len() > self.delay {
            let Some(message) = self.pending.pop_front() else {
                break;
            };
            self.sender
                .send(message)
                .map_err(|_| DetectorError::ChannelClosed)?;
        }
        Ok(())
    }
}

impl Detector for ScriptedDetector {
    fn submit(&mut self, _frame: VideoFrame, tag: FrameTag) -> Result<(), DetectorError> {
        let outcome = (self.script)(tag.frame_index);
        self.pending.push_back(DetectionMessage { tag, outcome });
        self.release_ready()
    }

    fn results(&self) -> &Receiver<DetectionMessage> {
        &self.receiver
    }
}

/// Build a 21-point hand landmark set around a base coordinate.
pub fn synthetic_hand(base: f32) -> Vec<LandmarkPoint> {
    (0..HAND_POINTS)
        .map(|i| {
            let offset = i as f32 * 0.01;
            LandmarkPoint::new(base + offset, base + offset * 0.5, -0.02 * i as f32)
        })
        .collect()
}

/// Build a 33-point pose landmark set around a base coordinate.
pub fn synthetic_pose(base: f32) -> Vec<LandmarkPoint> {
    (0..POSE_POINTS)
        .map(|i| {
            let offset = i as f32 * 0.005;
            LandmarkPoint::new(base + offset, base - offset, 0.01 * i as f32)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn frame(seq: u64) -> VideoFrame {
        VideoFrame::new(seq, 8, 8, vec![0; 64])
    }

    fn tag(session: Uuid, frame_index: u64) -> FrameTag {
        FrameTag {
            session,
            frame_index,
        }
    }

    #[test]
    fn test_immediate_delivery_in_order() {
        let mut detector = ScriptedDetector::full_body();
        let session = Uuid::new_v4();

        for i in 1..=3 {
            detector.submit(frame(i), tag(session, i)).unwrap();
        }

        let indices: Vec<u64> = detector
            .results()
            .try_iter()
            .map(|m| m.tag.frame_index)
            .collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_delayed_delivery() {
        let mut detector = ScriptedDetector::full_body().with_delay(2);
        let session = Uuid::new_v4();

        for i in 1..=5 {
            detector.submit(frame(i), tag(session, i)).unwrap();
        }

        // Two results are still in flight.
        let indices: Vec<u64> = detector
            .results()
            .try_iter()
            .map(|m| m.tag.frame_index)
            .collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_scripted_error_is_delivered() {
        let mut detector = ScriptedDetector::new(|i| {
            if i == 2 {
                Err(DetectorError::Internal("model crashed".to_string()))
            } else {
                Ok(Detection::empty())
            }
        });
        let session = Uuid::new_v4();

        detector.submit(frame(1), tag(session, 1)).unwrap();
        detector.submit(frame(2), tag(session, 2)).unwrap();

        let messages: Vec<DetectionMessage> = detector.results().try_iter().collect();
        assert!(messages[0].outcome.is_ok());
        assert!(messages[1].outcome.is_err());
    }

    #[test]
    fn test_synthetic_landmark_counts() {
        assert_eq!(synthetic_hand(0.3).len(), HAND_POINTS);
        assert_eq!(synthetic_pose(0.4).len(), POSE_POINTS);
    }
}
