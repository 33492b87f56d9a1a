//! Core pipeline for the sign-stream agent.
//!
//! This module contains:
//! - Feature vector construction from landmark detections
//! - The sliding sequence window and its dispatch snapshots
//! - The dispatch gate (readiness + throttle)
//! - Sequence validation before anything leaves the pipeline
//! - Recognition history for dispatched context

pub mod gate;
pub mod history;
pub mod keypoints;
pub mod validator;
pub mod window;

// Re-export commonly used types
pub use gate::PredictionGate;
pub use history::{HistoryPolicy, SignHistory};
pub use keypoints::{build_feature_vector, FeatureVector, FEATURE_LEN, HAND_LANDMARKS, POSE_JOINTS};
pub use validator::{SequenceValidator, SequenceViolation};
pub use window::{DispatchRecord, SequenceWindow};
