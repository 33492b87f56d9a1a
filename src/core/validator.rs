//! Independent shape and numeric-sanity check for candidate sequences.
//!
//! Runs after flush, before dispatch. A failing verdict suppresses the
//! dispatch; the window's retained tail is left as the flush produced it.

use crate::core::keypoints::FEATURE_LEN;
use crate::core::window::DispatchRecord;

/// The first violation found in a candidate sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceViolation {
    /// The sequence does not hold the expected number of frames.
    OuterLength { expected: usize, actual: usize },
    /// A frame's vector has the wrong length.
    InnerLength {
        frame: usize,
        expected: usize,
        actual: usize,
    },
    /// A vector element is NaN or infinite.
    NonFinite { frame: usize, index: usize },
}

impl std::fmt::Display for SequenceViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceViolation::OuterLength { expected, actual } => {
                write!(f, "sequence holds {actual} frames, expected {expected}")
            }
            SequenceViolation::InnerLength {
                frame,
                expected,
                actual,
            } => write!(
                f,
                "frame {frame} has {actual} values, expected {expected}"
            ),
            SequenceViolation::NonFinite { frame, index } => {
                write!(f, "frame {frame} has a non-finite value at index {index}")
            }
        }
    }
}

impl std::error::Error for SequenceViolation {}

/// Validates flushed sequences against the model's input contract.
#[derive(Debug, Clone)]
pub struct SequenceValidator {
    expected_frames: usize,
}

impl SequenceValidator {
    pub fn new(expected_frames: usize) -> Self {
        Self { expected_frames }
    }

    /// Check outer length, every inner length, and numeric sanity,
    /// reporting the first violation found.
    pub fn validate(&self, record: &DispatchRecord) -> Result<(), SequenceViolation> {
        let sequence = &record.sequence;
        if sequence.len() != self.expected_frames {
            return Err(SequenceViolation::OuterLength {
                expected: self.expected_frames,
                actual: sequence.len(),
            });
        }
        for (frame, vector) in sequence.iter().enumerate() {
            if vector.len() != FEATURE_LEN {
                return Err(SequenceViolation::InnerLength {
                    frame,
                    expected: FEATURE_LEN,
                    actual: vector.len(),
                });
            }
            for (index, value) in vector.iter().enumerate() {
                if !value.is_finite() {
                    return Err(SequenceViolation::NonFinite { frame, index });
                }
            }
        }
        Ok(())
    }
}
