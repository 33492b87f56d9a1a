//! Feature vector construction from landmark detections.
//!
//! One detection becomes one fixed-length vector: left hand, right hand,
//! then the tracked pose joints, each landmark contributing x, y, z in
//! order. Anything the detector did not track is zero-filled so the length
//! invariant holds unconditionally.

use crate::detect::{Detection, LandmarkPoint};

/// Landmarks per tracked hand.
pub const HAND_LANDMARKS: usize = 21;

/// Coordinates per landmark (x, y, z).
pub const COORDS_PER_LANDMARK: usize = 3;

// Pose landmark indices for the tracked upper-body joints (MediaPipe
// numbering, 33 points total).
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;

/// The pose joints consumed by the feature vector, in layout order.
pub const POSE_JOINTS: [usize; 6] = [
    LEFT_SHOULDER,
    RIGHT_SHOULDER,
    LEFT_ELBOW,
    RIGHT_ELBOW,
    LEFT_WRIST,
    RIGHT_WRIST,
];

/// Fixed length of every feature vector:
/// two hands of 21 landmarks plus 6 pose joints, 3 coordinates each.
pub const FEATURE_LEN: usize =
    2 * HAND_LANDMARKS * COORDS_PER_LANDMARK + POSE_JOINTS.len() * COORDS_PER_LANDMARK;

/// One frame's landmarks as a flat numeric vector of length `FEATURE_LEN`.
pub type FeatureVector = Vec<f32>;

/// Convert one detection into its feature vector.
///
/// Pure function of its input; never fails. A missing region, or a missing
/// landmark index within a present region, contributes zeros for exactly
/// its own slots.
pub fn build_feature_vector(detection: &Detection) -> FeatureVector {
    let mut vector = Vec::with_capacity(FEATURE_LEN);
    extend_hand(&mut vector, detection.left_hand.as_deref());
    extend_hand(&mut vector, detection.right_hand.as_deref());
    extend_pose(&mut vector, detection.pose.as_deref());
    vector
}

fn extend_hand(out: &mut FeatureVector, hand: Option<&[LandmarkPoint]>) {
    for i in 0..HAND_LANDMARKS {
        extend_point(out, hand.and_then(|points| points.get(i)));
    }
}

fn extend_pose(out: &mut FeatureVector, pose: Option<&[LandmarkPoint]>) {
    for &joint in POSE_JOINTS.iter() {
        extend_point(out, pose.and_then(|points| points.get(joint)));
    }
}

fn extend_point(out: &mut FeatureVector, point: Option<&LandmarkPoint>) {
    match point {
        Some(p) => out.extend_from_slice(&[p.x, p.y, p.z]),
        None => out.extend_from_slice(&[0.0; COORDS_PER_LANDMARK]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::scripted::{synthetic_hand, synthetic_pose};

    #[test]
    fn test_feature_len_constant() {
        assert_eq!(FEATURE_LEN, 144);
    }

    #[test]
    fn test_empty_detection_is_all_zeros() {
        let vector = build_feature_vector(&Detection::empty());
        assert_eq!(vector.len(), FEATURE_LEN);
        assert!(vector.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_full_detection_length_and_layout() {
        let detection = Detection {
            left_hand: Some(synthetic_hand(0.2)),
            right_hand: Some(synthetic_hand(0.7)),
            pose: Some(synthetic_pose(0.4)),
        };
        let vector = build_feature_vector(&detection);
        assert_eq!(vector.len(), FEATURE_LEN);

        // First slot is the left hand's first landmark x.
        assert!((vector[0] - 0.2).abs() < 1e-6);
        // Right hand starts at offset 63.
        assert!((vector[63] - 0.7).abs() < 1e-6);
        // Pose section starts at offset 126 with the left shoulder.
        let expected_shoulder_x = 0.4 + LEFT_SHOULDER as f32 * 0.005;
        assert!((vector[126] - expected_shoulder_x).abs() < 1e-6);
    }

    #[test]
    fn test_missing_hands_zero_filled() {
        let detection = Detection {
            pose: Some(synthetic_pose(0.4)),
            ..Detection::empty()
        };
        let vector = build_feature_vector(&detection);
        assert_eq!(vector.len(), FEATURE_LEN);
        assert!(vector[..126].iter().all(|&v| v == 0.0));
        assert!(vector[126..].iter().any(|&v| v != 0.0));
    }

    #[test]
    fn test_short_hand_zero_fills_missing_indices_only() {
        // Detector returned only 5 of the 21 landmarks.
        let detection = Detection {
            left_hand: Some(synthetic_hand(0.3)[..5].to_vec()),
            ..Detection::empty()
        };
        let vector = build_feature_vector(&detection);
        assert_eq!(vector.len(), FEATURE_LEN);
        assert!(vector[..5 * COORDS_PER_LANDMARK].iter().any(|&v| v != 0.0));
        assert!(vector[5 * COORDS_PER_LANDMARK..63].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_short_pose_zero_fills_untracked_joints() {
        // Only the first 12 pose points: left shoulder (11) is present,
        // right shoulder (12) onward are not.
        let detection = Detection {
            pose: Some(synthetic_pose(0.4)[..12].to_vec()),
            ..Detection::empty()
        };
        let vector = build_feature_vector(&detection);
        assert!(vector[126..129].iter().any(|&v| v != 0.0));
        assert!(vector[129..].iter().all(|&v| v == 0.0));
    }
}
