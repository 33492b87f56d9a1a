//! Sliding window of feature vectors awaiting dispatch.
//!
//! The window is owned by exactly one capture session. It fills frame by
//! frame until it holds a full sequence; a flush snapshots the contents for
//! dispatch and keeps a short tail so the next sequence starts with some
//! temporal context instead of a cold start.

use crate::core::keypoints::{FeatureVector, FEATURE_LEN};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable snapshot of a flushed window, ready for dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRecord {
    /// The flushed sequence, oldest frame first
    pub sequence: Vec<FeatureVector>,
    /// Wall-clock time of the flush
    pub flushed_at: DateTime<Utc>,
}

impl DispatchRecord {
    /// Number of frames in the snapshot.
    pub fn frame_count(&self) -> usize {
        self.sequence.len()
    }
}

/// Ordered, bounded buffer of feature vectors with sliding-window semantics.
#[derive(Debug)]
pub struct SequenceWindow {
    frames: Vec<FeatureVector>,
    /// Target sequence length; the buffer never grows past this
    capacity: usize,
    /// Frames kept after a flush
    retain: usize,
}

impl SequenceWindow {
    /// Create an empty window. `retain` frames survive each flush;
    /// 0 clears the window completely.
    pub fn new(capacity: usize, retain: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
            capacity,
            retain,
        }
    }

    /// Append one feature vector to the tail, dropping the oldest frame
    /// when the window is already at capacity.
    pub fn push(&mut self, frame: FeatureVector) {
        debug_assert_eq!(frame.len(), FEATURE_LEN);
        self.frames.push(frame);
        if self.frames.len() > self.capacity {
            let excess = self.frames.len() - self.capacity;
            self.frames.drain(..excess);
        }
    }

    /// Whether the window holds a full sequence.
    pub fn is_ready(&self) -> bool {
        self.frames.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Snapshot the full current contents for dispatch and keep only the
    /// final `retain` frames.
    pub fn flush(&mut self) -> DispatchRecord {
        let sequence = self.frames.clone();
        let keep_from = self.frames.len().saturating_sub(self.retain);
        self.frames.drain(..keep_from);
        DispatchRecord {
            sequence,
            flushed_at: Utc::now(),
        }
    }

    /// Empty the window unconditionally.
    pub fn reset(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(value: f32) -> FeatureVector {
        vec![value; FEATURE_LEN]
    }

    #[test]
    fn test_fills_to_ready() {
        let mut window = SequenceWindow::new(30, 10);
        for i in 0..29 {
            window.push(frame(i as f32));
            assert!(!window.is_ready());
        }
        window.push(frame(29.0));
        assert!(window.is_ready());
        assert_eq!(window.len(), 30);
    }

    #[test]
    fn test_push_past_capacity_slides() {
        let mut window = SequenceWindow::new(30, 10);
        for i in 0..35 {
            window.push(frame(i as f32));
        }
        assert_eq!(window.len(), 30);
        // Oldest five frames fell off the front.
        let record = window.flush();
        assert_eq!(record.sequence[0][0], 5.0);
        assert_eq!(record.sequence[29][0], 34.0);
    }

    #[test]
    fn test_flush_retains_tail() {
        let mut window = SequenceWindow::new(30, 10);
        for i in 0..30 {
            window.push(frame(i as f32));
        }

        let record = window.flush();
        assert_eq!(record.frame_count(), 30);
        assert_eq!(window.len(), 10);

        // The retained tail is the last ten frames, order preserved.
        let next = window.flush();
        assert_eq!(next.sequence[0][0], 20.0);
        assert_eq!(next.sequence[9][0], 29.0);
    }

    #[test]
    fn test_flush_with_zero_retain_clears() {
        let mut window = SequenceWindow::new(30, 0);
        for i in 0..30 {
            window.push(frame(i as f32));
        }
        let record = window.flush();
        assert_eq!(record.frame_count(), 30);
        assert!(window.is_empty());
    }

    #[test]
    fn test_flush_below_retain_keeps_everything() {
        let mut window = SequenceWindow::new(30, 10);
        for i in 0..4 {
            window.push(frame(i as f32));
        }
        let record = window.flush();
        assert_eq!(record.frame_count(), 4);
        assert_eq!(window.len(), 4);
    }

    #[test]
    fn test_reset_empties() {
        let mut window = SequenceWindow::new(30, 10);
        for i in 0..12 {
            window.push(frame(i as f32));
        }
        window.reset();
        assert!(window.is_empty());
        assert!(!window.is_ready());
    }
}
