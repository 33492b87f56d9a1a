//! Dispatch gate combining window readiness with a wall-clock throttle.

use std::time::{Duration, Instant};

/// Decides, per appended frame, whether the current window justifies a
/// dispatch.
///
/// A fire requires a full window and strictly more than the throttle
/// interval since the previous fire. The dispatch timestamp is recorded the
/// moment the gate fires, before any flushing, validation, or network work,
/// so a slow downstream path cannot let a second flush escape inside the
/// same throttle interval.
#[derive(Debug)]
pub struct PredictionGate {
    min_frames: usize,
    throttle: Duration,
    last_dispatch: Option<Instant>,
}

impl PredictionGate {
    pub fn new(min_frames: usize, throttle: Duration) -> Self {
        Self {
            min_frames,
            throttle,
            last_dispatch: None,
        }
    }

    /// Check the gate against the current buffer length and clock. Returns
    /// true exactly when a dispatch should happen now, and records `now` as
    /// the new last-dispatch timestamp in the same step.
    pub fn check(&mut self, buffered_frames: usize, now: Instant) -> bool {
        if buffered_frames < self.min_frames {
            // Still filling; not an error.
            return false;
        }
        if let Some(last) = self.last_dispatch {
            if now.duration_since(last) <= self.throttle {
                return false;
            }
        }
        self.last_dispatch = Some(now);
        true
    }

    /// Timestamp of the most recent fire, if any.
    pub fn last_dispatch(&self) -> Option<Instant> {
        self.last_dispatch
    }

    /// Forget the dispatch history (fresh session).
    pub fn reset(&mut self) {
        self.last_dispatch = None;
    }
}
