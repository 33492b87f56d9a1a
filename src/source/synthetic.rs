//! In-memory frame source.
//!
//! This exists so the pipeline (and binary) can run end-to-end without a
//! physical camera: demos, tests, and non-camera environments all drive the
//! loop with synthetic frames.

use crate::source::types::VideoFrame;
use crate::source::{FrameSource, SourceError};

/// A frame source that generates small synthetic frames on demand.
///
/// `grab` produces one frame per call; pacing is the caller's job.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    seq: u64,
    open: bool,
    /// When false, `open` fails the way an absent or busy camera would.
    available: bool,
}

impl SyntheticSource {
    /// Create a source producing frames of the given geometry.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            seq: 0,
            open: false,
            available: true,
        }
    }

    /// Create a source whose `open` always fails.
    ///
    /// Models a camera that cannot be acquired (permission denied or
    /// hardware busy).
    pub fn unavailable() -> Self {
        Self {
            width: 0,
            height: 0,
            seq: 0,
            open: false,
            available: false,
        }
    }

}

impl FrameSource for SyntheticSource {
    fn open(&mut self) -> Result<(), SourceError> {
        if !self.available {
            return Err(SourceError::Unavailable(
                "synthetic source configured as unavailable".to_string(),
            ));
        }
        if self.open {
            return Err(SourceError::AlreadyOpen);
        }
        self.open = true;
        Ok(())
    }

    fn grab(&mut self) -> Option<VideoFrame> {
        if !self.open {
            return None;
        }
        self.seq += 1;

        // Tiny gradient pattern that varies per frame, so downstream code
        // sees distinct payloads.
        let len = (self.width * self.height) as usize;
        let shade = (self.seq % 251) as u8;
        let pixels = vec![shade; len];

        Some(VideoFrame::new(self.seq, self.width, self.height, pixels))
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
