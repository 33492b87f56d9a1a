//! Frame types for the capture pipeline.

use chrono::{DateTime, Utc};

/// A single frame pulled from the video source.
///
/// The pipeline never inspects pixel data itself; frames are handed to the
/// external detector as-is.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Monotonic frame number within the source's lifetime
    pub seq: u64,
    /// Timestamp when the frame was grabbed
    pub captured_at: DateTime<Utc>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Raw pixel payload (layout is a contract between source and detector)
    pub pixels: Vec<u8>,
}

impl VideoFrame {
    /// Create a frame stamped with the current time.
    pub fn new(seq: u64, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            seq,
            captured_at: Utc::now(),
            width,
            height,
            pixels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = VideoFrame::new(7, 64, 48, vec![0; 64 * 48]);
        assert_eq!(frame.seq, 7);
        assert_eq!(frame.pixels.len(), 64 * 48);
    }
}
