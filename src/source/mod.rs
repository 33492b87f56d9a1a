//! Video source abstraction for the capture pipeline.
//!
//! The camera itself is an external collaborator; the pipeline only needs a
//! handle it can acquire, poll for frames, and release on stop.

pub mod synthetic;
pub mod types;

// Re-export commonly used types
pub use synthetic::SyntheticSource;
pub use types::VideoFrame;

/// Errors that can occur acquiring or using a video source.
#[derive(Debug)]
pub enum SourceError {
    /// The source could not be acquired (permission denied, hardware busy).
    Unavailable(String),
    /// The source is already open.
    AlreadyOpen,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Unavailable(msg) => write!(f, "Video source unavailable: {msg}"),
            SourceError::AlreadyOpen => write!(f, "Video source is already open"),
        }
    }
}

impl std::error::Error for SourceError {}

/// A live frame stream the capture session owns exclusively.
pub trait FrameSource {
    /// Acquire the underlying device. Fails with `SourceError::Unavailable`
    /// when the stream cannot be started.
    fn open(&mut self) -> Result<(), SourceError>;

    /// Pull the next frame. `None` means no frame is available right now;
    /// the stream is not necessarily finished.
    fn grab(&mut self) -> Option<VideoFrame>;

    /// Release the underlying device. Safe to call when already closed.
    fn close(&mut self);

    /// Whether the source is currently acquired.
    fn is_open(&self) -> bool;
}
