//! Sign-Stream Agent - continuous sign-language capture pipeline.
//!
//! This library turns a live stream of per-frame body/hand landmark
//! detections into fixed-shape numeric sequences and ships them to a remote
//! recognition service at a controlled rate. Detection itself, rendering,
//! and the recognition model are external collaborators; this crate owns
//! the stateful middle: feature extraction, windowed buffering, throttled
//! dispatch, and sequence validation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Sign-Stream Agent                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌─────────┐ │
//! │  │  Source  │──▶│ Detector │──▶│ Keypoints │──▶│ Window  │ │
//! │  │ (frames) │   │ (async)  │   │ (144/fr)  │   │ (30 fr) │ │
//! │  └──────────┘   └──────────┘   └───────────┘   └────┬────┘ │
//! │                                                     ▼      │
//! │  ┌──────────┐   ┌───────────┐   ┌──────────┐   ┌────────┐ │
//! │  │ History  │◀──│ Transport │◀──│ Validator│◀──│  Gate  │ │
//! │  │ (signs)  │   │ (predict) │   │ (30×144) │   │ (400ms)│ │
//! │  └──────────┘   └───────────┘   └──────────┘   └────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use sign_stream_agent::config::Config;
//! use sign_stream_agent::detect::ScriptedDetector;
//! use sign_stream_agent::session::FrameLoop;
//! use sign_stream_agent::source::SyntheticSource;
//! use sign_stream_agent::stats::create_shared_stats;
//! use sign_stream_agent::transport::NullTransport;
//!
//! let config = Config::default();
//! let source = SyntheticSource::new(640, 480);
//! let detector = ScriptedDetector::full_body();
//!
//! let mut frame_loop =
//!     FrameLoop::new(config, source, detector, NullTransport, create_shared_stats());
//! frame_loop.start().expect("Failed to start capture");
//!
//! // Drive one frame through detection and the pipeline.
//! let report = frame_loop.tick().expect("Tick failed");
//! assert_eq!(report.frames_submitted, 1);
//! ```

pub mod config;
pub mod core;
pub mod detect;
pub mod session;
pub mod source;
pub mod stats;
pub mod transport;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, SourceConfig};
pub use crate::core::{
    build_feature_vector, DispatchRecord, FeatureVector, HistoryPolicy, PredictionGate,
    SequenceValidator, SequenceViolation, SequenceWindow, SignHistory, FEATURE_LEN,
};
pub use detect::{Detection, Detector, DetectorError, FrameTag, LandmarkPoint, ScriptedDetector};
pub use session::{CaptureError, FrameLoop, SessionSummary, TickReport};
pub use source::{FrameSource, SourceError, SyntheticSource, VideoFrame};
pub use stats::{
    create_shared_stats, create_shared_stats_with_persistence, PipelineStats, SharedPipelineStats,
};
pub use transport::{NullTransport, PredictResponse, PredictorConfig, Transport, TransportError};

// Transport re-exports (when enabled)
#[cfg(feature = "transport")]
pub use transport::{BlockingPredictClient, HttpTransport, PredictClient};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
