//! The frame loop: the scheduler that drives capture.
//!
//! One `FrameLoop` alternates between Idle and Capturing. While capturing it
//! pulls frames from the video source, submits them to the detector, and
//! runs every arriving detection result through the pipeline:
//! build vector → append to window → gate check → flush → validate →
//! dispatch. All mutable pipeline state (window, frame counter, gate,
//! history) lives in the capture session and is created fresh on every
//! start.

use crate::config::Config;
use crate::core::{
    build_feature_vector, PredictionGate, SequenceValidator, SequenceWindow, SignHistory,
};
use crate::detect::{DetectionMessage, Detector, FrameTag};
use crate::source::FrameSource;
use crate::stats::SharedPipelineStats;
use crate::transport::Transport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

/// Errors surfaced by the frame loop.
#[derive(Debug)]
pub enum CaptureError {
    /// The video source could not be acquired. Retrying `start` is valid.
    SourceUnavailable(String),
    /// The detector failed; the capture session has been terminated.
    /// Restarting is valid.
    DetectorFailure(String),
    /// `start` was called while already capturing. The running session is
    /// untouched.
    AlreadyCapturing,
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::SourceUnavailable(msg) => {
                write!(f, "Video source unavailable: {msg}")
            }
            CaptureError::DetectorFailure(msg) => write!(f, "Detector failure: {msg}"),
            CaptureError::AlreadyCapturing => write!(f, "Capture is already active"),
        }
    }
}

impl std::error::Error for CaptureError {}

/// What one `tick` did, for progress reporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickReport {
    pub frames_submitted: u32,
    pub results_processed: u32,
    pub sequences_dispatched: u32,
    pub sequences_rejected: u32,
    pub stale_discarded: u32,
}

/// Summary of a finished capture session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    pub frames_submitted: u64,
    pub sequences_dispatched: u64,
    pub sequences_rejected: u64,
    /// Accepted signs, oldest first
    pub signs: Vec<String>,
    /// Last sentence returned by the predictor
    pub sentence: String,
}

/// Per-capture pipeline state. Exists only between `start` and `stop`.
struct CaptureSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    frames_submitted: u64,
    window: SequenceWindow,
    gate: PredictionGate,
    history: SignHistory,
    sequences_dispatched: u64,
    sequences_rejected: u64,
}

/// The driving scheduler for one video source / detector / transport trio.
pub struct FrameLoop<S, D, T> {
    config: Config,
    source: S,
    detector: D,
    transport: T,
    validator: SequenceValidator,
    stats: SharedPipelineStats,
    session: Option<CaptureSession>,
}

impl<S, D, T> FrameLoop<S, D, T>
where
    S: FrameSource,
    D: Detector,
    T: Transport,
{
    pub fn new(
        config: Config,
        source: S,
        detector: D,
        transport: T,
        stats: SharedPipelineStats,
    ) -> Self {
        let validator = SequenceValidator::new(config.n_frames);
        Self {
            config,
            source,
            detector,
            transport,
            validator,
            stats,
            session: None,
        }
    }

    /// Whether a capture session is active.
    pub fn is_capturing(&self) -> bool {
        self.session.is_some()
    }

    /// Begin capturing. Acquires the video source and creates a fresh
    /// session: empty window, zero frame counter, no dispatch history.
    pub fn start(&mut self) -> Result<Uuid, CaptureError> {
        if self.session.is_some() {
            return Err(CaptureError::AlreadyCapturing);
        }

        self.source
            .open()
            .map_err(|e| CaptureError::SourceUnavailable(e.to_string()))?;

        let session = CaptureSession {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            frames_submitted: 0,
            window: SequenceWindow::new(self.config.n_frames, self.config.retain_frames),
            gate: PredictionGate::new(self.config.n_frames, self.config.throttle),
            history: SignHistory::new(self.config.history_policy()),
            sequences_dispatched: 0,
            sequences_rejected: 0,
        };
        let id = session.id;
        self.session = Some(session);
        Ok(id)
    }

    /// Run one frame cycle: grab a frame, submit it for detection, then
    /// process every detection result that has arrived so far.
    ///
    /// A no-op while idle. A `DetectorFailure` terminates the session
    /// before returning.
    pub fn tick(&mut self) -> Result<TickReport, CaptureError> {
        let mut report = TickReport::default();
        let Some(session_id) = self.session.as_ref().map(|s| s.id) else {
            return Ok(report);
        };

        if let Some(frame) = self.source.grab() {
            let frame_index = {
                let session = match self.session.as_mut() {
                    Some(s) => s,
                    None => return Ok(report),
                };
                session.frames_submitted += 1;
                session.frames_submitted
            };
            let tag = FrameTag {
                session: session_id,
                frame_index,
            };
            self.stats.record_frame_captured();

            if let Err(e) = self.detector.submit(frame, tag) {
                self.halt_session();
                return Err(CaptureError::DetectorFailure(e.to_string()));
            }
            report.frames_submitted += 1;
        }

        self.drain_results(&mut report)?;
        Ok(report)
    }

    fn drain_results(&mut self, report: &mut TickReport) -> Result<(), CaptureError> {
        let pending: Vec<DetectionMessage> = self.detector.results().try_iter().collect();

        for message in pending {
            report.results_processed += 1;
            self.stats.record_detection_received();

            // Stale-result guard: a result tagged with a session other than
            // the live one belongs to a capture that already stopped. It
            // must not touch the current window.
            let live = self.session.as_ref().map(|s| s.id);
            if live != Some(message.tag.session) {
                report.stale_discarded += 1;
                self.stats.record_stale_discarded();
                continue;
            }

            let detection = match message.outcome {
                Ok(detection) => detection,
                Err(e) => {
                    self.halt_session();
                    return Err(CaptureError::DetectorFailure(e.to_string()));
                }
            };

            let vector = build_feature_vector(&detection);

            let Some(session) = self.session.as_mut() else {
                continue;
            };
            session.window.push(vector);

            let buffered = session.window.len();
            if session.gate.check(buffered, Instant::now()) {
                let record = session.window.flush();
                match self.validator.validate(&record) {
                    Ok(()) => {
                        session.sequences_dispatched += 1;
                        report.sequences_dispatched += 1;
                        self.stats.record_sequence_dispatched();
                        self.transport.dispatch(record, session.history.labels());
                    }
                    Err(_violation) => {
                        // Invalid sequences are dropped silently; the window
                        // keeps its retained tail and self-corrects as new
                        // frames arrive.
                        session.sequences_rejected += 1;
                        report.sequences_rejected += 1;
                        self.stats.record_sequence_rejected();
                    }
                }
            }
        }

        Ok(())
    }

    /// Feed an out-of-band recognition result into the live session's
    /// history. Returns true when the label was accepted.
    pub fn record_prediction(&mut self, label: &str, confidence: f64) -> bool {
        self.stats.record_prediction_received();
        match self.session.as_mut() {
            Some(session) => session.history.record(label, confidence),
            None => false,
        }
    }

    /// Store the predictor's running sentence on the live session.
    pub fn set_sentence(&mut self, sentence: &str) {
        if let Some(session) = self.session.as_mut() {
            session.history.set_sentence(sentence);
        }
    }

    /// The live session's recognition history, if capturing.
    pub fn history(&self) -> Option<&SignHistory> {
        self.session.as_ref().map(|s| &s.history)
    }

    /// Current window length; 0 while idle.
    pub fn window_len(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.window.len())
    }

    /// Frames submitted in the live session; 0 while idle.
    pub fn frames_submitted(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.frames_submitted)
    }

    /// Stop capturing and release the video source. Returns a summary of
    /// the finished session, or `None` when already idle.
    ///
    /// In-flight detector work is not aborted; its results will be
    /// discarded by the stale guard when they eventually arrive.
    pub fn stop(&mut self) -> Option<SessionSummary> {
        let session = self.session.take()?;
        self.source.close();

        Some(SessionSummary {
            session_id: session.id,
            started_at: session.started_at,
            stopped_at: Utc::now(),
            frames_submitted: session.frames_submitted,
            sequences_dispatched: session.sequences_dispatched,
            sequences_rejected: session.sequences_rejected,
            signs: session.history.labels().to_vec(),
            sentence: session.history.sentence().to_string(),
        })
    }

    fn halt_session(&mut self) {
        if self.session.take().is_some() {
            self.source.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{Detection, DetectorError, ScriptedDetector};
    use crate::source::SyntheticSource;
    use crate::stats::create_shared_stats;
    use crate::transport::NullTransport;

    fn test_config() -> Config {
        Config {
            data_path: std::env::temp_dir().join("sign-stream-session-test"),
            export_path: std::env::temp_dir().join("sign-stream-session-test/exports"),
            ..Config::default()
        }
    }

    fn full_body_loop() -> FrameLoop<SyntheticSource, ScriptedDetector, NullTransport> {
        FrameLoop::new(
            test_config(),
            SyntheticSource::new(64, 48),
            ScriptedDetector::full_body(),
            NullTransport,
            create_shared_stats(),
        )
    }

    #[test]
    fn test_start_stop_lifecycle() {
        let mut frame_loop = full_body_loop();
        assert!(!frame_loop.is_capturing());

        frame_loop.start().expect("start failed");
        assert!(frame_loop.is_capturing());

        let summary = frame_loop.stop().expect("no summary");
        assert!(!frame_loop.is_capturing());
        assert_eq!(summary.frames_submitted, 0);
        assert!(frame_loop.stop().is_none());
    }

    #[test]
    fn test_reentrant_start_signals_already_capturing() {
        let mut frame_loop = full_body_loop();
        frame_loop.start().expect("start failed");
        assert!(matches!(
            frame_loop.start(),
            Err(CaptureError::AlreadyCapturing)
        ));
        // The running session survived.
        assert!(frame_loop.is_capturing());
    }

    #[test]
    fn test_unavailable_source_fails_start() {
        let mut frame_loop = FrameLoop::new(
            test_config(),
            SyntheticSource::unavailable(),
            ScriptedDetector::full_body(),
            NullTransport,
            create_shared_stats(),
        );
        assert!(matches!(
            frame_loop.start(),
            Err(CaptureError::SourceUnavailable(_))
        ));
        assert!(!frame_loop.is_capturing());
    }

    #[test]
    fn test_tick_is_noop_while_idle() {
        let mut frame_loop = full_body_loop();
        let report = frame_loop.tick().expect("tick failed");
        assert_eq!(report.frames_submitted, 0);
        assert_eq!(report.results_processed, 0);
    }

    #[test]
    fn test_window_fills_per_tick() {
        let mut frame_loop = full_body_loop();
        frame_loop.start().expect("start failed");

        for expected in 1..=12 {
            frame_loop.tick().expect("tick failed");
            assert_eq!(frame_loop.window_len(), expected);
        }
        assert_eq!(frame_loop.frames_submitted(), 12);
    }

    #[test]
    fn test_detector_failure_terminates_session() {
        let detector = ScriptedDetector::new(|i| {
            if i == 5 {
                Err(DetectorError::Internal("model crashed".to_string()))
            } else {
                Ok(Detection::empty())
            }
        });
        let mut frame_loop = FrameLoop::new(
            test_config(),
            SyntheticSource::new(64, 48),
            detector,
            NullTransport,
            create_shared_stats(),
        );
        frame_loop.start().expect("start failed");

        let mut failed = false;
        for _ in 0..5 {
            if let Err(CaptureError::DetectorFailure(_)) = frame_loop.tick() {
                failed = true;
                break;
            }
        }
        assert!(failed);
        assert!(!frame_loop.is_capturing());

        // Recoverable by restarting.
        frame_loop.start().expect("restart failed");
        assert!(frame_loop.is_capturing());
    }

    #[test]
    fn test_restart_resets_window_and_counter() {
        let mut frame_loop = full_body_loop();
        frame_loop.start().expect("start failed");
        for _ in 0..12 {
            frame_loop.tick().expect("tick failed");
        }
        assert_eq!(frame_loop.window_len(), 12);

        let summary = frame_loop.stop().expect("no summary");
        assert_eq!(summary.frames_submitted, 12);
        assert_eq!(summary.sequences_dispatched, 0);

        frame_loop.start().expect("restart failed");
        assert_eq!(frame_loop.window_len(), 0);
        assert_eq!(frame_loop.frames_submitted(), 0);
    }

    #[test]
    fn test_prediction_feedback_updates_history() {
        let mut frame_loop = full_body_loop();
        frame_loop.start().expect("start failed");

        assert!(frame_loop.record_prediction("hello", 0.8));
        assert!(!frame_loop.record_prediction("he", 0.6));
        frame_loop.set_sentence("Hello.");

        let history = frame_loop.history().expect("no history");
        assert_eq!(history.labels(), ["hello".to_string()]);
        assert_eq!(history.sentence(), "Hello.");
    }

    #[test]
    fn test_prediction_feedback_ignored_while_idle() {
        let mut frame_loop = full_body_loop();
        assert!(!frame_loop.record_prediction("hello", 0.9));
        assert!(frame_loop.history().is_none());
    }
}
