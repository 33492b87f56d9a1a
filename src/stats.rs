//! Pipeline counters.
//!
//! Tracks what the agent did with the frame stream — captures, detections,
//! dispatches, drops — without retaining any frame or landmark data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for the current agent run.
#[derive(Debug)]
pub struct PipelineStats {
    /// Frames pulled from the video source
    frames_captured: AtomicU64,
    /// Detection results received from the detector
    detections_received: AtomicU64,
    /// Results discarded because their session had stopped
    stale_results_discarded: AtomicU64,
    /// Sequences handed to the transport
    sequences_dispatched: AtomicU64,
    /// Sequences the validator rejected
    sequences_rejected: AtomicU64,
    /// Recognition results consumed from the transport
    predictions_received: AtomicU64,
    /// Run start time
    run_start: DateTime<Utc>,
    /// Path for persisting cumulative stats
    persist_path: Option<PathBuf>,
}

impl PipelineStats {
    /// Create a new stats tracker.
    pub fn new() -> Self {
        Self {
            frames_captured: AtomicU64::new(0),
            detections_received: AtomicU64::new(0),
            stale_results_discarded: AtomicU64::new(0),
            sequences_dispatched: AtomicU64::new(0),
            sequences_rejected: AtomicU64::new(0),
            predictions_received: AtomicU64::new(0),
            run_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a stats tracker with persistence, resuming prior counts.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);

        if let Err(e) = stats.load() {
            eprintln!("Note: Could not load previous pipeline stats: {e}");
        }

        stats
    }

    pub fn record_frame_captured(&self) {
        self.frames_captured.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_detection_received(&self) {
        self.detections_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_discarded(&self) {
        self.stale_results_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sequence_dispatched(&self) {
        self.sequences_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sequence_rejected(&self) {
        self.sequences_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prediction_received(&self) {
        self.predictions_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_captured: self.frames_captured.load(Ordering::Relaxed),
            detections_received: self.detections_received.load(Ordering::Relaxed),
            stale_results_discarded: self.stale_results_discarded.load(Ordering::Relaxed),
            sequences_dispatched: self.sequences_dispatched.load(Ordering::Relaxed),
            sequences_rejected: self.sequences_rejected.load(Ordering::Relaxed),
            predictions_received: self.predictions_received.load(Ordering::Relaxed),
            run_start: self.run_start,
            run_duration_secs: (Utc::now() - self.run_start).num_seconds() as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        format!(
            "Pipeline Statistics:\n\
             - Frames captured: {}\n\
             - Detections received: {}\n\
             - Stale results discarded: {}\n\
             - Sequences dispatched: {}\n\
             - Sequences rejected: {}\n\
             - Predictions received: {}\n\
             - Run duration: {} seconds",
            stats.frames_captured,
            stats.detections_received,
            stats.stale_results_discarded,
            stats.sequences_dispatched,
            stats.sequences_rejected,
            stats.predictions_received,
            stats.run_duration_secs
        )
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            // Ensure parent directory exists
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.snapshot();
            let persisted = PersistedStats {
                frames_captured: stats.frames_captured,
                detections_received: stats.detections_received,
                stale_results_discarded: stats.stale_results_discarded,
                sequences_dispatched: stats.sequences_dispatched,
                sequences_rejected: stats.sequences_rejected,
                predictions_received: stats.predictions_received,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load stats from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.frames_captured
                    .store(persisted.frames_captured, Ordering::Relaxed);
                self.detections_received
                    .store(persisted.detections_received, Ordering::Relaxed);
                self.stale_results_discarded
                    .store(persisted.stale_results_discarded, Ordering::Relaxed);
                self.sequences_dispatched
                    .store(persisted.sequences_dispatched, Ordering::Relaxed);
                self.sequences_rejected
                    .store(persisted.sequences_rejected, Ordering::Relaxed);
                self.predictions_received
                    .store(persisted.predictions_received, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.frames_captured.store(0, Ordering::Relaxed);
        self.detections_received.store(0, Ordering::Relaxed);
        self.stale_results_discarded.store(0, Ordering::Relaxed);
        self.sequences_dispatched.store(0, Ordering::Relaxed);
        self.sequences_rejected.store(0, Ordering::Relaxed);
        self.predictions_received.store(0, Ordering::Relaxed);
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of pipeline statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub frames_captured: u64,
    pub detections_received: u64,
    pub stale_results_discarded: u64,
    pub sequences_dispatched: u64,
    pub sequences_rejected: u64,
    pub predictions_received: u64,
    pub run_start: DateTime<Utc>,
    pub run_duration_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    frames_captured: u64,
    detections_received: u64,
    stale_results_discarded: u64,
    sequences_dispatched: u64,
    sequences_rejected: u64,
    predictions_received: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared stats handle.
pub type SharedPipelineStats = Arc<PipelineStats>;

/// Create a new shared stats tracker.
pub fn create_shared_stats() -> SharedPipelineStats {
    Arc::new(PipelineStats::new())
}

/// Create a new shared stats tracker with persistence.
pub fn create_shared_stats_with_persistence(path: PathBuf) -> SharedPipelineStats {
    Arc::new(PipelineStats::with_persistence(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting() {
        let stats = PipelineStats::new();
        stats.record_frame_captured();
        stats.record_frame_captured();
        stats.record_detection_received();
        stats.record_sequence_dispatched();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.frames_captured, 2);
        assert_eq!(snapshot.detections_received, 1);
        assert_eq!(snapshot.sequences_dispatched, 1);
        assert_eq!(snapshot.stale_results_discarded, 0);
    }

    #[test]
    fn test_summary_contains_counters() {
        let stats = PipelineStats::new();
        stats.record_sequence_rejected();
        let summary = stats.summary();
        assert!(summary.contains("Sequences rejected: 1"));
        assert!(summary.contains("Frames captured: 0"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir().join("sign-stream-stats-test.json");
        let _ = std::fs::remove_file(&path);

        let stats = PipelineStats::with_persistence(path.clone());
        stats.record_frame_captured();
        stats.record_stale_discarded();
        stats.save().expect("save failed");

        let restored = PipelineStats::with_persistence(path.clone());
        let snapshot = restored.snapshot();
        assert_eq!(snapshot.frames_captured, 1);
        assert_eq!(snapshot.stale_results_discarded, 1);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_reset() {
        let stats = PipelineStats::new();
        stats.record_frame_captured();
        stats.reset();
        assert_eq!(stats.snapshot().frames_captured, 0);
    }
}
