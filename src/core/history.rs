//! Recognition history for a capture session.
//!
//! Tracks the labels the remote predictor has returned, gated by
//! confidence, and rides along with every dispatch as context. Certain
//! easily-confused signs require a much higher confidence before they are
//! accepted.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Labels smoothed over this many recent predictions.
const SMOOTHING_WINDOW: usize = 3;

/// Recent predictions contributing to confidence metrics.
const CONFIDENCE_WINDOW: usize = 5;

/// Acceptance thresholds for recognized labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPolicy {
    /// Minimum confidence for a label to enter the history
    pub min_confidence: f64,
    /// Threshold applied to the strict signs instead
    pub strict_confidence: f64,
    /// Signs that require the strict threshold
    pub strict_signs: Vec<String>,
}

impl Default for HistoryPolicy {
    fn default() -> Self {
        Self {
            min_confidence: 0.50,
            strict_confidence: 0.92,
            strict_signs: vec!["he".to_string(), "she".to_string()],
        }
    }
}

impl HistoryPolicy {
    /// The confidence a given label must exceed.
    pub fn threshold_for(&self, label: &str) -> f64 {
        if self.strict_signs.iter().any(|s| s == label) {
            self.strict_confidence
        } else {
            self.min_confidence
        }
    }
}

/// Ordered history of accepted signs plus running recognition state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignHistory {
    policy: HistoryPolicy,
    labels: Vec<String>,
    /// Confidence of every prediction seen, accepted or not
    confidences: Vec<f64>,
    /// Most recent sentence assembled by the remote predictor
    sentence: String,
}

impl SignHistory {
    pub fn new(policy: HistoryPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Record one prediction. Returns true when the label cleared its
    /// threshold and was appended to the history.
    pub fn record(&mut self, label: &str, confidence: f64) -> bool {
        self.confidences.push(confidence);
        if confidence > self.policy.threshold_for(label) {
            self.labels.push(label.to_string());
            true
        } else {
            false
        }
    }

    /// Accepted labels, oldest first.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn set_sentence(&mut self, sentence: impl Into<String>) {
        self.sentence = sentence.into();
    }

    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    /// Majority label among the last few accepted signs; the latest label
    /// when the history is still shorter than the smoothing window.
    pub fn smoothed_label(&self) -> Option<&str> {
        if self.labels.len() < SMOOTHING_WINDOW {
            return self.labels.last().map(String::as_str);
        }
        let recent = &self.labels[self.labels.len() - SMOOTHING_WINDOW..];
        recent
            .iter()
            .max_by_key(|label| recent.iter().filter(|other| other == label).count())
            .map(String::as_str)
    }

    /// Mean confidence over the most recent predictions.
    pub fn recent_confidence(&self) -> f64 {
        if self.confidences.is_empty() {
            return 0.0;
        }
        let start = self.confidences.len().saturating_sub(CONFIDENCE_WINDOW);
        self.confidences[start..].iter().copied().mean()
    }

    /// Spread of recent confidences; 0 when fewer than two predictions.
    pub fn confidence_spread(&self) -> f64 {
        let start = self.confidences.len().saturating_sub(CONFIDENCE_WINDOW);
        let recent = &self.confidences[start..];
        if recent.len() < 2 {
            return 0.0;
        }
        recent.iter().copied().std_dev()
    }

    pub fn clear(&mut self) {
        self.labels.clear();
        self.confidences.clear();
        self.sentence.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_above_min_confidence() {
        let mut history = SignHistory::default();
        assert!(history.record("hello", 0.6));
        assert!(!history.record("hello", 0.4));
        assert_eq!(history.labels(), ["hello".to_string()]);
    }

    #[test]
    fn test_strict_signs_need_strict_confidence() {
        let mut history = SignHistory::default();
        assert!(!history.record("he", 0.6));
        assert!(history.record("he", 0.95));
        assert!(history.record("you", 0.6));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_smoothing_majority_of_recent() {
        let mut history = SignHistory::default();
        history.record("thank", 0.9);
        history.record("you", 0.9);
        history.record("you", 0.9);
        assert_eq!(history.smoothed_label(), Some("you"));
    }

    #[test]
    fn test_smoothing_short_history_returns_latest() {
        let mut history = SignHistory::default();
        assert_eq!(history.smoothed_label(), None);
        history.record("hello", 0.9);
        assert_eq!(history.smoothed_label(), Some("hello"));
    }

    #[test]
    fn test_recent_confidence_mean() {
        let mut history = SignHistory::default();
        for c in [0.2, 0.9, 0.9, 0.9, 0.9, 0.9] {
            history.record("word", c);
        }
        // Only the last five contribute; the 0.2 fell out of the window.
        assert!((history.recent_confidence() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_rejected_predictions_still_count_toward_confidence() {
        let mut history = SignHistory::default();
        history.record("word", 0.3);
        history.record("word", 0.7);
        assert_eq!(history.len(), 1);
        assert!((history.recent_confidence() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_spread() {
        let mut history = SignHistory::default();
        assert_eq!(history.confidence_spread(), 0.0);
        history.record("word", 0.6);
        assert_eq!(history.confidence_spread(), 0.0);
        history.record("word", 0.8);
        assert!(history.confidence_spread() > 0.0);
    }

    #[test]
    fn test_clear() {
        let mut history = SignHistory::default();
        history.record("hello", 0.9);
        history.set_sentence("Hello.");
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.sentence(), "");
    }
}
