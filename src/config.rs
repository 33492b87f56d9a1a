//! Configuration for the sign-stream agent.

use crate::core::history::HistoryPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the capture pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Frames per dispatched sequence
    pub n_frames: usize,

    /// Frames retained in the window after a flush (0 clears fully)
    pub retain_frames: usize,

    /// Minimum interval between two dispatches
    #[serde(with = "duration_millis")]
    pub throttle: Duration,

    /// Target capture rate in frames per second
    pub frame_rate: f64,

    /// Minimum confidence for a label to enter the recognition history
    pub min_confidence: f64,

    /// Confidence required for the strict signs
    pub strict_confidence: f64,

    /// Signs held to the strict threshold
    pub strict_signs: Vec<String>,

    /// Video source settings
    pub source: SourceConfig,

    /// Path for exporting session reports
    pub export_path: PathBuf,

    /// Path for storing state and pipeline stats
    pub data_path: PathBuf,

    /// Whether capture is currently paused
    pub paused: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sign-stream-agent");

        Self {
            n_frames: 30,
            retain_frames: 10,
            throttle: Duration::from_millis(400),
            frame_rate: 25.0,
            min_confidence: 0.50,
            strict_confidence: 0.92,
            strict_signs: vec!["he".to_string(), "she".to_string()],
            source: SourceConfig::default(),
            export_path: data_dir.join("exports"),
            data_path: data_dir,
            paused: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sign-stream-agent")
            .join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Interval between frame grabs at the configured rate.
    pub fn frame_interval(&self) -> Duration {
        if self.frame_rate <= 0.0 {
            return Duration::from_millis(40);
        }
        Duration::from_secs_f64(1.0 / self.frame_rate)
    }

    /// Label acceptance thresholds as a history policy.
    pub fn history_policy(&self) -> HistoryPolicy {
        HistoryPolicy {
            min_confidence: self.min_confidence,
            strict_confidence: self.strict_confidence,
            strict_signs: self.strict_signs.clone(),
        }
    }
}

/// Configuration for the video source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub frame_width: u32,
    pub frame_height: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            frame_width: 640,
            frame_height: 480,
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for millisecond durations.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.n_frames, 30);
        assert_eq!(config.retain_frames, 10);
        assert_eq!(config.throttle, Duration::from_millis(400));
        assert_eq!(config.strict_signs, ["he", "she"]);
        assert!(!config.paused);
    }

    #[test]
    fn test_frame_interval() {
        let config = Config {
            frame_rate: 25.0,
            ..Config::default()
        };
        assert_eq!(config.frame_interval(), Duration::from_millis(40));

        let degenerate = Config {
            frame_rate: 0.0,
            ..Config::default()
        };
        assert_eq!(degenerate.frame_interval(), Duration::from_millis(40));
    }

    #[test]
    fn test_throttle_round_trips_as_millis() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"throttle\":400"));

        let restored: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.throttle, Duration::from_millis(400));
    }

    #[test]
    fn test_history_policy_mirrors_thresholds() {
        let config = Config::default();
        let policy = config.history_policy();
        assert_eq!(policy.threshold_for("he"), config.strict_confidence);
        assert_eq!(policy.threshold_for("hello"), config.min_confidence);
    }
}
