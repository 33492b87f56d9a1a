//! Transport to the remote sign predictor.
//!
//! The pipeline hands each validated sequence to a `Transport` and moves on;
//! recognition results come back asynchronously, out of band. The HTTP
//! implementation talks to the predictor's sequence endpoint.

use crate::core::window::DispatchRecord;
use serde::{Deserialize, Serialize};

#[cfg(feature = "transport")]
use crossbeam_channel::{bounded, Receiver, Sender};

/// Destination for dispatched sequences.
///
/// Dispatch is fire-and-forget: implementations must not block the frame
/// loop on network progress, and there is no acknowledgment path back into
/// the pipeline.
pub trait Transport {
    fn dispatch(&mut self, record: DispatchRecord, history: &[String]);
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn dispatch(&mut self, record: DispatchRecord, history: &[String]) {
        (**self).dispatch(record, history)
    }
}

/// Transport that drops every record. Used when no predictor is wired up.
#[derive(Debug, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn dispatch(&mut self, _record: DispatchRecord, _history: &[String]) {}
}

/// Predictor endpoint configuration.
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    /// Predictor host (default: 127.0.0.1)
    pub host: String,
    /// Predictor port
    pub port: u16,
}

impl PredictorConfig {
    /// Create a new predictor configuration.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the full predictor URL.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Get the sequence prediction endpoint URL.
    pub fn predict_url(&self) -> String {
        format!("{}/api/predict_sequence", self.url())
    }

    /// Get the health check endpoint URL.
    pub fn health_url(&self) -> String {
        format!("{}/api/test", self.url())
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", 5000)
    }
}

/// Transport error types.
#[derive(Debug)]
pub enum TransportError {
    /// Configuration error
    Config(String),
    /// Network/HTTP error
    Network(String),
    /// Server returned an error response
    Server { status: u16, message: String },
    /// JSON serialization error
    Serialization(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Config(msg) => write!(f, "Transport config error: {msg}"),
            TransportError::Network(msg) => write!(f, "Transport network error: {msg}"),
            TransportError::Server { status, message } => {
                write!(f, "Predictor error ({status}): {message}")
            }
            TransportError::Serialization(msg) => {
                write!(f, "Transport serialization error: {msg}")
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Request body for the predictor's sequence endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest {
    /// The flushed sequence, frames × features
    pub sequence: Vec<Vec<f32>>,
    /// Accepted signs so far, as sentence context
    pub history: Vec<String>,
    /// Client metadata
    pub meta: RequestMeta,
}

/// Client metadata riding with each request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestMeta {
    /// Device identifier
    pub device_id: String,
    /// Timezone
    pub timezone: String,
    /// Flush time (RFC3339)
    pub flushed_at: String,
}

/// Recognition result from the predictor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Recognized label for the sequence
    pub label: String,
    /// Model confidence in the label
    pub confidence: f64,
    /// Running sentence assembled from the history
    pub sentence: String,
    /// Canonical history after this prediction
    pub history: Vec<String>,
}

/// HTTP client for the remote predictor.
#[cfg(feature = "transport")]
pub struct PredictClient {
    config: PredictorConfig,
    client: reqwest::Client,
    device_id: String,
    timezone: String,
}

#[cfg(feature = "transport")]
impl PredictClient {
    /// Create a new predictor client.
    pub fn new(config: PredictorConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        // Generate device ID from hostname + instance
        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let device_id = format!(
            "signstream-{}-{}",
            hostname,
            &uuid::Uuid::new_v4().to_string()[..8]
        );

        Self {
            config,
            client,
            device_id,
            timezone: chrono_tz::Tz::UTC.to_string(),
        }
    }

    /// Test connection to the predictor.
    pub async fn test_connection(&self) -> Result<bool, TransportError> {
        let response = self
            .client
            .get(self.config.health_url())
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }

    /// Submit one sequence for recognition.
    pub async fn predict(
        &self,
        record: &DispatchRecord,
        history: &[String],
    ) -> Result<PredictResponse, TransportError> {
        if record.sequence.is_empty() {
            return Err(TransportError::Config("Empty sequence".to_string()));
        }

        let request = PredictRequest {
            sequence: record.sequence.clone(),
            history: history.to_vec(),
            meta: RequestMeta {
                device_id: self.device_id.clone(),
                timezone: self.timezone.clone(),
                flushed_at: record.flushed_at.to_rfc3339(),
            },
        };

        let response = self
            .client
            .post(self.config.predict_url())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let prediction: PredictResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Serialization(e.to_string()))?;

        Ok(prediction)
    }

    /// Get the device ID.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

/// Blocking predictor client for use in synchronous contexts.
#[cfg(feature = "transport")]
pub struct BlockingPredictClient {
    inner: PredictClient,
    runtime: tokio::runtime::Runtime,
}

#[cfg(feature = "transport")]
impl BlockingPredictClient {
    /// Create a new blocking predictor client.
    pub fn new(config: PredictorConfig) -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::Config(format!("Failed to create runtime: {e}")))?;

        Ok(Self {
            inner: PredictClient::new(config),
            runtime,
        })
    }

    /// Test connection to the predictor.
    pub fn test_connection(&self) -> Result<bool, TransportError> {
        self.runtime.block_on(self.inner.test_connection())
    }

    /// Submit one sequence for recognition.
    pub fn predict(
        &self,
        record: &DispatchRecord,
        history: &[String],
    ) -> Result<PredictResponse, TransportError> {
        self.runtime.block_on(self.inner.predict(record, history))
    }

    /// Get the device ID.
    pub fn device_id(&self) -> &str {
        self.inner.device_id()
    }
}

#[cfg(feature = "transport")]
struct PredictJob {
    record: DispatchRecord,
    history: Vec<String>,
}

/// Fire-and-forget HTTP transport.
///
/// A worker thread owns the blocking client; `dispatch` only enqueues. When
/// the worker is saturated the record is dropped and the next window
/// replaces it — the throttle gate is the only backpressure the pipeline
/// observes.
#[cfg(feature = "transport")]
pub struct HttpTransport {
    jobs: Option<Sender<PredictJob>>,
    results: Receiver<Result<PredictResponse, TransportError>>,
    worker: Option<std::thread::JoinHandle<()>>,
    device_id: String,
}

#[cfg(feature = "transport")]
impl HttpTransport {
    /// Spawn the worker and connect to the given predictor.
    pub fn spawn(config: PredictorConfig) -> Result<Self, TransportError> {
        let client = BlockingPredictClient::new(config)?;
        let device_id = client.device_id().to_string();

        match client.test_connection() {
            Ok(true) => {}
            Ok(false) => eprintln!("Warning: Predictor health check failed"),
            Err(e) => eprintln!("Warning: Could not reach predictor: {e}"),
        }

        let (job_tx, job_rx) = bounded::<PredictJob>(8);
        let (result_tx, result_rx) = bounded(8);

        let worker = std::thread::spawn(move || {
            for job in job_rx.iter() {
                let outcome = client.predict(&job.record, &job.history);
                if result_tx.send(outcome).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            worker: Some(worker),
            device_id,
        })
    }

    /// Channel delivering recognition results as they arrive.
    pub fn results(&self) -> &Receiver<Result<PredictResponse, TransportError>> {
        &self.results
    }

    /// Get the device ID.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

#[cfg(feature = "transport")]
impl Transport for HttpTransport {
    fn dispatch(&mut self, record: DispatchRecord, history: &[String]) {
        if let Some(ref jobs) = self.jobs {
            let job = PredictJob {
                record,
                history: history.to_vec(),
            };
            let _ = jobs.try_send(job);
        }
    }
}

#[cfg(feature = "transport")]
impl Drop for HttpTransport {
    fn drop(&mut self) {
        // Closing the job channel lets the worker drain and exit.
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_predictor_config_urls() {
        let config = PredictorConfig::new("127.0.0.1", 5000);
        assert_eq!(config.url(), "http://127.0.0.1:5000");
        assert_eq!(
            config.predict_url(),
            "http://127.0.0.1:5000/api/predict_sequence"
        );
        assert_eq!(config.health_url(), "http://127.0.0.1:5000/api/test");
    }

    #[test]
    fn test_null_transport_accepts_records() {
        let mut transport = NullTransport;
        let record = DispatchRecord {
            sequence: vec![vec![0.0; 4]],
            flushed_at: Utc::now(),
        };
        transport.dispatch(record, &["hello".to_string()]);
    }

    #[test]
    fn test_predict_response_deserialization() {
        let json = r#"{
            "label": "hello",
            "confidence": 0.87,
            "sentence": "Hello.",
            "history": ["hello"]
        }"#;
        let response: PredictResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.label, "hello");
        assert!((response.confidence - 0.87).abs() < 1e-9);
        assert_eq!(response.history.len(), 1);
    }
}
