//! Prediction client: remote failure prediction calls
//!
//! ## Architecture
//!
//! - **PredictionService**: the remote service's two endpoints, as a trait so
//!   the stream can run against an HTTP backend or a scripted one
//! - **HttpPredictionClient**: `reqwest` implementation of the service
//! - **SubmissionClient**: wraps a service with the stream contract: one
//!   record per call, exactly one outcome back, failures tagged with the
//!   record's position

mod http;

pub use http::HttpPredictionClient;

use async_trait::async_trait;
use tracing::debug;

use crate::types::{InvalidOutcome, PredictionOutcome, Record, SinglePrediction};

// ============================================================================
// Errors
// ============================================================================

/// Prediction client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned status {0}")]
    ServerError(reqwest::StatusCode),
    #[error("Malformed response: {0}")]
    Deserialization(String),
    #[error("Invalid record: {field} cannot be sent to the service")]
    InvalidRecord { field: &'static str },
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Deserialization(err.to_string())
    }
}

impl From<InvalidOutcome> for ClientError {
    fn from(err: InvalidOutcome) -> Self {
        ClientError::Deserialization(err.to_string())
    }
}

/// A record submission that failed during a stream run.
#[derive(Debug, thiserror::Error)]
#[error("Failed at record {position}: {source}")]
pub struct RemoteError {
    /// 1-based position of the record in the stream
    pub position: usize,
    #[source]
    pub source: ClientError,
}

// ============================================================================
// Service Trait
// ============================================================================

/// The remote prediction service.
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Predict a single record (`POST /predict`).
    async fn predict(&self, record: &Record) -> Result<PredictionOutcome, ClientError>;

    /// Predict a batch of records (`POST /batch_predict`).
    ///
    /// Returns one outcome per record, in request order.
    async fn batch_predict(&self, records: &[Record])
        -> Result<Vec<PredictionOutcome>, ClientError>;

    /// Human-readable name for logging (e.g. the base URL).
    fn service_name(&self) -> &str;
}

#[async_trait]
impl<T: PredictionService + ?Sized> PredictionService for Box<T> {
    async fn predict(&self, record: &Record) -> Result<PredictionOutcome, ClientError> {
        (**self).predict(record).await
    }

    async fn batch_predict(
        &self,
        records: &[Record],
    ) -> Result<Vec<PredictionOutcome>, ClientError> {
        (**self).batch_predict(records).await
    }

    fn service_name(&self) -> &str {
        (**self).service_name()
    }
}

/// Reject records the service schema cannot represent before they leave.
fn check_record(record: &Record) -> Result<(), ClientError> {
    match record.invalid_field() {
        Some(field) => Err(ClientError::InvalidRecord { field }),
        None => Ok(()),
    }
}

// ============================================================================
// Submission Client
// ============================================================================

/// Submits records to a [`PredictionService`] one at a time.
pub struct SubmissionClient<S> {
    service: S,
}

impl<S: PredictionService> SubmissionClient<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Submit one record as a single-element batch.
    ///
    /// `position` is the record's 1-based place in the stream and is only used
    /// to label a failure.
    pub async fn submit(
        &self,
        record: &Record,
        position: usize,
    ) -> Result<PredictionOutcome, RemoteError> {
        let tag = |source: ClientError| RemoteError { position, source };

        check_record(record).map_err(tag)?;

        let mut outcomes = self
            .service
            .batch_predict(std::slice::from_ref(record))
            .await
            .map_err(tag)?;

        if outcomes.len() != 1 {
            return Err(tag(ClientError::Deserialization(format!(
                "expected exactly 1 outcome, got {}",
                outcomes.len()
            ))));
        }

        let outcome = outcomes.remove(0);
        debug!(
            position,
            product_id = %record.product_id,
            probability = outcome.probability,
            "Record predicted"
        );
        Ok(outcome)
    }

    /// Predict a single record outside of a stream.
    ///
    /// Never fails: errors come back as [`SinglePrediction::Error`].
    pub async fn submit_single(&self, record: &Record) -> SinglePrediction {
        if let Err(e) = check_record(record) {
            return SinglePrediction::error(e.to_string());
        }
        match self.service.predict(record).await {
            Ok(outcome) => SinglePrediction::Ok { outcome },
            Err(e) => {
                tracing::warn!(product_id = %record.product_id, error = %e, "Single prediction failed");
                SinglePrediction::error(e.to_string())
            }
        }
    }
}

// ============================================================================
// Scripted Service (tests)
// ============================================================================
