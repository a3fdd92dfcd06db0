//! HTTP client for the remote prediction service

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{ClientError, PredictionService};
use crate::types::{PredictionOutcome, Record, ServiceOutcome};

/// Health response from the service root.
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// HTTP client for the prediction service.
#[derive(Clone)]
pub struct HttpPredictionClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPredictionClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get base URL for logging
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe the service root; returns its status string.
    pub async fn health(&self) -> Result<String, ClientError> {
        let resp = self.http.get(format!("{}/", self.base_url)).send().await?;
        let health: HealthResponse = read_body(resp).await?;
        Ok(health.status)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let resp = self
            .http
            .post(format!("{}/{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        read_body(resp).await
    }
}

/// Check the status, then decode a non-empty JSON body.
async fn read_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ClientError::ServerError(status));
    }

    let body = resp.bytes().await?;
    if body.is_empty() {
        return Err(ClientError::Deserialization(
            "empty response body".to_string(),
        ));
    }
    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl PredictionService for HttpPredictionClient {
    async fn predict(&self, record: &Record) -> Result<PredictionOutcome, ClientError> {
        let wire: ServiceOutcome = self.post_json("predict", record).await?;
        Ok(PredictionOutcome::try_from(wire)?)
    }

    async fn batch_predict(
        &self,
        records: &[Record],
    ) -> Result<Vec<PredictionOutcome>, ClientError> {
        let wire: Vec<ServiceOutcome> = self.post_json("batch_predict", records).await?;
        wire.into_iter()
            .map(|w| PredictionOutcome::try_from(w).map_err(ClientError::from))
            .collect()
    }

    fn service_name(&self) -> &str {
        &self.base_url
    }
}
