//! failstream: Machine Failure Prediction Stream Client
//!
//! Reads machine sensor records from a CSV file and streams them, one record
//! per request and paced, to a remote failure prediction service. Outcomes are
//! accumulated in order and published to observers as they arrive.
//!
//! ## Architecture
//!
//! - **Acquisition**: CSV text → [`Record`]s (short rows skipped)
//! - **Client**: one remote call per record, typed outcomes, positioned errors
//! - **Pipeline**: pacing, result accumulator/observers, stream orchestrator
//! - **API**: local dashboard (stream control, snapshot, SSE, single predict)
//! - **Render**: console results table

pub mod acquisition;
pub mod api;
pub mod client;
pub mod config;
pub mod pipeline;
pub mod render;
pub mod types;

// Re-export configuration
pub use config::ClientConfig;

// Re-export commonly used types
pub use types::{
    MachineType, PredictionForm, PredictionOutcome, Record, RunFailure, SinglePrediction,
    StreamPhase,
};

// Re-export client
pub use client::{ClientError, HttpPredictionClient, PredictionService, RemoteError, SubmissionClient};

// Re-export pipeline
pub use pipeline::{
    OutcomeObserver, PacingController, RunSummary, StreamError, StreamOrchestrator, StreamState,
};
