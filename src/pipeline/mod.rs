//! Batch Streaming Pipeline
//!
//! ```text
//! source text ──► Record Parser ──► for each record:
//!                                     Submission Client (await remote call)
//!                                     Result Accumulator (notify observers)
//!                                     Pacing Controller (await delay)
//! ```
//!
//! Exactly one submission is in flight at a time, and outcomes are appended in
//! record order. The first failure ends the run.

mod accumulator;
mod orchestrator;
pub mod pacing;
mod state;

pub use accumulator::{OutcomeObserver, ResultAccumulator};
pub use orchestrator::{RunSummary, StreamError, StreamOrchestrator};
pub use pacing::PacingController;
pub use state::{StreamSnapshot, StreamState};
