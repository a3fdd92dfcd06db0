//! Shared data structures for the failure prediction client
//!
//! - [`Record`]: one machine sensor reading parsed from an input row
//! - [`PredictionOutcome`]: the remote service's verdict for one record
//! - [`StreamPhase`] / [`RunFailure`]: lifecycle of a stream run

mod record;
mod outcome;
mod state;

pub use record::*;
pub use outcome::*;
pub use state::*;
