//! Console rendering of stream results
//!
//! [`ConsoleTable`] is an [`OutcomeObserver`] that prints one table row per
//! outcome as it arrives:
//!
//! ```text
//! Record Number | Status               | Failure Probability
//! ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//!             1 | No failure predicted |               3.12%
//!             2 | Failure predicted    |              87.10%
//! ```

use std::io::Write;

use tracing::warn;

use crate::pipeline::OutcomeObserver;
use crate::types::{PredictionOutcome, RunFailure, StreamPhase};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Header line of the results table.
pub fn format_header() -> String {
    format!("{:>13} | {:<20} | {:>19}", "Record Number", "Status", "Failure Probability")
}

/// One results row. Failures are flagged with a leading marker.
pub fn format_row(position: usize, outcome: &PredictionOutcome) -> String {
    let marker = if outcome.predicted { "🚨" } else { "  " };
    format!(
        "{marker}{position:>11} | {:<20} | {:>19}",
        outcome.label,
        outcome.probability_percent()
    )
}

/// Closing line for a finished run.
pub fn format_footer(phase: StreamPhase, rows: usize, failure: Option<&RunFailure>) -> String {
    match (phase, failure) {
        (StreamPhase::Failed, Some(f)) => {
            format!(
                "Streaming failed: {} (line {}, {rows} results kept)",
                f.message, f.line
            )
        }
        (StreamPhase::Cancelled, _) => format!("Streaming cancelled after {rows} records"),
        _ => format!("Streaming {phase}: {rows} records"),
    }
}

/// Prints stream progress as a table.
pub struct ConsoleTable<W> {
    out: W,
    rows: usize,
}

impl ConsoleTable<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleTable<W> {
    pub fn new(out: W) -> Self {
        Self { out, rows: 0 }
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            warn!("Failed to write results table: {}", e);
        }
    }
}

impl<W: Write + Send> OutcomeObserver for ConsoleTable<W> {
    fn on_run_started(&mut self, _source: &str) {
        self.rows = 0;
        self.emit(&format_header());
        self.emit(RULE);
    }

    fn on_outcome(&mut self, position: usize, outcome: &PredictionOutcome) {
        self.rows += 1;
        self.emit(&format_row(position, outcome));
    }

    fn on_run_finished(&mut self, phase: StreamPhase, failure: Option<&RunFailure>) {
        self.emit(RULE);
        let footer = format_footer(phase, self.rows, failure);
        self.emit(&footer);
    }
}
