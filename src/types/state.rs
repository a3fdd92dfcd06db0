//! Stream run lifecycle types

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a stream run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StreamPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl StreamPhase {
    /// Completed, Failed and Cancelled accept no further results.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            StreamPhase::Completed | StreamPhase::Failed | StreamPhase::Cancelled
        )
    }
}

impl std::fmt::Display for StreamPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamPhase::Idle => write!(f, "Idle"),
            StreamPhase::Running => write!(f, "Running"),
            StreamPhase::Completed => write!(f, "Completed"),
            StreamPhase::Failed => write!(f, "Failed"),
            StreamPhase::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Why a run stopped early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFailure {
    /// 1-based position of the failing record among the records sent
    pub position: usize,
    /// 1-based line of the record in the source file
    pub line: usize,
    pub message: String,
}
