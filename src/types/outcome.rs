//! Prediction outcome types

use serde::{Deserialize, Serialize};

/// The service's verdict for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    /// Human-readable status, e.g. "Failure predicted"
    pub label: String,
    /// True when a failure is predicted
    pub predicted: bool,
    /// Failure probability in [0, 1]
    pub probability: f64,
}

impl PredictionOutcome {
    /// Probability as a percentage with two decimals, e.g. `"12.34%"`.
    pub fn probability_percent(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }

    /// One-line summary for display: `"Failure predicted (87.10%)"`.
    pub fn summary(&self) -> String {
        format!("{} ({})", self.label, self.probability_percent())
    }
}

// ============================================================================
// Wire Format
// ============================================================================

/// Outcome object exactly as the prediction service returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOutcome {
    /// 1 = failure, 0 = no failure
    pub prediction: i64,
    pub probability: f64,
    pub message: String,
}

/// A service outcome that does not fit [`PredictionOutcome`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidOutcome {
    #[error("prediction must be 0 or 1, got {0}")]
    Prediction(i64),
    #[error("probability must be within [0, 1], got {0}")]
    Probability(f64),
}

impl TryFrom<ServiceOutcome> for PredictionOutcome {
    type Error = InvalidOutcome;

    fn try_from(wire: ServiceOutcome) -> Result<Self, Self::Error> {
        let predicted = match wire.prediction {
            0 => false,
            1 => true,
            other => return Err(InvalidOutcome::Prediction(other)),
        };
        if !(0.0..=1.0).contains(&wire.probability) {
            return Err(InvalidOutcome::Probability(wire.probability));
        }
        Ok(Self {
            label: wire.message,
            predicted,
            probability: wire.probability,
        })
    }
}

impl From<&PredictionOutcome> for ServiceOutcome {
    fn from(outcome: &PredictionOutcome) -> Self {
        Self {
            prediction: i64::from(outcome.predicted),
            probability: outcome.probability,
            message: outcome.label.clone(),
        }
    }
}

// ============================================================================
// Single-Record Result
// ============================================================================

/// Result of a single-record request, always displayable.
///
/// Failures are carried as a value so the caller can render them next to the
/// form instead of handling a fault.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SinglePrediction {
    Ok { outcome: PredictionOutcome },
    Error { message: String },
}

impl SinglePrediction {
    pub fn error(message: impl Into<String>) -> Self {
        SinglePrediction::Error {
            message: message.into(),
        }
    }

    pub fn outcome(&self) -> Option<&PredictionOutcome> {
        match self {
            SinglePrediction::Ok { outcome } => Some(outcome),
            SinglePrediction::Error { .. } => None,
        }
    }
}

impl std::fmt::Display for SinglePrediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinglePrediction::Ok { outcome } => f.write_str(&outcome.summary()),
            SinglePrediction::Error { message } => write!(f, "Single prediction failed: {message}"),
        }
    }
}
