//! Error types for metrics and evaluation runs.

use thiserror::Error;

use crate::runner::ModelRole;

/// A metric that is undefined for the given inputs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    #[error("Length mismatch: {truth} true values vs {predicted} predictions")]
    LengthMismatch { truth: usize, predicted: usize },

    /// Every prediction was missing, or there were no rows at all
    #[error("No rows with both a true value and a prediction")]
    EmptySample,

    #[error("k must be at least 1")]
    ZeroK,

    #[error("Relevant set is empty, recall is undefined")]
    EmptyRelevantSet,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// The worker evaluating one model panicked or was cancelled
    #[error("{role} evaluation worker failed: {reason}")]
    WorkerFailed { role: ModelRole, reason: String },

    #[error(transparent)]
    Metric(#[from] MetricError),
}
