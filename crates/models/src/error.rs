//! Error types for fitting and querying recommendation models.

use data_loader::{ItemId, UserId};
use thiserror::Error;

/// Structural problems found while fitting. These abort model construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Rank outside `1 <= k < min(rows, cols) - 1`
    #[error("Invalid rank k={k} for a {rows}x{cols} matrix (need 1 <= k < min(rows, cols) - 1)")]
    InvalidRank { k: usize, rows: usize, cols: usize },

    #[error("Neighborhood size must be at least 1")]
    InvalidNeighborhoodSize,

    #[error("Cannot fit on an empty rating matrix")]
    EmptyMatrix,

    #[error("Singular value decomposition did not converge")]
    DecompositionFailed,
}

/// Why a single (user, item) prediction could not be produced.
///
/// Recoverable: batch evaluation turns it into a missing marker and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionUnavailable {
    #[error("Model has not been fitted")]
    NotFitted,

    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    /// Cosine similarity against a zero-norm profile is undefined
    #[error("Profile has zero norm, similarity is undefined")]
    ZeroNorm,

    /// No rated neighbor with a defined similarity
    #[error("No neighbors available")]
    NoNeighbors,

    /// Selected neighbor similarities sum to zero
    #[error("Neighbor similarities sum to zero")]
    DegenerateWeights,
}
