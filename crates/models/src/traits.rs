//! Core trait shared by every recommendation model.
//!
//! This module defines the Recommender trait so latent-factor and
//! neighborhood models can be fitted, queried and evaluated the same way.

use crate::error::{ModelError, PredictionUnavailable};
use data_loader::{ItemId, RatingMatrix};
use serde::{Deserialize, Serialize};

/// One ranked item for a user, with the score that ranked it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub item: ItemId,
    pub score: f64,
}

impl Recommendation {
    pub fn new(item: impl Into<ItemId>, score: f64) -> Self {
        Self {
            item: item.into(),
            score,
        }
    }
}

/// Common contract for recommendation models.
///
/// ## Design Note
/// - `Send + Sync` lets a fitted model move into a worker thread or be
///   shared read-only across rayon tasks
/// - `fit` rebuilds all derived state from scratch; calling it again discards
///   whatever the previous fit produced
pub trait Recommender: Send + Sync {
    /// Returns the name of this model (for logging/reports)
    fn name(&self) -> &str;

    /// Build all derived state from a rating matrix.
    ///
    /// # Returns
    /// * `Ok(())` - The model is ready for `predict` and `recommend`
    /// * `Err(ModelError)` - The configuration doesn't fit this matrix
    fn fit(&mut self, matrix: &RatingMatrix) -> Result<(), ModelError>;

    /// Best estimate of the score `user` would give `item`.
    fn predict(&self, user: &str, item: &str) -> Result<f64, PredictionUnavailable>;

    /// Up to `n` items the user hasn't rated, highest predicted score first.
    ///
    /// Ties keep column order. Unknown users get an empty list.
    fn recommend(&self, user: &str, n: usize) -> Vec<Recommendation>;
}

impl<R: Recommender + ?Sized> Recommender for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fit(&mut self, matrix: &RatingMatrix) -> Result<(), ModelError> {
        (**self).fit(matrix)
    }

    fn predict(&self, user: &str, item: &str) -> Result<f64, PredictionUnavailable> {
        (**self).predict(user, item)
    }

    fn recommend(&self, user: &str, n: usize) -> Vec<Recommendation> {
        (**self).recommend(user, n)
    }
}
