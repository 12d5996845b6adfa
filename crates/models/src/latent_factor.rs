//! Latent Factor Model - Truncated SVD Reconstruction
//!
//! Predicts every cell of the rating matrix at once from a low-rank
//! approximation.
//!
//! ## Algorithm
//! 1. Fill missing cells with 0
//! 2. Subtract each user's mean (over the filled row) from that row
//! 3. Decompose the demeaned matrix and keep the `k` largest singular values
//! 4. Reconstruct `U_k * Σ_k * V_kᵗ` and add the user means back
//!
//! `predict` is then a lookup into the reconstructed table. Filling with 0
//! before demeaning pulls sparse users toward their mean; that bias is accepted.
//!
//! ## Cost
//! `fit` runs a full dense SVD and truncates afterwards: O(m·n·min(m, n)) time
//! and O(m·n) memory for m users and n items. The dense reconstruction is m·n
//! as well. Fine for thousands of customers; larger catalogs need a truncated
//! or randomized solver.

use crate::error::{ModelError, PredictionUnavailable};
use crate::neighborhood::top_unrated;
use crate::traits::{Recommendation, Recommender};
use data_loader::RatingMatrix;
use nalgebra::{DMatrix, DVector, SVD};
use std::cmp::Ordering;
use tracing::{debug, info, instrument};

/// Default number of latent factors
pub const DEFAULT_RANK: usize = 10;

/// Latent-factor recommender backed by a truncated SVD
#[derive(Debug, Clone)]
pub struct LatentFactorModel {
    rank: usize,
    state: Option<FittedFactors>,
}

#[derive(Debug, Clone)]
struct FittedFactors {
    /// Observed scores, used to exclude already-rated items
    ratings: RatingMatrix,
    user_means: DVector<f64>,
    user_factors: DMatrix<f64>,
    singular_values: DVector<f64>,
    item_factors: DMatrix<f64>,
    /// Dense reconstruction with the same labels as `ratings`
    predictions: RatingMatrix,
}

impl LatentFactorModel {
    /// Create an unfitted model keeping `rank` latent factors
    pub fn new(rank: usize) -> Self {
        Self { rank, state: None }
    }

    /// Configure the number of latent factors (default: 10)
    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Reconstructed scores for every (user, item) pair, or `None` before `fit`
    pub fn predictions(&self) -> Option<&RatingMatrix> {
        self.state.as_ref().map(|s| &s.predictions)
    }

    /// Per-user means subtracted before factorization
    pub fn user_means(&self) -> Option<&DVector<f64>> {
        self.state.as_ref().map(|s| &s.user_means)
    }

    /// Retained singular values, largest first
    pub fn singular_values(&self) -> Option<&DVector<f64>> {
        self.state.as_ref().map(|s| &s.singular_values)
    }

    /// (U: users×k, V: k×items)
    pub fn factors(&self) -> Option<(&DMatrix<f64>, &DMatrix<f64>)> {
        self.state
            .as_ref()
            .map(|s| (&s.user_factors, &s.item_factors))
    }

    fn validate_rank(&self, rows: usize, cols: usize) -> Result<(), ModelError> {
        let limit = rows.min(cols).saturating_sub(1);
        if self.rank == 0 || self.rank >= limit {
            return Err(ModelError::InvalidRank {
                k: self.rank,
                rows,
                cols,
            });
        }
        Ok(())
    }
}

impl Default for LatentFactorModel {
    fn default() -> Self {
        Self::new(DEFAULT_RANK)
    }
}

impl Recommender for LatentFactorModel {
    fn name(&self) -> &str {
        "LatentFactorModel"
    }

    #[instrument(skip_all, fields(rank = self.rank))]
    fn fit(&mut self, matrix: &RatingMatrix) -> Result<(), ModelError> {
        self.state = None;
        if matrix.is_empty() {
            return Err(ModelError::EmptyMatrix);
        }
        let (rows, cols) = matrix.shape();
        self.validate_rank(rows, cols)?;

        let filled = DMatrix::from_fn(rows, cols, |r, c| matrix.cell(r, c).unwrap_or(0.0));
        let user_means = DVector::from_fn(rows, |r, _| filled.row(r).sum() / cols as f64);
        let demeaned = DMatrix::from_fn(rows, cols, |r, c| filled[(r, c)] - user_means[r]);

        // max_niter = 0 iterates until convergence
        let svd = SVD::try_new(demeaned, true, true, f64::EPSILON, 0)
            .ok_or(ModelError::DecompositionFailed)?;
        let u = svd.u.ok_or(ModelError::DecompositionFailed)?;
        let v_t = svd.v_t.ok_or(ModelError::DecompositionFailed)?;

        // Keep the k largest singular values regardless of solver ordering
        let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
        order.sort_by(|&a, &b| {
            svd.singular_values[b]
                .partial_cmp(&svd.singular_values[a])
                .unwrap_or(Ordering::Equal)
        });
        order.truncate(self.rank);

        let user_factors = u.select_columns(order.iter());
        let item_factors = v_t.select_rows(order.iter());
        let singular_values = DVector::from_iterator(
            order.len(),
            order.iter().map(|&i| svd.singular_values[i]),
        );
        debug!("Retained singular values: {:?}", singular_values.as_slice());

        let reconstructed =
            &user_factors * DMatrix::from_diagonal(&singular_values) * &item_factors;
        let predictions = matrix.dense_like(|r, c| reconstructed[(r, c)] + user_means[r]);

        info!(
            "Fitted latent factor model on {}x{} matrix with rank {}",
            rows, cols, self.rank
        );

        self.state = Some(FittedFactors {
            ratings: matrix.clone(),
            user_means,
            user_factors,
            singular_values,
            item_factors,
            predictions,
        });
        Ok(())
    }

    fn predict(&self, user: &str, item: &str) -> Result<f64, PredictionUnavailable> {
        let state = self.state.as_ref().ok_or(PredictionUnavailable::NotFitted)?;
        let row = state
            .predictions
            .user_position(user)
            .ok_or_else(|| PredictionUnavailable::UnknownUser(user.to_string()))?;
        let col = state
            .predictions
            .item_position(item)
            .ok_or_else(|| PredictionUnavailable::UnknownItem(item.to_string()))?;
        state
            .predictions
            .cell(row, col)
            .ok_or(PredictionUnavailable::NotFitted)
    }

    fn recommend(&self, user: &str, n: usize) -> Vec<Recommendation> {
        let Some(state) = self.state.as_ref() else {
            return Vec::new();
        };
        let Some(row) = state.ratings.user_position(user) else {
            return Vec::new();
        };
        top_unrated(&state.ratings, row, n, |col| state.predictions.cell(row, col))
    }
}
