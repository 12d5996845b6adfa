//! User Neighborhood Model - User-User Collaborative Filtering
//!
//! "Customers who buy like you bought this, this much."
//!
//! ## Algorithm
//! 1. `fit`: center each user's row on that user's own mean; missing cells become 0
//! 2. `predict(user, item)`: compare the user's profile with every other user who
//!    rated the item, keep the `N` most similar, and average their ratings on the
//!    item weighted by similarity

use crate::error::{ModelError, PredictionUnavailable};
use crate::item_neighborhood::DEFAULT_NEIGHBORHOOD_SIZE;
use crate::neighborhood::{top_unrated, weighted_average, Neighbor};
use crate::similarity::{cosine_similarity, norm};
use crate::traits::{Recommendation, Recommender};
use data_loader::RatingMatrix;
use tracing::{debug, info, instrument};

/// User-based neighborhood recommender
#[derive(Debug, Clone)]
pub struct UserNeighborhoodModel {
    neighborhood_size: usize,
    state: Option<FittedUsers>,
}

#[derive(Debug, Clone)]
struct FittedUsers {
    ratings: RatingMatrix,
    /// One centered profile per user, indexed by row, each of length #items
    profiles: Vec<Vec<f64>>,
}

impl UserNeighborhoodModel {
    /// Create an unfitted model weighting `neighborhood_size` neighbors
    pub fn new(neighborhood_size: usize) -> Self {
        Self {
            neighborhood_size,
            state: None,
        }
    }

    /// Configure the neighborhood size (default: 10)
    pub fn with_neighborhood_size(mut self, size: usize) -> Self {
        self.neighborhood_size = size;
        self
    }

    pub fn neighborhood_size(&self) -> usize {
        self.neighborhood_size
    }

    /// Centered profile of a user, or `None` if unfitted or unknown
    pub fn user_profile(&self, user: &str) -> Option<&[f64]> {
        let state = self.state.as_ref()?;
        let row = state.ratings.user_position(user)?;
        Some(&state.profiles[row])
    }

    fn predict_at(
        &self,
        state: &FittedUsers,
        row: usize,
        col: usize,
    ) -> Result<f64, PredictionUnavailable> {
        let target = &state.profiles[row];
        if norm(target) == 0.0 {
            return Err(PredictionUnavailable::ZeroNorm);
        }

        let neighbors: Vec<Neighbor> = state
            .ratings
            .raters(col)
            .filter(|&other| other != row)
            .filter_map(|other| {
                let similarity = cosine_similarity(target, &state.profiles[other]).ok()?;
                let rating = state.ratings.cell(other, col)?;
                Some(Neighbor { similarity, rating })
            })
            .collect();

        weighted_average(neighbors, self.neighborhood_size)
    }
}

impl Default for UserNeighborhoodModel {
    fn default() -> Self {
        Self::new(DEFAULT_NEIGHBORHOOD_SIZE)
    }
}

/// Subtract each user's observed mean along their row; missing cells become 0
fn user_profiles(matrix: &RatingMatrix) -> Vec<Vec<f64>> {
    let (rows, _) = matrix.shape();
    (0..rows)
        .map(|row| {
            let cells = matrix.row(row);
            let observed: Vec<f64> = cells.iter().flatten().copied().collect();
            let mean = if observed.is_empty() {
                0.0
            } else {
                observed.iter().sum::<f64>() / observed.len() as f64
            };

            cells.iter().map(|c| c.map_or(0.0, |v| v - mean)).collect()
        })
        .collect()
}

impl Recommender for UserNeighborhoodModel {
    fn name(&self) -> &str {
        "UserNeighborhoodModel"
    }

    #[instrument(skip_all, fields(neighborhood_size = self.neighborhood_size))]
    fn fit(&mut self, matrix: &RatingMatrix) -> Result<(), ModelError> {
        self.state = None;
        if self.neighborhood_size == 0 {
            return Err(ModelError::InvalidNeighborhoodSize);
        }
        if matrix.is_empty() {
            return Err(ModelError::EmptyMatrix);
        }

        let profiles = user_profiles(matrix);
        let flat = profiles.iter().filter(|p| norm(p) == 0.0).count();
        debug!("{} of {} user profiles have zero norm", flat, profiles.len());

        let (rows, cols) = matrix.shape();
        info!("Fitted user neighborhood model on {}x{} matrix", rows, cols);

        self.state = Some(FittedUsers {
            ratings: matrix.clone(),
            profiles,
        });
        Ok(())
    }

    fn predict(&self, user: &str, item: &str) -> Result<f64, PredictionUnavailable> {
        let state = self.state.as_ref().ok_or(PredictionUnavailable::NotFitted)?;
        let row = state
            .ratings
            .user_position(user)
            .ok_or_else(|| PredictionUnavailable::UnknownUser(user.to_string()))?;
        let col = state
            .ratings
            .item_position(item)
            .ok_or_else(|| PredictionUnavailable::UnknownItem(item.to_string()))?;
        self.predict_at(state, row, col)
    }

    fn recommend(&self, user: &str, n: usize) -> Vec<Recommendation> {
        let Some(state) = self.state.as_ref() else {
            return Vec::new();
        };
        let Some(row) = state.ratings.user_position(user) else {
            return Vec::new();
        };
        top_unrated(&state.ratings, row, n, |col| {
            self.predict_at(state, row, col).ok()
        })
    }
}
