//! Item Neighborhood Model - Item-Item Collaborative Filtering
//!
//! "Items similar to the ones you bought, weighted by how much you bought them."
//!
//! ## Algorithm
//! 1. `fit`: center each item's column on that item's mean over the users who
//!    rated it; missing cells become 0
//! 2. `predict(user, item)`: compare the item's profile with the profile of every
//!    item the user rated, keep the `N` most similar, and average the user's
//!    ratings on them weighted by similarity

use crate::error::{ModelError, PredictionUnavailable};
use crate::neighborhood::{top_unrated, weighted_average, Neighbor};
use crate::similarity::{cosine_similarity, norm};
use crate::traits::{Recommendation, Recommender};
use data_loader::RatingMatrix;
use tracing::{debug, info, instrument};

/// Default number of neighbors weighted into a prediction
pub const DEFAULT_NEIGHBORHOOD_SIZE: usize = 10;

/// Item-based neighborhood recommender
#[derive(Debug, Clone)]
pub struct ItemNeighborhoodModel {
    neighborhood_size: usize,
    state: Option<FittedItems>,
}

#[derive(Debug, Clone)]
struct FittedItems {
    ratings: RatingMatrix,
    /// One centered profile per item, indexed by column, each of length #users
    profiles: Vec<Vec<f64>>,
}

impl ItemNeighborhoodModel {
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

    /// Centered profile of an item, or `None` if unfitted or unknown
    pub fn item_profile(&self, item: &str) -> Option<&[f64]> {
        let state = self.state.as_ref()?;
        let col = state.ratings.item_position(item)?;
        Some(&state.profiles[col])
    }

    fn predict_at(
        &self,
        state: &FittedItems,
        row: usize,
        col: usize,
    ) -> Result<f64, PredictionUnavailable> {
        let target = &state.profiles[col];
        if norm(target) == 0.0 {
            return Err(PredictionUnavailable::ZeroNorm);
        }

        // Rated items whose own profile is flat have no defined similarity
        let neighbors: Vec<Neighbor> = state
            .ratings
            .rated_columns(row)
            .filter_map(|rated| {
                let similarity = cosine_similarity(target, &state.profiles[rated]).ok()?;
                let rating = state.ratings.cell(row, rated)?;
                Some(Neighbor { similarity, rating })
            })
            .collect();

        weighted_average(neighbors, self.neighborhood_size)
    }
}

impl Default for ItemNeighborhoodModel {
    fn default() -> Self {
        Self::new(DEFAULT_NEIGHBORHOOD_SIZE)
    }
}

/// Subtract each item's observed mean down its column; missing cells become 0
fn item_profiles(matrix: &RatingMatrix) -> Vec<Vec<f64>> {
    let (rows, cols) = matrix.shape();
    (0..cols)
        .map(|col| {
            let (sum, count) = matrix
                .raters(col)
                .filter_map(|row| matrix.cell(row, col))
                .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
            let mean = if count > 0 { sum / count as f64 } else { 0.0 };

            (0..rows)
                .map(|row| matrix.cell(row, col).map_or(0.0, |v| v - mean))
                .collect()
        })
        .collect()
}

impl Recommender for ItemNeighborhoodModel {
    fn name(&self) -> &str {
        "ItemNeighborhoodModel"
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

        let profiles = item_profiles(matrix);
        let flat = profiles.iter().filter(|p| norm(p) == 0.0).count();
        debug!("{} of {} item profiles have zero norm", flat, profiles.len());

        let (rows, cols) = matrix.shape();
        info!("Fitted item neighborhood model on {}x{} matrix", rows, cols);

        self.state = Some(FittedItems {
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
