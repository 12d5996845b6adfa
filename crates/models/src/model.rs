//! Tagged model variants and their configuration.
//!
//! `Model` lets callers pick a recommender at runtime (from a CLI flag, say)
//! and still hand it around as one concrete, cloneable type.

use crate::error::{ModelError, PredictionUnavailable};
use crate::item_neighborhood::{ItemNeighborhoodModel, DEFAULT_NEIGHBORHOOD_SIZE};
use crate::latent_factor::{LatentFactorModel, DEFAULT_RANK};
use crate::traits::{Recommendation, Recommender};
use crate::user_neighborhood::UserNeighborhoodModel;
use data_loader::RatingMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which recommender to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    LatentFactor,
    ItemNeighborhood,
    UserNeighborhood,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::LatentFactor => "latent",
            ModelKind::ItemNeighborhood => "item",
            ModelKind::UserNeighborhood => "user",
        };
        f.write_str(name)
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "latent" | "svd" => Ok(ModelKind::LatentFactor),
            "item" | "item-item" => Ok(ModelKind::ItemNeighborhood),
            "user" | "user-user" => Ok(ModelKind::UserNeighborhood),
            other => Err(format!(
                "unknown model '{}', expected one of: latent, item, user",
                other
            )),
        }
    }
}

/// Hyperparameters for building a [`Model`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub kind: ModelKind,
    /// Latent factors kept by the SVD model
    pub rank: usize,
    /// Neighbors weighted by the neighborhood models
    pub neighborhood_size: usize,
}

impl ModelConfig {
    pub fn new(kind: ModelKind) -> Self {
        Self {
            kind,
            rank: DEFAULT_RANK,
            neighborhood_size: DEFAULT_NEIGHBORHOOD_SIZE,
        }
    }

    /// Configure the latent rank (default: 10)
    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    /// Configure the neighborhood size (default: 10)
    pub fn with_neighborhood_size(mut self, size: usize) -> Self {
        self.neighborhood_size = size;
        self
    }

    /// Build an unfitted model
    pub fn build(&self) -> Model {
        Model::from_config(self)
    }
}

/// One of the three recommenders
#[derive(Debug, Clone)]
pub enum Model {
    LatentFactor(LatentFactorModel),
    ItemNeighborhood(ItemNeighborhoodModel),
    UserNeighborhood(UserNeighborhoodModel),
}

impl Model {
    pub fn from_config(config: &ModelConfig) -> Self {
        match config.kind {
            ModelKind::LatentFactor => LatentFactorModel::new(config.rank).into(),
            ModelKind::ItemNeighborhood => {
                ItemNeighborhoodModel::new(config.neighborhood_size).into()
            }
            ModelKind::UserNeighborhood => {
                UserNeighborhoodModel::new(config.neighborhood_size).into()
            }
        }
    }

    /// Build and fit in one step
    pub fn fitted(config: &ModelConfig, matrix: &RatingMatrix) -> Result<Self, ModelError> {
        let mut model = Self::from_config(config);
        model.fit(matrix)?;
        Ok(model)
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Model::LatentFactor(_) => ModelKind::LatentFactor,
            Model::ItemNeighborhood(_) => ModelKind::ItemNeighborhood,
            Model::UserNeighborhood(_) => ModelKind::UserNeighborhood,
        }
    }

    fn inner(&self) -> &dyn Recommender {
        match self {
            Model::LatentFactor(m) => m,
            Model::ItemNeighborhood(m) => m,
            Model::UserNeighborhood(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Recommender {
        match self {
            Model::LatentFactor(m) => m,
            Model::ItemNeighborhood(m) => m,
            Model::UserNeighborhood(m) => m,
        }
    }
}

impl From<LatentFactorModel> for Model {
    fn from(model: LatentFactorModel) -> Self {
        Model::LatentFactor(model)
    }
}

impl From<ItemNeighborhoodModel> for Model {
    fn from(model: ItemNeighborhoodModel) -> Self {
        Model::ItemNeighborhood(model)
    }
}

impl From<UserNeighborhoodModel> for Model {
    fn from(model: UserNeighborhoodModel) -> Self {
        Model::UserNeighborhood(model)
    }
}

impl Recommender for Model {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn fit(&mut self, matrix: &RatingMatrix) -> Result<(), ModelError> {
        self.inner_mut().fit(matrix)
    }

    fn predict(&self, user: &str, item: &str) -> Result<f64, PredictionUnavailable> {
        self.inner().predict(user, item)
    }

    fn recommend(&self, user: &str, n: usize) -> Vec<Recommendation> {
        self.inner().recommend(user, n)
    }
}
