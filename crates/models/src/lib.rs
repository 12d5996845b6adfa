//! # Models Crate
//!
//! Recommendation models that fill in a sparse user-by-item matrix and rank
//! unrated items per user.
//!
//! ## Components
//!
//! ### LatentFactorModel
//! Truncated SVD of the demeaned matrix; every prediction is a table lookup.
//!
//! ### ItemNeighborhoodModel / UserNeighborhoodModel
//! Cosine similarity over mean-centered item (or user) profiles, computed on
//! demand; a prediction is the similarity-weighted average over the `N` closest
//! neighbors.
//!
//! All three implement [`Recommender`] and can be wrapped in the [`Model`] enum.
//!
//! ## Example Usage
//!
//! ```ignore
//! use models::{ModelConfig, ModelKind, Model, Recommender};
//!
//! let config = ModelConfig::new(ModelKind::ItemNeighborhood).with_neighborhood_size(20);
//! let model = Model::fitted(&config, &dataset.train)?;
//!
//! let score = model.predict("1001", "8001")?;
//! let top = model.recommend("1001", 10);
//! ```

pub mod error;
pub mod traits;
pub mod similarity;
pub mod latent_factor;
pub mod item_neighborhood;
pub mod user_neighborhood;
pub mod model;

mod neighborhood;

// Re-export main types
pub use error::{ModelError, PredictionUnavailable};
pub use traits::{Recommendation, Recommender};
pub use similarity::cosine_similarity;
pub use latent_factor::{LatentFactorModel, DEFAULT_RANK};
pub use item_neighborhood::{ItemNeighborhoodModel, DEFAULT_NEIGHBORHOOD_SIZE};
pub use user_neighborhood::UserNeighborhoodModel;
pub use model::{Model, ModelConfig, ModelKind};
