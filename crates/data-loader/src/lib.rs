//! # Data Loader Crate
//!
//! This crate turns retail purchase lines into the user-by-item rating matrix
//! the recommendation models train on.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (UserId, ItemId, Interaction, TestRow, RatingMatrix)
//! - **parser**: Parse transaction files into Rust structs
//! - **index**: Aggregate purchases, split train/test, load a Dataset
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Dataset;
//! use std::path::Path;
//!
//! let dataset = Dataset::load_from_file(Path::new("data/transactions.csv"), 0.25, 42)?;
//!
//! let (users, items) = dataset.train.shape();
//! println!("{} users x {} items, {} held out", users, items, dataset.test.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::{Dataset, DEFAULT_SEED, DEFAULT_TEST_FRACTION};
pub use types::{
    // Type aliases
    UserId,
    ItemId,
    // Core types
    Interaction,
    RatingMatrix,
    TestRow,
    Transaction,
};
