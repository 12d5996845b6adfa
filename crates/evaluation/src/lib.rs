//! # Evaluation Crate
//!
//! Measures fitted recommenders against held-out purchases.
//!
//! ## Components
//!
//! - **evaluator**: batch prediction with missing markers, coverage
//! - **metrics**: MAE, precision@k, recall@k, F1@k
//! - **ranking**: per-user top-k evaluation over held-out items
//! - **runner**: user and item models evaluated concurrently on blocking workers
//! - **report**: serializable summaries for text or JSON output
//!
//! ## Example Usage
//!
//! ```ignore
//! use evaluation::{run_parallel, mae, true_scores};
//!
//! let evaluation = run_parallel(user_model.clone(), item_model.clone(), dataset.test.clone()).await;
//! let (user_preds, item_preds) = evaluation.into_pair()?;
//! println!("user MAE: {:.4}", mae(&true_scores(&dataset.test), &user_preds)?);
//! ```

pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod ranking;
pub mod report;
pub mod runner;

pub use error::{EvaluationError, MetricError};
pub use evaluator::{coverage, evaluate_predict, true_scores};
pub use metrics::{f1_score_at_k, mae, precision_at_k, recall_at_k};
pub use ranking::{evaluate_ranking, rank_users, relevant_items, RankingSummary, UserRanking};
pub use report::{evaluate_model, EvaluationReport, ModelReport};
pub use runner::{run_parallel, ModelRole, ParallelEvaluation, Predictions};
