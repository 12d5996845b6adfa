//! Two-way parallel evaluation.
//!
//! Runs batch prediction for the user-based and item-based models on separate
//! blocking workers and waits for both. Each worker owns its model and its own
//! copy of the test rows; the workers share nothing. A worker that panics turns
//! into an error for its side only.

use crate::error::EvaluationError;
use crate::evaluator::evaluate_predict;
use data_loader::TestRow;
use models::Recommender;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::time::Instant;
use tokio::task::JoinError;
use tracing::{info, instrument, warn};

/// Which side of the parallel run a result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ModelRole {
    User,
    Item,
}

impl fmt::Display for ModelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelRole::User => f.write_str("user"),
            ModelRole::Item => f.write_str("item"),
        }
    }
}

pub type Predictions = Vec<Option<f64>>;

/// Outcome of both workers; one failing never drops the other's result
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelEvaluation {
    pub user: Result<Predictions, EvaluationError>,
    pub item: Result<Predictions, EvaluationError>,
}

impl ParallelEvaluation {
    pub fn get(&self, role: ModelRole) -> &Result<Predictions, EvaluationError> {
        match role {
            ModelRole::User => &self.user,
            ModelRole::Item => &self.item,
        }
    }

    /// `(user_predictions, item_predictions)`, or the first failure
    pub fn into_pair(self) -> Result<(Predictions, Predictions), EvaluationError> {
        Ok((self.user?, self.item?))
    }
}

/// Predict `rows` with both models concurrently and join at a barrier.
#[instrument(skip_all, fields(rows = rows.len()))]
///
/// Each worker takes ownership of its model and its own copy of `rows`; clone
/// a model at the call site to keep using it afterwards.
pub async fn run_parallel<U, I>(user_model: U, item_model: I, rows: Vec<TestRow>) -> ParallelEvaluation
where
    U: Recommender + 'static,
    I: Recommender + 'static,
{
    let start_time = Instant::now();
    let item_rows = rows.clone();

    let (user_result, item_result) = tokio::join!(
        tokio::task::spawn_blocking(move || evaluate_predict(&user_model, &rows)),
        tokio::task::spawn_blocking(move || evaluate_predict(&item_model, &item_rows))
    );

    let evaluation = ParallelEvaluation {
        user: worker_outcome(ModelRole::User, user_result),
        item: worker_outcome(ModelRole::Item, item_result),
    };

    info!(
        "Parallel evaluation finished in {:.2?} (user ok: {}, item ok: {})",
        start_time.elapsed(),
        evaluation.user.is_ok(),
        evaluation.item.is_ok()
    );
    evaluation
}

fn worker_outcome(
    role: ModelRole,
    result: Result<Predictions, JoinError>,
) -> Result<Predictions, EvaluationError> {
    result.map_err(|err| {
        let reason = if err.is_panic() {
            panic_message(err.into_panic())
        } else {
            err.to_string()
        };
        warn!("{} evaluation worker failed: {}", role, reason);
        EvaluationError::WorkerFailed { role, reason }
    })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::RatingMatrix;
    use models::{
        ItemNeighborhoodModel, ModelError, PredictionUnavailable, Recommendation,
        UserNeighborhoodModel,
    };

    fn matrix() -> RatingMatrix {
        RatingMatrix::from_rows(
            vec!["u1".into(), "u2".into(), "u3".into(), "u4".into()],
            vec!["i1".into(), "i2".into(), "i3".into(), "i4".into()],
            vec![
                vec![Some(5.0), Some(4.0), None, Some(1.0)],
                vec![Some(1.0), Some(5.0), Some(2.0), None],
                vec![Some(4.0), Some(1.0), Some(5.0), Some(2.0)],
                vec![None, Some(2.0), Some(4.0), Some(3.0)],
            ],
        )
        .unwrap()
    }

    fn rows() -> Vec<TestRow> {
        vec![
            TestRow::new("u1", "i3", 4.0),
            TestRow::new("u2", "i4", 2.0),
            TestRow::new("u4", "i1", 3.0),
            TestRow::new("ghost", "i1", 1.0),
        ]
    }

    /// Panics on every prediction
    struct Exploding;

    impl Recommender for Exploding {
        fn name(&self) -> &str {
            "Exploding"
        }

        fn fit(&mut self, _: &RatingMatrix) -> Result<(), ModelError> {
            Ok(())
        }

        fn predict(&self, _: &str, _: &str) -> Result<f64, PredictionUnavailable> {
            panic!("scoring backend exploded")
        }

        fn recommend(&self, _: &str, _: usize) -> Vec<Recommendation> {
            Vec::new()
        }
    }

    // ========================================================================
    // Agreement with sequential runs
    // ========================================================================

    #[tokio::test]
    async fn test_parallel_matches_sequential() {
        let matrix = matrix();
        let mut user_model = UserNeighborhoodModel::new(2);
        user_model.fit(&matrix).unwrap();
        let mut item_model = ItemNeighborhoodModel::new(2);
        item_model.fit(&matrix).unwrap();

        let expected_user = evaluate_predict(&user_model, &rows());
        let expected_item = evaluate_predict(&item_model, &rows());

        let evaluation = run_parallel(user_model, item_model, rows()).await;
        let (user, item) = evaluation.into_pair().unwrap();

        assert_eq!(user, expected_user, "user side should match a sequential run");
        assert_eq!(item, expected_item, "item side should match a sequential run");
        assert_eq!(user.len(), 4);
        assert_eq!(user[3], None, "unknown user should be a missing marker");
    }

    #[tokio::test]
    async fn test_results_are_deterministic() {
        let matrix = matrix();
        let mut user_model = UserNeighborhoodModel::new(2);
        user_model.fit(&matrix).unwrap();
        let mut item_model = ItemNeighborhoodModel::new(2);
        item_model.fit(&matrix).unwrap();

        let first = run_parallel(user_model.clone(), item_model.clone(), rows()).await;
        let second = run_parallel(user_model.clone(), item_model.clone(), rows()).await;
        assert_eq!(first, second);

        // workers ran on copies; the caller's models are still usable
        assert_eq!(first.user, Ok(evaluate_predict(&user_model, &rows())));
        assert_eq!(first.item, Ok(evaluate_predict(&item_model, &rows())));
    }

    // ========================================================================
    // Failure isolation
    // ========================================================================

    #[tokio::test]
    async fn test_panicking_side_keeps_other_result() {
        let mut item_model = ItemNeighborhoodModel::new(2);
        item_model.fit(&matrix()).unwrap();
        let expected_item = evaluate_predict(&item_model, &rows());

        let evaluation = run_parallel(Exploding, item_model, rows()).await;

        match evaluation.get(ModelRole::User) {
            Err(EvaluationError::WorkerFailed { role, reason }) => {
                assert_eq!(*role, ModelRole::User);
                assert!(reason.contains("exploded"), "reason was: {reason}");
            }
            other => panic!("expected user worker failure, got {other:?}"),
        }
        assert_eq!(
            evaluation.get(ModelRole::Item).as_ref().unwrap(),
            &expected_item,
            "item result should survive the user worker's panic"
        );
        assert!(evaluation.into_pair().is_err());
    }

    #[tokio::test]
    async fn test_boxed_trait_objects() {
        let mut item_model = ItemNeighborhoodModel::new(2);
        item_model.fit(&matrix()).unwrap();

        let user: Box<dyn Recommender> = Box::new(UserNeighborhoodModel::default());
        let item: Box<dyn Recommender> = Box::new(item_model);

        let evaluation = run_parallel(user, item, rows()).await;
        assert_eq!(evaluation.user, Ok(vec![None; 4]), "unfitted model predicts nothing");
        assert!(evaluation.item.is_ok());
    }
}
