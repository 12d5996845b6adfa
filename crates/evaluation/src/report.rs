//! Summaries of an evaluation run, printable as text or serializable to JSON.

use crate::evaluator::{coverage, evaluate_predict, true_scores};
use crate::metrics::mae;
use crate::ranking::{evaluate_ranking, RankingSummary};
use data_loader::{ItemId, TestRow, UserId};
use models::Recommender;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Results for one model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelReport {
    pub model: String,
    /// `None` when no prediction was available
    pub mae: Option<f64>,
    pub coverage: f64,
    pub ranking: Option<RankingSummary>,
    /// Set when the model's evaluation failed outright
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelReport {
    /// Summarize predictions already computed for `rows`
    pub fn from_predictions(
        model: impl Into<String>,
        rows: &[TestRow],
        predictions: &[Option<f64>],
    ) -> Self {
        Self {
            model: model.into(),
            mae: mae(&true_scores(rows), predictions).ok(),
            coverage: coverage(predictions),
            ranking: None,
            error: None,
        }
    }

    /// Report for a model that couldn't be fitted or whose worker failed
    pub fn failed(model: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            model: model.into(),
            mae: None,
            coverage: 0.0,
            ranking: None,
            error: Some(error.to_string()),
        }
    }

    pub fn with_ranking(mut self, ranking: Option<RankingSummary>) -> Self {
        self.ranking = ranking;
        self
    }
}

/// Predict and rank with a single model on the calling thread
pub fn evaluate_model<M: Recommender + ?Sized>(
    model: &M,
    rows: &[TestRow],
    relevant: &BTreeMap<UserId, HashSet<ItemId>>,
    k: usize,
) -> ModelReport {
    let predictions = evaluate_predict(model, rows);
    ModelReport::from_predictions(model.name(), rows, &predictions)
        .with_ranking(evaluate_ranking(model, relevant, k).ok())
}

/// Everything one `evaluate` run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub train_users: usize,
    pub train_items: usize,
    pub test_rows: usize,
    pub k: usize,
    pub models: Vec<ModelReport>,
}

impl EvaluationReport {
    pub fn new(train_shape: (usize, usize), test_rows: usize, k: usize) -> Self {
        Self {
            train_users: train_shape.0,
            train_items: train_shape.1,
            test_rows,
            k,
            models: Vec::new(),
        }
    }

    pub fn push(&mut self, report: ModelReport) {
        self.models.push(report);
    }

    /// Lowest-MAE model, if any model produced one
    pub fn best_by_mae(&self) -> Option<&ModelReport> {
        self.models
            .iter()
            .filter(|m| m.mae.is_some_and(f64::is_finite))
            .min_by(|a, b| a.mae.partial_cmp(&b.mae).unwrap_or(std::cmp::Ordering::Equal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvaluationError;
    use crate::runner::ModelRole;

    fn rows() -> Vec<TestRow> {
        vec![
            TestRow::new("u1", "a", 3.0),
            TestRow::new("u1", "b", 4.0),
            TestRow::new("u2", "a", 5.0),
        ]
    }

    #[test]
    fn test_from_predictions() {
        let report = ModelReport::from_predictions("m", &rows(), &[Some(2.0), None, Some(5.0)]);
        assert_eq!(report.mae, Some(0.5));
        assert!((report.coverage - 2.0 / 3.0).abs() < 1e-12);

        let empty = ModelReport::from_predictions("m", &rows(), &[None, None, None]);
        assert_eq!(empty.mae, None);
        assert_eq!(empty.coverage, 0.0);
    }

    #[test]
    fn test_best_by_mae_skips_missing() {
        let mut report = EvaluationReport::new((2, 2), 3, 5);
        report.push(ModelReport::from_predictions("worse", &rows(), &[Some(1.0), Some(1.0), Some(1.0)]));
        report.push(ModelReport::from_predictions("none", &rows(), &[None, None, None]));
        report.push(ModelReport::from_predictions("better", &rows(), &[Some(3.0), Some(4.0), Some(4.0)]));

        assert_eq!(report.best_by_mae().unwrap().model, "better");
    }

    #[test]
    fn test_json_shape() {
        let mut report = EvaluationReport::new((2, 3), 3, 5);
        report.push(ModelReport::from_predictions("m", &rows(), &[Some(3.0), Some(4.0), Some(5.0)]));
        report.push(ModelReport::failed(
            "f",
            &EvaluationError::WorkerFailed {
                role: ModelRole::Item,
                reason: "boom".into(),
            },
        ));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["train_items"], 3);
        assert_eq!(json["models"][0]["mae"], 0.0);
        assert!(json["models"][0].get("error").is_none());
        assert_eq!(json["models"][1]["error"], "item evaluation worker failed: boom");
        assert!(json["models"][1]["mae"].is_null());
    }
}
