//! Batch prediction over held-out rows.

use data_loader::TestRow;
use models::Recommender;
use tracing::{debug, instrument};

/// Predict every test row in input order.
///
/// Rows the model can't score come back as `None`; the batch never fails
/// because of a single row.
#[instrument(skip_all, fields(model = model.name(), rows = rows.len()))]
pub fn evaluate_predict<M: Recommender + ?Sized>(model: &M, rows: &[TestRow]) -> Vec<Option<f64>> {
    let predictions: Vec<Option<f64>> = rows
        .iter()
        .map(|row| match model.predict(&row.user, &row.item) {
            Ok(score) => Some(score),
            Err(reason) => {
                debug!("No prediction for ({}, {}): {}", row.user, row.item, reason);
                None
            }
        })
        .collect();

    let missing = predictions.iter().filter(|p| p.is_none()).count();
    debug!("{} of {} predictions missing", missing, predictions.len());
    predictions
}

/// Fraction of predictions that are present. An empty batch has coverage 0.
pub fn coverage(predicted: &[Option<f64>]) -> f64 {
    if predicted.is_empty() {
        return 0.0;
    }
    predicted.iter().filter(|p| p.is_some()).count() as f64 / predicted.len() as f64
}

/// True scores of `rows`, aligned with [`evaluate_predict`]'s output
pub fn true_scores(rows: &[TestRow]) -> Vec<f64> {
    rows.iter().map(|row| row.score).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::RatingMatrix;
    use models::LatentFactorModel;

    fn fitted() -> LatentFactorModel {
        let base = [1.0, 2.0, 3.0, 4.0];
        let rows = [1.0, 2.0, 3.0, 0.5]
            .iter()
            .map(|s| base.iter().map(|b| Some(s * b)).collect())
            .collect();
        let matrix = RatingMatrix::from_rows(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            vec!["w".into(), "x".into(), "y".into(), "z".into()],
            rows,
        )
        .unwrap();

        let mut model = LatentFactorModel::new(1);
        model.fit(&matrix).unwrap();
        model
    }

    #[test]
    fn test_predictions_keep_row_order_and_mark_missing() {
        let model = fitted();
        let rows = vec![
            TestRow::new("b", "x", 4.0),
            TestRow::new("ghost", "x", 1.0),
            TestRow::new("a", "nothing", 1.0),
            TestRow::new("c", "z", 12.0),
        ];

        let predictions = evaluate_predict(&model, &rows);
        assert_eq!(predictions.len(), 4);
        assert!((predictions[0].unwrap() - 4.0).abs() < 1e-9);
        assert_eq!(predictions[1], None);
        assert_eq!(predictions[2], None);
        assert!((predictions[3].unwrap() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_unfitted_model_yields_all_missing() {
        let model = LatentFactorModel::default();
        let rows = vec![TestRow::new("a", "w", 1.0)];
        assert_eq!(evaluate_predict(&model, &rows), vec![None]);
    }

    #[test]
    fn test_coverage() {
        assert_eq!(coverage(&[]), 0.0);
        assert_eq!(coverage(&[Some(1.0), None, Some(2.0), None]), 0.5);
        assert_eq!(coverage(&[Some(1.0)]), 1.0);
    }

    #[test]
    fn test_true_scores_align() {
        let rows = vec![TestRow::new("a", "w", 1.0), TestRow::new("b", "x", 3.0)];
        assert_eq!(true_scores(&rows), vec![1.0, 3.0]);
    }
}
