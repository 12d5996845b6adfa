//! Accuracy and ranking-quality metrics.
//!
//! - MAE over point predictions, skipping missing markers
//! - Precision@k, Recall@k, F1@k over a ranked list and a relevant set
//!
//! All functions are pure and generic over the id type.

use crate::error::MetricError;
use std::collections::HashSet;
use std::hash::Hash;

/// Mean absolute error between true values and predictions.
///
/// Positions where the prediction is `None` are left out of both the sum and
/// the count.
pub fn mae(truth: &[f64], predicted: &[Option<f64>]) -> Result<f64, MetricError> {
    if truth.len() != predicted.len() {
        return Err(MetricError::LengthMismatch {
            truth: truth.len(),
            predicted: predicted.len(),
        });
    }

    let (sum, count) = truth
        .iter()
        .zip(predicted)
        .filter_map(|(t, p)| p.map(|p| (t - p).abs()))
        .fold((0.0, 0usize), |(sum, count), err| (sum + err, count + 1));

    if count == 0 {
        return Err(MetricError::EmptySample);
    }
    Ok(sum / count as f64)
}

/// Distinct relevant ids among the first `k`; repeats in `ranked` count once
fn hits_at_k<T: Eq + Hash>(relevant: &HashSet<T>, ranked: &[T], k: usize) -> usize {
    let top: HashSet<&T> = ranked.iter().take(k).collect();
    top.into_iter().filter(|id| relevant.contains(*id)).count()
}

/// `|top k of ranked ∩ relevant| / k`.
///
/// Lists shorter than `k` still divide by `k`.
pub fn precision_at_k<T: Eq + Hash>(
    relevant: &HashSet<T>,
    ranked: &[T],
    k: usize,
) -> Result<f64, MetricError> {
    if k == 0 {
        return Err(MetricError::ZeroK);
    }
    Ok(hits_at_k(relevant, ranked, k) as f64 / k as f64)
}

/// `|top k of ranked ∩ relevant| / |relevant|`.
pub fn recall_at_k<T: Eq + Hash>(
    relevant: &HashSet<T>,
    ranked: &[T],
    k: usize,
) -> Result<f64, MetricError> {
    if k == 0 {
        return Err(MetricError::ZeroK);
    }
    if relevant.is_empty() {
        return Err(MetricError::EmptyRelevantSet);
    }
    Ok(hits_at_k(relevant, ranked, k) as f64 / relevant.len() as f64)
}

/// Harmonic mean of precision@k and recall@k; 0 when both are 0.
pub fn f1_score_at_k<T: Eq + Hash>(
    relevant: &HashSet<T>,
    ranked: &[T],
    k: usize,
) -> Result<f64, MetricError> {
    let precision = precision_at_k(relevant, ranked, k)?;
    let recall = recall_at_k(relevant, ranked, k)?;
    if precision + recall == 0.0 {
        return Ok(0.0);
    }
    Ok(2.0 * precision * recall / (precision + recall))
}
