//! Pieces shared by the item- and user-neighborhood models.

use crate::error::PredictionUnavailable;
use crate::traits::Recommendation;
use data_loader::RatingMatrix;
use std::cmp::Ordering;

/// A rated neighbor: how similar it is to the target and the rating it carries
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Neighbor {
    pub similarity: f64,
    pub rating: f64,
}

/// Similarity-weighted average over the `size` most similar neighbors.
///
/// Neighbors are ranked by descending similarity with a stable sort, so ties
/// keep the order they were collected in. The weights are the raw similarities
/// and are not normalized by their absolute values.
pub(crate) fn weighted_average(
    mut neighbors: Vec<Neighbor>,
    size: usize,
) -> Result<f64, PredictionUnavailable> {
    if neighbors.is_empty() {
        return Err(PredictionUnavailable::NoNeighbors);
    }

    neighbors.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });
    neighbors.truncate(size);

    // Signed weights that cancel leave rounding noise rather than an exact zero
    let weight_sum: f64 = neighbors.iter().map(|n| n.similarity).sum();
    let weight_scale: f64 = neighbors.iter().map(|n| n.similarity.abs()).sum();
    if weight_sum.abs() <= 4.0 * f64::EPSILON * weight_scale {
        return Err(PredictionUnavailable::DegenerateWeights);
    }

    // r * s / s can drift by an ulp; a lone neighbor's rating is the answer
    if let [only] = neighbors.as_slice() {
        return Ok(only.rating);
    }

    let weighted: f64 = neighbors.iter().map(|n| n.similarity * n.rating).sum();
    Ok(weighted / weight_sum)
}

/// Scores every item the user hasn't rated and keeps the best `n`.
///
/// Items whose score is unavailable (or NaN) are dropped. Sorting is stable
/// and descending, so equal scores keep column order.
pub(crate) fn top_unrated<F>(matrix: &RatingMatrix, row: usize, n: usize, score: F) -> Vec<Recommendation>
where
    F: Fn(usize) -> Option<f64>,
{
    if n == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(usize, f64)> = matrix
        .row(row)
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.is_none())
        .filter_map(|(col, _)| score(col).map(|s| (col, s)))
        .filter(|(_, s)| !s.is_nan())
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(n);

    scored
        .into_iter()
        .map(|(col, score)| Recommendation::new(matrix.items()[col].clone(), score))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbor(similarity: f64, rating: f64) -> Neighbor {
        Neighbor { similarity, rating }
    }

    #[test]
    fn test_single_neighbor_returns_its_rating() {
        let neighbors = vec![neighbor(0.2, 1.0), neighbor(0.9, 4.0), neighbor(0.5, 2.0)];
        assert_eq!(weighted_average(neighbors, 1), Ok(4.0));
    }

    #[test]
    fn test_weighted_average_over_top_two() {
        let neighbors = vec![neighbor(0.25, 4.0), neighbor(0.75, 2.0), neighbor(0.1, 5.0)];
        let predicted = weighted_average(neighbors, 2).unwrap();
        assert!((predicted - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_ties_keep_collection_order() {
        let neighbors = vec![neighbor(0.5, 1.0), neighbor(0.5, 3.0)];
        assert_eq!(weighted_average(neighbors, 1), Ok(1.0));
    }

    #[test]
    fn test_empty_and_degenerate() {
        assert_eq!(
            weighted_average(Vec::new(), 3),
            Err(PredictionUnavailable::NoNeighbors)
        );
        assert_eq!(
            weighted_average(vec![neighbor(0.5, 1.0), neighbor(-0.5, 3.0)], 2),
            Err(PredictionUnavailable::DegenerateWeights)
        );
    }

    #[test]
    fn test_nearly_cancelling_weights_are_degenerate() {
        // 0.1 + 0.2 - 0.3 is not exactly zero in floating point
        let neighbors = vec![neighbor(0.1, 3.0), neighbor(0.2, 1.0), neighbor(-0.3, 2.0)];
        assert_eq!(
            weighted_average(neighbors, 3),
            Err(PredictionUnavailable::DegenerateWeights)
        );

        let balanced = vec![neighbor(0.3, 3.0), neighbor(0.2, 1.0), neighbor(-0.3, 2.0)];
        assert!((weighted_average(balanced, 3).unwrap() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_top_unrated_skips_rated_and_unavailable() {
        let users = vec!["u1".to_string()];
        let items: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
        let matrix =
            RatingMatrix::from_rows(users, items, vec![vec![Some(1.0), None, None, None, None]])
                .unwrap();

        let scores = [9.0, 2.0, 7.0, f64::NAN, 7.0];
        let recs = top_unrated(&matrix, 0, 10, |col| if col == 1 { None } else { Some(scores[col]) });

        let ids: Vec<&str> = recs.iter().map(|r| r.item.as_str()).collect();
        assert_eq!(ids, vec!["c", "e"]);
        assert!(top_unrated(&matrix, 0, 0, |_| Some(1.0)).is_empty());
    }
}
