//! Vector similarity used by the neighborhood models.

use crate::error::PredictionUnavailable;

/// Cosine similarity `dot(x, y) / (|x| * |y|)`, in `[-1, 1]`.
///
/// Fails with [`PredictionUnavailable::ZeroNorm`] when either vector has zero
/// norm instead of returning NaN.
pub fn cosine_similarity(x: &[f64], y: &[f64]) -> Result<f64, PredictionUnavailable> {
    debug_assert_eq!(x.len(), y.len(), "profiles must share one axis");

    let denominator = norm(x) * norm(y);
    if denominator == 0.0 {
        return Err(PredictionUnavailable::ZeroNorm);
    }
    Ok(dot(x, y) / denominator)
}

pub(crate) fn dot(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}

pub(crate) fn norm(x: &[f64]) -> f64 {
    dot(x, x).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors() {
        let sim = cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!((sim - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_opposite_and_orthogonal() {
        let opposite = cosine_similarity(&[1.0, -2.0], &[-1.0, 2.0]).unwrap();
        assert!((opposite + 1.0).abs() < 1e-12);

        let orthogonal = cosine_similarity(&[1.0, 0.0], &[0.0, 5.0]).unwrap();
        assert_eq!(orthogonal, 0.0);
    }

    #[test]
    fn test_scale_invariant() {
        let a = cosine_similarity(&[1.0, 2.0, 0.5], &[3.0, -1.0, 2.0]).unwrap();
        let b = cosine_similarity(&[10.0, 20.0, 5.0], &[3.0, -1.0, 2.0]).unwrap();
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector_is_unavailable() {
        assert_eq!(
            cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]),
            Err(PredictionUnavailable::ZeroNorm)
        );
        assert_eq!(
            cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]),
            Err(PredictionUnavailable::ZeroNorm)
        );
        assert_eq!(
            cosine_similarity(&[], &[]),
            Err(PredictionUnavailable::ZeroNorm)
        );
    }
}
