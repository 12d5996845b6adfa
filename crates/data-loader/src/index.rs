//! Building rating matrices and evaluation sets from transactions.
//!
//! - Aggregate purchase lines into per-(user, item) counts
//! - Split interactions into train and test with an explicit seed
//! - Load a whole dataset from a transaction file

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Default share of interactions held out for evaluation
pub const DEFAULT_TEST_FRACTION: f64 = 0.25;

/// Default seed for the train/test shuffle
pub const DEFAULT_SEED: u64 = 42;

/// A training matrix plus the interactions held out from it
#[derive(Debug, Clone)]
pub struct Dataset {
    pub train: RatingMatrix,
    pub test: Vec<TestRow>,
}

impl Dataset {
    /// Load a transaction file and split it into train and test.
    ///
    /// Steps:
    /// 1. Parse purchase lines
    /// 2. Count purchases per (user, item)
    /// 3. Shuffle with `seed` and hold out `test_fraction` of the pairs
    /// 4. Pivot the training pairs into a RatingMatrix
    #[instrument(skip_all, fields(path = %path.display(), test_fraction, seed))]
    pub fn load_from_file(path: &Path, test_fraction: f64, seed: u64) -> Result<Self> {
        let transactions = parser::parse_transactions(path)?;
        let interactions = aggregate_purchases(&transactions);
        info!(
            "Parsed {} transactions into {} interactions",
            transactions.len(),
            interactions.len()
        );

        let dataset = Self::from_interactions(interactions, test_fraction, seed)?;
        let (users, items) = dataset.train.shape();
        info!(
            "Training matrix {}x{} with {} observed cells, {} test rows",
            users,
            items,
            dataset.train.observed_count(),
            dataset.test.len()
        );
        Ok(dataset)
    }

    /// Split already-aggregated interactions
    pub fn from_interactions(
        interactions: Vec<Interaction>,
        test_fraction: f64,
        seed: u64,
    ) -> Result<Self> {
        let (train, test) = train_test_split(interactions, test_fraction, seed)?;
        Ok(Self {
            train: RatingMatrix::from_interactions(&train),
            test: test.into_iter().map(TestRow::from).collect(),
        })
    }
}

/// Count purchase lines per (user, item).
///
/// The count is the engagement score. Lines with a non-positive quantity are
/// returns or cancellations and are not counted. Output is sorted by
/// (user, item) so downstream shuffles are reproducible.
pub fn aggregate_purchases(transactions: &[Transaction]) -> Vec<Interaction> {
    let returns = transactions.iter().filter(|tx| !tx.is_purchase()).count();
    if returns > 0 {
        debug!("Skipping {} return or cancellation lines", returns);
    }

    let counts: HashMap<(&str, &str), u32> = transactions
        .par_iter()
        .filter(|tx| tx.is_purchase())
        .fold(HashMap::new, |mut local, tx| {
            *local.entry((tx.user.as_str(), tx.item.as_str())).or_insert(0) += 1;
            local
        })
        .reduce(HashMap::new, |mut acc, local| {
            for (key, count) in local {
                *acc.entry(key).or_insert(0) += count;
            }
            acc
        });

    let mut interactions: Vec<Interaction> = counts
        .into_iter()
        .map(|((user, item), count)| Interaction::new(user, item, count as f64))
        .collect();
    interactions.sort_by(|a, b| a.user.cmp(&b.user).then_with(|| a.item.cmp(&b.item)));
    interactions
}

/// Shuffle with a seeded RNG and split off `test_fraction` of the rows.
///
/// The test side gets `ceil(len * test_fraction)` rows. Returns `(train, test)`.
pub fn train_test_split<T>(
    mut rows: Vec<T>,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<T>, Vec<T>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DataLoadError::InvalidValue {
            field: "test_fraction".to_string(),
            value: test_fraction.to_string(),
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    rows.shuffle(&mut rng);

    let test_len = ((rows.len() as f64) * test_fraction).ceil() as usize;
    let train = rows.split_off(test_len.min(rows.len()));
    Ok((train, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(user: &str, item: &str) -> Transaction {
        tx_qty(user, item, 1.0)
    }

    fn tx_qty(user: &str, item: &str, quantity: f64) -> Transaction {
        Transaction {
            user: user.to_string(),
            item: item.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_aggregate_counts_lines() {
        let transactions = vec![tx("1", "a"), tx("1", "a"), tx("2", "a"), tx("1", "b")];
        let interactions = aggregate_purchases(&transactions);

        assert_eq!(
            interactions,
            vec![
                Interaction::new("1", "a", 2.0),
                Interaction::new("1", "b", 1.0),
                Interaction::new("2", "a", 1.0),
            ]
        );
    }

    #[test]
    fn test_aggregate_skips_returns() {
        let transactions = vec![
            tx_qty("1", "a", 2.0),
            tx_qty("1", "a", -2.0),
            tx_qty("1", "b", 0.0),
            tx_qty("2", "b", 1.0),
        ];
        let interactions = aggregate_purchases(&transactions);

        assert_eq!(
            interactions,
            vec![Interaction::new("1", "a", 1.0), Interaction::new("2", "b", 1.0)]
        );
    }

    #[test]
    fn test_split_sizes() {
        let rows: Vec<u32> = (0..8).collect();
        let (train, test) = train_test_split(rows, 0.25, DEFAULT_SEED).unwrap();

        assert_eq!(train.len(), 6);
        assert_eq!(test.len(), 2);

        let mut all: Vec<u32> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_reproducible() {
        let rows: Vec<u32> = (0..100).collect();
        let first = train_test_split(rows.clone(), 0.3, 7).unwrap();
        let second = train_test_split(rows, 0.3, 7).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_split_rejects_bad_fraction() {
        assert!(train_test_split(vec![1, 2, 3], 0.0, 1).is_err());
        assert!(train_test_split(vec![1, 2, 3], 1.0, 1).is_err());
        assert!(train_test_split(vec![1, 2, 3], f64::NAN, 1).is_err());
    }

    #[test]
    fn test_dataset_from_interactions() {
        let interactions: Vec<Interaction> = (0..12)
            .map(|i| Interaction::new(format!("u{}", i % 3), format!("p{}", i % 4), 1.0))
            .collect();

        let dataset = Dataset::from_interactions(interactions, 0.25, DEFAULT_SEED).unwrap();

        assert_eq!(dataset.test.len(), 3);
        assert_eq!(dataset.train.observed_count(), 9);
        for row in &dataset.test {
            // Held-out pairs never leak into the training matrix
            assert!(dataset.train.get(&row.user, &row.item).is_none());
        }
    }
}
