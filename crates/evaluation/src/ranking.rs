//! Top-k ranking evaluation against held-out purchases.

use crate::error::MetricError;
use crate::metrics::{f1_score_at_k, precision_at_k, recall_at_k};
use data_loader::{ItemId, TestRow, UserId};
use models::Recommender;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{info, instrument};

/// Metrics for one user's top-k list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRanking {
    pub user: UserId,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Averages over every evaluated user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingSummary {
    pub k: usize,
    pub users: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Held-out items per user. Every held-out purchase counts as relevant.
pub fn relevant_items(rows: &[TestRow]) -> BTreeMap<UserId, HashSet<ItemId>> {
    let mut relevant: BTreeMap<UserId, HashSet<ItemId>> = BTreeMap::new();
    for row in rows {
        relevant
            .entry(row.user.clone())
            .or_default()
            .insert(row.item.clone());
    }
    relevant
}

/// Score each user's top-k recommendations, in user order.
pub fn rank_users<M: Recommender + ?Sized>(
    model: &M,
    relevant: &BTreeMap<UserId, HashSet<ItemId>>,
    k: usize,
) -> Result<Vec<UserRanking>, MetricError> {
    if k == 0 {
        return Err(MetricError::ZeroK);
    }

    let entries: Vec<(&UserId, &HashSet<ItemId>)> = relevant.iter().collect();
    entries
        .par_iter()
        .map(|(user, items)| {
            let ranked: Vec<ItemId> = model
                .recommend(user, k)
                .into_iter()
                .map(|rec| rec.item)
                .collect();

            Ok(UserRanking {
                user: (*user).clone(),
                precision: precision_at_k(items, &ranked, k)?,
                recall: recall_at_k(items, &ranked, k)?,
                f1: f1_score_at_k(items, &ranked, k)?,
            })
        })
        .collect()
}

/// Mean precision@k, recall@k and F1@k over all users with held-out items.
#[instrument(skip_all, fields(model = model.name(), users = relevant.len(), k))]
pub fn evaluate_ranking<M: Recommender + ?Sized>(
    model: &M,
    relevant: &BTreeMap<UserId, HashSet<ItemId>>,
    k: usize,
) -> Result<RankingSummary, MetricError> {
    let per_user = rank_users(model, relevant, k)?;
    if per_user.is_empty() {
        return Err(MetricError::EmptySample);
    }

    let n = per_user.len() as f64;
    let summary = RankingSummary {
        k,
        users: per_user.len(),
        precision: per_user.iter().map(|u| u.precision).sum::<f64>() / n,
        recall: per_user.iter().map(|u| u.recall).sum::<f64>() / n,
        f1: per_user.iter().map(|u| u.f1).sum::<f64>() / n,
    };
    info!(
        "{}: precision@{k}={:.4} recall@{k}={:.4} f1@{k}={:.4}",
        model.name(),
        summary.precision,
        summary.recall,
        summary.f1
    );
    Ok(summary)
}
