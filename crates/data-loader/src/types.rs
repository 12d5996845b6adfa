//! Core domain types for purchase-derived engagement data.
//!
//! This module defines the structures every model and evaluator works against:
//! - Type aliases for the two label axes (UserId, ItemId)
//! - Raw transactions and aggregated interactions
//! - Held-out evaluation rows
//! - RatingMatrix, the user-by-item table with explicit missing cells

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// =============================================================================
// Type Aliases
// =============================================================================

/// Identifier for a customer (loyalty card number in the retail data)
pub type UserId = String;

/// Identifier for a product (product code in the retail data)
pub type ItemId = String;

// =============================================================================
// Input Rows
// =============================================================================

/// A single purchase line from a transaction file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub user: UserId,
    pub item: ItemId,
    /// Pieces bought on this line; negative for returns. Engagement counts
    /// lines, not pieces.
    pub quantity: f64,
}

impl Transaction {
    /// Positive quantity; returns and zero-quantity voids are not purchases
    pub fn is_purchase(&self) -> bool {
        self.quantity > 0.0
    }
}

/// One observed (user, item) engagement score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub user: UserId,
    pub item: ItemId,
    pub value: f64,
}

impl Interaction {
    pub fn new(user: impl Into<UserId>, item: impl Into<ItemId>, value: f64) -> Self {
        Self {
            user: user.into(),
            item: item.into(),
            value,
        }
    }
}

/// A held-out (user, item, true score) triple used for evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRow {
    pub user: UserId,
    pub item: ItemId,
    pub score: f64,
}

impl TestRow {
    pub fn new(user: impl Into<UserId>, item: impl Into<ItemId>, score: f64) -> Self {
        Self {
            user: user.into(),
            item: item.into(),
            score,
        }
    }
}

impl From<Interaction> for TestRow {
    fn from(interaction: Interaction) -> Self {
        Self {
            user: interaction.user,
            item: interaction.item,
            score: interaction.value,
        }
    }
}

// =============================================================================
// RatingMatrix
// =============================================================================

/// User-by-item table of engagement scores.
///
/// Rows are users, columns are items. A cell is `None` when no interaction was
/// observed, which is distinct from an observed score of `0.0`. Labels are unique
/// per axis and fixed once the matrix is built; only cell values can change.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingMatrix {
    users: Vec<UserId>,
    items: Vec<ItemId>,
    user_positions: HashMap<UserId, usize>,
    item_positions: HashMap<ItemId, usize>,
    /// Row-major, `users.len() * items.len()` cells
    cells: Vec<Option<f64>>,
}

impl RatingMatrix {
    /// Creates a matrix with the given labels and every cell missing
    pub fn new(users: Vec<UserId>, items: Vec<ItemId>) -> Result<Self> {
        let user_positions = position_index("user", &users)?;
        let item_positions = position_index("item", &items)?;
        let cells = vec![None; users.len() * items.len()];

        Ok(Self {
            users,
            items,
            user_positions,
            item_positions,
            cells,
        })
    }

    /// Creates a matrix from dense rows, one `Vec` per user in label order
    pub fn from_rows(
        users: Vec<UserId>,
        items: Vec<ItemId>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        if rows.len() != users.len() {
            return Err(DataLoadError::ShapeMismatch {
                expected: users.len(),
                found: rows.len(),
                row: 0,
            });
        }

        let mut matrix = Self::new(users, items)?;
        let width = matrix.items.len();
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(DataLoadError::ShapeMismatch {
                    expected: width,
                    found: row.len(),
                    row: row_idx,
                });
            }
            let start = row_idx * width;
            matrix.cells[start..start + width].copy_from_slice(&row);
        }
        Ok(matrix)
    }

    /// Pivots interactions into a matrix.
    ///
    /// Labels on both axes are sorted ascending. Repeated (user, item) pairs
    /// accumulate into the same cell.
    pub fn from_interactions(interactions: &[Interaction]) -> Self {
        let users: BTreeSet<&UserId> = interactions.iter().map(|i| &i.user).collect();
        let items: BTreeSet<&ItemId> = interactions.iter().map(|i| &i.item).collect();

        let users: Vec<UserId> = users.into_iter().cloned().collect();
        let items: Vec<ItemId> = items.into_iter().cloned().collect();

        // Labels come from sets, so they can't collide
        let user_positions: HashMap<UserId, usize> = users
            .iter()
            .enumerate()
            .map(|(pos, id)| (id.clone(), pos))
            .collect();
        let item_positions: HashMap<ItemId, usize> = items
            .iter()
            .enumerate()
            .map(|(pos, id)| (id.clone(), pos))
            .collect();

        let width = items.len();
        let mut cells = vec![None; users.len() * width];
        for interaction in interactions {
            let row = user_positions[&interaction.user];
            let col = item_positions[&interaction.item];
            let cell = &mut cells[row * width + col];
            *cell = Some(cell.unwrap_or(0.0) + interaction.value);
        }

        Self {
            users,
            items,
            user_positions,
            item_positions,
            cells,
        }
    }

    /// Row labels in matrix order
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    /// Column labels in matrix order
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// (number of users, number of items)
    pub fn shape(&self) -> (usize, usize) {
        (self.users.len(), self.items.len())
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty() || self.items.is_empty()
    }

    pub fn user_position(&self, user: &str) -> Option<usize> {
        self.user_positions.get(user).copied()
    }

    pub fn item_position(&self, item: &str) -> Option<usize> {
        self.item_positions.get(item).copied()
    }

    /// Observed score for a (user, item) pair.
    ///
    /// Returns `None` for a missing cell and for labels the matrix doesn't have.
    pub fn get(&self, user: &str, item: &str) -> Option<f64> {
        let row = self.user_position(user)?;
        let col = self.item_position(item)?;
        self.cell(row, col)
    }

    /// Observed score by position
    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        self.cells[row * self.items.len() + col]
    }

    /// All cells of one user, in column order
    pub fn row(&self, row: usize) -> &[Option<f64>] {
        let width = self.items.len();
        &self.cells[row * width..(row + 1) * width]
    }

    /// A fully observed matrix with this matrix's labels, filled by position
    pub fn dense_like(&self, mut value: impl FnMut(usize, usize) -> f64) -> Self {
        let width = self.items.len();
        let cells = (0..self.cells.len())
            .map(|idx| Some(value(idx / width, idx % width)))
            .collect();

        Self {
            users: self.users.clone(),
            items: self.items.clone(),
            user_positions: self.user_positions.clone(),
            item_positions: self.item_positions.clone(),
            cells,
        }
    }

    /// Records a score for an existing (user, item) pair
    pub fn set(&mut self, user: &str, item: &str, value: f64) -> Result<()> {
        let row = self
            .user_position(user)
            .ok_or_else(|| DataLoadError::MissingReference {
                entity: "User".to_string(),
                id: user.to_string(),
            })?;
        let col = self
            .item_position(item)
            .ok_or_else(|| DataLoadError::MissingReference {
                entity: "Item".to_string(),
                id: item.to_string(),
            })?;
        let width = self.items.len();
        self.cells[row * width + col] = Some(value);
        Ok(())
    }

    /// Column positions the user has a score for, ascending
    pub fn rated_columns(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        self.row(row)
            .iter()
            .enumerate()
            .filter_map(|(col, cell)| cell.map(|_| col))
    }

    /// Row positions of users who scored the item, ascending
    pub fn raters(&self, col: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.users.len()).filter(move |&row| self.cell(row, col).is_some())
    }

    /// Number of non-missing cells
    pub fn observed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// Maps each label to its position, rejecting duplicates
fn position_index(axis: &str, labels: &[String]) -> Result<HashMap<String, usize>> {
    let mut positions = HashMap::with_capacity(labels.len());
    for (pos, label) in labels.iter().enumerate() {
        if positions.insert(label.clone(), pos).is_some() {
            return Err(DataLoadError::DuplicateLabel {
                axis: axis.to_string(),
                label: label.clone(),
            });
        }
    }
    Ok(positions)
}
