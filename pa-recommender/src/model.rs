//! Recommender model capability and the latent-factor implementation
//!
//! The service only depends on [`RecommenderModel`]; any ranking library
//! able to answer `recommend(index, row, count, filter_seen)` can stand in.

use pa_common::{Error, Result};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use thiserror::Error;

use crate::matrix::SparseRow;

/// Ranking failure raised by a model at request time
#[derive(Debug, Error)]
pub enum ModelError {
    /// Query index has no latent representation in the model
    #[error("user index {index} out of range for model with {users} users")]
    UserOutOfRange { index: usize, users: usize },

    /// Model-specific failure
    #[error("model failure: {0}")]
    Failed(String),
}

/// Ranking capability of a pre-trained recommender
pub trait RecommenderModel: Send + Sync {
    /// Rank candidate items for `user`.
    ///
    /// Returns at most `count` `(item_index, score)` pairs ordered by
    /// descending score. With `filter_seen`, items stored in `row` are
    /// excluded from the result.
    fn recommend(
        &self,
        user: usize,
        row: SparseRow<'_>,
        count: usize,
        filter_seen: bool,
    ) -> std::result::Result<Vec<(usize, f32)>, ModelError>;

    /// Number of users (query rows) the model knows
    fn user_count(&self) -> usize;

    /// Number of rankable items
    fn item_count(&self) -> usize;
}

/// Serialized factor model: one latent vector per user and per item
#[derive(Debug, Deserialize)]
pub struct FactorParts {
    pub user_factors: Vec<Vec<f32>>,
    pub item_factors: Vec<Vec<f32>>,
}

/// Matrix-factorization model scoring items by dot product
#[derive(Debug, Clone)]
pub struct FactorModel {
    factors: usize,
    user_factors: Vec<Vec<f32>>,
    item_factors: Vec<Vec<f32>>,
}

impl FactorModel {
    /// Build a model, requiring every latent vector to share one dimension
    pub fn from_parts(parts: FactorParts) -> Result<Self> {
        let FactorParts {
            user_factors,
            item_factors,
        } = parts;

        let factors = user_factors
            .first()
            .or_else(|| item_factors.first())
            .map(Vec::len)
            .unwrap_or(0);

        let check = |kind: &str, vectors: &[Vec<f32>]| -> Result<()> {
            match vectors.iter().position(|v| v.len() != factors) {
                Some(i) => Err(Error::invalid_artifact(
                    "model",
                    format!(
                        "{} factor {} has dimension {}, expected {}",
                        kind,
                        i,
                        vectors[i].len(),
                        factors
                    ),
                )),
                None => Ok(()),
            }
        };
        check("user", &user_factors)?;
        check("item", &item_factors)?;

        Ok(Self {
            factors,
            user_factors,
            item_factors,
        })
    }

    /// Latent dimension
    pub fn factors(&self) -> usize {
        self.factors
    }
}

impl RecommenderModel for FactorModel {
    fn recommend(
        &self,
        user: usize,
        row: SparseRow<'_>,
        count: usize,
        filter_seen: bool,
    ) -> std::result::Result<Vec<(usize, f32)>, ModelError> {
        let user_vector = self.user_factors.get(user).ok_or(ModelError::UserOutOfRange {
            index: user,
            users: self.user_factors.len(),
        })?;

        let seen: HashSet<usize> = if filter_seen {
            row.indices().iter().copied().collect()
        } else {
            HashSet::new()
        };

        let mut ranked: Vec<(usize, f32)> = self
            .item_factors
            .iter()
            .enumerate()
            .filter(|(item, _)| !seen.contains(item))
            .map(|(item, item_vector)| (item, dot(user_vector, item_vector)))
            .collect();

        // Stable: equal scores keep ascending item order
        ranked.sort_by(|a, b| descending(a.1, b.1));
        ranked.truncate(count);
        Ok(ranked)
    }

    fn user_count(&self) -> usize {
        self.user_factors.len()
    }

    fn item_count(&self) -> usize {
        self.item_factors.len()
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Descending score order with NaN last
fn descending(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::CsrMatrix;

    fn model(users: Vec<Vec<f32>>, items: Vec<Vec<f32>>) -> FactorModel {
        FactorModel::from_parts(FactorParts {
            user_factors: users,
            item_factors: items,
        })
        .unwrap()
    }

    fn empty_row() -> SparseRow<'static> {
        SparseRow::new(&[], &[])
    }

    #[test]
    fn test_ranks_by_dot_product() {
        let m = model(
            vec![vec![1.0, 0.0]],
            vec![vec![0.1, 5.0], vec![0.9, 0.0], vec![0.5, 0.0]],
        );

        let ranked = m.recommend(0, empty_row(), 10, true).unwrap();
        let items: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();

        assert_eq!(items, vec![1, 2, 0]);
        assert!((ranked[0].1 - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_filters_seen_items() {
        let m = model(vec![vec![1.0]], vec![vec![3.0], vec![2.0], vec![1.0]]);
        let matrix = CsrMatrix::from_dense(&[vec![1.0, 0.0, 0.0]], 3).unwrap();

        let filtered = m.recommend(0, matrix.row(0).unwrap(), 10, true).unwrap();
        assert_eq!(filtered.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![1, 2]);

        let unfiltered = m.recommend(0, matrix.row(0).unwrap(), 10, false).unwrap();
        assert_eq!(unfiltered.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_truncates_to_count() {
        let items = (0..20).map(|i| vec![i as f32]).collect();
        let m = model(vec![vec![1.0]], items);

        let ranked = m.recommend(0, empty_row(), 10, true).unwrap();

        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].0, 19);
        assert_eq!(ranked[9].0, 10);
    }

    #[test]
    fn test_ties_keep_item_order() {
        let m = model(vec![vec![1.0]], vec![vec![1.0], vec![2.0], vec![1.0], vec![1.0]]);

        let ranked = m.recommend(0, empty_row(), 10, true).unwrap();
        assert_eq!(ranked.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![1, 0, 2, 3]);
    }

    #[test]
    fn test_nan_scores_sort_last() {
        let m = model(vec![vec![1.0]], vec![vec![f32::NAN], vec![-1.0], vec![2.0]]);

        let ranked = m.recommend(0, empty_row(), 10, true).unwrap();
        assert_eq!(ranked.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![2, 1, 0]);
    }

    #[test]
    fn test_user_out_of_range() {
        let m = model(vec![vec![1.0]], vec![vec![1.0]]);

        let result = m.recommend(3, empty_row(), 10, true);
        assert!(matches!(result, Err(ModelError::UserOutOfRange { index: 3, users: 1 })));
    }

    #[test]
    fn test_rejects_inconsistent_dimensions() {
        let result = FactorModel::from_parts(FactorParts {
            user_factors: vec![vec![1.0, 2.0]],
            item_factors: vec![vec![1.0, 2.0], vec![1.0]],
        });
        assert!(matches!(result, Err(Error::InvalidArtifact { .. })));
    }

    #[test]
    fn test_counts() {
        let m = model(vec![vec![1.0, 0.0]; 3], vec![vec![0.0, 1.0]; 5]);
        assert_eq!(m.user_count(), 3);
        assert_eq!(m.item_count(), 5);
        assert_eq!(m.factors(), 2);
    }
}
