//! Lookup-and-recommend service
//!
//! Resolves an identifier against one sequence, ranks entities of the
//! opposite sequence through the model, and falls back to the head of the
//! opposite sequence when the identifier is unknown.

use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::artifacts::ArtifactStore;
use crate::model::ModelError;
use crate::resolver::IdentifierIndex;

/// Result-count bound passed to the model
pub const RECOMMENDATION_COUNT: usize = 10;

/// Size of the unscored default list for unknown identifiers
pub const FALLBACK_COUNT: usize = 10;

/// Entity kind on either side of the interaction matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Artist,
    Venue,
}

impl EntityKind {
    /// The kind recommended for a query of this kind
    pub fn opposite(self) -> Self {
        match self {
            EntityKind::Artist => EntityKind::Venue,
            EntityKind::Venue => EntityKind::Artist,
        }
    }

    /// JSON key carrying the entity name in a proposal
    pub fn key(self) -> &'static str {
        match self {
            EntityKind::Artist => "artist",
            EntityKind::Venue => "venue",
        }
    }
}

/// One recommended entity; unscored when it comes from the fallback list
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub name: String,
    pub score: Option<f32>,
}

/// Where a set of proposals came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendations {
    /// Kind of the proposed entities
    pub kind: EntityKind,
    pub source: ProposalSource,
    pub proposals: Vec<Proposal>,
}

/// Failure while ranking a resolved identifier
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("index {index} has no row in the interaction matrix ({rows} rows)")]
    MissingRow { index: usize, rows: usize },

    #[error("model returned {kind} index {index} but only {len} {kind}s are loaded")]
    UnknownCandidate {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("model returned non-finite score {score} for {kind} index {index}")]
    NonFiniteScore {
        kind: &'static str,
        index: usize,
        score: f32,
    },
}

pub struct RecommendationService {
    store: Arc<ArtifactStore>,
}

impl RecommendationService {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Venues for an artist identifier
    pub fn recommend_venues(&self, artist_id: &str) -> Result<Recommendations, RecommendError> {
        self.recommend_for(EntityKind::Artist, artist_id)
    }

    /// Artists for a venue identifier
    pub fn recommend_artists(&self, venue_id: &str) -> Result<Recommendations, RecommendError> {
        self.recommend_for(EntityKind::Venue, venue_id)
    }

    fn recommend_for(&self, query: EntityKind, id: &str) -> Result<Recommendations, RecommendError> {
        let target = query.opposite();
        let candidates = self.sequence(target);

        let (source, proposals) = match self.sequence(query).resolve(id) {
            Some(index) => (
                ProposalSource::Model,
                self.ranked_proposals(index, candidates, target)?,
            ),
            None => (
                ProposalSource::Fallback,
                default_proposals(candidates, FALLBACK_COUNT),
            ),
        };

        debug!(
            "{} '{}': {} {} proposals from {:?}",
            query.key(),
            id,
            proposals.len(),
            target.key(),
            source
        );
        Ok(Recommendations {
            kind: target,
            source,
            proposals,
        })
    }

    fn ranked_proposals(
        &self,
        index: usize,
        candidates: &IdentifierIndex,
        target: EntityKind,
    ) -> Result<Vec<Proposal>, RecommendError> {
        let row = self.store.matrix.row(index).ok_or(RecommendError::MissingRow {
            index,
            rows: self.store.matrix.rows(),
        })?;

        let ranked = self
            .store
            .model
            .recommend(index, row, RECOMMENDATION_COUNT, true)?;

        // Model order is kept as-is
        ranked
            .into_iter()
            .map(|(candidate, score)| {
                let name = candidates
                    .name(candidate)
                    .ok_or(RecommendError::UnknownCandidate {
                        kind: target.key(),
                        index: candidate,
                        len: candidates.len(),
                    })?;
                // JSON has no NaN or infinity
                if !score.is_finite() {
                    return Err(RecommendError::NonFiniteScore {
                        kind: target.key(),
                        index: candidate,
                        score,
                    });
                }
                Ok(Proposal {
                    name: name.to_string(),
                    score: Some(score),
                })
            })
            .collect()
    }

    fn sequence(&self, kind: EntityKind) -> &IdentifierIndex {
        match kind {
            EntityKind::Artist => &self.store.artists,
            EntityKind::Venue => &self.store.venues,
        }
    }
}

/// First `count` entries of `sequence`, in order and without scores
pub fn default_proposals(sequence: &IdentifierIndex, count: usize) -> Vec<Proposal> {
    sequence
        .head(count)
        .iter()
        .map(|name| Proposal {
            name: name.clone(),
            score: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::CsrMatrix;
    use crate::model::{FactorModel, FactorParts};

    fn names(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    /// 3 artists x 12 venues; venue score for every artist equals venue index
    fn service() -> RecommendationService {
        let model = FactorModel::from_parts(FactorParts {
            user_factors: vec![vec![1.0]; 3],
            item_factors: (0..12).map(|i| vec![i as f32]).collect(),
        })
        .unwrap();
        let mut dense = vec![vec![0.0; 12]; 3];
        dense[0][11] = 1.0;
        let matrix = CsrMatrix::from_dense(&dense, 12).unwrap();

        let store = ArtifactStore::new(names("A", 3), names("V", 12), Arc::new(model), matrix);
        RecommendationService::new(Arc::new(store))
    }

    #[test]
    fn test_known_artist_ranks_unseen_venues() {
        let recs = service().recommend_venues("A0").unwrap();

        assert_eq!(recs.kind, EntityKind::Venue);
        assert_eq!(recs.source, ProposalSource::Model);
        assert_eq!(recs.proposals.len(), RECOMMENDATION_COUNT);
        // V11 was already seen by A0
        assert_eq!(recs.proposals[0].name, "V10");
        assert_eq!(recs.proposals[0].score, Some(10.0));
        assert!(recs.proposals.iter().all(|p| p.name != "V11"));
    }

    #[test]
    fn test_unknown_artist_falls_back_to_first_venues() {
        let recs = service().recommend_venues("A0x").unwrap();

        assert_eq!(recs.source, ProposalSource::Fallback);
        let expected: Vec<Proposal> = names("V", 10)
            .into_iter()
            .map(|name| Proposal { name, score: None })
            .collect();
        assert_eq!(recs.proposals, expected);
    }

    #[test]
    fn test_fallback_shorter_than_count() {
        let recs = service().recommend_artists("nowhere").unwrap();

        assert_eq!(recs.kind, EntityKind::Artist);
        assert_eq!(recs.source, ProposalSource::Fallback);
        assert_eq!(recs.proposals.len(), 3);
    }

    #[test]
    fn test_venue_index_beyond_matrix_is_error() {
        // Venue V5 resolves to index 5, but the shared matrix has 3 rows
        let result = service().recommend_artists("V5");
        assert!(matches!(result, Err(RecommendError::MissingRow { index: 5, rows: 3 })));
    }

    #[test]
    fn test_model_index_beyond_target_sequence_is_error() {
        // Venue V1 resolves to row 1; the model ranks 12 items but only 3 artists exist
        let result = service().recommend_artists("V1");
        assert!(matches!(
            result,
            Err(RecommendError::UnknownCandidate { kind: "artist", .. })
        ));
    }

    #[test]
    fn test_overflowing_score_is_error() {
        // Finite factors whose product overflows f32
        let model = FactorModel::from_parts(FactorParts {
            user_factors: vec![vec![1e30]],
            item_factors: vec![vec![1e30], vec![1.0]],
        })
        .unwrap();
        let matrix = CsrMatrix::from_dense(&[vec![0.0, 0.0]], 2).unwrap();
        let store = ArtifactStore::new(names("A", 1), names("V", 2), Arc::new(model), matrix);
        let service = RecommendationService::new(Arc::new(store));

        let result = service.recommend_venues("A0");
        assert!(matches!(
            result,
            Err(RecommendError::NonFiniteScore { kind: "venue", index: 0, .. })
        ));
    }

    #[test]
    fn test_entity_kind_keys() {
        assert_eq!(EntityKind::Artist.opposite(), EntityKind::Venue);
        assert_eq!(EntityKind::Venue.key(), "venue");
        assert_eq!(EntityKind::Artist.key(), "artist");
    }
}
