//! Recommendation endpoints
//!
//! Both endpoints answer 200 for known and unknown identifiers alike; an
//! unknown identifier yields the unscored default list.

use std::convert::Infallible;

use axum::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::Json;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::ApiResult;
use crate::service::{Proposal, Recommendations};
use crate::AppState;

/// `{"proposals": [...]}`
#[derive(Debug, serde::Serialize)]
pub struct ProposalsResponse {
    pub proposals: Vec<ProposalBody>,
}

impl From<Recommendations> for ProposalsResponse {
    fn from(recs: Recommendations) -> Self {
        let key = recs.kind.key();
        Self {
            proposals: recs
                .proposals
                .into_iter()
                .map(|proposal| ProposalBody { key, proposal })
                .collect(),
        }
    }
}

/// One proposal keyed by entity kind: `{"venue": name, "score": s}`.
/// The `score` key is omitted for fallback proposals.
#[derive(Debug)]
pub struct ProposalBody {
    key: &'static str,
    proposal: Proposal,
}

impl Serialize for ProposalBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.proposal.score.is_some() { 2 } else { 1 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(self.key, &self.proposal.name)?;
        if let Some(score) = self.proposal.score {
            map.serialize_entry("score", &score)?;
        }
        map.end()
    }
}

/// Identifier taken from the last path segment, percent-decoded lossily.
///
/// `Path<String>` rejects segments that do not decode to UTF-8; those must
/// still resolve (and miss) like any other identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn from_path(path: &str) -> Self {
        let segment = path.rsplit('/').next().unwrap_or_default();
        let bytes = urlencoding::decode_binary(segment.as_bytes());
        Self(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identifier {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_path(parts.uri.path()))
    }
}

/// GET /recommend-venues/:paid
pub async fn recommend_venues(
    State(state): State<AppState>,
    Identifier(paid): Identifier,
) -> ApiResult<Json<ProposalsResponse>> {
    let recs = state.recommender.recommend_venues(&paid)?;
    Ok(Json(recs.into()))
}

/// GET /recommend-artists/:paid
pub async fn recommend_artists(
    State(state): State<AppState>,
    Identifier(paid): Identifier,
) -> ApiResult<Json<ProposalsResponse>> {
    let recs = state.recommender.recommend_artists(&paid)?;
    Ok(Json(recs.into()))
}
