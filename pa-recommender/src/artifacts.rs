//! Artifact store: identifier sequences, model and interaction matrix
//!
//! Loaded once at startup and shared read-only for the process lifetime.
//! Any load failure is fatal to startup.

use pa_common::config::ArtifactPaths;
use pa_common::{Error, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::matrix::{CsrMatrix, CsrParts};
use crate::model::{FactorModel, FactorParts, RecommenderModel};
use crate::resolver::IdentifierIndex;

/// Process-wide immutable artifacts
pub struct ArtifactStore {
    pub artists: IdentifierIndex,
    pub venues: IdentifierIndex,
    pub model: Arc<dyn RecommenderModel>,
    pub matrix: CsrMatrix,
}

impl std::fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("artists", &self.artists.len())
            .field("venues", &self.venues.len())
            .field("model_users", &self.model.user_count())
            .field("model_items", &self.model.item_count())
            .field("matrix_rows", &self.matrix.rows())
            .finish()
    }
}

impl ArtifactStore {
    /// Assemble a store from already-built parts
    pub fn new(
        artists: impl Into<IdentifierIndex>,
        venues: impl Into<IdentifierIndex>,
        model: Arc<dyn RecommenderModel>,
        matrix: CsrMatrix,
    ) -> Self {
        Self {
            artists: artists.into(),
            venues: venues.into(),
            model,
            matrix,
        }
    }

    /// Load all four artifacts from disk
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let artists: Vec<String> = read_json(&paths.artists, "artists")?;
        info!("Loaded {} artists from {}", artists.len(), paths.artists.display());

        let venues: Vec<String> = read_json(&paths.venues, "venues")?;
        info!("Loaded {} venues from {}", venues.len(), paths.venues.display());

        let model = FactorModel::from_parts(read_json::<FactorParts>(&paths.model, "model")?)?;
        info!(
            "Loaded factor model from {} ({} users, {} items, {} factors)",
            paths.model.display(),
            model.user_count(),
            model.item_count(),
            model.factors()
        );

        let matrix = CsrMatrix::from_parts(read_json::<CsrParts>(&paths.matrix, "matrix")?)?;
        info!(
            "Loaded interaction matrix from {} ({}x{}, {} stored entries)",
            paths.matrix.display(),
            matrix.rows(),
            matrix.cols(),
            matrix.nnz()
        );

        let store = Self::new(artists, venues, Arc::new(model), matrix);
        store.warn_on_misalignment();
        Ok(store)
    }

    /// Log shapes that break the index alignment both endpoints rely on
    pub fn warn_on_misalignment(&self) {
        if self.matrix.rows() != self.artists.len() {
            warn!(
                "Matrix has {} rows but there are {} artists",
                self.matrix.rows(),
                self.artists.len()
            );
        }
        if self.model.user_count() != self.matrix.rows() {
            warn!(
                "Model has {} users but matrix has {} rows",
                self.model.user_count(),
                self.matrix.rows()
            );
        }
        if self.model.item_count() != self.matrix.cols() {
            warn!(
                "Model has {} items but matrix has {} columns",
                self.model.item_count(),
                self.matrix.cols()
            );
        }
        for (kind, index) in [("artist", &self.artists), ("venue", &self.venues)] {
            if index.duplicate_count() > 0 {
                warn!(
                    "{} duplicate {} identifiers; lookups resolve to the first occurrence",
                    index.duplicate_count(),
                    kind
                );
            }
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, artifact: &str) -> Result<T> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            Error::NotFound(format!("{} artifact {}", artifact, path.display()))
        }
        _ => Error::Io(e),
    })?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::invalid_artifact(artifact, format!("{}: {}", path.display(), e)))
}
