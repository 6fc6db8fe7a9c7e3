//! Compressed sparse row interaction matrix
//!
//! Row `i` holds the interaction weights of entity `i`; the stored column
//! indices of a row are the items that entity has already interacted with.

use pa_common::{Error, Result};
use serde::Deserialize;

const ARTIFACT: &str = "interaction matrix";

/// On-disk CSR layout: `shape`, `indptr`, `indices`, `data`
#[derive(Debug, Deserialize)]
pub struct CsrParts {
    pub shape: (usize, usize),
    pub indptr: Vec<usize>,
    pub indices: Vec<usize>,
    pub data: Vec<f32>,
}

/// Immutable CSR matrix, validated at construction
#[derive(Debug, Clone)]
pub struct CsrMatrix {
    rows: usize,
    cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f32>,
}

impl CsrMatrix {
    /// Build a matrix from its CSR parts, rejecting structurally invalid input
    pub fn from_parts(parts: CsrParts) -> Result<Self> {
        let CsrParts {
            shape: (rows, cols),
            indptr,
            indices,
            data,
        } = parts;

        let expected = rows
            .checked_add(1)
            .ok_or_else(|| Error::invalid_artifact(ARTIFACT, format!("row count {} too large", rows)))?;
        if indptr.len() != expected {
            return Err(Error::invalid_artifact(
                ARTIFACT,
                format!("indptr has {} entries, expected {}", indptr.len(), expected),
            ));
        }
        if indptr[0] != 0 {
            return Err(Error::invalid_artifact(ARTIFACT, "indptr must start at 0"));
        }
        if let Some(row) = indptr.windows(2).position(|w| w[0] > w[1]) {
            return Err(Error::invalid_artifact(
                ARTIFACT,
                format!("indptr decreases at row {}", row),
            ));
        }
        if indices.len() != data.len() {
            return Err(Error::invalid_artifact(
                ARTIFACT,
                format!("{} indices but {} values", indices.len(), data.len()),
            ));
        }
        if indptr[rows] != indices.len() {
            return Err(Error::invalid_artifact(
                ARTIFACT,
                format!("indptr ends at {} but {} entries are stored", indptr[rows], indices.len()),
            ));
        }
        if let Some(&col) = indices.iter().find(|&&col| col >= cols) {
            return Err(Error::invalid_artifact(
                ARTIFACT,
                format!("column index {} out of range for {} columns", col, cols),
            ));
        }

        Ok(Self {
            rows,
            cols,
            indptr,
            indices,
            data,
        })
    }

    /// Build from dense rows; zero entries are not stored
    pub fn from_dense(rows: &[Vec<f32>], cols: usize) -> Result<Self> {
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);

        for row in rows {
            for (col, &value) in row.iter().enumerate() {
                if value != 0.0 {
                    indices.push(col);
                    data.push(value);
                }
            }
            indptr.push(indices.len());
        }

        Self::from_parts(CsrParts {
            shape: (rows.len(), cols),
            indptr,
            indices,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Row `index`, or `None` past the last row
    pub fn row(&self, index: usize) -> Option<SparseRow<'_>> {
        if index >= self.rows {
            return None;
        }
        let range = self.indptr[index]..self.indptr[index + 1];
        Some(SparseRow {
            indices: &self.indices[range.clone()],
            data: &self.data[range],
        })
    }
}

/// Borrowed view of one matrix row
#[derive(Debug, Clone, Copy)]
pub struct SparseRow<'a> {
    indices: &'a [usize],
    data: &'a [f32],
}

impl<'a> SparseRow<'a> {
    pub fn new(indices: &'a [usize], data: &'a [f32]) -> Self {
        debug_assert_eq!(indices.len(), data.len());
        Self { indices, data }
    }

    /// Column indices of the stored entries
    pub fn indices(&self) -> &'a [usize] {
        self.indices
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + 'a {
        self.indices.iter().copied().zip(self.data.iter().copied())
    }
}
