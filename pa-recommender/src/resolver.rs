//! Identifier sequences and exact-match index resolution

use std::collections::HashMap;

/// Ordered identifier sequence with a precomputed name → position map
///
/// Resolution is byte-exact. With duplicate names the first position wins,
/// the same answer an in-order scan gives.
#[derive(Debug, Clone, Default)]
pub struct IdentifierIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl IdentifierIndex {
    pub fn new(names: Vec<String>) -> Self {
        let mut positions = HashMap::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            positions.entry(name.clone()).or_insert(position);
        }
        Self { names, positions }
    }

    /// Position of `id`, or `None` when no entry equals it
    pub fn resolve(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn name(&self, position: usize) -> Option<&str> {
        self.names.get(position).map(String::as_str)
    }

    /// The first `count` names in sequence order (all of them if fewer)
    pub fn head(&self, count: usize) -> &[String] {
        &self.names[..count.min(self.names.len())]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of names that repeat an earlier entry
    pub fn duplicate_count(&self) -> usize {
        self.names.len() - self.positions.len()
    }
}

impl From<Vec<String>> for IdentifierIndex {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}
