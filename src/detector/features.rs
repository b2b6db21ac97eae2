use std::fmt;

use serde::Deserialize;

use super::error::ClassifyError;

/// Sparse row produced by a [`Vectorizer`]; entries are sorted by index.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dimension: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// Builds a vector from `(index, value)` pairs. Zero values are dropped and
    /// duplicate indices are summed.
    pub fn from_entries(dimension: usize, entries: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut entries: Vec<(usize, f64)> = entries.into_iter().collect();
        debug_assert!(entries.iter().all(|(idx, _)| *idx < dimension));
        entries.sort_by_key(|(idx, _)| *idx);
        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (idx, value) in entries {
            match merged.last_mut() {
                Some((last, acc)) if *last == idx => *acc += value,
                _ => merged.push((idx, value)),
            }
        }
        merged.retain(|(_, value)| *value != 0.0);
        Self {
            dimension,
            entries: merged,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|(idx, value)| dense.get(*idx).map(|w| w * value))
            .sum()
    }
}

#[cfg(test)]
impl FeatureVector {
    pub fn zeros(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |(idx, _)| *idx)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }
}

/// Raw class emitted by a classifier, before it is mapped to a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct Label(pub i64);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps normalized text onto the fixed feature space learned at training time.
pub trait Vectorizer: Send + Sync {
    fn dimension(&self) -> usize;

    /// Terms outside the vocabulary are ignored.
    fn transform(&self, text: &str) -> FeatureVector;
}

/// Binary decision model over a [`FeatureVector`].
pub trait Classifier: Send + Sync {
    fn dimension(&self) -> usize;

    /// The two labels this model can emit.
    fn classes(&self) -> &[Label];

    fn predict(&self, features: &FeatureVector) -> Result<Label, ClassifyError>;
}
