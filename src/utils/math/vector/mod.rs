pub mod math;

use indexmap::IndexMap;
use num::Float;
use serde::{Deserialize, Serialize};

/// Sparse term-keyed vector
/// Only non-zero dimensions are stored. A missing key is an implicit zero.
/// Entries keep insertion order, which is the first-seen order of terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermSpVec<N>
where
    N: Float,
{
    #[serde(
        with = "indexmap::map::serde_seq",
        bound(serialize = "N: Serialize", deserialize = "N: Deserialize<'de>")
    )]
    entries: IndexMap<Box<str>, N>,
}

impl<N> Default for TermSpVec<N>
where
    N: Float,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N> TermSpVec<N>
where
    N: Float,
{
    pub fn new() -> Self {
        Self { entries: IndexMap::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: IndexMap::with_capacity(capacity) }
    }

    /// Set a dimension; zero values are not stored
    #[inline]
    pub fn insert(&mut self, term: &str, value: N) {
        if value.is_zero() {
            self.entries.swap_remove(term);
        } else {
            self.entries.insert(term.into(), value);
        }
    }

    /// Value of a dimension, zero when absent
    #[inline]
    pub fn get(&self, term: &str) -> N {
        self.entries.get(term).copied().unwrap_or_else(N::zero)
    }

    #[inline]
    pub fn contains(&self, term: &str) -> bool {
        self.entries.contains_key(term)
    }

    /// Number of stored (non-zero) dimensions
    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, N)> {
        self.entries.iter().map(|(term, &v)| (term.as_ref(), v))
    }

    pub fn shrink_to_fit(&mut self) {
        self.entries.shrink_to_fit();
    }
}

impl<N> FromIterator<(Box<str>, N)> for TermSpVec<N>
where
    N: Float,
{
    fn from_iter<I: IntoIterator<Item = (Box<str>, N)>>(iter: I) -> Self {
        let mut vec = TermSpVec::new();
        for (term, value) in iter {
            vec.insert(&term, value);
        }
        vec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_keeps_entries_and_order() {
        let mut vec: TermSpVec<f64> = TermSpVec::new();
        vec.insert("cmp", 0.5);
        vec.insert("dishing", 1.25);
        let value = serde_json::to_value(&vec).unwrap();
        assert_eq!(value, serde_json::json!({ "entries": [["cmp", 0.5], ["dishing", 1.25]] }));

        let back: TermSpVec<f64> = serde_json::from_value(value).unwrap();
        assert_eq!(back, vec);
        assert_eq!(back.iter().map(|(term, _)| term).collect::<Vec<_>>(), vec!["cmp", "dishing"]);
    }
}
