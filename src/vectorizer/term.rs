use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Occurrence counts of the terms of one text.
///
/// Terms are kept in the order they were first seen so that vectors built
/// from the counts iterate deterministically.
///
/// # Examples
/// ```
/// use lab_search::TermFrequency;
/// let mut freq = TermFrequency::new();
/// freq.add_terms(&["cmp", "dishing", "cmp"]);
///
/// assert_eq!(freq.term_count("cmp"), 2);
/// assert_eq!(freq.most_frequent_term_count(), 2);
/// assert_eq!(freq.term_num(), 2);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TermFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    counts: IndexMap<String, u64>,
    /// running maximum of `counts`
    max_count: u64,
}

impl TermFrequency {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_term(&mut self, term: &str) -> &mut Self {
        let count = match self.counts.get_mut(term) {
            Some(count) => {
                *count += 1;
                *count
            }
            None => {
                self.counts.insert(term.to_owned(), 1);
                1
            }
        };
        self.max_count = self.max_count.max(count);
        self
    }

    pub fn add_terms<T: AsRef<str>>(&mut self, terms: &[T]) -> &mut Self {
        terms.iter().for_each(|term| {
            self.add_term(term.as_ref());
        });
        self
    }

    /// `(term, count)` in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(term, &count)| (term.as_str(), count))
    }

    /// Distinct terms, first-seen order
    pub fn term_set_iter(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// 0 for terms never added
    pub fn term_count(&self, term: &str) -> u64 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    /// TF denominator; 0 when empty
    pub fn most_frequent_term_count(&self) -> u64 {
        self.max_count
    }

    /// Number of distinct terms
    pub fn term_num(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<T: AsRef<str>> From<&[T]> for TermFrequency {
    fn from(terms: &[T]) -> Self {
        let mut freq = TermFrequency::new();
        freq.add_terms(terms);
        freq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_keep_first_seen_order() {
        let freq = TermFrequency::from(&["b", "a", "b", "c", "a", "b"][..]);
        let collected: Vec<(&str, u64)> = freq.iter().collect();
        assert_eq!(collected, vec![("b", 3), ("a", 2), ("c", 1)]);
        assert_eq!(freq.term_set_iter().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(freq.term_num(), 3);
        assert_eq!(freq.most_frequent_term_count(), 3);
    }

    #[test]
    fn empty_frequency() {
        let freq = TermFrequency::new();
        assert!(freq.is_empty());
        assert_eq!(freq.most_frequent_term_count(), 0);
        assert_eq!(freq.term_count("x"), 0);
    }

    #[test]
    fn max_tracks_the_leading_term() {
        let mut freq = TermFrequency::new();
        freq.add_term("x").add_term("y").add_term("y");
        assert_eq!(freq.most_frequent_term_count(), 2);
        freq.add_terms(&["x", "x"]);
        assert_eq!(freq.most_frequent_term_count(), 3);
    }
}
