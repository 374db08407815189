use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::vectorizer::term::TermFrequency;

/// Document-frequency statistics of one corpus build.
///
/// It does not store document text; it only keeps:
/// - the number of documents
/// - for each term, the number of documents containing it at least once
///
/// Every recorded count is in `1..=doc_num`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    /// number of documents added
    doc_num: u64,
    /// term -> document frequency, first-seen order
    #[serde(with = "indexmap::map::serde_seq")]
    term_counts: IndexMap<Box<str>, u64>,
}

impl Corpus {
    /// Create a new instance
    pub fn new() -> Self {
        Self {
            doc_num: 0,
            term_counts: IndexMap::new(),
        }
    }

    /// Add a document's terms to the corpus.
    /// Repeated terms of the same document count once.
    pub fn add_doc(&mut self, doc: &TermFrequency) {
        self.doc_num += 1;
        for term in doc.term_set_iter() {
            if let Some(count) = self.term_counts.get_mut(term) {
                *count += 1;
            } else {
                self.term_counts.insert(term.into(), 1);
            }
        }
    }

    /// Get the number of documents in the corpus
    #[inline]
    pub fn get_doc_num(&self) -> u64 {
        self.doc_num
    }

    /// Get the document frequency of a term, 0 if unseen
    #[inline]
    pub fn get_term_count(&self, term: &str) -> u64 {
        self.term_counts.get(term).copied().unwrap_or(0)
    }

    /// Get the current vocabulary size (number of unique terms)
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.term_counts.len()
    }

    /// Iterator over (term, document frequency)
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.term_counts.iter().map(|(term, &df)| (term.as_ref(), df))
    }

    /// Terms appearing in at least `min_doc_freq` documents
    pub fn terms_with_min_freq(&self, min_doc_freq: u64) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(move |&(_, df)| df >= min_doc_freq)
            .map(|(term, _)| term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freq(terms: &[&str]) -> TermFrequency {
        TermFrequency::from(terms)
    }

    #[test]
    fn repeated_terms_count_once_per_document() {
        let mut corpus = Corpus::new();
        corpus.add_doc(&freq(&["cmp", "cmp", "dishing"]));
        corpus.add_doc(&freq(&["cmp", "erosion"]));
        assert_eq!(corpus.get_doc_num(), 2);
        assert_eq!(corpus.get_term_count("cmp"), 2);
        assert_eq!(corpus.get_term_count("dishing"), 1);
        assert_eq!(corpus.get_term_count("etch"), 0);
        assert_eq!(corpus.vocab_size(), 3);
    }

    #[test]
    fn document_frequency_is_bounded_by_doc_num() {
        let mut corpus = Corpus::new();
        corpus.add_doc(&freq(&["a", "b"]));
        corpus.add_doc(&freq(&[]));
        corpus.add_doc(&freq(&["b", "c", "b"]));
        let n = corpus.get_doc_num();
        for (_, df) in corpus.iter() {
            assert!(df >= 1 && df <= n);
        }
        let common: Vec<&str> = corpus.terms_with_min_freq(2).collect();
        assert_eq!(common, vec!["b"]);
    }
}
