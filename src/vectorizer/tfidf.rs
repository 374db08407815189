use indexmap::IndexMap;

use crate::{utils::math::vector::TermSpVec, vectorizer::{corpus::Corpus, term::TermFrequency}};

/// term -> IDF weight
pub type IdfMap = IndexMap<Box<str>, f64>;

/// IDF applied to query terms the corpus has never seen.
/// Non-zero so that unknown terms still count toward the query magnitude.
pub const UNKNOWN_TERM_IDF: f64 = 1.0;

/// TF-IDF calculation strategy
///
/// `SearchIndex<D, E>` is generic over the engine so other weighting schemes
/// can be plugged in. `DefaultTFIDFEngine` implements the classic scheme.
pub trait TFIDFEngine {
    /// IDF of a term
    /// # Arguments
    /// * `doc_num` - number of documents in the corpus
    /// * `doc_freq` - number of documents containing the term
    fn idf(doc_num: u64, doc_freq: u64) -> f64;

    /// TF of a term within one text
    /// # Arguments
    /// * `count` - raw occurrences of the term
    /// * `max_count` - occurrences of the text's most frequent term
    fn tf(count: u64, max_count: u64) -> f64;

    /// IDF for every term of the corpus
    fn idf_map(corpus: &Corpus) -> IdfMap {
        let doc_num = corpus.get_doc_num();
        corpus
            .iter()
            .map(|(term, doc_freq)| (Box::from(term), Self::idf(doc_num, doc_freq)))
            .collect()
    }

    /// TF-IDF vector of one text
    /// Terms missing from `idf` get `unknown_idf`.
    fn tf_idf_vec(freq: &TermFrequency, idf: &IdfMap, unknown_idf: f64) -> TermSpVec<f64> {
        let max_count = freq.most_frequent_term_count();
        let mut vec = TermSpVec::with_capacity(freq.term_num());
        for (term, count) in freq.iter() {
            let idf = idf.get(term).copied().unwrap_or(unknown_idf);
            vec.insert(term, Self::tf(count, max_count) * idf);
        }
        vec
    }
}

/// Default TF-IDF engine
///
/// - `idf = ln(N / (1 + df)) + 1`
/// - `tf = count / max_count`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTFIDFEngine;

impl TFIDFEngine for DefaultTFIDFEngine {
    #[inline]
    fn idf(doc_num: u64, doc_freq: u64) -> f64 {
        (doc_num as f64 / (1.0 + doc_freq as f64)).ln() + 1.0
    }

    #[inline]
    fn tf(count: u64, max_count: u64) -> f64 {
        if max_count == 0 {
            return 0.0;
        }
        count as f64 / max_count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idf_follows_smoothed_log() {
        let idf = DefaultTFIDFEngine::idf(3, 1);
        assert!((idf - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
        // df == N still keeps a positive weight
        let common = DefaultTFIDFEngine::idf(3, 3);
        assert!(common > 0.0);
        assert!((common - ((0.75f64).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn idf_strictly_decreases_with_doc_freq() {
        let n = 50;
        let mut prev = f64::INFINITY;
        for df in 1..=n {
            let idf = DefaultTFIDFEngine::idf(n, df);
            assert!(idf < prev, "df={df}");
            prev = idf;
        }
    }

    #[test]
    fn tf_is_normalized_by_max_count() {
        assert_eq!(DefaultTFIDFEngine::tf(2, 4), 0.5);
        assert_eq!(DefaultTFIDFEngine::tf(4, 4), 1.0);
        assert_eq!(DefaultTFIDFEngine::tf(0, 0), 0.0);
    }

    #[test]
    fn unknown_terms_use_fallback_idf() {
        let mut corpus = Corpus::new();
        corpus.add_doc(&TermFrequency::from(&["cmp", "dishing"][..]));
        corpus.add_doc(&TermFrequency::from(&["cmp"][..]));
        let idf = DefaultTFIDFEngine::idf_map(&corpus);

        let query = TermFrequency::from(&["cmp", "cmp", "zzz"][..]);
        let vec = DefaultTFIDFEngine::tf_idf_vec(&query, &idf, UNKNOWN_TERM_IDF);
        assert_eq!(vec.get("cmp"), idf["cmp"]);
        assert_eq!(vec.get("zzz"), 0.5 * UNKNOWN_TERM_IDF);
    }
}
