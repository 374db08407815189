use std::fmt::{self, Debug, Display};

use rayon::prelude::*;

use crate::utils::math::vector::TermSpVec;

/// One ranked document
pub struct HitEntry<'a, D> {
    /// position of the document in the indexed corpus
    pub index: usize,
    /// cosine similarity, `(0, 1]`
    pub score: f64,
    pub document: &'a D,
}

impl<D> Clone for HitEntry<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for HitEntry<'_, D> {}

impl<D: Debug> Debug for HitEntry<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HitEntry")
            .field("index", &self.index)
            .field("score", &self.score)
            .field("document", self.document)
            .finish()
    }
}

/// Structure to store search results
pub struct Hits<'a, D> {
    pub list: Vec<HitEntry<'a, D>>,
}

impl<'a, D> Hits<'a, D> {
    /// Create a new Hits instance
    pub fn new(list: Vec<HitEntry<'a, D>>) -> Self {
        Hits { list }
    }

    pub fn empty() -> Self {
        Hits { list: Vec::new() }
    }

    /// Build ranked hits from per-document scores (corpus order).
    /// Keeps strictly positive scores, sorts by descending score with ties in
    /// corpus order and truncates to `top_k`.
    pub fn from_scores(scores: &[f64], documents: &'a [D], top_k: usize) -> Self {
        let list = scores
            .iter()
            .zip(documents)
            .enumerate()
            .filter(|(_, (score, _))| **score > 0.0)
            .map(|(index, (&score, document))| HitEntry { index, score, document })
            .collect();
        let mut hits = Hits { list };
        hits.sort_by_score_desc();
        hits.list.truncate(top_k);
        hits
    }

    /// Sort results by descending score.
    /// The sort is stable: equal scores keep their current order.
    pub fn sort_by_score_desc(&mut self) -> &mut Self {
        self.list.retain(|hit| !hit.score.is_nan());
        self.list.sort_by(|a, b| b.score.total_cmp(&a.score));
        self
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HitEntry<'a, D>> {
        self.list.iter()
    }

    /// Borrowed documents in rank order
    pub fn documents(&self) -> Vec<&'a D> {
        self.list.iter().map(|hit| hit.document).collect()
    }

    /// Corpus positions in rank order
    pub fn indices(&self) -> Vec<usize> {
        self.list.iter().map(|hit| hit.index).collect()
    }
}

impl<'a, D> IntoIterator for Hits<'a, D> {
    type Item = HitEntry<'a, D>;
    type IntoIter = std::vec::IntoIter<HitEntry<'a, D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.into_iter()
    }
}

impl<D> Debug for Hits<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            // Pretty print with alternate formatting: each hit on a new line
            writeln!(f, "Hits [")?;
            for hit in &self.list {
                writeln!(f, "    #{}: {:.6}", hit.index, hit.score)?;
            }
            write!(f, "]")
        } else {
            f.debug_list()
                .entries(self.list.iter().map(|hit| (hit.index, hit.score)))
                .finish()
        }
    }
}

impl<D> Display for Hits<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (rank, hit) in self.list.iter().enumerate() {
            writeln!(f, "{:>3}. doc #{:<6} score {:.4}", rank + 1, hit.index, hit.score)?;
        }
        Ok(())
    }
}

/// Cosine similarity of the query against every document vector.
/// Returns scores in corpus order regardless of thread scheduling.
pub fn scoring_cosine(query: &TermSpVec<f64>, documents: &[TermSpVec<f64>]) -> Vec<f64> {
    if query.is_empty() {
        return vec![0.0; documents.len()];
    }
    documents.par_iter().map(|doc| query.cosine(doc)).collect()
}
