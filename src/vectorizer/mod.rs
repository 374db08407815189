pub mod analyzer;
pub mod corpus;
pub mod evaluate;
pub mod term;
pub mod tfidf;

use std::{marker::PhantomData, time::Instant};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    document::{FieldSource, Projection},
    utils::math::vector::TermSpVec,
    vectorizer::{
        analyzer::tokenize,
        corpus::Corpus,
        evaluate::scoring::{scoring_cosine, Hits},
        term::TermFrequency,
        tfidf::{DefaultTFIDFEngine, IdfMap, TFIDFEngine, UNKNOWN_TERM_IDF},
    },
};

/// TF-IDF index over a fixed document set.
///
/// Built in one pass from the documents and a [`Projection`]; there is no
/// incremental update. To reindex, build a new `SearchIndex` and swap it in.
///
/// `SearchIndex<D, E>` has the following generic parameters:
/// - `D`: document type, read through [`FieldSource`]
/// - `E`: TF-IDF calculation engine (e.g., `DefaultTFIDFEngine`)
///
/// # Examples
/// ```
/// use lab_search::{Document, Projection, SearchIndex};
/// let docs = vec![
///     Document::new().with("eval_item", "CMP Dishing 제어"),
///     Document::new().with("eval_item", "ESL Etch Rate 개선"),
/// ];
/// let index: SearchIndex<Document> = SearchIndex::build(docs, Projection::new().field("eval_item", 1));
/// let hits = index.search("cmp", 10);
/// assert_eq!(hits.indices(), vec![0]);
/// ```
#[derive(Debug, Clone)]
pub struct SearchIndex<D, E = DefaultTFIDFEngine>
where
    E: TFIDFEngine,
{
    documents: Vec<D>,
    /// projected text of each document, corpus order
    texts: Vec<String>,
    projection: Projection,
    corpus: Corpus,
    idf: IdfMap,
    vectors: Vec<TermSpVec<f64>>,
    _marker: PhantomData<E>,
}

impl<D, E> SearchIndex<D, E>
where
    D: FieldSource + Send + Sync,
    E: TFIDFEngine,
{
    /// Build the index: project, tokenize, count document frequencies, then
    /// weight every document vector with the fresh IDF table.
    pub fn build(documents: Vec<D>, projection: Projection) -> Self {
        let started = Instant::now();

        let texts: Vec<String> = documents
            .par_iter()
            .map(|doc| projection.project(doc))
            .collect();
        let freqs: Vec<TermFrequency> = texts
            .par_iter()
            .map(|text| TermFrequency::from(tokenize(text).as_slice()))
            .collect();

        let mut corpus = Corpus::new();
        for freq in &freqs {
            corpus.add_doc(freq);
        }
        let idf = E::idf_map(&corpus);

        let vectors: Vec<TermSpVec<f64>> = freqs
            .par_iter()
            .map(|freq| {
                let mut vec = E::tf_idf_vec(freq, &idf, UNKNOWN_TERM_IDF);
                vec.shrink_to_fit();
                vec
            })
            .collect();

        info!(
            documents = documents.len(),
            vocabulary = corpus.vocab_size(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built search index"
        );

        SearchIndex {
            documents,
            texts,
            projection,
            corpus,
            idf,
            vectors,
            _marker: PhantomData,
        }
    }

    /// TF-IDF vector of a query. Unknown terms are weighted with
    /// [`UNKNOWN_TERM_IDF`].
    pub fn query_vector(&self, query: &str) -> TermSpVec<f64> {
        let tokens = tokenize(query);
        let freq = TermFrequency::from(tokens.as_slice());
        E::tf_idf_vec(&freq, &self.idf, UNKNOWN_TERM_IDF)
    }

    /// Cosine score of every document against the query, corpus order.
    /// All zeros when the query has no tokens.
    pub fn score_all(&self, query: &str) -> Vec<f64> {
        let query_vec = self.query_vector(query);
        scoring_cosine(&query_vec, &self.vectors)
    }

    /// Rank documents by cosine similarity to the query.
    ///
    /// Only documents with a positive score are returned, best first, ties in
    /// corpus order, at most `top_k` of them.
    pub fn search(&self, query: &str, top_k: usize) -> Hits<'_, D> {
        if top_k == 0 || self.documents.is_empty() {
            return Hits::empty();
        }
        let query_vec = self.query_vector(query);
        if query_vec.is_empty() {
            debug!(query, "query has no tokens");
            return Hits::empty();
        }
        let scores = scoring_cosine(&query_vec, &self.vectors);
        let hits = Hits::from_scores(&scores, &self.documents, top_k);
        debug!(
            query,
            query_terms = query_vec.nnz(),
            hits = hits.len(),
            top_k,
            "search"
        );
        hits
    }
}

/// Accessors
impl<D, E> SearchIndex<D, E>
where
    E: TFIDFEngine,
{
    /// Number of documents containing `term` (0 when unseen)
    pub fn df(&self, term: &str) -> u64 {
        self.corpus.get_term_count(term)
    }

    /// IDF of an indexed term
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    pub fn doc_num(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[D] {
        &self.documents
    }

    pub fn document(&self, index: usize) -> Option<&D> {
        self.documents.get(index)
    }

    /// Projected text of a document, as seen by the ranker
    pub fn document_text(&self, index: usize) -> Option<&str> {
        self.texts.get(index).map(String::as_str)
    }

    pub fn vector(&self, index: usize) -> Option<&TermSpVec<f64>> {
        self.vectors.get(index)
    }

    pub fn vocab_size(&self) -> usize {
        self.corpus.vocab_size()
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }
}
