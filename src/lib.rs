//! Search core for a semiconductor process-development experiment tracker.
//!
//! Experiments, joined with their project and Split Table rows, are indexed
//! with TF-IDF and ranked by cosine similarity. A suggestion extractor
//! proposes keywords that split the current result set.
pub mod config;
pub mod document;
pub mod error;
pub mod service;
pub mod suggest;
pub mod utils;
pub mod vectorizer;

/// TF-IDF search index
/// The top-level struct of this crate. It is built once from a document set
/// and a `Projection`, and answers ranked cosine-similarity queries.
///
/// Internally, it holds:
/// - The documents and their projected text
/// - Document frequencies of every term (`Corpus`)
/// - The IDF table
/// - A sparse TF-IDF vector for each document
///
/// `SearchIndex<D, E>` has the following generic parameters:
/// - `D`: Document type, read through `FieldSource`
/// - `E`: TF-IDF calculation engine type (e.g., DefaultTFIDFEngine)
///
/// There is no incremental update. Reindexing builds a new instance.
pub use vectorizer::SearchIndex;

/// Ranked search results
/// `Hits` borrows the documents from the index it came from.
/// Each `HitEntry` carries the corpus position, the score and the document.
pub use vectorizer::evaluate::scoring::{HitEntry, Hits};

/// Query with quoted exact phrases split from its free text
pub use vectorizer::evaluate::query::ParsedQuery;

/// Tokenizer
/// Lowercases and splits mixed Korean / Latin / numeric text at script
/// boundaries.
pub use vectorizer::analyzer::tokenize;

/// Term frequency counter of one text
pub use vectorizer::term::TermFrequency;

/// Document frequency statistics of a corpus
/// It does not store document text; it only manages:
/// - The number of documents
/// - The number of documents in which each term appears
///
/// It is the base data for IDF calculation.
pub use vectorizer::corpus::Corpus;

/// TF-IDF Engine
/// Pluggable weighting scheme. `DefaultTFIDFEngine` uses
/// `idf = ln(N / (1 + df)) + 1` and `tf = count / max_count`.
pub use vectorizer::tfidf::{DefaultTFIDFEngine, TFIDFEngine};

/// Sparse term-keyed vector
pub use utils::math::vector::TermSpVec;

/// Documents, field access and weighted projection
pub use document::{Document, FieldSource, Projection};

/// Refinement keyword suggestions
pub use suggest::{extract_suggestions, Suggester, Suggestion, SuggestionConfig};

/// Request-level search service with atomic reindex
pub use service::{
    ChatTurn, ConversationRequest, ConversationResponse, ResultEntry, Role, SearchRequest, SearchResponse,
    SearchService,
};

pub use config::SearchConfig;
pub use error::{Result, SearchError};
