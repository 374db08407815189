//! Error types for lab-search.
//!
//! The ranking core never fails on empty text, empty corpora or empty
//! queries. Errors only surface at the boundary: request validation,
//! configuration and corpus loading.

use std::io;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    /// Request carried no query text
    #[error("query is required")]
    EmptyQuery,

    /// Negative `top_k` at the request boundary
    #[error("top_k must not be negative, got {0}")]
    InvalidTopK(i64),

    /// Corpus input was not an array of objects
    #[error("invalid corpus: {0}")]
    InvalidCorpus(String),

    /// Configuration file rejected
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CBOR error: {0}")]
    Cbor(#[from] serde_cbor::Error),
}

impl SearchError {
    pub fn invalid_corpus<S: Into<String>>(msg: S) -> Self {
        SearchError::InvalidCorpus(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        SearchError::Config(msg.into())
    }
}
