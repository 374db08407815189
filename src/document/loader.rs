use std::{fs::File, io::{BufReader, Read}, path::Path};

use serde_json::Value;
use tracing::info;

use crate::error::{Result, SearchError};

use super::Document;

/// Load a corpus file: a JSON array of objects, or the same structure
/// encoded as CBOR when the extension is `.cbor`.
pub fn load_documents<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let is_cbor = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("cbor"));
    let documents = if is_cbor {
        read_cbor_documents(reader)?
    } else {
        read_json_documents(reader)?
    };
    info!(path = %path.display(), documents = documents.len(), "loaded corpus");
    Ok(documents)
}

pub fn read_json_documents<R: Read>(reader: R) -> Result<Vec<Document>> {
    let value: Value = serde_json::from_reader(reader)?;
    documents_from_value(value)
}

pub fn read_cbor_documents<R: Read>(reader: R) -> Result<Vec<Document>> {
    let value: Value = serde_cbor::from_reader(reader)?;
    documents_from_value(value)
}

/// Convert a JSON array of objects into documents.
/// Anything else is not a corpus.
pub fn documents_from_value(value: Value) -> Result<Vec<Document>> {
    let Value::Array(rows) = value else {
        return Err(SearchError::invalid_corpus("expected an array of objects"));
    };
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            Document::from_value(row)
                .ok_or_else(|| SearchError::invalid_corpus(format!("element {i} is not an object")))
        })
        .collect()
}
