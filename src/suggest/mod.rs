//! Refinement keyword suggestions.
//!
//! Given the ranked results of a query, propose keywords that split the
//! result set roughly in half. Picking one of them narrows the results
//! without emptying them.

pub mod stopwords;

use std::collections::{BTreeSet, HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    document::FieldSource,
    vectorizer::{
        analyzer::{is_numeric_token, tokenize},
        tfidf::TFIDFEngine,
        SearchIndex,
    },
};

pub use stopwords::{is_stop_word, STOP_WORDS};

/// Upper bound on returned suggestions
pub const MAX_SUGGESTIONS: usize = 6;
/// Suggestions sharing the exact same set of field labels
pub const MAX_PER_FIELD_SET: usize = 2;
/// Shorter tokens carry too little meaning to be offered
pub const MIN_KEYWORD_CHARS: usize = 2;
/// From this many results on, keywords matching a single result are dropped
pub const NARROW_RESULT_THRESHOLD: usize = 3;

/// Semantic fields scanned for keywords, `(label, accessor)`
pub const DEFAULT_SEMANTIC_FIELDS: &[(&str, &str)] = &[
    ("평가아이템", "eval_item"),
    ("모듈", "module"),
    ("평가공정", "eval_process"),
    ("과제", "iacpj_nm"),
    ("Tech", "iacpj_tech_n"),
    ("목표", "iacpj_ta_goa"),
    ("현황", "iacpj_cur_stt"),
    ("요청자", "requester"),
];

/// Tunables of the extractor. Defaults are the named constants above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    pub max_suggestions: usize,
    pub max_per_field_set: usize,
    pub min_keyword_chars: usize,
    pub narrow_result_threshold: usize,
    /// Tokens whose document frequency reaches this share of the corpus are
    /// treated as stopwords. `None` disables it.
    pub common_term_ratio: Option<f64>,
    pub extra_stop_words: Vec<String>,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        SuggestionConfig {
            max_suggestions: MAX_SUGGESTIONS,
            max_per_field_set: MAX_PER_FIELD_SET,
            min_keyword_chars: MIN_KEYWORD_CHARS,
            narrow_result_threshold: NARROW_RESULT_THRESHOLD,
            common_term_ratio: None,
            extra_stop_words: Vec::new(),
        }
    }
}

/// A labelled field read from each result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticField {
    pub label: Box<str>,
    pub accessor: Box<str>,
}

impl SemanticField {
    pub fn new(label: &str, accessor: &str) -> Self {
        SemanticField { label: label.into(), accessor: accessor.into() }
    }
}

/// One proposed refinement keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub keyword: String,
    /// results containing the keyword
    pub hit_count: usize,
    pub total_results: usize,
    /// labels of the fields it was found in, declaration order
    pub fields: Vec<String>,
    /// `1 - |hit_count / total_results - 0.5| * 2`
    pub discrimination: f64,
    /// display text, e.g. `2/4건 매칭 · 평가아이템, 모듈`
    pub context: String,
}

/// Evenness of a split: 1 at exactly half of the results, falling linearly
/// to 0 toward none or all of them.
pub fn discrimination_score(hit_count: usize, total_results: usize) -> f64 {
    if total_results == 0 {
        return 0.0;
    }
    let ratio = hit_count as f64 / total_results as f64;
    1.0 - (ratio - 0.5).abs() * 2.0
}

/// Extract suggestions with the default configuration and fields
pub fn extract_suggestions<D: FieldSource + ?Sized>(results: &[&D], original_query: &str) -> Vec<Suggestion> {
    Suggester::default().extract(results, original_query)
}

/// Candidate keyword gathered while scanning results
#[derive(Debug, Default)]
struct Candidate {
    /// result positions, ascending, no duplicates
    positions: Vec<usize>,
    /// indices into `Suggester::fields`
    fields: BTreeSet<usize>,
}

#[derive(Debug, Clone)]
pub struct Suggester {
    config: SuggestionConfig,
    fields: Vec<SemanticField>,
    stop_words: HashSet<String>,
}

impl Default for Suggester {
    fn default() -> Self {
        Suggester::new(SuggestionConfig::default())
    }
}

impl Suggester {
    pub fn new(config: SuggestionConfig) -> Self {
        let stop_words = config
            .extra_stop_words
            .iter()
            .map(|word| word.to_lowercase())
            .collect();
        let fields = DEFAULT_SEMANTIC_FIELDS
            .iter()
            .map(|(label, accessor)| SemanticField::new(label, accessor))
            .collect();
        Suggester { config, fields, stop_words }
    }

    /// Replace the scanned fields
    pub fn with_fields(mut self, fields: Vec<SemanticField>) -> Self {
        self.fields = fields;
        self
    }

    /// Add the index's common terms to the stopwords when
    /// `common_term_ratio` is set.
    pub fn with_common_terms<D, E>(mut self, index: &SearchIndex<D, E>) -> Self
    where
        E: TFIDFEngine,
    {
        let Some(ratio) = self.config.common_term_ratio else {
            return self;
        };
        let doc_num = index.doc_num();
        if doc_num == 0 || ratio <= 0.0 {
            return self;
        }
        let min_doc_freq = ((doc_num as f64 * ratio).ceil() as u64).max(1);
        let before = self.stop_words.len();
        self.stop_words
            .extend(index.corpus().terms_with_min_freq(min_doc_freq).map(str::to_string));
        debug!(
            min_doc_freq,
            added = self.stop_words.len() - before,
            "common terms added to stopwords"
        );
        self
    }

    pub fn config(&self) -> &SuggestionConfig {
        &self.config
    }

    pub fn fields(&self) -> &[SemanticField] {
        &self.fields
    }

    fn is_candidate(&self, token: &str, known: &HashSet<String>) -> bool {
        !known.contains(token)
            && token.chars().count() >= self.config.min_keyword_chars
            && !is_numeric_token(token)
            && !is_stop_word(token)
            && !self.stop_words.contains(token)
    }

    /// Propose refinement keywords for `results`, most useful first.
    /// Tokens of `original_query` are never proposed.
    pub fn extract<D: FieldSource + ?Sized>(&self, results: &[&D], original_query: &str) -> Vec<Suggestion> {
        let total = results.len();
        if total == 0 || self.config.max_suggestions == 0 {
            return Vec::new();
        }
        let known: HashSet<String> = tokenize(original_query).into_iter().collect();

        // first-discovered order
        let mut found: IndexMap<String, Candidate> = IndexMap::new();
        for (position, doc) in results.iter().enumerate() {
            for (field_idx, field) in self.fields.iter().enumerate() {
                let Some(text) = doc.field_text(&field.accessor) else {
                    continue;
                };
                for token in tokenize(&text) {
                    if !self.is_candidate(&token, &known) {
                        continue;
                    }
                    let candidate = found.entry(token).or_default();
                    if candidate.positions.last() != Some(&position) {
                        candidate.positions.push(position);
                    }
                    candidate.fields.insert(field_idx);
                }
            }
        }
        let discovered = found.len();

        let mut scored: Vec<(String, Candidate, f64)> = found
            .into_iter()
            .filter(|(_, candidate)| {
                let hits = candidate.positions.len();
                hits < total && !(total >= self.config.narrow_result_threshold && hits <= 1)
            })
            .map(|(keyword, candidate)| {
                let score = discrimination_score(candidate.positions.len(), total);
                (keyword, candidate, score)
            })
            .collect();
        // stable: equal scores stay in discovery order
        scored.sort_by(|a, b| b.2.total_cmp(&a.2));

        let mut seen_partitions: HashSet<Vec<usize>> = HashSet::new();
        let mut per_field_set: HashMap<BTreeSet<usize>, usize> = HashMap::new();
        let mut suggestions = Vec::new();
        for (keyword, candidate, score) in scored {
            if suggestions.len() >= self.config.max_suggestions {
                break;
            }
            // same partition of the results as a better keyword
            if !seen_partitions.insert(candidate.positions.clone()) {
                continue;
            }
            let used = per_field_set.entry(candidate.fields.clone()).or_insert(0);
            if *used >= self.config.max_per_field_set {
                continue;
            }
            *used += 1;
            suggestions.push(self.suggestion(keyword, &candidate, total, score));
        }

        debug!(
            results = total,
            candidates = discovered,
            suggestions = suggestions.len(),
            "extracted suggestions"
        );
        suggestions
    }

    fn suggestion(&self, keyword: String, candidate: &Candidate, total: usize, score: f64) -> Suggestion {
        let fields: Vec<String> = candidate
            .fields
            .iter()
            .filter_map(|&idx| self.fields.get(idx))
            .map(|field| field.label.to_string())
            .collect();
        let hit_count = candidate.positions.len();
        let shown = fields.iter().take(2).map(String::as_str).collect::<Vec<_>>().join(", ");
        Suggestion {
            context: format!("{hit_count}/{total}건 매칭 · {shown}"),
            keyword,
            hit_count,
            total_results: total,
            fields,
            discrimination: score,
        }
    }
}
