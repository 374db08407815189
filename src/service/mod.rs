//! Request-level search flow on top of [`SearchIndex`].
//!
//! The service owns the current index behind `RwLock<Arc<_>>`. Queries clone
//! the `Arc` and run without holding the lock; [`SearchService::reindex`]
//! builds a complete index first and then swaps the pointer, so a reader sees
//! either the old index or the new one.

pub mod summary;

use std::{
    borrow::Cow,
    collections::HashSet,
    sync::Arc,
    time::Instant,
};

use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::{
    config::SearchConfig,
    document::{Document, FieldSource, Projection},
    error::{Result, SearchError},
    suggest::{Suggester, Suggestion},
    vectorizer::{
        analyzer::tokenize,
        evaluate::query::ParsedQuery,
        tfidf::{DefaultTFIDFEngine, TFIDFEngine},
        SearchIndex,
    },
};

pub use summary::generate_summary;

/// Score given to phrase-only matches and to unscored candidate fallbacks
const PHRASE_ONLY_SCORE: f64 = 1.0;
const CANDIDATE_FALLBACK_SCORE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default, alias = "topK")]
    pub top_k: Option<i64>,
}

impl SearchRequest {
    pub fn new<S: Into<String>>(query: S) -> Self {
        SearchRequest { query: query.into(), top_k: None }
    }

    pub fn top_k(mut self, top_k: i64) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

/// One returned experiment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEntry<D> {
    /// corpus position
    pub index: usize,
    /// rounded to three decimals
    pub score: f64,
    pub document: D,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse<D> {
    pub summary: String,
    pub suggestions: Vec<Suggestion>,
    pub results: Vec<ResultEntry<D>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user<S: Into<String>>(content: S) -> Self {
        ChatTurn { role: Role::User, content: content.into() }
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        ChatTurn { role: Role::Assistant, content: content.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRequest {
    pub query: String,
    #[serde(default, alias = "conversationHistory")]
    pub history: Vec<ChatTurn>,
    /// Restrict ranking to documents with these keys (`id`)
    #[serde(default, deserialize_with = "candidate_keys")]
    pub candidate_ids: Option<Vec<String>>,
}

/// Keys arrive as strings or as integer ids; both compare as the text
/// [`FieldSource::doc_key`] produces.
fn candidate_keys<'de, De>(deserializer: De) -> std::result::Result<Option<Vec<String>>, De::Error>
where
    De: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Key {
        Text(String),
        Number(serde_json::Number),
    }

    let keys = Option::<Vec<Key>>::deserialize(deserializer)?;
    Ok(keys.map(|keys| {
        keys.into_iter()
            .map(|key| match key {
                Key::Text(text) => text,
                Key::Number(number) => number.to_string(),
            })
            .collect()
    }))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse<D> {
    /// query extended with the recent user turns
    pub expanded_query: String,
    pub results: Vec<ResultEntry<D>>,
}

/// Identity used to merge result lists
#[derive(Debug, PartialEq, Eq, Hash)]
enum DocIdentity<'a> {
    Key(Cow<'a, str>),
    Position(usize),
}

fn identity<D: FieldSource>(index: usize, doc: &D) -> DocIdentity<'_> {
    match doc.doc_key() {
        Some(key) => DocIdentity::Key(key),
        None => DocIdentity::Position(index),
    }
}

fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

/// `(corpus position, score)` in rank order
type Ranked = Vec<(usize, f64)>;

pub struct SearchService<D = Document, E = DefaultTFIDFEngine>
where
    E: TFIDFEngine,
{
    index: RwLock<Arc<SearchIndex<D, E>>>,
    config: SearchConfig,
}

impl<D, E> SearchService<D, E>
where
    D: FieldSource + Clone + Send + Sync,
    E: TFIDFEngine,
{
    pub fn new(documents: Vec<D>, projection: Projection, config: SearchConfig) -> Self {
        Self::with_index(SearchIndex::build(documents, projection), config)
    }

    pub fn with_index(index: SearchIndex<D, E>, config: SearchConfig) -> Self {
        SearchService { index: RwLock::new(Arc::new(index)), config }
    }

    /// Snapshot of the current index
    pub fn index(&self) -> Arc<SearchIndex<D, E>> {
        self.index.read().clone()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Rebuild from `documents` with the current projection and swap it in.
    /// Returns the new document count.
    pub fn reindex(&self, documents: Vec<D>) -> usize {
        let started = Instant::now();
        let projection = self.index().projection().clone();
        let fresh = Arc::new(SearchIndex::build(documents, projection));
        let count = fresh.doc_num();
        let previous = {
            let mut guard = self.index.write();
            std::mem::replace(&mut *guard, fresh)
        };
        info!(
            documents = count,
            previous = previous.doc_num(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reindexed"
        );
        count
    }

    /// Keyword search with strict filtering, summary and suggestions
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse<D>> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let top_k = self.config.resolve_top_k(request.top_k)?;
        let index = self.index();

        let parsed = ParsedQuery::parse(query);
        let ranked = if parsed.has_phrases() {
            phrase_search(&index, &parsed, top_k)
        } else {
            let hits = index.search(query, top_k);
            let ranked = hits.iter().map(|hit| (hit.index, hit.score)).collect();
            self.strict_filter(&index, query, ranked)
        };

        let documents: Vec<&D> = ranked
            .iter()
            .filter_map(|&(position, _)| index.document(position))
            .collect();
        let summary = generate_summary(&documents, query);
        let suggestions = self.suggester(&index).extract(&documents, query);
        debug!(
            query,
            top_k,
            results = ranked.len(),
            suggestions = suggestions.len(),
            "keyword search"
        );

        Ok(SearchResponse {
            summary,
            suggestions,
            results: entries(&index, &ranked),
        })
    }

    /// Ranking for a conversational turn.
    ///
    /// Results for the literal query come first, followed by results for the
    /// query extended with the last user turns, deduplicated by document key.
    pub fn conversation_search(&self, request: &ConversationRequest) -> Result<ConversationResponse<D>> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let cap = self.config.conversation_top_k.min(self.config.max_top_k);
        let index = self.index();
        let expanded_query = self.expand_query(query, &request.history);

        let candidates = request.candidate_ids.as_deref().filter(|ids| !ids.is_empty());
        let parsed = ParsedQuery::parse(query);
        let ranked = if let Some(ids) = candidates {
            narrow_to_candidates(&index, query, ids, cap)
        } else if parsed.has_phrases() {
            phrase_search(&index, &parsed, cap)
        } else {
            let merged = merge_ranked(&index, query, &expanded_query, cap);
            self.strict_filter(&index, query, merged)
        };
        debug!(query, expanded = %expanded_query, results = ranked.len(), "conversation search");

        Ok(ConversationResponse {
            expanded_query,
            results: entries(&index, &ranked),
        })
    }

    fn expand_query(&self, query: &str, history: &[ChatTurn]) -> String {
        let mut recent: Vec<&str> = history
            .iter()
            .rev()
            .filter(|turn| turn.role == Role::User)
            .map(|turn| turn.content.trim())
            .filter(|content| !content.is_empty())
            .take(self.config.conversation_turns)
            .collect();
        if recent.is_empty() {
            return query.to_string();
        }
        recent.reverse();
        format!("{query} {}", recent.join(" "))
    }

    fn suggester(&self, index: &SearchIndex<D, E>) -> Suggester {
        Suggester::new(self.config.suggestion.clone()).with_common_terms(index)
    }

    /// Keep results whose projected text contains every query token.
    /// An empty outcome falls back to the unfiltered ranking.
    fn strict_filter(&self, index: &SearchIndex<D, E>, query: &str, ranked: Ranked) -> Ranked {
        if !self.config.strict_filter || ranked.is_empty() {
            return ranked;
        }
        let tokens = tokenize(query);
        let filtered: Ranked = ranked
            .iter()
            .copied()
            .filter(|&(position, _)| {
                index.document_text(position).is_some_and(|text| {
                    let text = text.to_lowercase();
                    tokens.iter().all(|token| text.contains(token.as_str()))
                })
            })
            .collect();
        if filtered.is_empty() {
            warn!(query, results = ranked.len(), "strict filter matched nothing, keeping ranked results");
            return ranked;
        }
        filtered
    }
}

/// Documents containing every quoted phrase. Ordered by the score of the
/// free text when there is any, corpus order otherwise.
fn phrase_search<D, E>(index: &SearchIndex<D, E>, parsed: &ParsedQuery, top_k: usize) -> Ranked
where
    D: FieldSource + Send + Sync,
    E: TFIDFEngine,
{
    let matched = (0..index.doc_num())
        .filter(|&position| index.document_text(position).is_some_and(|text| parsed.phrases_match(text)));

    if parsed.free_text.is_empty() {
        return matched.take(top_k).map(|position| (position, PHRASE_ONLY_SCORE)).collect();
    }
    let scores = index.score_all(&parsed.free_text);
    let mut ranked: Ranked = matched
        .map(|position| (position, scores.get(position).copied().unwrap_or(0.0)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(top_k);
    ranked
}

/// Primary results first, then expanded results not seen yet
fn merge_ranked<D, E>(index: &SearchIndex<D, E>, query: &str, expanded_query: &str, cap: usize) -> Ranked
where
    D: FieldSource + Send + Sync,
    E: TFIDFEngine,
{
    let primary = index.search(query, cap);
    let mut seen: HashSet<DocIdentity<'_>> = HashSet::new();
    let mut merged: Ranked = Vec::with_capacity(cap);
    for hit in primary.iter() {
        if seen.insert(identity(hit.index, hit.document)) {
            merged.push((hit.index, hit.score));
        }
    }
    if expanded_query != query {
        for hit in index.search(expanded_query, cap).iter() {
            if seen.insert(identity(hit.index, hit.document)) {
                merged.push((hit.index, hit.score));
            }
        }
    }
    merged.truncate(cap);
    merged
}

/// Ranking restricted to documents whose key is in `ids`, capped. When none
/// of them scores, every listed document is returned in corpus order with a
/// neutral score.
fn narrow_to_candidates<D, E>(index: &SearchIndex<D, E>, query: &str, ids: &[String], cap: usize) -> Ranked
where
    D: FieldSource + Send + Sync,
    E: TFIDFEngine,
{
    let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let is_candidate = |doc: &D| doc.doc_key().is_some_and(|key| ids.contains(&*key));

    let scored: Ranked = index
        .search(query, index.doc_num())
        .iter()
        .filter(|hit| is_candidate(hit.document))
        .take(cap)
        .map(|hit| (hit.index, hit.score))
        .collect();
    if !scored.is_empty() {
        return scored;
    }
    index
        .documents()
        .iter()
        .enumerate()
        .filter(|(_, doc)| is_candidate(*doc))
        .map(|(position, _)| (position, CANDIDATE_FALLBACK_SCORE))
        .collect()
}

fn entries<D: Clone, E: TFIDFEngine>(index: &SearchIndex<D, E>, ranked: &[(usize, f64)]) -> Vec<ResultEntry<D>> {
    ranked
        .iter()
        .filter_map(|&(position, score)| {
            index.document(position).map(|document| ResultEntry {
                index: position,
                score: round_score(score),
                document: document.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(id: &str, item: &str) -> Document {
        Document::new().with("id", id).with("iacpj_nm", "P").with("eval_item", item)
    }

    fn service(docs: Vec<Document>) -> SearchService {
        SearchService::new(docs, Projection::experiment(), SearchConfig::default())
    }

    fn ids<D: FieldSource>(results: &[ResultEntry<D>]) -> Vec<String> {
        results
            .iter()
            .map(|r| r.document.doc_key().unwrap_or_default().into_owned())
            .collect()
    }

    #[test]
    fn rejects_blank_query_and_negative_top_k() {
        let svc = service(vec![doc("e1", "CMP")]);
        assert!(matches!(svc.search(&SearchRequest::new("   ")), Err(SearchError::EmptyQuery)));
        assert!(matches!(
            svc.search(&SearchRequest::new("cmp").top_k(-3)),
            Err(SearchError::InvalidTopK(-3))
        ));
        assert!(svc.search(&SearchRequest::new("cmp").top_k(0)).unwrap().results.is_empty());
    }

    #[test]
    fn strict_filter_requires_every_token() {
        let svc = service(vec![
            doc("e1", "CMP Dishing"),
            doc("e2", "CMP Erosion"),
            doc("e3", "Dishing 측정"),
        ]);
        let response = svc.search(&SearchRequest::new("cmp dishing")).unwrap();
        assert_eq!(ids(&response.results), vec!["e1"]);
    }

    #[test]
    fn strict_filter_falls_back_to_ranking() {
        let svc = service(vec![doc("e1", "CMP"), doc("e2", "Dishing"), doc("e3", "Etch")]);
        let response = svc.search(&SearchRequest::new("cmp dishing")).unwrap();
        let mut found = ids(&response.results);
        found.sort();
        assert_eq!(found, vec!["e1", "e2"]);
    }

    #[test]
    fn disabled_strict_filter_keeps_ranking() {
        let config = SearchConfig { strict_filter: false, ..Default::default() };
        let svc: SearchService = SearchService::new(
            vec![doc("e1", "CMP Dishing"), doc("e2", "CMP Erosion")],
            Projection::experiment(),
            config,
        );
        let response = svc.search(&SearchRequest::new("cmp dishing")).unwrap();
        assert_eq!(response.results.len(), 2);
    }

    #[test]
    fn quoted_phrase_without_free_text_keeps_corpus_order() {
        let svc = service(vec![
            doc("e1", "ESL Etch Rate"),
            doc("e2", "Etch ESL"),
            doc("e3", "esl etch 개선"),
        ]);
        let response = svc.search(&SearchRequest::new("\"ESL Etch\"")).unwrap();
        assert_eq!(ids(&response.results), vec!["e1", "e3"]);
        assert!(response.results.iter().all(|r| r.score == 1.0));
    }

    #[test]
    fn quoted_phrase_orders_by_free_text() {
        let svc = service(vec![
            doc("e1", "ESL Etch Rate"),
            doc("e2", "ESL Etch 개선 개선"),
            doc("e3", "개선"),
        ]);
        let response = svc.search(&SearchRequest::new("\"esl etch\" 개선").top_k(5)).unwrap();
        assert_eq!(ids(&response.results), vec!["e2", "e1"]);
        assert_eq!(response.results[1].score, 0.0);
    }

    #[test]
    fn response_carries_summary_and_suggestions() {
        let svc = service(vec![
            doc("e1", "CMP Dishing"),
            doc("e2", "CMP Erosion"),
            doc("e3", "Etch"),
        ]);
        let response = svc.search(&SearchRequest::new("cmp")).unwrap();
        assert!(response.summary.contains("총 2건"));
        let keywords: Vec<&str> = response.suggestions.iter().map(|s| s.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["dishing", "erosion"]);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["results"][0]["document"]["iacpj_nm"], json!("P"));
    }

    #[test]
    fn scores_are_rounded() {
        assert_eq!(round_score(0.123456), 0.123);
        assert_eq!(round_score(0.9996), 1.0);
    }

    #[test]
    fn reindex_swaps_the_whole_index() {
        let svc = service(vec![doc("e1", "CMP")]);
        let before = svc.index();
        assert_eq!(svc.reindex(vec![doc("e2", "Etch"), doc("e3", "Etch Rate")]), 2);
        // old snapshot stays intact for readers holding it
        assert_eq!(before.doc_num(), 1);
        assert_eq!(before.search("cmp", 10).len(), 1);
        let response = svc.search(&SearchRequest::new("etch")).unwrap();
        assert_eq!(response.results.len(), 2);
        assert!(svc.search(&SearchRequest::new("cmp")).unwrap().results.is_empty());
    }

    #[test]
    fn conversation_merges_expanded_results() {
        let svc = service(vec![
            doc("e1", "CMP Dishing"),
            doc("e2", "Slurry 교체"),
            doc("e3", "Etch"),
        ]);
        let request = ConversationRequest {
            query: "dishing".into(),
            history: vec![
                ChatTurn::user("slurry 변경 건"),
                ChatTurn::assistant("etch 도 있습니다"),
            ],
            candidate_ids: None,
        };
        let response = svc.conversation_search(&request).unwrap();
        assert_eq!(response.expanded_query, "dishing slurry 변경 건");
        // strict filter keeps only documents containing the literal query
        assert_eq!(ids(&response.results), vec!["e1"]);

        let config = SearchConfig { strict_filter: false, ..Default::default() };
        let svc: SearchService = SearchService::with_index(svc.index().as_ref().clone(), config);
        let response = svc.conversation_search(&request).unwrap();
        assert_eq!(ids(&response.results), vec!["e1", "e2"]);
    }

    #[test]
    fn conversation_uses_last_user_turns_only() {
        let config = SearchConfig { conversation_turns: 2, ..Default::default() };
        let svc: SearchService = SearchService::new(vec![doc("e1", "x")], Projection::experiment(), config);
        let history = vec![
            ChatTurn::user("one"),
            ChatTurn::user("two"),
            ChatTurn::assistant("skip"),
            ChatTurn::user("three"),
        ];
        assert_eq!(svc.expand_query("q", &history), "q two three");
        assert_eq!(svc.expand_query("q", &[]), "q");
    }

    #[test]
    fn conversation_narrows_to_candidates() {
        let svc = service(vec![doc("e1", "CMP"), doc("e2", "CMP Dishing"), doc("e3", "Etch")]);
        let request = ConversationRequest {
            query: "cmp".into(),
            candidate_ids: Some(vec!["e2".into(), "e3".into()]),
            ..Default::default()
        };
        let response = svc.conversation_search(&request).unwrap();
        assert_eq!(ids(&response.results), vec!["e2"]);

        let request = ConversationRequest {
            query: "unrelated".into(),
            candidate_ids: Some(vec!["e3".into(), "e1".into()]),
            ..Default::default()
        };
        let response = svc.conversation_search(&request).unwrap();
        assert_eq!(ids(&response.results), vec!["e1", "e3"]);
        assert!(response.results.iter().all(|r| r.score == 0.5));
    }

    #[test]
    fn conversation_request_accepts_wire_names() {
        let request: ConversationRequest = serde_json::from_value(json!({
            "query": "cmp",
            "conversationHistory": [{ "role": "user", "content": "dishing" }],
            "candidateIds": ["e1"]
        }))
        .unwrap();
        assert_eq!(request.history, vec![ChatTurn::user("dishing")]);
        assert_eq!(request.candidate_ids, Some(vec!["e1".to_string()]));

        let search: SearchRequest = serde_json::from_value(json!({ "query": "cmp", "topK": 3 })).unwrap();
        assert_eq!(search.top_k, Some(3));
    }

    #[test]
    fn numeric_candidate_ids_narrow_by_key() {
        let docs = vec![
            Document::new().with("id", 1).with("eval_item", "CMP"),
            Document::new().with("id", 2).with("eval_item", "CMP Dishing"),
            Document::new().with("id", 3).with("eval_item", "Etch"),
        ];
        let svc = service(docs);
        let request: ConversationRequest = serde_json::from_value(json!({
            "query": "cmp",
            "candidateIds": [2, "3"]
        }))
        .unwrap();
        assert_eq!(request.candidate_ids, Some(vec!["2".to_string(), "3".to_string()]));

        let response = svc.conversation_search(&request).unwrap();
        assert_eq!(ids(&response.results), vec!["2"]);

        let request: ConversationRequest = serde_json::from_value(json!({ "query": "cmp" })).unwrap();
        assert_eq!(request.candidate_ids, None);
    }

    #[test]
    fn unscored_candidates_are_not_capped() {
        let config = SearchConfig { conversation_top_k: 2, ..Default::default() };
        let docs = (1..=4).map(|i| doc(&format!("e{i}"), "CMP")).collect();
        let svc: SearchService = SearchService::new(docs, Projection::experiment(), config);
        let request = ConversationRequest {
            query: "unrelated".into(),
            candidate_ids: Some(vec!["e4".into(), "e1".into(), "e2".into()]),
            ..Default::default()
        };
        let response = svc.conversation_search(&request).unwrap();
        assert_eq!(ids(&response.results), vec!["e1", "e2", "e4"]);

        let request = ConversationRequest { query: "cmp".into(), ..request };
        assert_eq!(svc.conversation_search(&request).unwrap().results.len(), 2);
    }
}
