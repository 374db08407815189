//! Search configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! { "default_top_k": 20, "suggestion": { "common_term_ratio": 0.4 } }
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{Result, SearchError},
    suggest::SuggestionConfig,
};

pub const DEFAULT_TOP_K: usize = 10;
pub const MAX_TOP_K: usize = 1000;
pub const CONVERSATION_TOP_K: usize = 15;
pub const CONVERSATION_TURNS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// `top_k` when a request leaves it out
    pub default_top_k: usize,
    /// larger requests are clamped to this
    pub max_top_k: usize,
    /// keep only results containing every query token as a substring
    pub strict_filter: bool,
    /// cap on merged conversational results
    pub conversation_top_k: usize,
    /// user turns folded into a conversational query
    pub conversation_turns: usize,
    pub suggestion: SuggestionConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            default_top_k: DEFAULT_TOP_K,
            max_top_k: MAX_TOP_K,
            strict_filter: true,
            conversation_top_k: CONVERSATION_TOP_K,
            conversation_turns: CONVERSATION_TURNS,
            suggestion: SuggestionConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Load from a JSON file and validate
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let config: SearchConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        info!(path = %path.display(), "loaded search config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_top_k == 0 {
            return Err(SearchError::config("max_top_k must be at least 1"));
        }
        if self.default_top_k > self.max_top_k {
            return Err(SearchError::config(format!(
                "default_top_k ({}) exceeds max_top_k ({})",
                self.default_top_k, self.max_top_k
            )));
        }
        if let Some(ratio) = self.suggestion.common_term_ratio {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(SearchError::config(format!(
                    "suggestion.common_term_ratio must be in (0, 1], got {ratio}"
                )));
            }
        }
        Ok(())
    }

    /// Validate a requested `top_k`: absent takes the default, negative is
    /// rejected, anything above `max_top_k` is clamped.
    pub fn resolve_top_k(&self, requested: Option<i64>) -> Result<usize> {
        match requested {
            None => Ok(self.default_top_k.min(self.max_top_k)),
            Some(k) if k < 0 => Err(SearchError::InvalidTopK(k)),
            Some(k) => Ok(usize::try_from(k).map_or(self.max_top_k, |k| k.min(self.max_top_k))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.default_top_k, 10);
        assert_eq!(config.max_top_k, 1000);
        assert!(config.strict_filter);
        assert_eq!(config.suggestion.max_suggestions, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_top_k": 20, "suggestion": {{"common_term_ratio": 0.4}}}}"#).unwrap();
        let config = SearchConfig::from_path(file.path()).unwrap();
        assert_eq!(config.default_top_k, 20);
        assert_eq!(config.conversation_turns, 3);
        assert_eq!(config.suggestion.common_term_ratio, Some(0.4));
        assert_eq!(config.suggestion.max_per_field_set, 2);
    }

    #[test]
    fn rejects_inconsistent_values() {
        let config = SearchConfig { default_top_k: 50, max_top_k: 5, ..Default::default() };
        assert!(matches!(config.validate(), Err(SearchError::Config(_))));

        let mut config = SearchConfig::default();
        config.suggestion.common_term_ratio = Some(1.5);
        assert!(matches!(config.validate(), Err(SearchError::Config(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(SearchConfig::from_path(file.path()), Err(SearchError::Json(_))));
    }

    #[test]
    fn resolves_top_k() {
        let config = SearchConfig::default();
        assert_eq!(config.resolve_top_k(None).unwrap(), 10);
        assert_eq!(config.resolve_top_k(Some(0)).unwrap(), 0);
        assert_eq!(config.resolve_top_k(Some(25)).unwrap(), 25);
        assert_eq!(config.resolve_top_k(Some(5000)).unwrap(), 1000);
        assert!(matches!(config.resolve_top_k(Some(-1)), Err(SearchError::InvalidTopK(-1))));
    }
}
