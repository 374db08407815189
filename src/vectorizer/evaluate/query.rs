/// A raw query split into quoted exact phrases and remaining free text.
///
/// `"ESL Etch" 개선` -> phrases `["ESL Etch"]`, free text `개선`.
/// Blank or empty quoted segments are dropped; an unmatched quote is left in
/// the free text (the tokenizer discards it).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedQuery {
    pub phrases: Vec<String>,
    pub free_text: String,
}

impl ParsedQuery {
    pub fn parse(raw: &str) -> Self {
        let mut phrases = Vec::new();
        let mut rest = String::with_capacity(raw.len());
        let mut remaining = raw;

        while let Some(open) = remaining.find('"') {
            let after_open = &remaining[open + 1..];
            let Some(close) = after_open.find('"') else {
                break;
            };
            rest.push_str(&remaining[..open]);
            rest.push(' ');
            let phrase = after_open[..close].trim();
            if !phrase.is_empty() {
                phrases.push(phrase.to_string());
            }
            remaining = &after_open[close + 1..];
        }
        rest.push_str(remaining);

        let free_text = rest.split_whitespace().collect::<Vec<_>>().join(" ");
        ParsedQuery { phrases, free_text }
    }

    pub fn has_phrases(&self) -> bool {
        !self.phrases.is_empty()
    }

    /// True when every phrase occurs in `text`, ignoring case
    pub fn phrases_match(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.phrases
            .iter()
            .all(|phrase| lowered.contains(&phrase.to_lowercase()))
    }
}
