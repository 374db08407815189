//! Text analyzer for mixed Korean / Latin / numeric text.
//!
//! Produces lowercase tokens, splitting wherever the script changes between
//! Latin letters, Hangul syllables and ASCII digits
//! (`"dishing을"` -> `["dishing", "을"]`, `"test123"` -> `["test", "123"]`).

/// Character class used for boundary detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    /// `a-z` (after lowercasing)
    Latin,
    /// `가-힣`
    Hangul,
    /// `0-9`
    Digit,
    /// compatibility jamo `ㄱ-ㅎ`, `ㅏ-ㅣ`; kept but never split on
    Jamo,
    Space,
    /// anything else, replaced by a space
    Other,
}

impl CharClass {
    #[inline]
    fn of(c: char) -> Self {
        match c {
            'a'..='z' => CharClass::Latin,
            '0'..='9' => CharClass::Digit,
            '가'..='힣' => CharClass::Hangul,
            'ㄱ'..='ㅎ' | 'ㅏ'..='ㅣ' => CharClass::Jamo,
            c if c.is_whitespace() => CharClass::Space,
            _ => CharClass::Other,
        }
    }

    /// classes that introduce a token boundary when they change
    #[inline]
    fn is_script(self) -> bool {
        matches!(self, CharClass::Latin | CharClass::Hangul | CharClass::Digit)
    }

    #[inline]
    fn is_token_char(self) -> bool {
        !matches!(self, CharClass::Space | CharClass::Other)
    }
}

/// Tokenize text into lowercase tokens.
///
/// - lowercases the input
/// - splits at every Latin / Hangul / digit boundary (all six directions)
/// - treats every other non-word character as whitespace
/// - never yields an empty token
///
/// The result is a sequence: repeated tokens are kept so callers can count them.
///
/// # Examples
/// ```
/// use lab_search::tokenize;
/// assert_eq!(tokenize("CMP Dishing을 개선"), vec!["cmp", "dishing", "을", "개선"]);
/// assert_eq!(tokenize("abc가나다123"), vec!["abc", "가나다", "123"]);
/// assert!(tokenize("!!!").is_empty());
/// ```
pub fn tokenize<S: AsRef<str>>(text: S) -> Vec<String> {
    let text = text.as_ref();
    if text.is_empty() {
        return Vec::new();
    }

    let lowered = text.to_lowercase();
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev: Option<CharClass> = None;

    for c in lowered.chars() {
        let class = CharClass::of(c);
        if !class.is_token_char() {
            flush(&mut current, &mut tokens);
            prev = None;
            continue;
        }
        if let Some(p) = prev {
            if p != class && p.is_script() && class.is_script() {
                flush(&mut current, &mut tokens);
            }
        }
        current.push(c);
        prev = Some(class);
    }
    flush(&mut current, &mut tokens);
    tokens
}

/// `tokenize` for optional field values; `None` yields no tokens.
#[inline]
pub fn tokenize_opt(text: Option<&str>) -> Vec<String> {
    text.map(tokenize).unwrap_or_default()
}

/// True when the token consists of ASCII digits only
#[inline]
pub fn is_numeric_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

#[inline]
fn flush(current: &mut String, tokens: &mut Vec<String>) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_punctuation_yield_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("!!!").is_empty());
        assert!(tokenize("  -- ,. ()  ").is_empty());
        assert!(tokenize_opt(None).is_empty());
    }

    #[test]
    fn lowercases_and_splits_whitespace() {
        assert_eq!(tokenize("CMP  Dishing\tControl\n"), vec!["cmp", "dishing", "control"]);
    }

    #[test]
    fn splits_every_script_boundary() {
        assert_eq!(tokenize("abc가나다123"), vec!["abc", "가나다", "123"]);
        assert_eq!(tokenize("test123"), vec!["test", "123"]);
        assert_eq!(tokenize("123test"), vec!["123", "test"]);
        assert_eq!(tokenize("dishing을"), vec!["dishing", "을"]);
        assert_eq!(tokenize("을dishing"), vec!["을", "dishing"]);
        assert_eq!(tokenize("3차평가"), vec!["3", "차평가"]);
        assert_eq!(tokenize("평가2"), vec!["평가", "2"]);
        assert_eq!(tokenize("a1b2"), vec!["a", "1", "b", "2"]);
    }

    #[test]
    fn punctuation_becomes_a_separator() {
        assert_eq!(tokenize("W/L-ratio(1.5)"), vec!["w", "l", "ratio", "1", "5"]);
        assert_eq!(tokenize("ESL_Etch"), vec!["esl", "etch"]);
    }

    #[test]
    fn jamo_is_kept_without_boundaries() {
        assert_eq!(tokenize("ㅋㅋ"), vec!["ㅋㅋ"]);
        assert_eq!(tokenize("abcㄱ"), vec!["abcㄱ"]);
    }

    #[test]
    fn non_latin_letters_are_stripped() {
        assert_eq!(tokenize("étch"), vec!["tch"]);
        assert_eq!(tokenize("日本 cmp"), vec!["cmp"]);
    }

    #[test]
    fn retokenizing_output_is_identity() {
        let inputs = [
            "CMP Dishing 제어",
            "abc가나다123 !!! test123",
            "ESL Etch Rate 개선 (2nd lot) / 3차",
            "ㅋㅋ mixed-Case 값1",
        ];
        for input in inputs {
            let tokens = tokenize(input);
            assert_eq!(tokenize(tokens.join(" ")), tokens, "input: {input}");
        }
    }

    #[test]
    fn numeric_token_detection() {
        assert!(is_numeric_token("123"));
        assert!(!is_numeric_token("12a"));
        assert!(!is_numeric_token(""));
        assert!(!is_numeric_token("일2"));
    }
}
