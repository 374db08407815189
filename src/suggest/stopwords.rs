/// Tokens never offered as refinement keywords.
///
/// Korean particles and connectives, domain-generic nouns that appear in
/// nearly every experiment, and English filler from project titles.
/// All entries are already in tokenized (lowercase) form.
pub const STOP_WORDS: &[&str] = &[
    // particles and connectives
    "향", "및", "위한", "통해", "기반", "위해", "후", "시", "내", "의", "을", "를",
    "이", "가", "에", "는", "은", "로", "으로", "과", "와", "도", "에서", "까지",
    "부터", "대한", "된", "한", "할",
    // domain-generic nouns
    "개발", "과제", "평가", "실험", "공정", "검토", "적용", "확인", "진행", "요청",
    // English filler
    "advanced", "split", "base", "and", "the", "for", "with", "of", "new",
    "x", "o",
];

#[inline]
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}
