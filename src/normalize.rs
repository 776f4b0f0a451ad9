//! Shared answer normalization used by every text-based kind.
//!
//! Fill-in-blank, spelling, audio dictation and translation all go through
//! `normalize` so that trimming, case folding and whitespace handling agree
//! across widgets. Translation additionally strips sentence punctuation.

/// Punctuation dropped when `strip_punctuation` is on: ASCII sentence marks
/// plus their Arabic, CJK full-width and Spanish inverted forms.
const STRIPPED_PUNCTUATION: &[char] = &[
  '.', ',', '!', '?', ';', ':',
  '،', '؛', '؟',
  '。', '，', '！', '？', '；', '：', '、',
  '¡', '¿',
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalizeMode {
  pub case_sensitive: bool,
  pub strip_punctuation: bool,
}

impl NormalizeMode {
  pub fn plain(case_sensitive: bool) -> Self {
    Self { case_sensitive, strip_punctuation: false }
  }

  pub fn translation(case_sensitive: bool) -> Self {
    Self { case_sensitive, strip_punctuation: true }
  }
}

/// Trim, optionally case-fold, optionally strip punctuation, collapse whitespace runs.
pub fn normalize(text: &str, mode: NormalizeMode) -> String {
  let stripped: String = if mode.strip_punctuation {
    text.chars().filter(|c| !STRIPPED_PUNCTUATION.contains(c)).collect()
  } else {
    text.to_string()
  };
  let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
  if mode.case_sensitive { collapsed } else { collapsed.to_lowercase() }
}

/// Equality after normalization. Empty (or whitespace/punctuation-only) input never matches.
pub fn texts_match(answer: &str, expected: &str, mode: NormalizeMode) -> bool {
  let a = normalize(answer, mode);
  if a.is_empty() { return false; }
  a == normalize(expected, mode)
}

/// Per-letter comparison with the same case folding as `normalize`.
pub fn letters_match(a: char, b: char, case_sensitive: bool) -> bool {
  if case_sensitive { a == b } else { a.to_lowercase().eq(b.to_lowercase()) }
}

/// True when the text has something to submit.
pub fn has_content(text: &str) -> bool {
  !text.trim().is_empty()
}
