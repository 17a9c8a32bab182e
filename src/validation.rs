//! Input validation and answer matching.
//!
//! Quiz answers are compared after normalization:
//! - Unicode NFC, so composed and decomposed forms compare equal
//! - case-insensitive
//! - leading/trailing whitespace ignored, inner runs collapsed to one space

use unicode_normalization::UnicodeNormalization;

/// Normalize an answer for comparison
pub fn normalize_answer(input: &str) -> String {
  let composed: String = input.nfc().collect();
  composed
    .to_lowercase()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

/// True if `given` matches `expected` after normalization
pub fn answers_match(given: &str, expected: &str) -> bool {
  normalize_answer(given) == normalize_answer(expected)
}

/// Trimmed text for a required field, `None` if blank
pub fn required_text(input: &str) -> Option<String> {
  let trimmed = input.trim();
  if trimmed.is_empty() {
    None
  } else {
    Some(trimmed.to_string())
  }
}

/// Trimmed text for an optional field; blank collapses to `None`
pub fn optional_text(input: Option<&str>) -> Option<String> {
  input.and_then(required_text)
}
