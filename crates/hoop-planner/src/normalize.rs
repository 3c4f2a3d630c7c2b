//! Text canonicalisation shared by every matcher in the planner.

/// Lowercase, replace anything other than `a-z`, `0-9` and `-` with spaces,
/// collapse whitespace and trim. Hyphens survive so season tokens such as
/// `2023-24` stay intact.
///
/// Idempotent: `normalize_question(&normalize_question(x)) ==
/// normalize_question(x)`.
pub fn normalize_question(message: &str) -> String {
  let cleaned: String = message
    .to_lowercase()
    .chars()
    .map(|c| {
      if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
        c
      } else {
        ' '
      }
    })
    .collect();
  cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-token match for single words, substring match for phrases.
pub(crate) fn contains_term(normalized: &str, term: &str) -> bool {
  if term.contains(' ') {
    normalized.contains(term)
  } else {
    normalized.split(' ').any(|token| token == term)
  }
}

pub(crate) fn contains_any(normalized: &str, terms: &[&str]) -> bool {
  terms.iter().any(|term| contains_term(normalized, term))
}
