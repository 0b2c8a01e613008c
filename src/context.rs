//! Prepared query state shared by every entry scored for one search.

use crate::scoring::tokenizer::tokenize;
use crate::types::Query;

/// A query normalized once per search.
///
/// Scoring a catalog compares the same needle and tokens against every entry,
/// so the trimming, lowercasing and tokenization happen here rather than in
/// the scorer's inner loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchContext {
  needle: String,
  tokens: Vec<String>,
  locale: String,
}

impl SearchContext {
  /// Prepares the given query.
  pub fn new(query: &Query) -> Self {
    let needle = query.text.trim().to_lowercase();
    let tokens = if needle.is_empty() {
      Vec::new()
    } else {
      tokenize(&query.text, &query.locale)
    };

    Self {
      needle,
      tokens,
      locale: query.locale.clone(),
    }
  }

  /// The trimmed, lowercased query text.
  pub fn needle(&self) -> &str {
    &self.needle
  }

  /// The query tokens.
  pub fn tokens(&self) -> &[String] {
    &self.tokens
  }

  /// The query locale.
  pub fn locale(&self) -> &str {
    &self.locale
  }

  /// Returns `true` for the "browse all" case.
  pub fn is_browse(&self) -> bool {
    self.needle.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_context_normalizes_query() {
    let ctx = SearchContext::new(&Query::new("  Hex TO  Base64 ", "en"));
    assert_eq!(ctx.needle(), "hex to  base64");
    assert_eq!(ctx.tokens(), ["hex", "to", "base64"]);
    assert_eq!(ctx.locale(), "en");
    assert!(!ctx.is_browse());
  }

  #[test]
  fn test_blank_query_is_browse() {
    let ctx = SearchContext::new(&Query::new(" \t ", "fr"));
    assert!(ctx.is_browse());
    assert!(ctx.tokens().is_empty());
  }
}
