//! Text tokenization utilities.

#[cfg(feature = "segmentation")]
use unicode_segmentation::UnicodeSegmentation;

/// Strategy used to split a query into words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segmenter {
  /// Unicode word boundaries (UAX #29), keeping word-like segments only.
  Unicode,
  /// Runs of whitespace.
  Whitespace,
}

impl Segmenter {
  /// Picks the segmenter for a locale.
  ///
  /// Unicode segmentation is used for any well-formed locale tag when the
  /// `segmentation` feature is enabled. Empty or malformed tags fall back to
  /// whitespace splitting instead of failing.
  pub fn for_locale(locale: &str) -> Self {
    if cfg!(feature = "segmentation") && is_well_formed_locale(locale) {
      Segmenter::Unicode
    } else {
      Segmenter::Whitespace
    }
  }

  /// Splits `text` into lowercase, trimmed, non-empty words.
  pub fn segment(self, text: &str) -> Vec<String> {
    match self {
      Segmenter::Unicode => unicode_words(text),
      Segmenter::Whitespace => whitespace_words(text),
    }
  }
}

/// Tokenize a query into normalized lowercase words.
pub fn tokenize(query: &str, locale: &str) -> Vec<String> {
  if query.trim().is_empty() {
    return Vec::new();
  }
  Segmenter::for_locale(locale).segment(query)
}

#[cfg(feature = "segmentation")]
fn unicode_words(text: &str) -> Vec<String> {
  text
    .unicode_words()
    .map(|word| word.to_lowercase().trim().to_string())
    .filter(|word| !word.is_empty())
    .collect()
}

#[cfg(not(feature = "segmentation"))]
fn unicode_words(text: &str) -> Vec<String> {
  whitespace_words(text)
}

fn whitespace_words(text: &str) -> Vec<String> {
  text
    .split_whitespace()
    .map(|word| word.to_lowercase())
    .filter(|word| !word.is_empty())
    .collect()
}

/// Loose BCP 47 check: alphabetic primary subtag of 2-8 letters followed by
/// alphanumeric subtags of 1-8 characters, separated by `-` or `_`.
fn is_well_formed_locale(locale: &str) -> bool {
  let mut subtags = locale.split(['-', '_']);
  let primary = match subtags.next() {
    Some(primary) => primary,
    None => return false,
  };
  if !(2..=8).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
    return false;
  }
  subtags.all(|tag| (1..=8).contains(&tag.len()) && tag.chars().all(|c| c.is_ascii_alphanumeric()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_tokenize_whitespace_fallback() {
    let tokens = tokenize("  JSON   to\tYAML ", "");
    assert_eq!(tokens, vec!["json", "to", "yaml"]);
  }

  #[test]
  fn test_tokenize_empty() {
    assert!(tokenize("", "en").is_empty());
    assert!(tokenize("   ", "en").is_empty());
  }

  #[test]
  fn test_malformed_locale_falls_back() {
    assert_eq!(Segmenter::for_locale(""), Segmenter::Whitespace);
    assert_eq!(Segmenter::for_locale("not a locale"), Segmenter::Whitespace);
    assert_eq!(Segmenter::for_locale("e"), Segmenter::Whitespace);
  }

  #[cfg(feature = "segmentation")]
  #[test]
  fn test_tokenize_drops_punctuation() {
    let tokens = tokenize("Hello, World! URL-encode: base64?", "en");
    assert_eq!(tokens, vec!["hello", "world", "url", "encode", "base64"]);
  }

  #[cfg(feature = "segmentation")]
  #[test]
  fn test_region_locales_use_unicode() {
    assert_eq!(Segmenter::for_locale("en"), Segmenter::Unicode);
    assert_eq!(Segmenter::for_locale("zh-Hans-CN"), Segmenter::Unicode);
    assert_eq!(Segmenter::for_locale("pt_BR"), Segmenter::Unicode);
  }

  #[cfg(not(feature = "segmentation"))]
  #[test]
  fn test_without_segmentation_keeps_punctuation() {
    assert_eq!(tokenize("Hello, World!", "en"), vec!["hello,", "world!"]);
  }
}
