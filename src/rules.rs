//! Scoring weights.
//!
//! The defaults form a fixed table that ranking order depends on. Changing any
//! of them changes which tool comes first for a given query.

use serde::{Deserialize, Serialize};

/// The full weight table used by the [`Scorer`](crate::scoring::Scorer).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
  /// Bonuses for the whole query appearing as a substring.
  #[serde(default)]
  pub phrase: PhraseWeights,
  /// Bonuses for each individual token.
  #[serde(default)]
  pub token: TokenWeights,
  /// Bonus for queries with several tokens.
  #[serde(default)]
  pub multi_word: MultiWordWeights,
}

impl ScoringRules {
  /// Set the phrase weights.
  pub fn phrase(mut self, phrase: PhraseWeights) -> Self {
    self.phrase = phrase;
    self
  }

  /// Set the per-token weights.
  pub fn token(mut self, token: TokenWeights) -> Self {
    self.token = token;
    self
  }

  /// Set the multi-word weights.
  pub fn multi_word(mut self, multi_word: MultiWordWeights) -> Self {
    self.multi_word = multi_word;
    self
  }
}

/// Whole-query substring weights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseWeights {
  /// Query found in the current-locale name.
  #[serde(default = "default_phrase_name")]
  pub name: u32,
  /// Query found in the current-locale description.
  #[serde(default = "default_phrase_description")]
  pub description: u32,
  /// Query found in the space-joined tags.
  #[serde(default = "default_phrase_tags")]
  pub tags: u32,
}

fn default_phrase_name() -> u32 {
  100
}

fn default_phrase_description() -> u32 {
  50
}

fn default_phrase_tags() -> u32 {
  80
}

impl Default for PhraseWeights {
  fn default() -> Self {
    Self {
      name: default_phrase_name(),
      description: default_phrase_description(),
      tags: default_phrase_tags(),
    }
  }
}

/// Per-token weights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenWeights {
  /// Token found in the current-locale name.
  #[serde(default = "default_token_name")]
  pub name: u32,
  /// Token found in the current-locale description.
  #[serde(default = "default_token_description")]
  pub description: u32,
  /// Token found in another locale's name, per locale.
  #[serde(default = "default_other_locale_name")]
  pub other_locale_name: u32,
  /// Token found in another locale's description, per locale.
  #[serde(default = "default_other_locale_description")]
  pub other_locale_description: u32,
  /// Token found in a tag, per matching tag.
  #[serde(default = "default_token_tag")]
  pub tag: u32,
  /// Token found in the entry id.
  #[serde(default = "default_token_id")]
  pub id: u32,
}

fn default_token_name() -> u32 {
  20
}

fn default_token_description() -> u32 {
  10
}

fn default_other_locale_name() -> u32 {
  5
}

fn default_other_locale_description() -> u32 {
  3
}

fn default_token_tag() -> u32 {
  15
}

fn default_token_id() -> u32 {
  8
}

impl Default for TokenWeights {
  fn default() -> Self {
    Self {
      name: default_token_name(),
      description: default_token_description(),
      other_locale_name: default_other_locale_name(),
      other_locale_description: default_other_locale_description(),
      tag: default_token_tag(),
      id: default_token_id(),
    }
  }
}

/// Multi-word bonus weights. Only applied when the query has more than one
/// token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiWordWeights {
  /// Every token matched somewhere in the entry.
  #[serde(default = "default_all_matched")]
  pub all_matched: u32,
  /// Multiplied by the number of matched tokens when more than one, but not
  /// all, matched.
  #[serde(default = "default_per_partial_match")]
  pub per_partial_match: u32,
}

fn default_all_matched() -> u32 {
  30
}

fn default_per_partial_match() -> u32 {
  5
}

impl Default for MultiWordWeights {
  fn default() -> Self {
    Self {
      all_matched: default_all_matched(),
      per_partial_match: default_per_partial_match(),
    }
  }
}
