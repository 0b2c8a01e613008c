//! Relevance scoring for a single catalog entry.

use crate::context::SearchContext;
use crate::rules::ScoringRules;
use crate::types::{Searchable, DEFAULT_LOCALE};
use serde::{Deserialize, Serialize};

/// Per-signal contributions to an entry's score.
///
/// Every field is a sum of weights from [`ScoringRules`]; [`total`] is the
/// score the ranker sorts on.
///
/// [`total`]: ScoreBreakdown::total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
  pub phrase_name: u32,
  pub phrase_description: u32,
  pub phrase_tags: u32,
  pub token_name: u32,
  pub token_description: u32,
  pub other_locale_name: u32,
  pub other_locale_description: u32,
  pub token_tags: u32,
  pub token_id: u32,
  pub multi_word: u32,
}

impl ScoreBreakdown {
  /// The final score. Saturates at `u32::MAX` instead of overflowing.
  pub fn total(&self) -> u32 {
    [
      self.phrase_name,
      self.phrase_description,
      self.phrase_tags,
      self.token_name,
      self.token_description,
      self.other_locale_name,
      self.other_locale_description,
      self.token_tags,
      self.token_id,
      self.multi_word,
    ]
    .into_iter()
    .fold(0, u32::saturating_add)
  }
}

fn add(signal: &mut u32, weight: u32) {
  *signal = signal.saturating_add(weight);
}

/// Lowercased searchable fields of one entry.
struct Fields {
  name: String,
  description: String,
  id: String,
  tags: Vec<String>,
  tags_text: String,
  /// (name, description) of every locale other than the current one.
  others: Vec<(String, String)>,
}

impl Fields {
  fn extract<T: Searchable + ?Sized>(entry: &T, locale: &str) -> Self {
    let meta = entry.localized_meta();
    let current_locale = if meta.contains_key(locale) {
      locale
    } else {
      DEFAULT_LOCALE
    };
    let current = meta.get(current_locale);
    let lower = |value: Option<&String>| value.map(|s| s.to_lowercase()).unwrap_or_default();

    let tags: Vec<String> = entry.tags().iter().map(|tag| tag.to_lowercase()).collect();
    let tags_text = tags.join(" ");

    let others = meta
      .iter()
      .filter(|(code, _)| code.as_str() != current_locale)
      .map(|(_, other)| (lower(other.name.as_ref()), lower(other.description.as_ref())))
      .collect();

    Self {
      name: lower(current.and_then(|m| m.name.as_ref())),
      description: lower(current.and_then(|m| m.description.as_ref())),
      id: entry.id().to_lowercase(),
      tags,
      tags_text,
      others,
    }
  }

  fn matches_anywhere(&self, token: &str) -> bool {
    self.name.contains(token)
      || self.description.contains(token)
      || self.tags_text.contains(token)
      || self.id.contains(token)
  }
}

/// Computes the relevance of catalog entries for a prepared query.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
  rules: ScoringRules,
}

impl Scorer {
  /// Creates a scorer with the given weights.
  pub fn new(rules: ScoringRules) -> Self {
    Self { rules }
  }

  /// The weights in use.
  pub fn rules(&self) -> &ScoringRules {
    &self.rules
  }

  /// Scores one entry. Entries matching nothing score `0`.
  pub fn score<T: Searchable + ?Sized>(&self, entry: &T, ctx: &SearchContext) -> u32 {
    self.explain(entry, ctx).total()
  }

  /// Scores one entry and reports how each signal contributed.
  pub fn explain<T: Searchable + ?Sized>(&self, entry: &T, ctx: &SearchContext) -> ScoreBreakdown {
    let rules = &self.rules;
    let fields = Fields::extract(entry, ctx.locale());
    let mut breakdown = ScoreBreakdown::default();

    let needle = ctx.needle();
    if !needle.is_empty() {
      if fields.name.contains(needle) {
        add(&mut breakdown.phrase_name, rules.phrase.name);
      }
      if fields.description.contains(needle) {
        add(&mut breakdown.phrase_description, rules.phrase.description);
      }
      if fields.tags_text.contains(needle) {
        add(&mut breakdown.phrase_tags, rules.phrase.tags);
      }
    }

    let tokens = ctx.tokens();
    for token in tokens.iter().filter(|token| !token.is_empty()) {
      let token = token.as_str();

      if fields.name.contains(token) {
        add(&mut breakdown.token_name, rules.token.name);
      }
      if fields.description.contains(token) {
        add(&mut breakdown.token_description, rules.token.description);
      }

      for (name, description) in &fields.others {
        if name.contains(token) {
          add(&mut breakdown.other_locale_name, rules.token.other_locale_name);
        }
        if description.contains(token) {
          add(&mut breakdown.other_locale_description, rules.token.other_locale_description);
        }
      }

      let matching_tags = fields.tags.iter().filter(|tag| tag.contains(token)).count() as u32;
      add(
        &mut breakdown.token_tags,
        rules.token.tag.saturating_mul(matching_tags),
      );

      if fields.id.contains(token) {
        add(&mut breakdown.token_id, rules.token.id);
      }
    }

    if tokens.len() > 1 {
      let match_count = tokens
        .iter()
        .filter(|token| fields.matches_anywhere(token))
        .count();

      breakdown.multi_word = if match_count == tokens.len() {
        rules.multi_word.all_matched
      } else if match_count > 1 {
        rules
          .multi_word
          .per_partial_match
          .saturating_mul(match_count as u32)
      } else {
        0
      };
    }

    breakdown
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{CatalogEntry, LocalizedMeta, Query};

  fn ctx(text: &str, locale: &str) -> SearchContext {
    SearchContext::new(&Query::new(text, locale))
  }

  #[test]
  fn test_single_token_fixture() {
    let entry = CatalogEntry::new("base64")
      .with_tag("base64")
      .with_meta("en", LocalizedMeta::named("base64"));

    let scorer = Scorer::default();
    let breakdown = scorer.explain(&entry, &ctx("base64", "en"));

    assert_eq!(breakdown.phrase_name, 100);
    assert_eq!(breakdown.phrase_tags, 80);
    assert_eq!(breakdown.token_name, 20);
    assert_eq!(breakdown.token_tags, 15);
    assert_eq!(breakdown.token_id, 8);
    assert_eq!(breakdown.multi_word, 0);
    assert_eq!(scorer.score(&entry, &ctx("base64", "en")), 223);
  }

  #[test]
  fn test_no_match_scores_zero() {
    let entry = CatalogEntry::new("b")
      .with_tag("beta")
      .with_meta("en", LocalizedMeta::new("Beta Tool", "second"));

    assert_eq!(Scorer::default().score(&entry, &ctx("alpha", "en")), 0);
  }

  #[test]
  fn test_cross_locale_bonus() {
    let entry = CatalogEntry::new("hasher")
      .with_meta("en", LocalizedMeta::new("Hash generator", "Digest text"))
      .with_meta("fr", LocalizedMeta::new("Empreinte", "Calcul d'empreinte"));

    let breakdown = Scorer::default().explain(&entry, &ctx("empreinte", "en"));
    assert_eq!(breakdown.other_locale_name, 5);
    assert_eq!(breakdown.other_locale_description, 3);
    assert_eq!(breakdown.total(), 8);
  }

  #[test]
  fn test_unknown_locale_uses_english_as_current() {
    let entry = CatalogEntry::new("x")
      .with_meta("en", LocalizedMeta::named("Color picker"))
      .with_meta("de", LocalizedMeta::named("Farbwähler"));

    // "ja" has no metadata, so "en" is current and "de" counts as another locale.
    let breakdown = Scorer::default().explain(&entry, &ctx("color", "ja"));
    assert_eq!(breakdown.phrase_name, 100);
    assert_eq!(breakdown.token_name, 20);
    assert_eq!(breakdown.other_locale_name, 0);

    let breakdown = Scorer::default().explain(&entry, &ctx("farbwähler", "de"));
    assert_eq!(breakdown.phrase_name, 100);
    assert_eq!(breakdown.other_locale_name, 0);
  }

  #[test]
  fn test_every_matching_tag_counts() {
    let entry = CatalogEntry::new("t").with_tags(["Hash", "sha-hash", "crypto"]);
    let breakdown = Scorer::default().explain(&entry, &ctx("hash", "en"));
    assert_eq!(breakdown.token_tags, 30);
    assert_eq!(breakdown.phrase_tags, 80);
  }

  #[test]
  fn test_multi_word_all_matched() {
    let entry = CatalogEntry::new("json-formatter")
      .with_tag("pretty")
      .with_meta("en", LocalizedMeta::named("JSON Formatter"));

    let breakdown = Scorer::default().explain(&entry, &ctx("json pretty", "en"));
    assert_eq!(breakdown.multi_word, 30);
  }

  #[test]
  fn test_multi_word_partial_and_single() {
    let entry = CatalogEntry::new("json-formatter")
      .with_tag("pretty")
      .with_meta("en", LocalizedMeta::named("JSON Formatter"));
    let scorer = Scorer::default();

    // Two of three tokens matched.
    let breakdown = scorer.explain(&entry, &ctx("json pretty yaml", "en"));
    assert_eq!(breakdown.multi_word, 10);

    // One of two tokens matched.
    let breakdown = scorer.explain(&entry, &ctx("json yaml", "en"));
    assert_eq!(breakdown.multi_word, 0);
  }

  #[test]
  fn test_huge_weights_saturate() {
    let rules = ScoringRules::default()
      .phrase(crate::rules::PhraseWeights {
        name: u32::MAX,
        ..Default::default()
      })
      .token(crate::rules::TokenWeights {
        tag: u32::MAX,
        ..Default::default()
      });
    let entry = CatalogEntry::new("alpha")
      .with_tags(["alpha", "alphabet"])
      .with_meta("en", LocalizedMeta::named("Alpha"));

    let breakdown = Scorer::new(rules.clone()).explain(&entry, &ctx("alpha", "en"));
    assert_eq!(breakdown.phrase_name, u32::MAX);
    assert_eq!(breakdown.token_tags, u32::MAX);
    assert_eq!(Scorer::new(rules).score(&entry, &ctx("alpha", "en")), u32::MAX);
  }

  #[test]
  fn test_custom_rules() {
    let rules = ScoringRules::default().token(crate::rules::TokenWeights {
      id: 1,
      ..Default::default()
    });
    let entry = CatalogEntry::new("qr");
    assert_eq!(Scorer::new(rules).score(&entry, &ctx("qr", "en")), 1);
  }
}
