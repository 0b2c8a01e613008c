//! Search session configuration.
//!
//! Every field has a serde default, so a partial configuration (or none at
//! all) is valid. [`SearchConfig::from_env`] layers `TOOLSEARCH_*`
//! environment variables over the defaults with Figment; nested keys use a
//! double underscore, e.g. `TOOLSEARCH_RULES__TOKEN__ID=12`.

use crate::error::Result;
use crate::rules::ScoringRules;
use crate::types::DEFAULT_LOCALE;
use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration of a [`SearchSession`](crate::coordinator::SearchSession).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
  /// Quiet period after the last input change before a search is dispatched.
  #[serde(default = "default_debounce_ms")]
  pub debounce_ms: u64,
  /// Locale used when neither the caller nor the environment provides one.
  #[serde(default = "default_locale")]
  pub default_locale: String,
  /// Run searches on a worker thread when possible.
  #[serde(default = "default_prefer_worker")]
  pub prefer_worker: bool,
  /// Name given to the worker thread.
  #[serde(default = "default_worker_thread_name")]
  pub worker_thread_name: String,
  /// Scoring weights.
  #[serde(default)]
  pub rules: ScoringRules,
}

fn default_debounce_ms() -> u64 {
  150
}

fn default_locale() -> String {
  DEFAULT_LOCALE.to_string()
}

fn default_prefer_worker() -> bool {
  true
}

fn default_worker_thread_name() -> String {
  "toolsearch-worker".to_string()
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      debounce_ms: default_debounce_ms(),
      default_locale: default_locale(),
      prefer_worker: default_prefer_worker(),
      worker_thread_name: default_worker_thread_name(),
      rules: ScoringRules::default(),
    }
  }
}

impl SearchConfig {
  /// Creates a new `SearchConfigBuilder`.
  pub fn builder() -> SearchConfigBuilder {
    SearchConfigBuilder::default()
  }

  /// The debounce window.
  pub fn debounce(&self) -> Duration {
    Duration::from_millis(self.debounce_ms)
  }

  /// Defaults merged with `TOOLSEARCH_*` environment variables.
  pub fn figment() -> Figment {
    Figment::from(Serialized::defaults(SearchConfig::default()))
      .merge(Env::prefixed("TOOLSEARCH_").split("__"))
  }

  /// Extracts the configuration from [`figment`](Self::figment).
  pub fn from_env() -> Result<Self> {
    Ok(Self::figment().extract()?)
  }
}

/// A builder for creating `SearchConfig` instances.
#[derive(Debug, Default)]
pub struct SearchConfigBuilder {
  config: SearchConfig,
}

impl SearchConfigBuilder {
  /// Sets the debounce window. Windows beyond `u64::MAX` milliseconds are
  /// clamped.
  pub fn debounce(mut self, debounce: Duration) -> Self {
    self.config.debounce_ms = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
    self
  }

  /// Sets the locale used when no other is known.
  pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
    self.config.default_locale = locale.into();
    self
  }

  /// Chooses whether to search on a worker thread when possible.
  pub fn prefer_worker(mut self, prefer_worker: bool) -> Self {
    self.config.prefer_worker = prefer_worker;
    self
  }

  /// Sets the worker thread's name.
  pub fn worker_thread_name(mut self, name: impl Into<String>) -> Self {
    self.config.worker_thread_name = name.into();
    self
  }

  /// Sets the scoring weights.
  pub fn rules(mut self, rules: ScoringRules) -> Self {
    self.config.rules = rules;
    self
  }

  /// Builds the final `SearchConfig`.
  pub fn build(self) -> SearchConfig {
    self.config
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = SearchConfig::default();
    assert_eq!(config.debounce(), Duration::from_millis(150));
    assert_eq!(config.default_locale, "en");
    assert!(config.prefer_worker);
    assert_eq!(config.rules, ScoringRules::default());
  }

  #[test]
  fn test_partial_json_uses_defaults() {
    let config: SearchConfig = serde_json::from_str(r#"{"debounce_ms": 40}"#).unwrap();
    assert_eq!(config.debounce_ms, 40);
    assert_eq!(config.worker_thread_name, "toolsearch-worker");
  }

  #[test]
  fn test_figment_overrides() {
    let config: SearchConfig = SearchConfig::figment()
      .merge(Serialized::default("prefer_worker", false))
      .merge(Serialized::default("rules.token.id", 12))
      .extract()
      .unwrap();
    assert!(!config.prefer_worker);
    assert_eq!(config.rules.token.id, 12);
    assert_eq!(config.rules.token.tag, 15);
  }

  #[test]
  fn test_builder_clamps_huge_debounce() {
    let config = SearchConfig::builder().debounce(Duration::MAX).build();
    assert_eq!(config.debounce_ms, u64::MAX);
  }

  #[test]
  fn test_builder() {
    let config = SearchConfig::builder()
      .debounce(Duration::from_millis(5))
      .default_locale("de")
      .prefer_worker(false)
      .build();
    assert_eq!(config.debounce_ms, 5);
    assert_eq!(config.default_locale, "de");
    assert!(!config.prefer_worker);
  }
}
