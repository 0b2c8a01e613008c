//! Core data types for the toolsearch engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Locale used when a query carries none, and when an entry has no metadata
/// for the query's locale.
pub const DEFAULT_LOCALE: &str = "en";

/// Type alias for catalog entry identifiers.
pub type EntityId = String;

/// Localized metadata keyed by locale code.
pub type LocaleMap = BTreeMap<String, LocalizedMeta>;

/// Name and description of a tool in one locale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedMeta {
  /// The display name in this locale.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  /// A short description in this locale.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

impl LocalizedMeta {
  /// Creates metadata with both a name and a description.
  pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      name: Some(name.into()),
      description: Some(description.into()),
    }
  }

  /// Creates metadata carrying only a name.
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name: Some(name.into()),
      description: None,
    }
  }
}

/// Anything that can be ranked by the search engine.
///
/// Application records usually carry much more than the searchable fields
/// (routes, icons, feature flags). Implementing this trait lets the engine
/// rank them directly while the worker backend only ever receives the
/// [`CatalogEntry`] projection returned by [`Searchable::project`].
///
/// The `Send` and `Sync` bounds are required because ranking runs on spawned
/// tasks and, with the `parallel` feature, across threads.
pub trait Searchable: Send + Sync {
  /// Unique identifier within a catalog snapshot.
  fn id(&self) -> &str;

  /// Free-text tags.
  fn tags(&self) -> &[String];

  /// Per-locale name and description.
  fn localized_meta(&self) -> &LocaleMap;

  /// Copies the searchable fields into a standalone [`CatalogEntry`].
  fn project(&self) -> CatalogEntry {
    CatalogEntry {
      id: self.id().to_string(),
      tags: self.tags().to_vec(),
      localized_meta: self.localized_meta().clone(),
    }
  }
}

impl<T: Searchable + ?Sized> Searchable for Arc<T> {
  fn id(&self) -> &str {
    (**self).id()
  }

  fn tags(&self) -> &[String] {
    (**self).tags()
  }

  fn localized_meta(&self) -> &LocaleMap {
    (**self).localized_meta()
  }
}

/// A single searchable catalog item.
///
/// This is also the minimal projection shipped to the worker backend: only
/// the id, the tags and the per-locale name and description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
  /// Unique identifier, stable for the lifetime of the catalog.
  pub id: EntityId,
  /// Free-text tags. Their order is irrelevant for search.
  #[serde(default)]
  pub tags: Vec<String>,
  /// Name and description per locale.
  #[serde(default)]
  pub localized_meta: LocaleMap,
}

impl CatalogEntry {
  /// Creates an entry with the given id and no tags or metadata.
  pub fn new(id: impl Into<EntityId>) -> Self {
    Self {
      id: id.into(),
      ..Default::default()
    }
  }

  /// Adds a tag to the entry.
  pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
    self.tags.push(tag.into());
    self
  }

  /// Adds several tags to the entry.
  pub fn with_tags<I, S>(mut self, tags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.tags.extend(tags.into_iter().map(Into::into));
    self
  }

  /// Sets the metadata for one locale, replacing any previous value.
  pub fn with_meta(mut self, locale: impl Into<String>, meta: LocalizedMeta) -> Self {
    self.localized_meta.insert(locale.into(), meta);
    self
  }
}

impl Searchable for CatalogEntry {
  fn id(&self) -> &str {
    &self.id
  }

  fn tags(&self) -> &[String] {
    &self.tags
  }

  fn localized_meta(&self) -> &LocaleMap {
    &self.localized_meta
  }

  fn project(&self) -> CatalogEntry {
    self.clone()
  }
}

/// Identifier of a search request.
///
/// Request ids are minted only by the request coordinator and strictly
/// increase over the lifetime of a session.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
  /// Wraps a raw id.
  pub const fn new(raw: u64) -> Self {
    Self(raw)
  }

  /// Returns the raw id.
  pub const fn get(self) -> u64 {
    self.0
  }

  pub(crate) fn next(self) -> Self {
    Self(self.0 + 1)
  }
}

impl fmt::Display for RequestId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A search query: raw text plus the locale used to weight metadata.
///
/// An empty (or whitespace-only) text means "browse all": every entry is
/// returned in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
  /// The raw text as typed by the user.
  #[serde(default)]
  pub text: String,
  /// Locale whose metadata counts as "current" for scoring.
  #[serde(default = "default_locale")]
  pub locale: String,
}

fn default_locale() -> String {
  DEFAULT_LOCALE.to_string()
}

impl Default for Query {
  fn default() -> Self {
    Self {
      text: String::new(),
      locale: default_locale(),
    }
  }
}

impl Query {
  /// Creates a query for the given text and locale. An empty locale falls
  /// back to [`DEFAULT_LOCALE`].
  pub fn new(text: impl Into<String>, locale: impl Into<String>) -> Self {
    let locale = locale.into();
    Self {
      text: text.into(),
      locale: if locale.trim().is_empty() {
        default_locale()
      } else {
        locale
      },
    }
  }

  /// Creates a new `QueryBuilder` to construct a `Query` in a chained manner.
  pub fn builder() -> QueryBuilder {
    QueryBuilder::default()
  }

  /// Returns `true` when the query does not filter anything.
  pub fn is_browse(&self) -> bool {
    self.text.trim().is_empty()
  }
}

/// A builder for creating `Query` instances.
#[derive(Debug, Default)]
pub struct QueryBuilder {
  text: Option<String>,
  locale: Option<String>,
}

impl QueryBuilder {
  /// Sets the query text.
  pub fn text(mut self, text: impl Into<String>) -> Self {
    self.text = Some(text.into());
    self
  }

  /// Sets the query locale.
  pub fn locale(mut self, locale: impl Into<String>) -> Self {
    self.locale = Some(locale.into());
    self
  }

  /// Builds the final `Query` object.
  pub fn build(self) -> Query {
    Query::new(self.text.unwrap_or_default(), self.locale.unwrap_or_default())
  }
}

/// An entry together with its relevance score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredEntry {
  /// Id of the scored entry.
  pub id: EntityId,
  /// Relevance score. Browse results carry `0`.
  pub score: u32,
  /// Position of the entry in the ranked catalog slice.
  pub position: usize,
}

/// A query tagged with the id of the request that carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
  pub request_id: RequestId,
  pub query: Query,
}

/// The outcome of one search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult<T> {
  /// The id of the request this result answers.
  pub request_id: RequestId,
  /// Matching records, best match first.
  pub items: Vec<T>,
}

impl<T> SearchResult<T> {
  /// A result with no items.
  pub fn empty(request_id: RequestId) -> Self {
    Self {
      request_id,
      items: Vec::new(),
    }
  }
}

/// Shape of the results a backend sends back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultForm {
  /// Ranked entry ids; the caller hydrates them from its own catalog.
  #[default]
  Ids,
  /// Ranked projected records.
  Records,
}
