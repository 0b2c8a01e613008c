//! Where a search session gets its catalog from.

use crate::error::LoadError;
use crate::index::loader::{CatalogLoader, LazyCatalog};
use crate::index::memory::CatalogSnapshot;
use crate::types::Searchable;
use std::sync::Arc;

/// The catalog collaborator of a search session.
pub enum CatalogSource<T> {
  /// A catalog supplied by the caller. `None` means "not loaded yet": searches
  /// resolve to no result without reaching a backend.
  Snapshot(Option<Arc<CatalogSnapshot<T>>>),
  /// A catalog loaded on first use and memoized.
  Lazy(Arc<LazyCatalog<T>>),
}

impl<T> Clone for CatalogSource<T> {
  fn clone(&self) -> Self {
    match self {
      CatalogSource::Snapshot(snapshot) => CatalogSource::Snapshot(snapshot.clone()),
      CatalogSource::Lazy(lazy) => CatalogSource::Lazy(Arc::clone(lazy)),
    }
  }
}

impl<T: Searchable + 'static> CatalogSource<T> {
  /// No catalog yet.
  pub fn empty() -> Self {
    CatalogSource::Snapshot(None)
  }

  /// A catalog built from the given entries.
  pub fn from_entries(entries: Vec<T>) -> Self {
    CatalogSource::Snapshot(Some(Arc::new(CatalogSnapshot::new(entries))))
  }

  /// A catalog produced by `loader` on first use.
  pub fn lazy(loader: impl CatalogLoader<T> + 'static) -> Self {
    CatalogSource::Lazy(Arc::new(LazyCatalog::new(loader)))
  }

  /// Whether a search can be dispatched. Lazy sources always can; loading
  /// happens as part of the search.
  pub fn is_available(&self) -> bool {
    match self {
      CatalogSource::Snapshot(snapshot) => snapshot.is_some(),
      CatalogSource::Lazy(_) => true,
    }
  }

  /// Resolves the catalog, loading it if needed.
  pub async fn resolve(&self) -> Result<Option<Arc<CatalogSnapshot<T>>>, LoadError> {
    match self {
      CatalogSource::Snapshot(snapshot) => Ok(snapshot.clone()),
      CatalogSource::Lazy(lazy) => lazy.get().await.map(Some),
    }
  }
}

impl<T: Searchable + 'static> From<Vec<T>> for CatalogSource<T> {
  fn from(entries: Vec<T>) -> Self {
    CatalogSource::from_entries(entries)
  }
}
