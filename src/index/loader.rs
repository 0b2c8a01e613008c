//! Catalog loaders: the seam to wherever the tool catalog comes from.

use crate::error::LoadError;
use crate::index::memory::CatalogSnapshot;
use crate::types::Searchable;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Loads a whole catalog on demand.
///
/// Closures returning a future implement this trait, so a loader can be as
/// small as `|| async { Ok(vec![...]) }`.
pub trait CatalogLoader<T>: Send + Sync {
  /// Loads every catalog entry. Called at most once per successful load when
  /// wrapped in a [`LazyCatalog`].
  fn load(&self) -> BoxFuture<'static, Result<Vec<T>, LoadError>>;
}

impl<T, F, Fut> CatalogLoader<T> for F
where
  F: Fn() -> Fut + Send + Sync,
  Fut: Future<Output = Result<Vec<T>, LoadError>> + Send + 'static,
{
  fn load(&self) -> BoxFuture<'static, Result<Vec<T>, LoadError>> {
    self().boxed()
  }
}

/// A catalog loaded lazily, once.
///
/// The first successful load is memoized and shared by every later search.
/// Failed loads are not cached: the next search tries again.
pub struct LazyCatalog<T> {
  loader: Arc<dyn CatalogLoader<T>>,
  cell: Mutex<Arc<OnceCell<Arc<CatalogSnapshot<T>>>>>,
}

impl<T: Searchable + 'static> LazyCatalog<T> {
  /// Wraps `loader`. Nothing is loaded until the first [`get`](Self::get).
  pub fn new(loader: impl CatalogLoader<T> + 'static) -> Self {
    Self::from_arc(Arc::new(loader))
  }

  /// Like [`new`](Self::new), for a loader that is already shared.
  pub fn from_arc(loader: Arc<dyn CatalogLoader<T>>) -> Self {
    Self {
      loader,
      cell: Mutex::new(Arc::new(OnceCell::new())),
    }
  }

  /// Returns the catalog, loading it first if needed.
  pub async fn get(&self) -> Result<Arc<CatalogSnapshot<T>>, LoadError> {
    let cell = Arc::clone(&*self.cell.lock());
    cell
      .get_or_try_init(|| async {
        let entries = self.loader.load().await?;
        info!(entries = entries.len(), "catalog loaded");
        Ok::<_, LoadError>(Arc::new(CatalogSnapshot::new(entries)))
      })
      .await
      .map(Arc::clone)
  }

  /// The catalog if it has already been loaded.
  pub fn loaded(&self) -> Option<Arc<CatalogSnapshot<T>>> {
    self.cell.lock().get().cloned()
  }

  /// Forgets the memoized catalog; the next [`get`](Self::get) loads again.
  pub fn reset(&self) {
    *self.cell.lock() = Arc::new(OnceCell::new());
  }
}

/// Loads a catalog from a JSON file holding an array of entries.
pub struct JsonCatalogLoader<T> {
  path: PathBuf,
  _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCatalogLoader<T> {
  /// A loader reading the file at `path`.
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      _marker: PhantomData,
    }
  }

  /// The file this loader reads.
  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl<T> CatalogLoader<T> for JsonCatalogLoader<T>
where
  T: DeserializeOwned + Send + 'static,
{
  fn load(&self) -> BoxFuture<'static, Result<Vec<T>, LoadError>> {
    let path = self.path.clone();
    async move {
      tokio::task::spawn_blocking(move || read_catalog(&path))
        .await
        .map_err(|e| LoadError::Loader(e.to_string()))?
    }
    .boxed()
  }
}

/// Reads a JSON array of catalog entries from a file.
pub fn read_catalog<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
  let bytes = std::fs::read(path)?;
  Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::CatalogEntry;
  use std::io::Write;
  use std::sync::atomic::{AtomicUsize, Ordering};

  #[tokio::test]
  async fn test_lazy_catalog_loads_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let lazy = LazyCatalog::<CatalogEntry>::new(move || {
      counter.fetch_add(1, Ordering::SeqCst);
      async { Ok::<_, LoadError>(vec![CatalogEntry::new("a")]) }
    });

    assert!(lazy.loaded().is_none());
    let first = lazy.get().await.unwrap();
    let second = lazy.get().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    lazy.reset();
    assert!(lazy.loaded().is_none());
    lazy.get().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_lazy_catalog_retries_after_failure() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let lazy = LazyCatalog::<CatalogEntry>::new(move || {
      let attempt = counter.fetch_add(1, Ordering::SeqCst);
      async move {
        if attempt == 0 {
          Err(LoadError::Loader("offline".into()))
        } else {
          Ok(vec![CatalogEntry::new("a")])
        }
      }
    });

    assert!(matches!(lazy.get().await, Err(LoadError::Loader(_))));
    assert_eq!(lazy.get().await.unwrap().len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_json_loader() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
      file,
      r#"[{{"id":"uuid","tags":["random"],"localizedMeta":{{"en":{{"name":"UUID"}}}}}}]"#
    )
    .unwrap();

    let loader = JsonCatalogLoader::<CatalogEntry>::new(file.path());
    let entries = loader.load().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].tags, vec!["random"]);

    let missing = JsonCatalogLoader::<CatalogEntry>::new(file.path().with_extension("missing"));
    assert!(matches!(missing.load().await, Err(LoadError::Io(_))));
  }
}
