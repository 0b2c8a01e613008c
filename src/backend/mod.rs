//! Execution backends: where a ranked search actually runs.
//!
//! [`ExecutionBackend`] holds one of two capabilities:
//!
//! - **Worker**: ranking on a dedicated thread holding a projection of the
//!   catalog (requires the `worker` feature and a tokio runtime).
//! - **Inline**: ranking on the caller's snapshot within the async call.
//!
//! The only transition is a one-way downgrade from worker to inline, taken
//! when the worker cannot be spawned or any round trip fails. The request that
//! hit the failure is retried inline, so callers always get a result.

pub mod message;
#[cfg(feature = "worker")]
pub mod worker;

pub use message::{ResultSet, WorkerRequest, WorkerResponse};
#[cfg(feature = "worker")]
pub use worker::{WorkerBackend, WorkerState};

use crate::config::SearchConfig;
use crate::engine::Ranker;
use crate::index::CatalogSnapshot;
use crate::rules::ScoringRules;
use crate::types::{CatalogEntry, ResultForm, SearchRequest, SearchResult, Searchable};
use parking_lot::Mutex;
#[cfg(feature = "worker")]
use std::sync::Arc;
use tracing::{debug, info};
#[cfg(feature = "worker")]
use tracing::warn;

/// The capability currently backing an [`ExecutionBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
  Worker,
  Inline,
}

enum Capability {
  #[cfg(feature = "worker")]
  Worker(Arc<WorkerBackend>),
  Inline,
}

/// Runs ranked searches, on a worker thread when possible.
pub struct ExecutionBackend {
  ranker: Ranker,
  capability: Mutex<Capability>,
}

impl ExecutionBackend {
  /// A backend that always ranks inline.
  pub fn inline(rules: ScoringRules) -> Self {
    Self {
      ranker: Ranker::new(rules),
      capability: Mutex::new(Capability::Inline),
    }
  }

  /// A backend using an already spawned worker.
  #[cfg(feature = "worker")]
  pub fn with_worker(worker: WorkerBackend, rules: ScoringRules) -> Self {
    Self {
      ranker: Ranker::new(rules),
      capability: Mutex::new(Capability::Worker(Arc::new(worker))),
    }
  }

  /// Picks the best available capability for `config`.
  ///
  /// A worker is used when `prefer_worker` is set, the `worker` feature is
  /// enabled and the thread can be spawned; otherwise searches run inline.
  pub fn select(config: &SearchConfig) -> Self {
    #[cfg(feature = "worker")]
    if config.prefer_worker {
      match WorkerBackend::spawn(&config.worker_thread_name, config.rules.clone()) {
        Ok(worker) => {
          info!(thread = %config.worker_thread_name, "searching on worker thread");
          return Self::with_worker(worker, config.rules.clone());
        }
        Err(error) => warn!(%error, "search worker unavailable, searching inline"),
      }
    }

    #[cfg(not(feature = "worker"))]
    if config.prefer_worker {
      debug!("worker support not compiled in, searching inline");
    }

    info!("searching inline");
    Self::inline(config.rules.clone())
  }

  /// The current capability.
  pub fn kind(&self) -> BackendKind {
    match &*self.capability.lock() {
      #[cfg(feature = "worker")]
      Capability::Worker(_) => BackendKind::Worker,
      Capability::Inline => BackendKind::Inline,
    }
  }

  /// Switches to inline ranking for the rest of this backend's life,
  /// releasing the worker if there was one.
  pub fn downgrade(&self) {
    let previous = std::mem::replace(&mut *self.capability.lock(), Capability::Inline);
    #[cfg(feature = "worker")]
    if let Capability::Worker(worker) = previous {
      worker.shutdown();
    }
    #[cfg(not(feature = "worker"))]
    let _ = previous;
  }

  /// Releases the worker, if any. Later searches run inline.
  pub fn release(&self) {
    self.downgrade();
  }

  /// Ranks `catalog` for the request and hydrates the ranked ids into the
  /// catalog's records.
  ///
  /// Both capabilities resolve a repeated id to its first occurrence in the
  /// catalog, so they return the same records even for a catalog with
  /// duplicate ids.
  pub async fn search<T>(&self, catalog: &CatalogSnapshot<T>, request: &SearchRequest) -> SearchResult<T>
  where
    T: Searchable + Clone,
  {
    let items = match self.dispatch(catalog, request, ResultForm::Ids).await {
      Dispatched::Positions(positions) => catalog.select(&positions),
      Dispatched::Remote(results) => catalog.hydrate(&results.into_ids()),
    };

    debug!(request_id = %request.request_id, hits = items.len(), "search finished");
    SearchResult {
      request_id: request.request_id,
      items,
    }
  }

  /// Ranks `catalog` for the request and returns the projected records.
  pub async fn search_projected<T>(
    &self,
    catalog: &CatalogSnapshot<T>,
    request: &SearchRequest,
  ) -> Vec<CatalogEntry>
  where
    T: Searchable,
  {
    match self.dispatch(catalog, request, ResultForm::Records).await {
      Dispatched::Positions(positions) => positions
        .into_iter()
        .filter_map(|position| catalog.at(position).map(Searchable::project))
        .collect(),
      Dispatched::Remote(ResultSet::Records(records)) => records,
      Dispatched::Remote(ResultSet::Ids(ids)) => ids
        .iter()
        .filter_map(|id| catalog.get(id).map(Searchable::project))
        .collect(),
    }
  }

  async fn dispatch<T>(
    &self,
    catalog: &CatalogSnapshot<T>,
    request: &SearchRequest,
    form: ResultForm,
  ) -> Dispatched
  where
    T: Searchable,
  {
    #[cfg(feature = "worker")]
    if let Some(worker) = self.worker() {
      let outcome = worker
        .round_trip(
          catalog.version(),
          || catalog.project(),
          request.request_id,
          &request.query,
          form,
        )
        .await;

      match outcome {
        Ok(results) => return Dispatched::Remote(results),
        Err(error) => {
          warn!(request_id = %request.request_id, %error, "search worker failed, retrying inline");
          self.downgrade();
        }
      }
    }

    #[cfg(not(feature = "worker"))]
    let _ = form;

    Dispatched::Positions(self.ranker.rank_positions(catalog.entries(), &request.query))
  }

  #[cfg(feature = "worker")]
  fn worker(&self) -> Option<Arc<WorkerBackend>> {
    match &*self.capability.lock() {
      Capability::Worker(worker) => Some(Arc::clone(worker)),
      Capability::Inline => None,
    }
  }
}

/// Where a search ran.
enum Dispatched {
  /// Inline: positions into the caller's snapshot.
  Positions(Vec<usize>),
  #[cfg_attr(not(feature = "worker"), allow(dead_code))]
  Remote(ResultSet),
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{LocalizedMeta, Query, RequestId};

  fn catalog() -> CatalogSnapshot<CatalogEntry> {
    CatalogSnapshot::new(vec![
      CatalogEntry::new("a")
        .with_tag("alpha")
        .with_meta("en", LocalizedMeta::new("Alpha Tool", "first")),
      CatalogEntry::new("b")
        .with_tag("beta")
        .with_meta("en", LocalizedMeta::new("Beta Tool", "second")),
    ])
  }

  fn request(id: u64, text: &str) -> SearchRequest {
    SearchRequest {
      request_id: RequestId::new(id),
      query: Query::new(text, "en"),
    }
  }

  #[tokio::test]
  async fn test_inline_search() {
    let backend = ExecutionBackend::inline(ScoringRules::default());
    let result = backend.search(&catalog(), &request(4, "alpha")).await;
    assert_eq!(result.request_id, RequestId::new(4));
    assert_eq!(result.items, vec![catalog().entries()[0].clone()]);
    assert_eq!(backend.kind(), BackendKind::Inline);
  }

  #[tokio::test]
  async fn test_inline_projected() {
    let backend = ExecutionBackend::inline(ScoringRules::default());
    let records = backend.search_projected(&catalog(), &request(1, "beta")).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "b");
  }

  #[test]
  fn test_select_inline_when_not_preferred() {
    let config = SearchConfig::builder().prefer_worker(false).build();
    assert_eq!(ExecutionBackend::select(&config).kind(), BackendKind::Inline);
  }

  #[cfg(feature = "worker")]
  #[tokio::test]
  async fn test_select_prefers_worker() {
    let backend = ExecutionBackend::select(&SearchConfig::default());
    assert_eq!(backend.kind(), BackendKind::Worker);

    backend.downgrade();
    assert_eq!(backend.kind(), BackendKind::Inline);
  }

  #[cfg(feature = "worker")]
  #[tokio::test]
  async fn test_worker_panic_downgrades_and_answers_inline() {
    let worker = WorkerBackend::start("toolsearch-test", |request| match request {
      WorkerRequest::Search { .. } => panic!("ranking failed"),
      _ => None,
    })
    .unwrap();
    let backend = ExecutionBackend::with_worker(worker, ScoringRules::default());

    let result = backend.search(&catalog(), &request(3, "beta")).await;
    assert_eq!(result.request_id, RequestId::new(3));
    assert_eq!(result.items, vec![catalog().entries()[1].clone()]);
    assert_eq!(backend.kind(), BackendKind::Inline);
  }

  #[cfg(feature = "worker")]
  #[test]
  fn test_select_without_runtime_falls_back() {
    assert_eq!(
      ExecutionBackend::select(&SearchConfig::default()).kind(),
      BackendKind::Inline
    );
  }
}
