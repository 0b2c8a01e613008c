//! The worker backend: ranking on a dedicated thread.
//!
//! The worker thread owns a [`CatalogSnapshot`] of [`CatalogEntry`]
//! projections and talks to the rest of the crate only through channels.
//! Requests go over a std channel; responses come back over a tokio channel
//! drained by a router task, which resolves the pending future registered for
//! each request id.

use crate::backend::message::{ResultSet, WorkerRequest, WorkerResponse};
use crate::engine::Ranker;
use crate::error::BackendError;
use crate::index::CatalogSnapshot;
use crate::rules::ScoringRules;
use crate::types::{CatalogEntry, Query, RequestId, ResultForm};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

type Pending = Arc<DashMap<RequestId, oneshot::Sender<WorkerResponse>>>;

/// The state living on the worker thread.
pub struct WorkerState {
  ranker: Ranker,
  catalog: Option<CatalogSnapshot<CatalogEntry>>,
}

impl WorkerState {
  pub fn new(rules: ScoringRules) -> Self {
    Self {
      ranker: Ranker::new(rules),
      catalog: None,
    }
  }

  /// Handles one request, returning the response to send back, if any.
  pub fn handle(&mut self, request: WorkerRequest) -> Option<WorkerResponse> {
    match request {
      WorkerRequest::Init { catalog } => {
        self.catalog = Some(CatalogSnapshot::new(catalog));
        None
      }
      WorkerRequest::Search {
        request_id,
        query,
        locale,
        form,
      } => Some(self.search(request_id, Query::new(query, locale), form)),
      WorkerRequest::Shutdown => None,
    }
  }

  fn search(&self, request_id: RequestId, query: Query, form: ResultForm) -> WorkerResponse {
    let catalog = match &self.catalog {
      Some(catalog) => catalog,
      None => {
        return WorkerResponse::Error {
          request_id: Some(request_id),
          message: "search worker has no catalog".to_string(),
        }
      }
    };

    let positions = self.ranker.rank_positions(catalog.entries(), &query);
    let results = match form {
      ResultForm::Ids => ResultSet::Ids(
        positions
          .iter()
          .map(|&position| catalog.entries()[position].id.clone())
          .collect(),
      ),
      ResultForm::Records => ResultSet::Records(catalog.select(&positions)),
    };

    WorkerResponse::Result { request_id, results }
  }
}

/// Handle to a running worker thread.
///
/// Dropping the handle asks the thread to stop; it is never joined, since a
/// search in progress may still be running and its result is simply ignored.
pub struct WorkerBackend {
  requests: std_mpsc::Sender<WorkerRequest>,
  pending: Pending,
  /// Version of the catalog snapshot the worker currently holds.
  seeded: Mutex<Option<u64>>,
}

impl WorkerBackend {
  /// Spawns the worker thread and its response router.
  ///
  /// Must be called from within a tokio runtime.
  pub fn spawn(thread_name: &str, rules: ScoringRules) -> Result<Self, BackendError> {
    let mut state = WorkerState::new(rules);
    Self::start(thread_name, move |request| state.handle(request))
  }

  /// Spawns a worker thread answering requests with `handler`.
  pub(crate) fn start<H>(thread_name: &str, handler: H) -> Result<Self, BackendError>
  where
    H: FnMut(WorkerRequest) -> Option<WorkerResponse> + Send + 'static,
  {
    let runtime = Handle::try_current().map_err(|_| BackendError::NoRuntime)?;
    let (request_tx, request_rx) = std_mpsc::channel();
    let (response_tx, response_rx) = mpsc::unbounded_channel();

    thread::Builder::new()
      .name(thread_name.to_string())
      .spawn(move || run(request_rx, response_tx, handler))
      .map_err(BackendError::Spawn)?;

    let pending: Pending = Arc::new(DashMap::new());
    runtime.spawn(route(response_rx, Arc::clone(&pending)));

    Ok(Self {
      requests: request_tx,
      pending,
      seeded: Mutex::new(None),
    })
  }

  /// Sends one search to the worker and waits for its response.
  ///
  /// The worker is re-seeded with `projection()` first when its copy is not
  /// the snapshot identified by `version`.
  pub async fn round_trip<F>(
    &self,
    version: u64,
    projection: F,
    request_id: RequestId,
    query: &Query,
    form: ResultForm,
  ) -> Result<ResultSet, BackendError>
  where
    F: FnOnce() -> Vec<CatalogEntry>,
  {
    let (tx, rx) = oneshot::channel();
    self.pending.insert(request_id, tx);

    if let Err(error) = self.post(version, projection, request_id, query, form) {
      self.pending.remove(&request_id);
      return Err(error);
    }

    match rx.await {
      Ok(WorkerResponse::Result { results, .. }) => Ok(results),
      Ok(WorkerResponse::Error { message, .. }) => Err(BackendError::Worker(message)),
      Err(_) => Err(BackendError::Disconnected),
    }
  }

  fn post<F>(
    &self,
    version: u64,
    projection: F,
    request_id: RequestId,
    query: &Query,
    form: ResultForm,
  ) -> Result<(), BackendError>
  where
    F: FnOnce() -> Vec<CatalogEntry>,
  {
    // Init and Search are sent under the same lock so a concurrent search on
    // another snapshot cannot slip in between them.
    let mut seeded = self.seeded.lock();
    if *seeded != Some(version) {
      let catalog = projection();
      debug!(version, entries = catalog.len(), "seeding search worker");
      self.send(WorkerRequest::Init { catalog })?;
      *seeded = Some(version);
    }

    self.send(WorkerRequest::Search {
      request_id,
      query: query.text.clone(),
      locale: query.locale.clone(),
      form,
    })
  }

  fn send(&self, request: WorkerRequest) -> Result<(), BackendError> {
    self
      .requests
      .send(request)
      .map_err(|_| BackendError::Disconnected)
  }

  /// Asks the worker thread to stop. Pending and later round trips fail with
  /// [`BackendError::Disconnected`].
  pub fn shutdown(&self) {
    let _ = self.requests.send(WorkerRequest::Shutdown);
  }
}

impl Drop for WorkerBackend {
  fn drop(&mut self) {
    self.shutdown();
  }
}

fn run<H>(
  requests: std_mpsc::Receiver<WorkerRequest>,
  responses: mpsc::UnboundedSender<WorkerResponse>,
  mut handler: H,
) where
  H: FnMut(WorkerRequest) -> Option<WorkerResponse>,
{
  while let Ok(request) = requests.recv() {
    if matches!(request, WorkerRequest::Shutdown) {
      break;
    }

    match panic::catch_unwind(AssertUnwindSafe(|| handler(request))) {
      Ok(Some(response)) => {
        if responses.send(response).is_err() {
          break;
        }
      }
      Ok(None) => {}
      Err(_) => {
        let _ = responses.send(WorkerResponse::Error {
          request_id: None,
          message: "search worker panicked".to_string(),
        });
        break;
      }
    }
  }

  // Close the request side before the response side, so the router never
  // finishes while a request can still be queued.
  drop(requests);
  drop(responses);
  debug!("search worker stopped");
}

async fn route(mut responses: mpsc::UnboundedReceiver<WorkerResponse>, pending: Pending) {
  while let Some(response) = responses.recv().await {
    match response.request_id() {
      Some(request_id) => match pending.remove(&request_id) {
        Some((_, waiter)) => {
          let _ = waiter.send(response);
        }
        None => debug!(%request_id, "dropping worker response with no waiter"),
      },
      None => {
        warn!(?response, "search worker failed");
        pending.clear();
      }
    }
  }

  // The worker is gone: dropping the senders fails every pending round trip.
  pending.clear();
}
