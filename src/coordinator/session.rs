//! The async driver around [`RequestCoordinator`].
//!
//! A [`SearchSession`] is a handle to an actor task owning the coordinator,
//! the catalog source and the execution backend. Input changes arrive as
//! commands; the actor restarts the debounce deadline on each one, dispatches
//! the surviving request on a spawned task when the deadline passes and feeds
//! the result back through [`RequestCoordinator::apply`]. Every state change
//! is published on a [`watch`] channel.

use crate::backend::{BackendKind, ExecutionBackend};
use crate::config::SearchConfig;
use crate::coordinator::state::{RequestCoordinator, SearchState};
use crate::index::CatalogSource;
use crate::locale::resolve_locale_or;
use crate::types::{Query, SearchRequest, SearchResult, Searchable};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

enum Command<T> {
  SetQuery(String),
  SetLocale(Option<String>),
  SetCatalog(Option<Vec<T>>),
  Refresh,
  Dispose(oneshot::Sender<()>),
}

/// A live search over one catalog.
///
/// The session starts by browsing the whole catalog with an empty query.
/// Dropping the session aborts its actor; use [`dispose`](Self::dispose) to
/// also release the backend deterministically.
///
/// # Example
///
/// ```no_run
/// use toolsearch::prelude::*;
///
/// # async fn demo() {
/// let catalog = vec![CatalogEntry::new("uuid").with_tag("random")];
/// let session = SearchSession::spawn(SearchConfig::default(), catalog.into());
///
/// let mut state = session.subscribe();
/// session.set_query("random");
/// let resolved = state.wait_for(|s| !s.searching && s.results.is_some()).await;
/// # drop(resolved);
/// session.dispose().await;
/// # }
/// ```
pub struct SearchSession<T> {
  commands: mpsc::UnboundedSender<Command<T>>,
  state: watch::Receiver<SearchState<T>>,
  backend: Arc<ExecutionBackend>,
  task: JoinHandle<()>,
}

impl<T> SearchSession<T>
where
  T: Searchable + Clone + 'static,
{
  /// Starts a session.
  ///
  /// Must be called from within a tokio runtime.
  pub fn spawn(config: SearchConfig, source: CatalogSource<T>) -> Self {
    let backend = Arc::new(ExecutionBackend::select(&config));
    let (commands, command_rx) = mpsc::unbounded_channel();
    let (completions, completion_rx) = mpsc::unbounded_channel();
    let (state_tx, state) = watch::channel(SearchState::default());

    let actor = Actor {
      locale: resolve_locale_or(None, &config.default_locale),
      text: String::new(),
      config,
      coordinator: RequestCoordinator::new(),
      source,
      backend: Arc::clone(&backend),
      deadline: None,
      state: state_tx,
      completions,
    };
    let task = tokio::spawn(actor.run(command_rx, completion_rx));

    Self {
      commands,
      state,
      backend,
      task,
    }
  }

  /// Replaces the query text.
  pub fn set_query(&self, text: impl Into<String>) {
    self.send(Command::SetQuery(text.into()));
  }

  /// Replaces the locale. `None` resolves to the process locale, then to the
  /// configured default.
  pub fn set_locale(&self, locale: Option<String>) {
    self.send(Command::SetLocale(locale));
  }

  /// Replaces the catalog. `Some` re-runs the last query against it; `None`
  /// marks the catalog as not loaded.
  pub fn set_catalog(&self, entries: Option<Vec<T>>) {
    self.send(Command::SetCatalog(entries));
  }

  /// Re-runs the current query.
  pub fn refresh(&self) {
    self.send(Command::Refresh);
  }

  /// The latest published state.
  pub fn state(&self) -> SearchState<T> {
    self.state.borrow().clone()
  }

  /// A receiver notified on every state change.
  pub fn subscribe(&self) -> watch::Receiver<SearchState<T>> {
    self.state.clone()
  }

  /// The backend searches currently run on.
  pub fn backend_kind(&self) -> BackendKind {
    self.backend.kind()
  }

  /// Stops the session: cancels the debounce, drops any pending or in-flight
  /// request and releases the backend.
  pub async fn dispose(self) {
    let (done, finished) = oneshot::channel();
    if self.commands.send(Command::Dispose(done)).is_ok() {
      let _ = finished.await;
    }
    self.backend.release();
  }

  fn send(&self, command: Command<T>) {
    if self.commands.send(command).is_err() {
      debug!("search session already stopped");
    }
  }
}

impl<T> Drop for SearchSession<T> {
  fn drop(&mut self) {
    self.task.abort();
  }
}

struct Actor<T> {
  config: SearchConfig,
  coordinator: RequestCoordinator<T>,
  source: CatalogSource<T>,
  backend: Arc<ExecutionBackend>,
  text: String,
  locale: String,
  deadline: Option<Instant>,
  state: watch::Sender<SearchState<T>>,
  completions: mpsc::UnboundedSender<SearchResult<T>>,
}

impl<T> Actor<T>
where
  T: Searchable + Clone + 'static,
{
  async fn run(
    mut self,
    mut commands: mpsc::UnboundedReceiver<Command<T>>,
    mut completions: mpsc::UnboundedReceiver<SearchResult<T>>,
  ) {
    self.trigger();

    loop {
      let deadline = self.deadline;
      tokio::select! {
        command = commands.recv() => {
          let running = match command {
            Some(command) => self.handle(command),
            None => {
              self.stop();
              false
            }
          };
          if !running {
            break;
          }
        }
        Some(result) = completions.recv() => {
          self.coordinator.apply(result);
          self.publish();
        }
        _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
          self.deadline = None;
          self.fire();
        }
      }
    }
  }

  /// Applies one command. Returns `false` once the session is stopped.
  fn handle(&mut self, command: Command<T>) -> bool {
    match command {
      Command::SetQuery(text) => {
        if text != self.text {
          self.text = text;
          self.trigger();
        }
      }
      Command::SetLocale(preference) => {
        let locale = resolve_locale_or(preference.as_deref(), &self.config.default_locale);
        if locale != self.locale {
          self.locale = locale;
          self.trigger();
        }
      }
      Command::SetCatalog(entries) => {
        self.source = match entries {
          Some(entries) => CatalogSource::from_entries(entries),
          None => CatalogSource::empty(),
        };
        self.trigger();
      }
      Command::Refresh => self.trigger(),
      Command::Dispose(done) => {
        self.stop();
        let _ = done.send(());
        return false;
      }
    }
    true
  }

  /// Input changed: start a new request and restart the debounce window.
  fn trigger(&mut self) {
    if !self.source.is_available() {
      self.deadline = None;
      self.coordinator.catalog_unavailable();
    } else {
      self
        .coordinator
        .submit(Query::new(self.text.clone(), self.locale.clone()));
      self.deadline = Some(Instant::now() + self.config.debounce());
    }
    self.publish();
  }

  fn fire(&mut self) {
    if !self.source.is_available() {
      self.coordinator.catalog_unavailable();
      self.publish();
      return;
    }

    if let Some(request) = self.coordinator.fire() {
      tokio::spawn(execute(
        self.source.clone(),
        Arc::clone(&self.backend),
        request,
        self.completions.clone(),
      ));
      self.publish();
    }
  }

  fn stop(&mut self) {
    self.deadline = None;
    self.coordinator.dispose();
    self.backend.release();
    self.publish();
    debug!("search session disposed");
  }

  fn publish(&self) {
    self.state.send_replace(self.coordinator.state());
  }
}

async fn execute<T>(
  source: CatalogSource<T>,
  backend: Arc<ExecutionBackend>,
  request: SearchRequest,
  completions: mpsc::UnboundedSender<SearchResult<T>>,
) where
  T: Searchable + Clone + 'static,
{
  let request_id = request.request_id;
  let search = async {
    match source.resolve().await {
      Ok(Some(catalog)) => backend.search(&catalog, &request).await,
      Ok(None) => SearchResult::empty(request_id),
      Err(error) => {
        warn!(%request_id, %error, "catalog failed to load");
        SearchResult::empty(request_id)
      }
    }
  };

  // A panicking record or loader still resolves the request.
  let result = match AssertUnwindSafe(search).catch_unwind().await {
    Ok(result) => result,
    Err(_) => {
      warn!(%request_id, "search panicked");
      SearchResult::empty(request_id)
    }
  };

  // The session may be gone; its result has nowhere to go.
  let _ = completions.send(result);
}
