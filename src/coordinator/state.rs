//! The request coordinator state machine.
//!
//! The coordinator is synchronous and owns request-id sequencing. It is driven
//! by [`SearchSession`](super::SearchSession), which supplies the timers and
//! runs the dispatched searches.

use crate::types::{Query, RequestId, SearchRequest, SearchResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Where the coordinator stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Phase {
  /// No search pending.
  #[default]
  Idle,
  /// Input changed; waiting out the debounce window.
  Debouncing,
  /// A search was dispatched and its result has not been applied yet.
  Searching,
  /// The result of the active request has been applied.
  Resolved,
}

/// Counters over the coordinator's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoordinatorStats {
  /// Requests created by input changes.
  pub submitted: u64,
  /// Requests handed to a backend.
  pub dispatched: u64,
  /// Results accepted.
  pub applied: u64,
  /// Results dropped because a newer request was active.
  pub discarded: u64,
}

/// A snapshot of what a caller should display.
#[derive(Debug, Clone)]
pub struct SearchState<T> {
  /// Where the coordinator stands.
  pub phase: Phase,
  /// `true` from the moment input changes until its result is applied.
  pub searching: bool,
  /// Results of the latest applied request; `None` before any result or while
  /// the catalog is unavailable.
  pub results: Option<Arc<Vec<T>>>,
  /// The request whose result would be applied next.
  pub active_request: Option<RequestId>,
  /// Lifetime counters.
  pub stats: CoordinatorStats,
}

impl<T> Default for SearchState<T> {
  fn default() -> Self {
    Self {
      phase: Phase::Idle,
      searching: false,
      results: None,
      active_request: None,
      stats: CoordinatorStats::default(),
    }
  }
}

/// Debounce, sequencing and staleness bookkeeping for one query subscription.
#[derive(Debug)]
pub struct RequestCoordinator<T> {
  last_issued: RequestId,
  active: Option<RequestId>,
  pending: Option<SearchRequest>,
  phase: Phase,
  searching: bool,
  results: Option<Arc<Vec<T>>>,
  stats: CoordinatorStats,
}

impl<T> Default for RequestCoordinator<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> RequestCoordinator<T> {
  /// A coordinator with no request issued yet.
  pub fn new() -> Self {
    Self {
      last_issued: RequestId::default(),
      active: None,
      pending: None,
      phase: Phase::Idle,
      searching: false,
      results: None,
      stats: CoordinatorStats::default(),
    }
  }

  fn mint(&mut self) -> RequestId {
    self.last_issued = self.last_issued.next();
    self.last_issued
  }

  /// Records an input change.
  ///
  /// The new request becomes active immediately and replaces any request
  /// still waiting for its debounce window. The caller restarts the timer.
  pub fn submit(&mut self, query: Query) -> SearchRequest {
    let request = SearchRequest {
      request_id: self.mint(),
      query,
    };

    self.active = Some(request.request_id);
    self.pending = Some(request.clone());
    self.searching = true;
    self.phase = Phase::Debouncing;
    self.stats.submitted += 1;
    request
  }

  /// The debounce window elapsed: hands out the request to dispatch.
  pub fn fire(&mut self) -> Option<SearchRequest> {
    let request = self.pending.take()?;
    self.phase = Phase::Searching;
    self.stats.dispatched += 1;
    debug!(request_id = %request.request_id, "dispatching search");
    Some(request)
  }

  /// Offers a backend result. Returns `true` if it was applied, `false` if it
  /// was stale and dropped.
  pub fn apply(&mut self, result: SearchResult<T>) -> bool {
    if self.active != Some(result.request_id) {
      self.stats.discarded += 1;
      debug!(
        request_id = %result.request_id,
        active = ?self.active.map(RequestId::get),
        "discarding stale search result"
      );
      return false;
    }

    debug!(request_id = %result.request_id, hits = result.items.len(), "applying search result");
    self.results = Some(Arc::new(result.items));
    self.searching = false;
    self.phase = Phase::Resolved;
    self.stats.applied += 1;
    true
  }

  /// The catalog cannot be searched: clear everything right away.
  ///
  /// A fresh id becomes active without being dispatched, so a result still in
  /// flight for an older request can never be applied afterwards.
  pub fn catalog_unavailable(&mut self) {
    let request_id = self.mint();
    debug!(%request_id, "catalog unavailable");
    self.active = Some(request_id);
    self.pending = None;
    self.results = None;
    self.searching = false;
    self.phase = Phase::Idle;
  }

  /// Stops the subscription. No result is applied afterwards.
  pub fn dispose(&mut self) {
    self.active = None;
    self.pending = None;
    self.searching = false;
    self.phase = Phase::Idle;
  }

  /// The current phase.
  pub fn phase(&self) -> Phase {
    self.phase
  }

  /// Whether the latest input is still waiting for its result.
  pub fn searching(&self) -> bool {
    self.searching
  }

  /// The only request whose result can still be applied.
  pub fn active_request(&self) -> Option<RequestId> {
    self.active
  }

  /// Whether a request is waiting for its debounce window.
  pub fn has_pending(&self) -> bool {
    self.pending.is_some()
  }

  /// Results of the latest applied request.
  pub fn results(&self) -> Option<&Arc<Vec<T>>> {
    self.results.as_ref()
  }

  /// Lifetime counters.
  pub fn stats(&self) -> CoordinatorStats {
    self.stats
  }

  /// A snapshot of everything a caller displays.
  pub fn state(&self) -> SearchState<T> {
    SearchState {
      phase: self.phase,
      searching: self.searching,
      results: self.results.clone(),
      active_request: self.active,
      stats: self.stats,
    }
  }
}
