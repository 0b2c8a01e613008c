//! Messages exchanged with the worker backend.
//!
//! Messages carry plain owned data only; nothing is shared between the worker
//! thread and its callers. The serde representation is tagged by `kind`.

use crate::types::{CatalogEntry, EntityId, RequestId, ResultForm};
use serde::{Deserialize, Serialize};

/// A message sent to the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WorkerRequest {
  /// Replaces the worker's catalog projection.
  Init { catalog: Vec<CatalogEntry> },
  /// Ranks the current projection.
  Search {
    request_id: RequestId,
    query: String,
    locale: String,
    #[serde(default)]
    form: ResultForm,
  },
  /// Stops the worker.
  Shutdown,
}

/// A message sent back by the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WorkerResponse {
  Result {
    request_id: RequestId,
    results: ResultSet,
  },
  /// `request_id` is `None` when the failure is not tied to one request; every
  /// pending request fails in that case.
  Error {
    request_id: Option<RequestId>,
    message: String,
  },
}

impl WorkerResponse {
  /// The request this response answers, if any.
  pub fn request_id(&self) -> Option<RequestId> {
    match self {
      WorkerResponse::Result { request_id, .. } => Some(*request_id),
      WorkerResponse::Error { request_id, .. } => *request_id,
    }
  }
}

/// Ranked results, in the form the request asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "form", content = "items", rename_all = "lowercase")]
pub enum ResultSet {
  Ids(Vec<EntityId>),
  Records(Vec<CatalogEntry>),
}

impl ResultSet {
  /// Number of ranked results.
  pub fn len(&self) -> usize {
    match self {
      ResultSet::Ids(ids) => ids.len(),
      ResultSet::Records(records) => records.len(),
    }
  }

  /// Returns `true` when nothing matched.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The ranked ids, whatever the form.
  pub fn into_ids(self) -> Vec<EntityId> {
    match self {
      ResultSet::Ids(ids) => ids,
      ResultSet::Records(records) => records.into_iter().map(|record| record.id).collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_wire_shape() {
    let search = WorkerRequest::Search {
      request_id: RequestId::new(7),
      query: "hex".into(),
      locale: "en".into(),
      form: ResultForm::Ids,
    };
    assert_eq!(
      serde_json::to_value(&search).unwrap(),
      json!({"kind": "search", "request_id": 7, "query": "hex", "locale": "en", "form": "ids"})
    );

    let result = WorkerResponse::Result {
      request_id: RequestId::new(7),
      results: ResultSet::Ids(vec!["hex-to-text".into()]),
    };
    assert_eq!(
      serde_json::to_value(&result).unwrap(),
      json!({"kind": "result", "request_id": 7, "results": {"form": "ids", "items": ["hex-to-text"]}})
    );
  }

  #[test]
  fn test_search_form_defaults_to_ids() {
    let parsed: WorkerRequest =
      serde_json::from_value(json!({"kind": "search", "request_id": 1, "query": "", "locale": "en"}))
        .unwrap();
    assert!(matches!(parsed, WorkerRequest::Search { form: ResultForm::Ids, .. }));
  }

  #[test]
  fn test_error_request_id() {
    let error = WorkerResponse::Error {
      request_id: None,
      message: "boom".into(),
    };
    assert_eq!(error.request_id(), None);
  }
}
