//! Error types.
//!
//! None of these reach the caller of a [`SearchSession`]: backend errors
//! downgrade the session to inline search and load errors resolve the
//! current request with an empty result. They are public for the lower-level
//! APIs ([`WorkerBackend`], [`CatalogLoader`], [`SearchConfig`]).
//!
//! [`SearchSession`]: crate::coordinator::SearchSession
//! [`WorkerBackend`]: crate::backend::WorkerBackend
//! [`CatalogLoader`]: crate::index::CatalogLoader
//! [`SearchConfig`]: crate::config::SearchConfig

use thiserror::Error;

/// Failures of the worker backend.
#[derive(Debug, Error)]
pub enum BackendError {
  #[error("failed to spawn search worker: {0}")]
  Spawn(#[source] std::io::Error),

  #[error("search worker requires a tokio runtime")]
  NoRuntime,

  #[error("search worker disconnected")]
  Disconnected,

  #[error("search worker error: {0}")]
  Worker(String),
}

/// Failures while loading a catalog.
#[derive(Debug, Error)]
pub enum LoadError {
  #[error("failed to read catalog: {0}")]
  Io(#[from] std::io::Error),

  #[error("failed to parse catalog: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("catalog loader failed: {0}")]
  Loader(String),
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Backend(#[from] BackendError),

  #[error(transparent)]
  Load(#[from] LoadError),

  #[error("invalid configuration: {0}")]
  Config(#[from] figment::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
