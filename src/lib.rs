//! Toolsearch - ranked search over a catalog of tool metadata.
//!
//! Toolsearch scores catalog entries against a free-text query using a fixed
//! table of weighted signals (phrase matches, per-token matches, cross-locale
//! matches and a multi-word bonus), and coordinates asynchronous searches so
//! that only the result of the most recent request is ever applied.
//!
//! The ranking can run inline or on a dedicated worker thread that holds a
//! minimal projection of the catalog; both paths produce identical output.

pub mod backend;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod index;
pub mod locale;
pub mod rules;
pub mod scoring;
pub mod types;

pub mod prelude {
  //! Convenient re-exports for common types and traits.

  pub use crate::backend::*;
  pub use crate::config::*;
  pub use crate::context::*;
  pub use crate::coordinator::*;
  pub use crate::engine::*;
  pub use crate::error::{BackendError, LoadError};
  pub use crate::index::*;
  pub use crate::locale::*;
  pub use crate::rules::*;
  pub use crate::scoring::*;
  pub use crate::types::*;
}
