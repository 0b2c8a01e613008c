//! Request coordination: debouncing, request sequencing and staleness.

pub mod session;
pub mod state;

pub use session::SearchSession;
pub use state::{CoordinatorStats, Phase, RequestCoordinator, SearchState};
