//! Destination search: query, geocode, route, and fit the camera.
//!
//! [`SearchOrchestrator`] owns the [`SearchState`] machine:
//!
//! ```text
//! Idle -> Searching -> Resolved
//!                   \-> Failed
//! any  -> Idle (clear)
//! ```
//!
//! Only the most recently submitted query can ever be observed in the
//! published state.

mod orchestrator;
mod state;

pub use orchestrator::{FALLBACK_CENTER, OrchestratorConfig, SearchOrchestrator, StateUpdates};
pub use state::{ErrorKind, RequestId, SearchError, SearchQuery, SearchState, SubmitOutcome};

#[cfg(test)]
mod tests;
