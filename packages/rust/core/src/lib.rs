//! Orchestration for conftrack: the update pipeline and the query engine.

pub mod query;
pub mod update;

pub use query::query;
pub use update::{UpdateSummary, reconcile, update_from_source};
