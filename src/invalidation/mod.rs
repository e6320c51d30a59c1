//! Invalidation Module
//!
//! Maps mutation events to the cache keys they stale and applies them.
//!
//! - `events`: the mutation vocabulary
//! - `table`: event → key patterns, in one place
//! - `dispatcher`: evaluates the table against the cache registry

mod dispatcher;
mod events;
mod table;

pub use dispatcher::{DispatchReport, InvalidationDispatcher};
pub use events::MutationEvent;
pub use table::invalidation_targets;
