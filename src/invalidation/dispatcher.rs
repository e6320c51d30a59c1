//! Invalidation dispatcher.
//!
//! Applies the invalidation table for a mutation event to the registered
//! stores.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::portal::Namespace;
use crate::registry::CacheRegistry;

use super::events::MutationEvent;
use super::table::invalidation_targets;

/// Outcome of dispatching one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Event kind that was dispatched
    pub event: String,
    /// Entries removed per namespace
    pub removed: BTreeMap<Namespace, usize>,
}

impl DispatchReport {
    /// Total entries removed across namespaces.
    pub fn total_removed(&self) -> usize {
        self.removed.values().sum()
    }
}

/// Evaluates the invalidation table against a cache registry.
#[derive(Clone)]
pub struct InvalidationDispatcher {
    registry: Arc<CacheRegistry>,
}

impl InvalidationDispatcher {
    pub fn new(registry: Arc<CacheRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<CacheRegistry> {
        &self.registry
    }

    /// Invalidates every pattern the table lists for `event`.
    ///
    /// Every target namespace must be registered; otherwise nothing past the
    /// missing one is applied and `UnknownNamespace` is returned.
    pub async fn dispatch(&self, event: &MutationEvent) -> Result<DispatchReport> {
        let mut report = DispatchReport {
            event: event.kind().to_string(),
            removed: BTreeMap::new(),
        };

        for target in invalidation_targets(event) {
            let namespace = target.namespace();
            let cache = self.registry.get(namespace)?;
            let regex = target.compile()?;
            let removed = cache.invalidate_matching(&regex).await;
            debug!(namespace = %namespace, pattern = %target, removed, "Applied invalidation");
            *report.removed.entry(namespace).or_insert(0) += removed;
        }

        info!(
            event = %event,
            removed = report.total_removed(),
            "Mutation event dispatched"
        );
        Ok(report)
    }
}
