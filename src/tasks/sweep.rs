//! Expiry Sweep Task
//!
//! Reads already purge expired entries lazily. The sweep bounds how long an
//! expired entry can hold memory in a store nobody is reading.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ManagedCache;
use crate::portal::Namespace;
use crate::registry::CacheRegistry;

/// Spawns a task that purges expired entries from `cache` every `interval`.
///
/// The returned handle must be aborted to stop the task.
pub fn spawn_sweep_task(
    cache: Arc<dyn ManagedCache>,
    namespace: Namespace,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            namespace = %namespace,
            interval_secs = interval.as_secs(),
            "Starting expiry sweep task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired().await;
            if removed > 0 {
                info!(namespace = %namespace, removed, "Expiry sweep removed entries");
            } else {
                debug!(namespace = %namespace, "Expiry sweep found nothing to remove");
            }
        }
    })
}

// == Sweep Tasks ==
/// One sweep task per registered store, aborted together on drop.
#[derive(Debug)]
pub struct SweepTasks {
    handles: Vec<(Namespace, JoinHandle<()>)>,
}

impl SweepTasks {
    pub fn spawn(registry: &CacheRegistry, interval: Duration) -> Self {
        let handles = registry
            .iter()
            .map(|(namespace, cache)| {
                (
                    namespace,
                    spawn_sweep_task(Arc::clone(cache), namespace, interval),
                )
            })
            .collect();
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Stops every sweep task.
    pub fn abort_all(&mut self) {
        for (namespace, handle) in self.handles.drain(..) {
            handle.abort();
            debug!(namespace = %namespace, "Expiry sweep task stopped");
        }
    }
}

impl Drop for SweepTasks {
    fn drop(&mut self) {
        self.abort_all();
    }
}
