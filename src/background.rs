//! Tracked background work that must finish before the process exits.
//!
//! Reply streams dropped mid-generation (client disconnects) hand their
//! final model-turn write to this registry; `drain` awaits every such write
//! during graceful shutdown.

// The lock is never held across an .await, so std::sync::Mutex suffices.
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{info, warn};

struct Tracked {
    label: &'static str,
    handle: JoinHandle<()>,
}

/// Registry of spawned tasks awaited on shutdown. Clones share the registry.
#[derive(Clone, Default)]
pub struct BackgroundTasks {
    tasks: Arc<Mutex<Vec<Tracked>>>,
}

impl BackgroundTasks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Tracked>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawn `future` and register it before returning.
    ///
    /// Finished tasks are pruned on each call.
    pub fn spawn<F>(&self, label: &'static str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);

        let mut tasks = self.lock();
        tasks.retain(|t| !t.handle.is_finished());
        tasks.push(Tracked { label, handle });
    }

    /// Await every registered task.
    pub async fn drain(&self) {
        let tasks = std::mem::take(&mut *self.lock());
        if tasks.is_empty() {
            return;
        }

        info!(count = tasks.len(), "Waiting for background tasks to complete");
        for task in tasks {
            if let Err(e) = task.handle.await {
                warn!(task = task.label, error = %e, "Background task failed");
            }
        }
        info!("All background tasks completed");
    }

    /// Number of tasks still running.
    #[cfg(test)]
    fn pending(&self) -> usize {
        let mut tasks = self.lock();
        tasks.retain(|t| !t.handle.is_finished());
        tasks.len()
    }
}
