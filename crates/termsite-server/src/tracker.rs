//! Ownership of per-connection tasks.
//!
//! Every connection handler and session loop the server starts is spawned
//! through a [`SessionTracker`], so shutdown can wait for them and abort
//! whatever outlives the grace period. Once draining starts no new task is
//! accepted.

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::task::{JoinError, JoinSet};

#[derive(Default)]
struct TrackerState {
    tasks: JoinSet<()>,
    draining: bool,
}

/// Shared set of running connection and session tasks.
///
/// Clones refer to the same set.
#[derive(Clone, Default)]
pub struct SessionTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl SessionTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` onto the current runtime and track it.
    ///
    /// Returns `false`, dropping `task` without running it, once
    /// [`SessionTracker::drain`] has started.
    pub fn spawn<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut state = self.lock();
        if state.draining {
            return false;
        }
        reap(&mut state.tasks);
        state.tasks.spawn(task);
        true
    }

    /// Number of tracked tasks still running.
    pub fn active(&self) -> usize {
        let mut state = self.lock();
        reap(&mut state.tasks);
        state.tasks.len()
    }

    /// Stop accepting tasks, wait up to `grace` for the running ones, then
    /// abort the rest.
    ///
    /// Returns how many tasks were aborted.
    pub async fn drain(&self, grace: Duration) -> usize {
        let mut tasks = {
            let mut state = self.lock();
            state.draining = true;
            std::mem::take(&mut state.tasks)
        };

        let finished = tokio::time::timeout(grace, async {
            while let Some(result) = tasks.join_next().await {
                log_failure(result);
            }
        })
        .await;

        if finished.is_ok() {
            return 0;
        }

        let remaining = tasks.len();
        tracing::warn!("Aborting {} sessions still running after {:?}", remaining, grace);
        tasks.shutdown().await;
        remaining
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        // The state stays consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Collect finished tasks so the set only holds running ones.
fn reap(tasks: &mut JoinSet<()>) {
    while let Some(result) = tasks.try_join_next() {
        log_failure(result);
    }
}

fn log_failure(result: Result<(), JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            tracing::error!("Session task panicked: {}", e);
        }
    }
}
