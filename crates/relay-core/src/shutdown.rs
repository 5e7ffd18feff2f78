//! Session tracking for graceful shutdown
//!
//! Every in-flight request registers an identifier. Once shutdown starts,
//! registration is refused and waiters are released as soon as the last
//! tracked session finishes.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Tracks in-flight sessions and signals when they have drained
///
/// Cheap to clone; clones share the same tracked set.
#[derive(Clone, Default)]
pub struct ShutdownManager {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    /// Cancelled exactly once, when draining and no sessions remain
    drained: CancellationToken,
}

#[derive(Default)]
struct State {
    draining: bool,
    sessions: HashSet<String>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a session as in flight
    ///
    /// Returns `false` without recording anything once draining.
    pub fn register(&self, id: impl Into<String>) -> bool {
        let mut state = self.state();
        if state.draining {
            return false;
        }
        state.sessions.insert(id.into());
        true
    }

    /// Stop tracking a session; unknown ids are ignored
    pub fn unregister(&self, id: &str) {
        let mut state = self.state();
        state.sessions.remove(id);
        if state.draining && state.sessions.is_empty() {
            self.inner.drained.cancel();
        }
    }

    /// Register a session and return a guard that unregisters it on drop
    pub fn track(&self, id: impl Into<String>) -> Option<SessionGuard> {
        let id = id.into();
        self.register(id.clone()).then(|| SessionGuard {
            manager: self.clone(),
            id,
        })
    }

    /// Stop accepting sessions
    ///
    /// Calling this more than once has no further effect.
    pub fn initiate_shutdown(&self) {
        let mut state = self.state();
        if !state.draining {
            state.draining = true;
            tracing::info!(active_sessions = state.sessions.len(), "session draining started");
        }
        if state.sessions.is_empty() {
            self.inner.drained.cancel();
        }
    }

    /// Whether shutdown has been initiated
    pub fn is_draining(&self) -> bool {
        self.state().draining
    }

    /// Number of sessions currently tracked
    pub fn active_sessions(&self) -> usize {
        self.state().sessions.len()
    }

    /// Wait until all sessions finish or `timeout` elapses
    ///
    /// Returns `true` when drained, `false` on timeout.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        if self.state().sessions.is_empty() {
            return true;
        }

        tokio::time::timeout(timeout, self.inner.drained.cancelled())
            .await
            .is_ok()
    }
}

/// Keeps a session registered until dropped
pub struct SessionGuard {
    manager: ShutdownManager,
    id: String,
}

impl SessionGuard {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.manager.unregister(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_while_accepting() {
        let manager = ShutdownManager::new();
        assert!(manager.register("a"));
        assert!(manager.register("b"));
        assert_eq!(manager.active_sessions(), 2);
    }

    #[test]
    fn register_refused_while_draining() {
        let manager = ShutdownManager::new();
        manager.initiate_shutdown();
        assert!(!manager.register("late"));
        assert_eq!(manager.active_sessions(), 0);
        assert!(manager.track("late").is_none());
    }

    #[test]
    fn unregister_is_idempotent() {
        let manager = ShutdownManager::new();
        manager.register("a");
        manager.unregister("a");
        manager.unregister("a");
        manager.unregister("never-registered");
        assert_eq!(manager.active_sessions(), 0);
    }

    #[test]
    fn guard_unregisters_on_drop() {
        let manager = ShutdownManager::new();
        let guard = manager.track("req-1").unwrap();
        assert_eq!(guard.id(), "req-1");
        assert_eq!(manager.active_sessions(), 1);
        drop(guard);
        assert_eq!(manager.active_sessions(), 0);
    }

    #[tokio::test]
    async fn empty_set_drains_immediately() {
        let manager = ShutdownManager::new();
        assert!(manager.wait_for_drain(Duration::ZERO).await);

        manager.initiate_shutdown();
        assert!(manager.is_draining());
        assert!(manager.wait_for_drain(Duration::ZERO).await);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_times_out_with_sessions_in_flight() {
        let manager = ShutdownManager::new();
        manager.register("stuck");
        manager.initiate_shutdown();

        assert!(!manager.wait_for_drain(Duration::from_secs(5)).await);
        assert_eq!(manager.active_sessions(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn last_unregister_releases_every_waiter() {
        let manager = ShutdownManager::new();
        manager.register("a");
        manager.register("b");
        manager.initiate_shutdown();

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.wait_for_drain(Duration::from_secs(60)).await })
            })
            .collect();

        tokio::task::yield_now().await;
        manager.unregister("a");
        manager.unregister("b");

        for waiter in waiters {
            assert!(waiter.await.unwrap());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn unregister_before_shutdown_does_not_signal() {
        let manager = ShutdownManager::new();
        manager.register("a");
        manager.register("b");
        manager.unregister("a");

        // Still accepting, so a drain wait can only time out
        assert!(!manager.wait_for_drain(Duration::from_secs(1)).await);

        manager.initiate_shutdown();
        manager.unregister("b");
        assert!(manager.wait_for_drain(Duration::from_secs(1)).await);
    }
}
