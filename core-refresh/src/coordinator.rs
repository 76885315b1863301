//! # Visibility Refresh Coordinator
//!
//! Decides, on tab visibility transitions, whether to trigger a
//! caller-supplied refresh action. Hiding the page records when it was
//! hidden; becoming visible again fires the refresh only when the page was
//! hidden at least `hiddenThresholdSeconds` AND the last firing is at least
//! `cooldownPeriodSeconds` ago, per the policy read at that moment.
//!
//! The callback typically clears repository caches so the next read
//! refetches. It runs on its own task: `last_refresh_at` is stamped before
//! the spawn, so a slow callback cannot allow a re-entrant firing, and its
//! failure is logged rather than propagated to the visibility source.
//!
//! Multiple coordinators may be registered over the same source; each keeps
//! independent state. Deregistration stops the listener task; an
//! already-spawned callback is not cancelled.

use crate::policy::RefreshPolicyStore;
use bridge_traits::time::Clock;
use bridge_traits::visibility::VisibilitySource;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Refresh action invoked when the coordinator decides to fire.
pub type RefreshCallback = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

struct VisibilityState {
    /// Unix millis when the page became hidden; `None` while visible.
    hidden_since: Option<i64>,
    /// Unix millis of the last refresh firing; 0 before the first.
    last_refresh_at: i64,
}

/// Handle returned by [`register`]. Dropping it, or calling
/// [`deregister`](CoordinatorHandle::deregister), stops the listener task;
/// no further refreshes fire afterwards.
#[derive(Debug)]
pub struct CoordinatorHandle {
    task: JoinHandle<()>,
}

impl CoordinatorHandle {
    pub fn deregister(self) {
        self.task.abort();
    }
}

impl Drop for CoordinatorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Register a refresh coordinator over a visibility source.
///
/// The policy is re-read from `policy_store` on every Hidden→Visible
/// transition, so settings changes apply without re-registration. The
/// source is treated as level-triggered: the hidden flag is re-read on each
/// notification rather than inferred from event edges.
pub fn register(
    visibility: Arc<dyn VisibilitySource>,
    policy_store: RefreshPolicyStore,
    clock: Arc<dyn Clock>,
    callback: RefreshCallback,
) -> CoordinatorHandle {
    let mut changes = visibility.changes();
    let task = tokio::spawn(async move {
        let mut state = VisibilityState {
            hidden_since: visibility
                .is_hidden()
                .then(|| clock.unix_timestamp_millis()),
            last_refresh_at: 0,
        };

        while changes.changed().await.is_ok() {
            let hidden = visibility.is_hidden();
            let now = clock.unix_timestamp_millis();

            if hidden {
                // Repeated hidden notifications keep the original mark.
                if state.hidden_since.is_none() {
                    state.hidden_since = Some(now);
                    debug!(hidden_since = now, "page hidden");
                }
                continue;
            }

            let Some(hidden_since) = state.hidden_since.take() else {
                continue;
            };
            let hidden_for_ms = now - hidden_since;

            let policy = match policy_store.load().await {
                Ok(policy) => policy,
                Err(error) => {
                    warn!(%error, "refresh policy unavailable, skipping evaluation");
                    continue;
                }
            };
            if !policy.auto_refresh_enabled {
                continue;
            }

            let threshold_ms = policy.hidden_threshold().as_millis() as i64;
            let cooldown_ms = policy.cooldown_period().as_millis() as i64;
            if hidden_for_ms < threshold_ms || now - state.last_refresh_at < cooldown_ms {
                debug!(
                    hidden_for_ms,
                    since_last_refresh_ms = now - state.last_refresh_at,
                    "visibility refresh suppressed"
                );
                continue;
            }

            // Stamped before the callback runs so a slow callback cannot
            // let the next transition re-enter within the cooldown.
            state.last_refresh_at = now;
            debug!(hidden_for_ms, "visibility refresh firing");
            let callback = Arc::clone(&callback);
            tokio::spawn(async move {
                if let Err(error) = callback().await {
                    warn!(%error, "visibility refresh callback failed");
                }
            });
        }
    });

    CoordinatorHandle { task }
}
