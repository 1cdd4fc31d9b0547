//! Single-flight refresh coordination.
//!
//! At most one call to the refresh endpoint may be outstanding at any time.
//! The first task that needs a fresh token becomes the leader of a refresh
//! cycle; every task that arrives while the cycle is in flight parks in a
//! FIFO queue and is resolved with that cycle's outcome. The queue is never
//! dropped and waiters are released strictly in arrival order.
//!
//! The state check and the transition to `Refreshing` happen under one lock
//! with no await point in between, so two tasks can never both lead.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

/// Result of one refresh cycle, fanned out to every queued waiter.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// The refresh succeeded; carries the new access token.
    Refreshed(String),
    /// The refresh failed; carries the failure description. The session has
    /// been cleared by the leader.
    Failed(String),
}

/// Ticket handed to a task entering the refresh protocol.
#[derive(Debug)]
pub enum RefreshTicket {
    /// This task runs the refresh call and must settle the cycle.
    Leader,
    /// A refresh is already in flight; await the outcome.
    Waiter {
        /// Resolves when the in-flight cycle settles.
        rx: oneshot::Receiver<RefreshOutcome>,
        /// Zero-based arrival position in the queue.
        position: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshState {
    Idle,
    Refreshing,
}

#[derive(Debug)]
struct CoordinatorInner {
    state: RefreshState,
    waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
}

/// Process-wide single-flight coordinator.
///
/// Constructed once per client and injectable, so tests get a fresh machine
/// instead of resetting global state. The machine cycles Idle → Refreshing →
/// Idle for the lifetime of the client; there is no terminal state.
#[derive(Debug)]
pub struct RefreshCoordinator {
    inner: Mutex<CoordinatorInner>,
}

impl RefreshCoordinator {
    /// Create a coordinator in the `Idle` state with an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CoordinatorInner {
                state: RefreshState::Idle,
                waiters: VecDeque::new(),
            }),
        }
    }

    /// Enter the refresh protocol.
    ///
    /// Exactly one caller per cycle observes `Idle` and becomes the leader;
    /// everyone else is enqueued. The leader must eventually call
    /// [`settle`](Self::settle), success or failure.
    pub fn begin(&self) -> RefreshTicket {
        let mut inner = self.inner.lock();
        match inner.state {
            RefreshState::Idle => {
                inner.state = RefreshState::Refreshing;
                RefreshTicket::Leader
            }
            RefreshState::Refreshing => {
                let (tx, rx) = oneshot::channel();
                inner.waiters.push_back(tx);
                RefreshTicket::Waiter { rx, position: inner.waiters.len() - 1 }
            }
        }
    }

    /// Settle the in-flight cycle and release every queued waiter in FIFO
    /// order with a clone of the outcome.
    pub fn settle(&self, outcome: RefreshOutcome) {
        let waiters = {
            let mut inner = self.inner.lock();
            inner.state = RefreshState::Idle;
            std::mem::take(&mut inner.waiters)
        };

        let released = waiters.len();
        for tx in waiters {
            // A waiter that gave up (dropped its receiver) is not an error.
            let _ = tx.send(outcome.clone());
        }
        if released > 0 {
            debug!(released, "released queued requests after refresh settled");
        }
    }

    /// Whether a refresh cycle is currently in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.lock().state == RefreshState::Refreshing
    }

    /// Number of tasks currently parked behind the in-flight cycle.
    #[must_use]
    pub fn waiter_count(&self) -> usize {
        self.inner.lock().waiters.len()
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for api::refresh.
    use super::*;

    #[tokio::test]
    async fn first_caller_leads_later_callers_queue_in_order() {
        let coordinator = RefreshCoordinator::new();

        assert!(matches!(coordinator.begin(), RefreshTicket::Leader));
        assert!(coordinator.is_refreshing());

        let mut receivers = Vec::new();
        for expected in 0..3 {
            match coordinator.begin() {
                RefreshTicket::Waiter { rx, position } => {
                    assert_eq!(position, expected);
                    receivers.push(rx);
                }
                RefreshTicket::Leader => panic!("second leader during one cycle"),
            }
        }
        assert_eq!(coordinator.waiter_count(), 3);

        coordinator.settle(RefreshOutcome::Refreshed("fresh".to_string()));

        // Every waiter observes the one outcome, in queue order.
        for rx in receivers {
            match rx.await {
                Ok(RefreshOutcome::Refreshed(token)) => assert_eq!(token, "fresh"),
                other => panic!("unexpected outcome: {other:?}"),
            }
        }

        // The machine is back to Idle: the next caller leads a new cycle.
        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.waiter_count(), 0);
        assert!(matches!(coordinator.begin(), RefreshTicket::Leader));
    }

    #[tokio::test]
    async fn failure_outcome_reaches_every_waiter() {
        let coordinator = RefreshCoordinator::new();
        assert!(matches!(coordinator.begin(), RefreshTicket::Leader));

        let rx = match coordinator.begin() {
            RefreshTicket::Waiter { rx, .. } => rx,
            RefreshTicket::Leader => panic!("second leader"),
        };

        coordinator.settle(RefreshOutcome::Failed("refresh endpoint returned 500".to_string()));

        match rx.await {
            Ok(RefreshOutcome::Failed(message)) => {
                assert!(message.contains("500"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn dropped_waiter_does_not_break_settlement() {
        let coordinator = RefreshCoordinator::new();
        assert!(matches!(coordinator.begin(), RefreshTicket::Leader));

        let rx_kept = match coordinator.begin() {
            RefreshTicket::Waiter { rx, .. } => rx,
            RefreshTicket::Leader => panic!("second leader"),
        };
        match coordinator.begin() {
            RefreshTicket::Waiter { rx, .. } => drop(rx),
            RefreshTicket::Leader => panic!("second leader"),
        }

        coordinator.settle(RefreshOutcome::Refreshed("fresh".to_string()));

        assert!(matches!(rx_kept.await, Ok(RefreshOutcome::Refreshed(_))));
    }

    #[tokio::test]
    async fn concurrent_begin_produces_one_leader() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let coordinator = Arc::new(RefreshCoordinator::new());
        let leaders = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let coordinator = Arc::clone(&coordinator);
            let leaders = Arc::clone(&leaders);
            handles.push(tokio::spawn(async move {
                match coordinator.begin() {
                    RefreshTicket::Leader => {
                        leaders.fetch_add(1, Ordering::SeqCst);
                        None
                    }
                    RefreshTicket::Waiter { rx, .. } => Some(rx),
                }
            }));
        }

        let mut receivers = Vec::new();
        for handle in handles {
            if let Some(rx) = handle.await.expect("task") {
                receivers.push(rx);
            }
        }

        assert_eq!(leaders.load(Ordering::SeqCst), 1);
        assert_eq!(receivers.len(), 15);

        coordinator.settle(RefreshOutcome::Refreshed("fresh".to_string()));
        for rx in receivers {
            assert!(matches!(rx.await, Ok(RefreshOutcome::Refreshed(_))));
        }
    }
}
