//! Shared debate store — reducer behind a lock, snapshots over watch

use crate::op::StateOp;
use crate::state::DebateState;
use conclave_core::{ConnectionState, ServerEvent};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::watch;
use tracing::debug;

/// The single mutable resource of the client. All mutation goes through
/// [`StateOp`]s; consumers subscribe and receive immutable
/// `Arc<DebateState>` snapshots after every transition.
pub struct DebateStore {
    inner: Mutex<DebateState>,
    tx: watch::Sender<Arc<DebateState>>,
}

impl Default for DebateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DebateStore {
    pub fn new() -> Self {
        let state = DebateState::default();
        let (tx, _) = watch::channel(Arc::new(state.clone()));
        Self {
            inner: Mutex::new(state),
            tx,
        }
    }

    /// Apply one operation and publish the resulting snapshot.
    pub fn apply(&self, op: StateOp) {
        let snapshot = {
            let mut state = self.inner.lock().expect("debate state poisoned");
            state.apply(op);
            Arc::new(state.clone())
        };
        // send_replace never fails even with no subscribers.
        self.tx.send_replace(snapshot);
    }

    /// Reduce one inbound wire event, stamping the monotonic clock here
    /// so the reducer stays clock-free.
    pub fn dispatch(&self, event: ServerEvent) {
        debug!(?event, "dispatch");
        self.apply(StateOp::from_event(event, Instant::now()));
    }

    /// Current immutable snapshot.
    pub fn snapshot(&self) -> Arc<DebateState> {
        self.tx.borrow().clone()
    }

    /// Subscribe to snapshots. The receiver observes every transition
    /// that happens after this call (plus the current value).
    pub fn subscribe(&self) -> watch::Receiver<Arc<DebateState>> {
        self.tx.subscribe()
    }

    // -- convenience wrappers for local (non-wire) operations ------------

    pub fn start_debate(&self, query: impl Into<String>) {
        self.apply(StateOp::StartDebate {
            query: query.into(),
        });
    }

    pub fn start_follow_up_turn(&self, query: impl Into<String>) {
        self.apply(StateOp::StartFollowUpTurn {
            query: query.into(),
        });
    }

    pub fn add_constraint(&self, text: impl Into<String>) {
        self.apply(StateOp::AddConstraint { text: text.into() });
    }

    pub fn clear_constraints(&self) {
        self.apply(StateOp::ClearConstraints);
    }

    pub fn set_connection(&self, state: ConnectionState) {
        self.apply(StateOp::SetConnection { state });
    }

    pub fn set_fatal_error(&self, message: impl Into<String>) {
        self.apply(StateOp::FatalError {
            message: message.into(),
        });
    }

    pub fn clear_error(&self) {
        self.apply(StateOp::ClearError);
    }
}
