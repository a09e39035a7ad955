//! Streaming reducer for Conclave — the single source of truth
//!
//! Every inbound wire event maps to exactly one [`StateOp`], and every
//! `StateOp` is one atomic transition on [`DebateState`]. Consumers never
//! mutate state directly; they hold immutable snapshots published through
//! a watch channel and diff by pointer.

pub mod op;
pub mod state;
pub mod store;

pub use op::StateOp;
pub use state::{AgentRecord, DebateState, FollowUp, TurnSummary};
pub use store::DebateStore;
