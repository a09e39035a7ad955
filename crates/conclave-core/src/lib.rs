//! Core types for Conclave — shared across every crate in the workspace

pub mod error;
pub mod protocol;
pub mod roster;
pub mod types;

pub use error::{Error, Result};
pub use protocol::{ClientCommand, ServerEvent};
pub use roster::{AgentProfile, AgentRole};
pub use types::{
    AgentId, AgentUsage, AggregateMetrics, ConnectionState, DebatePhase, ModelTier, RoundId,
};
