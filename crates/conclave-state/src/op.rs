//! Reducer operations — one per atomic state transition

use conclave_core::{AgentId, AgentUsage, ConnectionState, RoundId, ServerEvent};
use std::time::Instant;

/// One atomic transition on [`crate::DebateState`].
///
/// Wire events convert via [`StateOp::from_event`]; local operations
/// (starting a debate, injecting a constraint, connection status) are
/// built directly.
#[derive(Clone, Debug)]
pub enum StateOp {
    /// Full reset: a brand-new debate, history wiped.
    StartDebate { query: String },
    /// Continue the consultation: per-agent state resets, history kept.
    StartFollowUpTurn { query: String },
    AppendToken {
        agent: AgentId,
        content: String,
        at: Instant,
    },
    SetPhase {
        round: RoundId,
        active: Vec<AgentId>,
    },
    AgentDone { agent: AgentId },
    AgentError { agent: AgentId, message: String },
    AgentMetrics { agent: AgentId, usage: AgentUsage },
    UpdateMetrics {
        tokens_per_second: f64,
        total_tokens: u64,
    },
    /// Terminal for the turn. Idempotent.
    EndDebate { total_tokens: Option<u64> },
    /// Backend-reported fatal notice; forces the turn terminal.
    FatalError { message: String },
    AddConstraint { text: String },
    ClearConstraints,
    ConstraintAcknowledged { constraint: String },
    SetConnection { state: ConnectionState },
    /// Manual retry clears the surfaced error before reconnecting.
    ClearError,
}

impl StateOp {
    /// Map an inbound frame to its transition. Total: every event the
    /// protocol can parse has exactly one op. `now` is sampled by the
    /// caller so the reducer itself never reads a clock.
    pub fn from_event(event: ServerEvent, now: Instant) -> StateOp {
        match event {
            ServerEvent::AgentToken { agent_id, content } => StateOp::AppendToken {
                agent: agent_id,
                content,
                at: now,
            },
            ServerEvent::AgentMetrics {
                agent_id,
                prompt_tokens,
                completion_tokens,
                total_tokens,
                completion_time,
                ..
            } => StateOp::AgentMetrics {
                agent: agent_id,
                usage: AgentUsage {
                    prompt_tokens,
                    completion_tokens,
                    total_tokens,
                    completion_time_secs: completion_time,
                },
            },
            ServerEvent::AgentDone { agent_id } => StateOp::AgentDone { agent: agent_id },
            ServerEvent::AgentError { agent_id, error } => StateOp::AgentError {
                agent: agent_id,
                message: error,
            },
            ServerEvent::PhaseChange {
                phase,
                active_agents,
            } => StateOp::SetPhase {
                round: phase,
                active: active_agents,
            },
            ServerEvent::RoundStart {
                round,
                active_agents,
                ..
            } => StateOp::SetPhase {
                round,
                active: active_agents,
            },
            ServerEvent::Metrics {
                tokens_per_second,
                total_tokens,
            } => StateOp::UpdateMetrics {
                tokens_per_second,
                total_tokens,
            },
            // A timeout must not leave agents stuck mid-stream: same
            // transition as normal completion.
            ServerEvent::DebateComplete { total_tokens, .. }
            | ServerEvent::DebateTimeout { total_tokens, .. } => {
                StateOp::EndDebate { total_tokens }
            }
            ServerEvent::Error { message } => StateOp::FatalError { message },
            ServerEvent::ConstraintAcknowledged { constraint, .. } => {
                StateOp::ConstraintAcknowledged { constraint }
            }
        }
    }
}
