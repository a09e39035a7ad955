//! Wire protocol — JSON frames over a persistent duplex connection
//!
//! Inbound (backend → client), discriminated by `type`:
//!   { "type": "agent_token", "agentId": "analyst", "content": "..." }
//!   { "type": "phase_change", "phase": "round2", "activeAgents": ["critic", "skeptic"] }
//!   { "type": "debate_complete", "totalTokens": 4812, "durationSeconds": 41.3 }
//!
//! Outbound (client → backend):
//!   { "type": "start_debate", "query": "...", "modelTier": "balanced",
//!     "selectedAgents": ["analyst", "optimist", "synthesizer"] }
//!
//! Delivery is best-effort / at-least-once; every inbound handler is
//! idempotent, so a replayed frame is harmless.

use crate::types::{AgentId, ModelTier, RoundId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Backend → client events
// ---------------------------------------------------------------------------

/// One inbound frame. Unknown `type` tags fail to parse and are dropped
/// by the connection layer, never surfaced as a connection error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// A streamed token for one agent's answer.
    AgentToken { agent_id: AgentId, content: String },

    /// Final usage accounting for one agent.
    AgentMetrics {
        agent_id: AgentId,
        tokens_per_second: f64,
        total_tokens: u64,
        prompt_tokens: u64,
        completion_tokens: u64,
        completion_time: f64,
    },

    /// The agent finished streaming normally.
    AgentDone { agent_id: AgentId },

    /// One agent's generation failed; the rest of the round continues.
    AgentError { agent_id: AgentId, error: String },

    /// Advance the round state machine.
    PhaseChange {
        phase: RoundId,
        #[serde(default)]
        active_agents: Vec<AgentId>,
    },

    /// Same effect as `phase_change`; some backends send this shape.
    RoundStart {
        round: RoundId,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        active_agents: Vec<AgentId>,
    },

    /// Debate-wide aggregate metrics update.
    Metrics {
        tokens_per_second: f64,
        total_tokens: u64,
    },

    /// Terminal state for the turn.
    DebateComplete {
        #[serde(default)]
        total_tokens: Option<u64>,
        #[serde(default)]
        duration_seconds: Option<f64>,
    },

    /// Backend wall-clock ceiling hit. Handled identically to
    /// `debate_complete`; agents must not be left stuck mid-stream.
    DebateTimeout {
        #[serde(default)]
        total_tokens: Option<u64>,
        #[serde(default)]
        duration_seconds: Option<f64>,
    },

    /// Non-agent-scoped fatal notice.
    Error { message: String },

    /// Backend acknowledged an injected constraint.
    ConstraintAcknowledged {
        constraint: String,
        timestamp: String,
    },
}

// ---------------------------------------------------------------------------
// Client → backend commands
// ---------------------------------------------------------------------------

/// One outbound frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    /// Begin a fresh debate. Resets all agent state client-side.
    StartDebate {
        query: String,
        model_tier: ModelTier,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<String>,
        selected_agents: Vec<AgentId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        industry: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        credential: Option<String>,
    },

    /// Branch variant of `start_debate`; the backend decides what differs.
    StartBranching {
        query: String,
        model_tier: ModelTier,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<String>,
        selected_agents: Vec<AgentId>,
    },

    /// Continue the consultation with a follow-up question. Same shape as
    /// `start_debate` but routed through the non-resetting store path.
    FollowUp {
        query: String,
        model_tier: ModelTier,
        context: String,
        selected_agents: Vec<AgentId>,
    },

    /// Inject a mid-debate constraint for the currently-active agents.
    AddConstraint { constraint: String },
}

impl ClientCommand {
    pub fn start_debate(
        query: impl Into<String>,
        model_tier: ModelTier,
        selected_agents: Vec<AgentId>,
    ) -> Self {
        Self::StartDebate {
            query: query.into(),
            model_tier,
            context: None,
            selected_agents,
            industry: None,
            credential: None,
        }
    }

    pub fn follow_up(
        query: impl Into<String>,
        model_tier: ModelTier,
        context: impl Into<String>,
        selected_agents: Vec<AgentId>,
    ) -> Self {
        Self::FollowUp {
            query: query.into(),
            model_tier,
            context: context.into(),
            selected_agents,
        }
    }

    pub fn add_constraint(constraint: impl Into<String>) -> Self {
        Self::AddConstraint {
            constraint: constraint.into(),
        }
    }

    /// Attach prior-turn context to a `start_debate`/`start_branching`.
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        match &mut self {
            Self::StartDebate { context, .. } | Self::StartBranching { context, .. } => {
                *context = Some(ctx.into());
            }
            Self::FollowUp { context, .. } => *context = ctx.into(),
            Self::AddConstraint { .. } => {}
        }
        self
    }
}
