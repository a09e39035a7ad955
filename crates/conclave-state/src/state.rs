//! Debate state and the pure reducer

use crate::op::StateOp;
use conclave_core::roster;
use conclave_core::{
    AgentId, AgentUsage, AggregateMetrics, ConnectionState, DebatePhase, RoundId,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Live state of one debate participant for the current turn.
///
/// `text` and `token_count` are monotonically non-decreasing within a
/// turn; both reset only when a new turn begins. `stream_start` is
/// stamped on the first token of a stream and kept until the next stream
/// starts, so the rate is tokens over elapsed-since-first-token.
#[derive(Clone, Debug)]
pub struct AgentRecord {
    pub id: AgentId,
    pub display_name: String,
    pub color: String,
    pub text: String,
    pub phase: Option<RoundId>,
    pub is_active: bool,
    pub is_streaming: bool,
    pub token_count: u64,
    pub tokens_per_second: u64,
    pub stream_start: Option<Instant>,
    pub usage: Option<AgentUsage>,
}

impl AgentRecord {
    pub fn new(id: AgentId) -> Self {
        let (display_name, color) = match roster::profile(id.as_str()) {
            Some(p) => (p.display_name.to_string(), p.color.to_string()),
            None => (id.as_str().to_string(), "#888888".to_string()),
        };
        Self {
            id,
            display_name,
            color,
            text: String::new(),
            phase: None,
            is_active: false,
            is_streaming: false,
            token_count: 0,
            tokens_per_second: 0,
            stream_start: None,
            usage: None,
        }
    }

    /// Reset everything except identity, at the start of a new turn.
    pub fn reset_for_turn(&mut self) {
        self.text.clear();
        self.phase = None;
        self.is_active = false;
        self.is_streaming = false;
        self.token_count = 0;
        self.tokens_per_second = 0;
        self.stream_start = None;
        self.usage = None;
    }

    pub fn has_content(&self) -> bool {
        !self.text.is_empty()
    }
}

/// One finished turn, kept for multi-turn projection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TurnSummary {
    pub query: String,
    pub responses: BTreeMap<AgentId, String>,
}

/// The user's continuation question between two turns.
#[derive(Clone, Debug, PartialEq)]
pub struct FollowUp {
    pub query: String,
}

/// Singleton debate state; lifecycle is one client session.
///
/// Agent records sit behind `Arc` so an op that touches agent `a` leaves
/// every other agent's record pointer-identical across snapshots, so
/// consumers scoped to `b` can skip work by `Arc::ptr_eq`.
#[derive(Clone, Debug)]
pub struct DebateState {
    pub connection: ConnectionState,
    pub phase: DebatePhase,
    pub query: String,
    pub is_debating: bool,
    pub agents: BTreeMap<AgentId, Arc<AgentRecord>>,
    pub constraints: Vec<String>,
    pub active_constraint: Option<String>,
    pub aggregate: AggregateMetrics,
    pub completed_turns: Vec<TurnSummary>,
    pub follow_up_nodes: Vec<FollowUp>,
    pub current_turn_index: usize,
    pub error: Option<String>,
}

impl Default for DebateState {
    fn default() -> Self {
        let agents = roster::all_ids()
            .map(|id| {
                let id = AgentId::new(id);
                (id.clone(), Arc::new(AgentRecord::new(id)))
            })
            .collect();
        Self {
            connection: ConnectionState::Disconnected,
            phase: DebatePhase::Idle,
            query: String::new(),
            is_debating: false,
            agents,
            constraints: Vec::new(),
            active_constraint: None,
            aggregate: AggregateMetrics::default(),
            completed_turns: Vec::new(),
            follow_up_nodes: Vec::new(),
            current_turn_index: 0,
            error: None,
        }
    }
}

impl DebateState {
    pub fn agent(&self, id: &AgentId) -> Option<&AgentRecord> {
        self.agents.get(id).map(|a| a.as_ref())
    }

    /// Copy-on-write access to one agent record, creating a default
    /// record for ids the roster does not know (backends may introduce
    /// agents the client has never seen).
    fn agent_mut(&mut self, id: &AgentId) -> &mut AgentRecord {
        let entry = self
            .agents
            .entry(id.clone())
            .or_insert_with(|| Arc::new(AgentRecord::new(id.clone())));
        Arc::make_mut(entry)
    }

    /// Apply one operation. This is the whole reducer: no partial effect
    /// of an op is ever observable.
    pub fn apply(&mut self, op: StateOp) {
        match op {
            StateOp::StartDebate { query } => {
                for record in self.agents.values_mut() {
                    Arc::make_mut(record).reset_for_turn();
                }
                self.query = query;
                self.phase = DebatePhase::Idle;
                self.is_debating = true;
                self.constraints.clear();
                self.active_constraint = None;
                self.aggregate = AggregateMetrics::default();
                self.completed_turns.clear();
                self.follow_up_nodes.clear();
                self.current_turn_index = 0;
                self.error = None;
            }

            StateOp::StartFollowUpTurn { query } => {
                // The finished turn becomes history; accumulated context
                // survives, per-agent live state does not.
                let summary = self.summarize_current_turn();
                self.completed_turns.push(summary);
                self.follow_up_nodes.push(FollowUp {
                    query: query.clone(),
                });
                self.current_turn_index += 1;
                for record in self.agents.values_mut() {
                    Arc::make_mut(record).reset_for_turn();
                }
                self.query = query;
                self.phase = DebatePhase::Idle;
                self.is_debating = true;
                self.active_constraint = None;
                self.error = None;
            }

            StateOp::AppendToken { agent, content, at } => {
                let record = self.agent_mut(&agent);
                if record.stream_start.is_none() {
                    record.stream_start = Some(at);
                }
                record.text.push_str(&content);
                record.token_count += 1;
                record.is_streaming = true;
                let elapsed = at
                    .duration_since(record.stream_start.unwrap_or(at))
                    .as_secs_f64();
                record.tokens_per_second = if elapsed > 0.0 {
                    (record.token_count as f64 / elapsed).round() as u64
                } else {
                    0
                };
            }

            StateOp::SetPhase { round, active } => {
                self.phase = DebatePhase::Round(round);
                // Agents not listed are left untouched: a later round may
                // re-activate an agent that already spoke.
                for id in active {
                    let record = self.agent_mut(&id);
                    record.phase = Some(round);
                    record.is_active = true;
                    record.is_streaming = true;
                }
            }

            StateOp::AgentDone { agent } => {
                self.agent_mut(&agent).is_streaming = false;
            }

            StateOp::AgentError { agent, message } => {
                let record = self.agent_mut(&agent);
                record.is_streaming = false;
                record.is_active = false;
                self.error = Some(format!("{}: {}", agent, message));
            }

            StateOp::AgentMetrics { agent, usage } => {
                let record = self.agent_mut(&agent);
                record.usage = Some(usage);
                if usage.completion_time_secs > 0.0 {
                    record.tokens_per_second = (usage.completion_tokens as f64
                        / usage.completion_time_secs)
                        .round() as u64;
                }
            }

            StateOp::UpdateMetrics {
                tokens_per_second,
                total_tokens,
            } => {
                self.aggregate = AggregateMetrics {
                    tokens_per_second,
                    total_tokens,
                };
            }

            StateOp::EndDebate { total_tokens } => {
                // The only operation allowed to mass-clear streaming
                // flags. Idempotent: a second terminal frame is a no-op.
                for record in self.agents.values_mut() {
                    if record.is_streaming {
                        Arc::make_mut(record).is_streaming = false;
                    }
                }
                self.phase = DebatePhase::Complete;
                self.is_debating = false;
                if let Some(total) = total_tokens {
                    self.aggregate.total_tokens = total;
                }
            }

            StateOp::FatalError { message } => {
                self.error = Some(message);
                self.apply(StateOp::EndDebate { total_tokens: None });
            }

            StateOp::AddConstraint { text } => {
                self.active_constraint = Some(text.clone());
                self.constraints.push(text);
            }

            StateOp::ClearConstraints => {
                self.constraints.clear();
                self.active_constraint = None;
            }

            StateOp::ConstraintAcknowledged { constraint } => {
                self.active_constraint = Some(constraint);
            }

            StateOp::SetConnection { state } => {
                self.connection = state;
            }

            StateOp::ClearError => {
                self.error = None;
            }
        }
    }

    fn summarize_current_turn(&self) -> TurnSummary {
        let responses = self
            .agents
            .values()
            .filter(|a| a.has_content())
            .map(|a| (a.id.clone(), a.text.clone()))
            .collect();
        TurnSummary {
            query: self.query.clone(),
            responses,
        }
    }
}
