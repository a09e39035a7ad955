//! Core types for Conclave

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Agent identifier - cheaply cloneable
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct AgentId(Arc<str>);

impl AgentId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Arc::from(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Serialize for AgentId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AgentId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(s))
    }
}

/// A debate round. Wire names are `round1`..`round5`; the descriptive
/// aliases are accepted on inbound frames.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum RoundId {
    #[serde(rename = "round1", alias = "opening")]
    Opening,
    #[serde(rename = "round2", alias = "challenge")]
    Challenge,
    #[serde(rename = "round3", alias = "defense")]
    Defense,
    #[serde(rename = "round4", alias = "expert_analysis")]
    ExpertAnalysis,
    #[serde(rename = "round5", alias = "final_verdict")]
    FinalVerdict,
}

impl RoundId {
    pub const ALL: [RoundId; 5] = [
        RoundId::Opening,
        RoundId::Challenge,
        RoundId::Defense,
        RoundId::ExpertAnalysis,
        RoundId::FinalVerdict,
    ];

    /// Zero-based position in the round sequence.
    pub fn index(&self) -> usize {
        match self {
            RoundId::Opening => 0,
            RoundId::Challenge => 1,
            RoundId::Defense => 2,
            RoundId::ExpertAnalysis => 3,
            RoundId::FinalVerdict => 4,
        }
    }

    pub fn wire_name(&self) -> &'static str {
        match self {
            RoundId::Opening => "round1",
            RoundId::Challenge => "round2",
            RoundId::Defense => "round3",
            RoundId::ExpertAnalysis => "round4",
            RoundId::FinalVerdict => "round5",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RoundId::Opening => "Opening Statements",
            RoundId::Challenge => "Challenge Round",
            RoundId::Defense => "Defense Round",
            RoundId::ExpertAnalysis => "Expert Analysis",
            RoundId::FinalVerdict => "Final Verdict",
        }
    }
}

impl std::fmt::Display for RoundId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// Global debate phase. A turn moves `Idle -> Round(..) -> Complete`;
/// only `start_debate` / a follow-up turn re-enter `Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebatePhase {
    Idle,
    Round(RoundId),
    Complete,
}

impl DebatePhase {
    pub fn round(&self) -> Option<RoundId> {
        match self {
            DebatePhase::Round(r) => Some(*r),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DebatePhase::Complete)
    }
}

impl std::fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DebatePhase::Idle => write!(f, "idle"),
            DebatePhase::Round(r) => write!(f, "{}", r.wire_name()),
            DebatePhase::Complete => write!(f, "complete"),
        }
    }
}

/// Transport connection state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Connected,
    #[default]
    Disconnected,
    Error,
}

/// Model tier requested when starting a debate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Fast,
    #[default]
    Balanced,
    Deep,
}

/// Final usage accounting for one agent, populated only by terminal
/// metrics events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub completion_time_secs: f64,
}

/// Debate-wide aggregate metrics
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub tokens_per_second: f64,
    pub total_tokens: u64,
}
