//! The fixed agent roster and its round membership tables
//!
//! Every debate draws from the same eight agents. Round membership is
//! static: the defense round reuses the opening agents, and the
//! synthesizer alone delivers the final verdict.

use crate::types::RoundId;

/// What an agent does in the debate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentRole {
    /// Makes an opening argument and later defends it.
    Opener,
    /// Attacks a specific opener's position in the challenge round.
    Challenger,
    /// Contributes specialist analysis after the defense round.
    Expert,
    /// Weighs everything and delivers the verdict. Cannot be deselected.
    Synthesizer,
}

/// Static identity of one roster agent.
#[derive(Clone, Copy, Debug)]
pub struct AgentProfile {
    pub id: &'static str,
    pub display_name: &'static str,
    pub color: &'static str,
    pub role: AgentRole,
}

pub const ROSTER: &[AgentProfile] = &[
    AgentProfile {
        id: "analyst",
        display_name: "Analyst",
        color: "#4f8ef7",
        role: AgentRole::Opener,
    },
    AgentProfile {
        id: "optimist",
        display_name: "Optimist",
        color: "#2dbd6e",
        role: AgentRole::Opener,
    },
    AgentProfile {
        id: "pragmatist",
        display_name: "Pragmatist",
        color: "#b98a3e",
        role: AgentRole::Opener,
    },
    AgentProfile {
        id: "critic",
        display_name: "Critic",
        color: "#e05252",
        role: AgentRole::Challenger,
    },
    AgentProfile {
        id: "skeptic",
        display_name: "Skeptic",
        color: "#c75fb8",
        role: AgentRole::Challenger,
    },
    AgentProfile {
        id: "technical_expert",
        display_name: "Technical Expert",
        color: "#3ab6c4",
        role: AgentRole::Expert,
    },
    AgentProfile {
        id: "market_expert",
        display_name: "Market Expert",
        color: "#8a6fe8",
        role: AgentRole::Expert,
    },
    AgentProfile {
        id: "synthesizer",
        display_name: "Synthesizer",
        color: "#e8b93e",
        role: AgentRole::Synthesizer,
    },
];

/// The agent whose opening position anchors expert `depends` edges.
pub const ANCHOR_AGENT: &str = "analyst";

/// The role-pinned agent that can never be deselected.
pub const SYNTHESIZER: &str = "synthesizer";

const OPENERS: &[&str] = &["analyst", "optimist", "pragmatist"];
const CHALLENGERS: &[&str] = &["critic", "skeptic"];
const EXPERTS: &[&str] = &["technical_expert", "market_expert"];
const VERDICT: &[&str] = &["synthesizer"];

/// Look up an agent's static profile by id.
pub fn profile(id: &str) -> Option<&'static AgentProfile> {
    ROSTER.iter().find(|p| p.id == id)
}

/// Every roster id, in declaration order.
pub fn all_ids() -> impl Iterator<Item = &'static str> {
    ROSTER.iter().map(|p| p.id)
}

/// The agents that speak in a given round. Defense reuses the opening
/// agents.
pub fn round_members(round: RoundId) -> &'static [&'static str] {
    match round {
        RoundId::Opening | RoundId::Defense => OPENERS,
        RoundId::Challenge => CHALLENGERS,
        RoundId::ExpertAnalysis => EXPERTS,
        RoundId::FinalVerdict => VERDICT,
    }
}

/// The opener a challenger argues against, used for `refutes` edges.
pub fn challenger_counterpart(id: &str) -> Option<&'static str> {
    match id {
        "critic" => Some("analyst"),
        "skeptic" => Some("optimist"),
        _ => None,
    }
}
