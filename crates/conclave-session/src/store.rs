//! Turn/session store — the consultation history layer

use crate::persist;
use chrono::{DateTime, Utc};
use conclave_core::{AgentId, Error, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::info;
use uuid::Uuid;

/// Character budget for each agent response when building prior-turn
/// context, bounding prompt size on the next turn.
pub const CONTEXT_CHAR_BUDGET: usize = 500;

/// Minimum interval between live-text writes into the current turn.
pub const SYNC_INTERVAL: Duration = Duration::from_millis(500);

/// Optional benchmark metadata recorded on a completed turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnBenchmark {
    pub total_tokens: u64,
    pub duration_seconds: f64,
}

/// One question-and-full-debate cycle within a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DebateTurn {
    pub query: String,
    pub agent_responses: BTreeMap<AgentId, String>,
    pub selected_agents: Vec<AgentId>,
    pub is_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<TurnBenchmark>,
    pub started_at: DateTime<Utc>,
}

impl DebateTurn {
    fn new(query: String, selected_agents: Vec<AgentId>) -> Self {
        Self {
            query,
            agent_responses: BTreeMap::new(),
            selected_agents,
            is_complete: false,
            benchmark: None,
            started_at: Utc::now(),
        }
    }
}

/// A persisted consultation: ordered turns, appended and never removed
/// except by whole-session deletion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsultationSession {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub turns: Vec<DebateTurn>,
}

impl ConsultationSession {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            turns: Vec::new(),
        }
    }
}

/// Registry of consultation sessions with one active session at a time.
///
/// Live text is copied into the current turn only on a throttled sync so
/// per-token calls don't amplify disk writes; `complete_turn` always
/// writes the final authoritative responses.
pub struct ConsultationStore {
    dir: PathBuf,
    sessions: DashMap<String, ConsultationSession>,
    active: Mutex<Option<String>>,
    last_sync: DashMap<AgentId, Instant>,
    sync_interval: Duration,
}

impl ConsultationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sessions: DashMap::new(),
            active: Mutex::new(None),
            last_sync: DashMap::new(),
            sync_interval: SYNC_INTERVAL,
        }
    }

    /// Shorter/longer throttle, mostly for tests.
    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }

    /// Load every persisted session from the data directory.
    pub fn load(dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(dir);
        for session in persist::load_all(&store.dir)? {
            store.sessions.insert(session.id.clone(), session);
        }
        info!("Loaded {} consultation sessions", store.sessions.len());
        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.dir
    }

    /// Append a new turn to the active session, creating the session
    /// lazily if none is active. Returns the turn index.
    pub fn start_new_turn(&self, query: &str, selected: &[AgentId]) -> usize {
        let mut active = self.active.lock().expect("active session poisoned");
        let id = match active.as_ref() {
            Some(id) if self.sessions.contains_key(id) => id.clone(),
            _ => {
                let session = ConsultationSession::new();
                let id = session.id.clone();
                info!("Created consultation session {}", id);
                self.sessions.insert(id.clone(), session);
                *active = Some(id.clone());
                id
            }
        };
        self.last_sync.clear();

        let mut session = self.sessions.get_mut(&id).expect("active session vanished");
        session
            .turns
            .push(DebateTurn::new(query.to_string(), selected.to_vec()));
        session.turns.len() - 1
    }

    /// Upsert the latest accumulated text for one agent into the current
    /// turn only, never a historical turn. Throttled: within the sync
    /// interval for an agent the call is a no-op and returns `false`.
    pub fn update_turn_response(&self, agent: &AgentId, text: &str) -> Result<bool> {
        let now = Instant::now();
        if let Some(last) = self.last_sync.get(agent) {
            if now.duration_since(*last) < self.sync_interval {
                return Ok(false);
            }
        }

        let id = self.active_id().ok_or(Error::NoActiveTurn)?;
        let mut session = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| Error::SessionNotFound(id.clone()))?;
        let turn = session.turns.last_mut().ok_or(Error::NoActiveTurn)?;
        turn.agent_responses
            .insert(agent.clone(), text.to_string());
        self.last_sync.insert(agent.clone(), now);
        Ok(true)
    }

    /// Flag the current turn complete with its final responses and
    /// persist the session.
    pub fn complete_turn(
        &self,
        responses: &BTreeMap<AgentId, String>,
        benchmark: Option<TurnBenchmark>,
    ) -> Result<()> {
        let id = self.active_id().ok_or(Error::NoActiveTurn)?;
        {
            let mut session = self
                .sessions
                .get_mut(&id)
                .ok_or_else(|| Error::SessionNotFound(id.clone()))?;
            let turn = session.turns.last_mut().ok_or(Error::NoActiveTurn)?;
            for (agent, text) in responses {
                turn.agent_responses.insert(agent.clone(), text.clone());
            }
            turn.is_complete = true;
            turn.benchmark = benchmark;
        }
        self.persist_session(&id)
    }

    /// Serialize all complete prior turns into one context string for the
    /// backend. Interrupted turns are excluded; partial output must not
    /// feed the next round.
    pub fn previous_turns_context(&self) -> String {
        let Some(id) = self.active_id() else {
            return String::new();
        };
        let Some(session) = self.sessions.get(&id) else {
            return String::new();
        };

        let mut out = String::new();
        for (i, turn) in session.turns.iter().filter(|t| t.is_complete).enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&format!("Turn {} - Q: {}\n", i + 1, turn.query));
            for (agent, text) in &turn.agent_responses {
                let name = conclave_core::roster::profile(agent.as_str())
                    .map(|p| p.display_name)
                    .unwrap_or(agent.as_str());
                out.push_str(&format!("  {}: {}\n", name, truncate(text, CONTEXT_CHAR_BUDGET)));
            }
        }
        out
    }

    pub fn active_session(&self) -> Option<ConsultationSession> {
        self.active_id()
            .and_then(|id| self.sessions.get(&id).map(|s| s.clone()))
    }

    /// Make an existing session active, to continue it with follow-ups.
    pub fn resume(&self, id: &str) -> Result<()> {
        if !self.sessions.contains_key(id) {
            return Err(Error::SessionNotFound(id.to_string()));
        }
        *self.active.lock().expect("active session poisoned") = Some(id.to_string());
        Ok(())
    }

    pub fn list_sessions(&self) -> Vec<ConsultationSession> {
        let mut sessions: Vec<_> = self.sessions.iter().map(|e| e.value().clone()).collect();
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        sessions
    }

    /// Remove a whole session, including its file on disk.
    pub fn delete_session(&self, id: &str) -> Result<()> {
        self.sessions
            .remove(id)
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))?;
        let mut active = self.active.lock().expect("active session poisoned");
        if active.as_deref() == Some(id) {
            *active = None;
        }
        persist::delete(&self.dir, id)
    }

    fn active_id(&self) -> Option<String> {
        self.active.lock().expect("active session poisoned").clone()
    }

    fn persist_session(&self, id: &str) -> Result<()> {
        let session = self
            .sessions
            .get(id)
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))?;
        persist::save(&self.dir, &session)
    }
}

fn truncate(text: &str, budget: usize) -> String {
    if text.len() <= budget {
        return text.to_string();
    }
    // Cut on a char boundary, then mark the truncation.
    let mut end = budget;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "héllo wörld";
        let t = truncate(s, 2);
        assert!(t.starts_with('h'));
        assert!(t.ends_with('…'));
    }

    #[test]
    fn truncate_leaves_short_text_alone() {
        assert_eq!(truncate("short", 500), "short");
    }
}
