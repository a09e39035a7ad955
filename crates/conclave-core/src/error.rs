//! Error types for Conclave

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    #[error("reconnect retries exhausted after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("agent failed: {agent} - {message}")]
    AgentFailed { agent: String, message: String },

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("no active turn")]
    NoActiveTurn,

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn agent_failed(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AgentFailed {
            agent: agent.into(),
            message: message.into(),
        }
    }

    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame(message.into())
    }
}
