//! Consultation sessions for Conclave — turns, history, persistence
//!
//! A consultation session owns an ordered list of turns; each turn is one
//! question-and-full-debate cycle. Sessions persist as one JSON document
//! per session under a local data directory; there is no external
//! database.

pub mod persist;
pub mod selection;
pub mod store;

pub use selection::AgentSelection;
pub use store::{ConsultationSession, ConsultationStore, DebateTurn, TurnBenchmark};
