//! Connection management for Conclave
//!
//! Owns the duplex transport lifecycle: connect, bounded
//! exponential-backoff reconnect, manual retry, outbound sends, and
//! typed dispatch of inbound frames into the debate store.

pub mod backoff;
pub mod client;
pub mod health;

pub use client::{ClientConfig, DebateClient};
