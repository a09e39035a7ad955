//! Graph projection for Conclave
//!
//! A pure function from debate state to a positioned node list and a
//! semantic edge list. Given identical inputs the projection is
//! byte-identical: no randomness, no clock, ordered iteration only. The
//! optional relaxation pass in [`relax`] is cosmetic and never runs
//! inside the projection itself.

pub mod layout;
pub mod model;
pub mod project;
pub mod relax;

pub use model::{EdgeKind, GraphEdge, GraphNode, Projection};
pub use project::project;
