//! Fixed semantic layout rules
//!
//! Agents bucket into rows by role: openers, challengers, experts,
//! synthesizer. The defense round reuses the opening agents, so it adds
//! no row of its own. Rows center on a fixed canvas midline; turns stack
//! as whole blocks with a reserved follow-up slot between them.

use conclave_core::roster::{self, AgentRole};

pub const CARD_WIDTH: f64 = 220.0;
pub const CARD_GAP: f64 = 40.0;
pub const ROW_HEIGHT: f64 = 160.0;
pub const TOP_MARGIN: f64 = 80.0;
pub const CANVAS_MID_X: f64 = 640.0;

/// Rows per turn block: openers, challengers, experts, synthesizer.
pub const TURN_ROWS: usize = 4;
pub const TURN_HEIGHT: f64 = TURN_ROWS as f64 * ROW_HEIGHT;
/// Reserved slot for the follow-up ("you") node between turn blocks.
pub const FOLLOW_UP_HEIGHT: f64 = 120.0;

pub const CONSTRAINT_X: f64 = 40.0;

/// Which row of a turn block an agent sits in.
pub fn row_index(role: AgentRole) -> usize {
    match role {
        AgentRole::Opener => 0,
        AgentRole::Challenger => 1,
        AgentRole::Expert => 2,
        AgentRole::Synthesizer => 3,
    }
}

/// Agents of one row, in roster order.
pub fn row_members(row: usize) -> Vec<&'static str> {
    roster::ROSTER
        .iter()
        .filter(|p| row_index(p.role) == row)
        .map(|p| p.id)
        .collect()
}

/// Top y coordinate of a turn block.
pub fn block_y(turn: usize) -> f64 {
    TOP_MARGIN + turn as f64 * (TURN_HEIGHT + FOLLOW_UP_HEIGHT)
}

/// Y of the follow-up slot after a turn block.
pub fn follow_up_y(turn: usize) -> f64 {
    block_y(turn) + TURN_HEIGHT
}

/// X coordinates for a centered row of `count` cards.
pub fn row_positions(count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let width = count as f64 * CARD_WIDTH + (count.saturating_sub(1)) as f64 * CARD_GAP;
    let start = CANVAS_MID_X - width / 2.0;
    (0..count)
        .map(|i| start + i as f64 * (CARD_WIDTH + CARD_GAP))
        .collect()
}
