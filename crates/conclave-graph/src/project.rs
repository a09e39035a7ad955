//! The projection itself — state in, nodes and edges out

use crate::layout;
use crate::model::{EdgeKind, GraphEdge, GraphNode, Projection};
use conclave_core::roster::{self, ANCHOR_AGENT, SYNTHESIZER};
use conclave_core::{AgentId, RoundId};
use conclave_state::{AgentRecord, DebateState, TurnSummary};
use std::collections::BTreeSet;

const FOLLOW_UP_COLOR: &str = "#6b7280";
const CONSTRAINT_COLOR: &str = "#d97706";

/// Project debate state into a positioned node list and semantic edge
/// list. Deterministic: identical state yields identical ids and
/// coordinates.
pub fn project(state: &DebateState) -> Projection {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut edge_ids = BTreeSet::new();

    let live_turn = state.completed_turns.len();

    // Historical turn blocks, oldest first.
    for (turn_idx, turn) in state.completed_turns.iter().enumerate() {
        emit_turn_block(&mut nodes, turn_idx, turn);
    }

    // The live block sits beneath the history.
    emit_live_block(&mut nodes, state, live_turn);

    // Edge rules, in fixed order; the first writer of an id wins.
    challenge_edges(state, &mut edges, &mut edge_ids);
    expert_edges(state, &mut edges, &mut edge_ids);
    synthesis_edges(state, &mut edges, &mut edge_ids);
    constraint_edges(state, live_turn, &mut nodes, &mut edges, &mut edge_ids);
    follow_up_chain(state, live_turn, &mut nodes, &mut edges, &mut edge_ids);

    Projection { nodes, edges }
}

fn push_edge(edges: &mut Vec<GraphEdge>, seen: &mut BTreeSet<String>, edge: GraphEdge) {
    if seen.insert(edge.id.clone()) {
        edges.push(edge);
    }
}

/// A live agent is rendered when it has output or is about to produce
/// some, never as an empty placeholder.
fn renders(record: &AgentRecord) -> bool {
    record.has_content() || record.is_streaming
}

fn live_agent<'a>(state: &'a DebateState, id: &str) -> Option<&'a AgentRecord> {
    state.agent(&AgentId::new(id))
}

fn emit_turn_block(nodes: &mut Vec<GraphNode>, turn_idx: usize, turn: &TurnSummary) {
    let base_y = layout::block_y(turn_idx);
    for row in 0..layout::TURN_ROWS {
        let members: Vec<&str> = layout::row_members(row)
            .into_iter()
            .filter(|id| {
                turn.responses
                    .get(&AgentId::new(*id))
                    .map(|t| !t.is_empty())
                    .unwrap_or(false)
            })
            .collect();
        let xs = layout::row_positions(members.len());
        for (id, x) in members.iter().zip(xs) {
            let profile = roster::profile(id).expect("row member is in roster");
            nodes.push(GraphNode {
                id: format!("turn{}-{}", turn_idx, id),
                agent_id: Some(AgentId::new(*id)),
                text: turn.responses[&AgentId::new(*id)].clone(),
                x,
                y: base_y + row as f64 * layout::ROW_HEIGHT,
                color: profile.color.to_string(),
                phase: Some(bucket_round(row)),
                is_streaming: false,
            });
        }
    }
}

fn emit_live_block(nodes: &mut Vec<GraphNode>, state: &DebateState, live_turn: usize) {
    let base_y = layout::block_y(live_turn);
    for row in 0..layout::TURN_ROWS {
        let members: Vec<&AgentRecord> = layout::row_members(row)
            .into_iter()
            .filter_map(|id| live_agent(state, id))
            .filter(|r| renders(r))
            .collect();
        let xs = layout::row_positions(members.len());
        for (record, x) in members.iter().zip(xs) {
            nodes.push(GraphNode {
                id: record.id.as_str().to_string(),
                agent_id: Some(record.id.clone()),
                text: record.text.clone(),
                x,
                y: base_y + row as f64 * layout::ROW_HEIGHT,
                color: record.color.clone(),
                phase: record.phase,
                is_streaming: record.is_streaming,
            });
        }
    }
}

/// The round a row represents, for node metadata on historical blocks.
fn bucket_round(row: usize) -> RoundId {
    match row {
        0 => RoundId::Opening,
        1 => RoundId::Challenge,
        2 => RoundId::ExpertAnalysis,
        _ => RoundId::FinalVerdict,
    }
}

/// Rule 1: a challenger with content/streaming refutes its opening
/// counterpart, once that counterpart has said something.
fn challenge_edges(
    state: &DebateState,
    edges: &mut Vec<GraphEdge>,
    seen: &mut BTreeSet<String>,
) {
    for id in roster::round_members(RoundId::Challenge) {
        let Some(challenger) = live_agent(state, id) else {
            continue;
        };
        if !renders(challenger) {
            continue;
        }
        let Some(counterpart) = roster::challenger_counterpart(id) else {
            continue;
        };
        if live_agent(state, counterpart).map(|r| r.has_content()) == Some(true) {
            push_edge(edges, seen, GraphEdge::new(*id, counterpart, EdgeKind::Refutes));
        }
    }
}

/// Rule 2: each expert with content/streaming depends on the round-1
/// anchor's position.
fn expert_edges(state: &DebateState, edges: &mut Vec<GraphEdge>, seen: &mut BTreeSet<String>) {
    let anchor_has_content =
        live_agent(state, ANCHOR_AGENT).map(|r| r.has_content()) == Some(true);
    if !anchor_has_content {
        return;
    }
    for id in roster::round_members(RoundId::ExpertAnalysis) {
        if live_agent(state, id).map(renders) == Some(true) {
            push_edge(edges, seen, GraphEdge::new(*id, ANCHOR_AGENT, EdgeKind::Depends));
        }
    }
}

/// Rule 3: the synthesizer's verdict is supported by every expert that
/// contributed.
fn synthesis_edges(
    state: &DebateState,
    edges: &mut Vec<GraphEdge>,
    seen: &mut BTreeSet<String>,
) {
    if live_agent(state, SYNTHESIZER).map(renders) != Some(true) {
        return;
    }
    for id in roster::round_members(RoundId::ExpertAnalysis) {
        if live_agent(state, id).map(|r| r.has_content()) == Some(true) {
            push_edge(edges, seen, GraphEdge::new(SYNTHESIZER, *id, EdgeKind::Supports));
        }
    }
}

/// Rule 4: constraints inform only what is actively in flight.
fn constraint_edges(
    state: &DebateState,
    live_turn: usize,
    nodes: &mut Vec<GraphNode>,
    edges: &mut Vec<GraphEdge>,
    seen: &mut BTreeSet<String>,
) {
    if state.constraints.is_empty() {
        return;
    }
    let text = state
        .active_constraint
        .clone()
        .or_else(|| state.constraints.last().cloned())
        .unwrap_or_default();
    nodes.push(GraphNode {
        id: "constraint".to_string(),
        agent_id: None,
        text: text.clone(),
        x: layout::CONSTRAINT_X,
        y: layout::block_y(live_turn) + layout::ROW_HEIGHT,
        color: CONSTRAINT_COLOR.to_string(),
        phase: None,
        is_streaming: false,
    });
    for record in state.agents.values() {
        if record.is_streaming {
            push_edge(
                edges,
                seen,
                GraphEdge::new("constraint", record.id.as_str(), EdgeKind::Constraint)
                    .with_label(text.clone()),
            );
        }
    }
}

/// Rule 5: each completed turn's synthesizer chains through the user's
/// follow-up question into the next turn's opening agents.
fn follow_up_chain(
    state: &DebateState,
    live_turn: usize,
    nodes: &mut Vec<GraphNode>,
    edges: &mut Vec<GraphEdge>,
    seen: &mut BTreeSet<String>,
) {
    for (i, follow_up) in state.follow_up_nodes.iter().enumerate() {
        let follow_id = format!("followup-{}", i);
        nodes.push(GraphNode {
            id: follow_id.clone(),
            agent_id: None,
            text: follow_up.query.clone(),
            x: layout::CANVAS_MID_X - layout::CARD_WIDTH / 2.0,
            y: layout::follow_up_y(i),
            color: FOLLOW_UP_COLOR.to_string(),
            phase: None,
            is_streaming: false,
        });

        // Completed turn i's synthesizer anchors the chain.
        let synth_spoke = state
            .completed_turns
            .get(i)
            .and_then(|t| t.responses.get(&AgentId::new(SYNTHESIZER)))
            .map(|t| !t.is_empty())
            .unwrap_or(false);
        if synth_spoke {
            push_edge(
                edges,
                seen,
                GraphEdge::new(
                    format!("turn{}-{}", i, SYNTHESIZER),
                    follow_id.clone(),
                    EdgeKind::Depends,
                ),
            );
        }

        // ...and the chain feeds the next turn's openers.
        let next = i + 1;
        if next < state.completed_turns.len() {
            let turn = &state.completed_turns[next];
            for id in roster::round_members(RoundId::Opening) {
                let spoke = turn
                    .responses
                    .get(&AgentId::new(*id))
                    .map(|t| !t.is_empty())
                    .unwrap_or(false);
                if spoke {
                    push_edge(
                        edges,
                        seen,
                        GraphEdge::new(
                            follow_id.clone(),
                            format!("turn{}-{}", next, id),
                            EdgeKind::Depends,
                        ),
                    );
                }
            }
        } else if next == live_turn {
            for id in roster::round_members(RoundId::Opening) {
                if live_agent(state, id).map(renders) == Some(true) {
                    push_edge(
                        edges,
                        seen,
                        GraphEdge::new(follow_id.clone(), *id, EdgeKind::Depends),
                    );
                }
            }
        }
    }
}
