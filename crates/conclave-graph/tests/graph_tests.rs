//! Tests for conclave-graph: placement, edge rules, determinism

use conclave_core::{AgentId, RoundId};
use conclave_graph::{layout, project, relax, EdgeKind};
use conclave_state::{DebateState, FollowUp, StateOp, TurnSummary};
use std::collections::BTreeMap;
use std::time::Instant;

fn id(s: &str) -> AgentId {
    AgentId::new(s)
}

fn give_text(state: &mut DebateState, agent: &str, text: &str) {
    state.apply(StateOp::AppendToken {
        agent: id(agent),
        content: text.to_string(),
        at: Instant::now(),
    });
}

fn finish(state: &mut DebateState, agent: &str) {
    state.apply(StateOp::AgentDone { agent: id(agent) });
}

fn turn(query: &str, pairs: &[(&str, &str)]) -> TurnSummary {
    let responses: BTreeMap<AgentId, String> = pairs
        .iter()
        .map(|(a, t)| (id(a), t.to_string()))
        .collect();
    TurnSummary {
        query: query.to_string(),
        responses,
    }
}

// ===========================================================================
// Node emission and placement
// ===========================================================================

#[test]
fn empty_state_projects_nothing() {
    let projection = project(&DebateState::default());
    assert!(projection.nodes.is_empty());
    assert!(projection.edges.is_empty());
}

#[test]
fn empty_agents_are_never_placeholder_nodes() {
    let mut state = DebateState::default();
    // Activated then finished without producing a single token: not
    // streaming, no content, no node.
    state.apply(StateOp::SetPhase {
        round: RoundId::Opening,
        active: vec![id("analyst")],
    });
    finish(&mut state, "analyst");

    let projection = project(&state);
    assert!(projection.node("analyst").is_none());
}

#[test]
fn streaming_agent_renders_before_first_token() {
    let mut state = DebateState::default();
    state.apply(StateOp::SetPhase {
        round: RoundId::Opening,
        active: vec![id("analyst")],
    });
    let projection = project(&state);
    let node = projection.node("analyst").unwrap();
    assert!(node.is_streaming);
    assert_eq!(node.text, "");
    assert_eq!(node.agent_id, Some(id("analyst")));
}

#[test]
fn live_nodes_use_plain_agent_ids_and_roster_colors() {
    let mut state = DebateState::default();
    give_text(&mut state, "critic", "objection");
    let projection = project(&state);
    let node = projection.node("critic").unwrap();
    assert_eq!(node.color, "#e05252");
    assert_eq!(node.phase, None);
}

#[test]
fn rows_are_centered_on_the_midline() {
    let mut state = DebateState::default();
    give_text(&mut state, "analyst", "a");
    give_text(&mut state, "optimist", "b");

    let projection = project(&state);
    let analyst = projection.node("analyst").unwrap();
    let optimist = projection.node("optimist").unwrap();

    assert_eq!(analyst.y, optimist.y);
    let left = analyst.x.min(optimist.x);
    let right = analyst.x.max(optimist.x) + layout::CARD_WIDTH;
    assert!(((left + right) / 2.0 - layout::CANVAS_MID_X).abs() < 1e-9);
}

#[test]
fn rounds_stack_vertically_by_role() {
    let mut state = DebateState::default();
    give_text(&mut state, "analyst", "opening");
    give_text(&mut state, "critic", "challenge");
    give_text(&mut state, "technical_expert", "analysis");
    give_text(&mut state, "synthesizer", "verdict");

    let projection = project(&state);
    let ys: Vec<f64> = ["analyst", "critic", "technical_expert", "synthesizer"]
        .iter()
        .map(|a| projection.node(a).unwrap().y)
        .collect();
    assert!(ys[0] < ys[1] && ys[1] < ys[2] && ys[2] < ys[3]);
    assert_eq!(ys[1] - ys[0], layout::ROW_HEIGHT);
}

// ===========================================================================
// Determinism
// ===========================================================================

#[test]
fn projection_is_deterministic() {
    let mut state = DebateState::default();
    state.apply(StateOp::StartDebate { query: "q".into() });
    give_text(&mut state, "analyst", "position");
    give_text(&mut state, "critic", "attack");
    give_text(&mut state, "synthesizer", "verdict");
    state.apply(StateOp::AddConstraint {
        text: "stay realistic".into(),
    });
    state.completed_turns.push(turn("old", &[("synthesizer", "v0")]));
    state.follow_up_nodes.push(FollowUp { query: "next".into() });

    let a = project(&state);
    let b = project(&state);
    assert_eq!(a, b);

    let ids_a: Vec<&str> = a.nodes.iter().map(|n| n.id.as_str()).collect();
    let ids_b: Vec<&str> = b.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids_a, ids_b);
    let edges_a: Vec<&str> = a.edges.iter().map(|e| e.id.as_str()).collect();
    let edges_b: Vec<&str> = b.edges.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(edges_a, edges_b);
}

#[test]
fn edge_ids_are_never_duplicated() {
    let mut state = DebateState::default();
    give_text(&mut state, "analyst", "a");
    give_text(&mut state, "optimist", "b");
    give_text(&mut state, "critic", "c");
    give_text(&mut state, "skeptic", "d");
    give_text(&mut state, "technical_expert", "e");
    give_text(&mut state, "market_expert", "f");
    give_text(&mut state, "synthesizer", "g");
    state.apply(StateOp::AddConstraint { text: "x".into() });

    let projection = project(&state);
    let mut seen = std::collections::HashSet::new();
    for edge in &projection.edges {
        assert!(seen.insert(&edge.id), "duplicate edge id {}", edge.id);
    }
}

// ===========================================================================
// Edge rules
// ===========================================================================

#[test]
fn challenger_refutes_its_counterpart() {
    let mut state = DebateState::default();
    give_text(&mut state, "analyst", "the opening position");
    state.apply(StateOp::SetPhase {
        round: RoundId::Challenge,
        active: vec![id("critic")],
    });

    let projection = project(&state);
    let edge = projection.edge("edge-critic-analyst").unwrap();
    assert_eq!(edge.kind, EdgeKind::Refutes);
    assert_eq!(edge.source, "critic");
    assert_eq!(edge.target, "analyst");
}

#[test]
fn refutes_edge_needs_the_counterpart_to_have_spoken() {
    let mut state = DebateState::default();
    // Critic streams but the analyst has not started: no edge yet.
    state.apply(StateOp::SetPhase {
        round: RoundId::Challenge,
        active: vec![id("critic")],
    });
    let projection = project(&state);
    assert!(projection.edge("edge-critic-analyst").is_none());

    // Once the analyst has text, the next projection grows the edge.
    give_text(&mut state, "analyst", "now on record");
    let projection = project(&state);
    assert!(projection.edge("edge-critic-analyst").is_some());
}

#[test]
fn experts_depend_on_the_anchor() {
    let mut state = DebateState::default();
    give_text(&mut state, "analyst", "anchor position");
    give_text(&mut state, "technical_expert", "deep dive");
    give_text(&mut state, "market_expert", "market view");

    let projection = project(&state);
    for expert in ["technical_expert", "market_expert"] {
        let edge = projection.edge(&format!("edge-{}-analyst", expert)).unwrap();
        assert_eq!(edge.kind, EdgeKind::Depends);
    }
}

#[test]
fn experts_without_an_anchor_have_no_dependency() {
    let mut state = DebateState::default();
    give_text(&mut state, "technical_expert", "floating analysis");
    let projection = project(&state);
    assert!(projection.edge("edge-technical_expert-analyst").is_none());
}

#[test]
fn synthesizer_is_supported_by_contributing_experts() {
    let mut state = DebateState::default();
    give_text(&mut state, "technical_expert", "input");
    give_text(&mut state, "synthesizer", "weighing");

    let projection = project(&state);
    let edge = projection.edge("edge-synthesizer-technical_expert").unwrap();
    assert_eq!(edge.kind, EdgeKind::Supports);
    // The silent expert contributes nothing.
    assert!(projection.edge("edge-synthesizer-market_expert").is_none());
}

#[test]
fn constraints_attach_only_to_streaming_agents() {
    let mut state = DebateState::default();
    give_text(&mut state, "analyst", "done talking");
    finish(&mut state, "analyst");
    state.apply(StateOp::SetPhase {
        round: RoundId::Challenge,
        active: vec![id("critic")],
    });
    state.apply(StateOp::AddConstraint {
        text: "budget is frozen".into(),
    });

    let projection = project(&state);
    let node = projection.node("constraint").unwrap();
    assert_eq!(node.text, "budget is frozen");

    let edge = projection.edge("edge-constraint-critic").unwrap();
    assert_eq!(edge.kind, EdgeKind::Constraint);
    assert_eq!(edge.label.as_deref(), Some("budget is frozen"));
    // The analyst finished streaming; constraints only inform what is
    // actively in flight.
    assert!(projection.edge("edge-constraint-analyst").is_none());
}

#[test]
fn no_constraint_node_without_constraints() {
    let mut state = DebateState::default();
    give_text(&mut state, "analyst", "a");
    assert!(project(&state).node("constraint").is_none());
}

// ===========================================================================
// Multi-turn history and follow-up chaining
// ===========================================================================

#[test]
fn historical_turns_render_as_offset_blocks() {
    let mut state = DebateState::default();
    state
        .completed_turns
        .push(turn("old question", &[("analyst", "old answer")]));
    give_text(&mut state, "analyst", "new answer");

    let projection = project(&state);
    let old = projection.node("turn0-analyst").unwrap();
    let live = projection.node("analyst").unwrap();
    assert_eq!(old.text, "old answer");
    assert!(!old.is_streaming);
    assert_eq!(
        live.y - old.y,
        layout::TURN_HEIGHT + layout::FOLLOW_UP_HEIGHT
    );
}

#[test]
fn two_turns_and_one_follow_up_form_exactly_one_chain() {
    let mut state = DebateState::default();
    state.completed_turns.push(turn(
        "first question",
        &[("analyst", "a0"), ("synthesizer", "verdict 0")],
    ));
    state.completed_turns.push(turn(
        "second question",
        &[("analyst", "a1"), ("synthesizer", "verdict 1")],
    ));
    state.follow_up_nodes.push(FollowUp {
        query: "what about costs?".into(),
    });

    let projection = project(&state);
    assert_eq!(projection.node("followup-0").unwrap().text, "what about costs?");

    let depends: Vec<_> = projection
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Depends)
        .collect();
    assert_eq!(depends.len(), 2);
    assert!(projection.edge("edge-turn0-synthesizer-followup-0").is_some());
    assert!(projection.edge("edge-followup-0-turn1-analyst").is_some());
}

#[test]
fn follow_up_chains_into_the_live_turn() {
    let mut state = DebateState::default();
    state
        .completed_turns
        .push(turn("first", &[("synthesizer", "verdict")]));
    state.follow_up_nodes.push(FollowUp { query: "next".into() });
    give_text(&mut state, "analyst", "fresh opening");

    let projection = project(&state);
    assert!(projection.edge("edge-turn0-synthesizer-followup-0").is_some());
    assert!(projection.edge("edge-followup-0-analyst").is_some());
}

#[test]
fn chain_skips_a_turn_whose_synthesizer_was_silent() {
    let mut state = DebateState::default();
    state
        .completed_turns
        .push(turn("first", &[("analyst", "only an opener spoke")]));
    state.follow_up_nodes.push(FollowUp { query: "next".into() });

    let projection = project(&state);
    assert!(projection.node("followup-0").is_some());
    assert!(projection.edge("edge-turn0-synthesizer-followup-0").is_none());
}

// ===========================================================================
// Relaxation stays out of the projection
// ===========================================================================

#[test]
fn relaxation_is_an_explicit_opt_in_pass() {
    let mut state = DebateState::default();
    give_text(&mut state, "analyst", "a");
    give_text(&mut state, "optimist", "b");

    let raw = project(&state);
    let mut relaxed = raw.clone();
    relax::relax(&mut relaxed.nodes, 10);

    // Projection output itself is untouched by the cosmetic pass.
    assert_eq!(project(&state), raw);
    // Nodes spaced wider than the separation threshold do not drift.
    let a = raw.node("analyst").unwrap();
    let b = relaxed.node("analyst").unwrap();
    assert_eq!(a.y, b.y);
}
