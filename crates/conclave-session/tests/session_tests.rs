//! Tests for conclave-session: turns, context building, persistence, roster rules

use conclave_core::{AgentId, Error};
use conclave_session::{AgentSelection, ConsultationStore, TurnBenchmark};
use std::collections::BTreeMap;
use std::time::Duration;
use tempfile::TempDir;

fn id(s: &str) -> AgentId {
    AgentId::new(s)
}

fn store(dir: &TempDir) -> ConsultationStore {
    ConsultationStore::new(dir.path()).with_sync_interval(Duration::ZERO)
}

fn responses(pairs: &[(&str, &str)]) -> BTreeMap<AgentId, String> {
    pairs
        .iter()
        .map(|(a, t)| (id(a), t.to_string()))
        .collect()
}

// ===========================================================================
// Turn lifecycle
// ===========================================================================

#[test]
fn first_turn_creates_session_lazily() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    assert!(store.active_session().is_none());

    let turn = store.start_new_turn("Should we expand?", &[id("analyst")]);
    assert_eq!(turn, 0);

    let session = store.active_session().unwrap();
    assert_eq!(session.turns.len(), 1);
    assert_eq!(session.turns[0].query, "Should we expand?");
    assert!(!session.turns[0].is_complete);
    assert_eq!(session.turns[0].selected_agents, vec![id("analyst")]);
}

#[test]
fn second_turn_appends_to_same_session() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.start_new_turn("first", &[]);
    let turn = store.start_new_turn("second", &[]);
    assert_eq!(turn, 1);
    assert_eq!(store.active_session().unwrap().turns.len(), 2);
}

#[test]
fn update_targets_only_the_current_turn() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.start_new_turn("first", &[]);
    store.update_turn_response(&id("analyst"), "first answer").unwrap();
    store.complete_turn(&responses(&[("analyst", "first answer")]), None).unwrap();

    store.start_new_turn("second", &[]);
    store.update_turn_response(&id("analyst"), "second answer").unwrap();

    let session = store.active_session().unwrap();
    assert_eq!(session.turns[0].agent_responses[&id("analyst")], "first answer");
    assert_eq!(session.turns[1].agent_responses[&id("analyst")], "second answer");
}

#[test]
fn update_without_a_turn_is_an_error() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let err = store.update_turn_response(&id("analyst"), "text").unwrap_err();
    assert!(matches!(err, Error::NoActiveTurn));
}

#[test]
fn update_is_throttled_per_agent() {
    let dir = TempDir::new().unwrap();
    let store = ConsultationStore::new(dir.path()).with_sync_interval(Duration::from_secs(60));
    store.start_new_turn("q", &[]);

    assert!(store.update_turn_response(&id("analyst"), "one").unwrap());
    // Within the interval the same agent's write is skipped...
    assert!(!store.update_turn_response(&id("analyst"), "two").unwrap());
    // ...but another agent syncs independently.
    assert!(store.update_turn_response(&id("critic"), "other").unwrap());

    let session = store.active_session().unwrap();
    assert_eq!(session.turns[0].agent_responses[&id("analyst")], "one");
}

#[test]
fn complete_turn_writes_final_responses() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.start_new_turn("q", &[]);
    store.update_turn_response(&id("analyst"), "partial").unwrap();

    store
        .complete_turn(
            &responses(&[("analyst", "full final answer"), ("synthesizer", "verdict")]),
            Some(TurnBenchmark {
                total_tokens: 512,
                duration_seconds: 12.0,
            }),
        )
        .unwrap();

    let session = store.active_session().unwrap();
    let turn = &session.turns[0];
    assert!(turn.is_complete);
    assert_eq!(turn.agent_responses[&id("analyst")], "full final answer");
    assert_eq!(turn.benchmark.unwrap().total_tokens, 512);
}

// ===========================================================================
// Prior-turn context
// ===========================================================================

#[test]
fn context_includes_only_complete_turns() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.start_new_turn("answered question", &[]);
    store
        .complete_turn(&responses(&[("analyst", "solid answer")]), None)
        .unwrap();

    store.start_new_turn("interrupted question", &[]);
    store.update_turn_response(&id("analyst"), "partial junk").unwrap();

    let context = store.previous_turns_context();
    assert!(context.contains("answered question"));
    assert!(context.contains("solid answer"));
    assert!(!context.contains("interrupted question"));
    assert!(!context.contains("partial junk"));
}

#[test]
fn context_truncates_long_responses() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.start_new_turn("q", &[]);
    let long = "x".repeat(2000);
    store.complete_turn(&responses(&[("analyst", &long)]), None).unwrap();

    let context = store.previous_turns_context();
    assert!(context.contains('…'));
    // Budget plus framing, nowhere near the raw 2000 chars.
    assert!(context.len() < 700, "context too long: {}", context.len());
}

#[test]
fn context_uses_display_names() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.start_new_turn("q", &[]);
    store
        .complete_turn(&responses(&[("technical_expert", "feasible")]), None)
        .unwrap();
    assert!(store.previous_turns_context().contains("Technical Expert: feasible"));
}

#[test]
fn context_is_empty_without_a_session() {
    let dir = TempDir::new().unwrap();
    assert_eq!(store(&dir).previous_turns_context(), "");
}

// ===========================================================================
// Persistence
// ===========================================================================

#[test]
fn completed_sessions_survive_a_reload() {
    let dir = TempDir::new().unwrap();
    let session_id;
    {
        let store = store(&dir);
        store.start_new_turn("persistent question", &[id("analyst"), id("synthesizer")]);
        store
            .complete_turn(&responses(&[("analyst", "kept on disk")]), None)
            .unwrap();
        session_id = store.active_session().unwrap().id;
    }

    let reloaded = ConsultationStore::load(dir.path()).unwrap();
    let sessions = reloaded.list_sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, session_id);
    assert_eq!(sessions[0].turns[0].query, "persistent question");
    assert!(sessions[0].turns[0].is_complete);

    // Resuming makes it the active session for follow-ups.
    reloaded.resume(&session_id).unwrap();
    assert!(reloaded.previous_turns_context().contains("kept on disk"));
}

#[test]
fn corrupt_session_files_are_skipped() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    let store = ConsultationStore::load(dir.path()).unwrap();
    assert!(store.list_sessions().is_empty());
}

#[test]
fn delete_session_removes_the_file() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.start_new_turn("q", &[]);
    store.complete_turn(&responses(&[("analyst", "a")]), None).unwrap();
    let session_id = store.active_session().unwrap().id;
    let path = dir.path().join(format!("{}.json", session_id));
    assert!(path.exists());

    store.delete_session(&session_id).unwrap();
    assert!(!path.exists());
    assert!(store.active_session().is_none());
}

#[test]
fn resume_unknown_session_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = store(&dir).resume("no-such-id").unwrap_err();
    assert!(matches!(err, Error::SessionNotFound(_)));
}

// ===========================================================================
// Roster selection
// ===========================================================================

#[test]
fn selection_defaults_to_full_roster() {
    let selection = AgentSelection::all();
    assert_eq!(selection.len(), 8);
    assert!(selection.is_selected(&id("synthesizer")));
}

#[test]
fn synthesizer_can_never_be_deselected() {
    let mut selection = AgentSelection::all();
    assert!(!selection.deselect(&id("synthesizer")));
    assert!(selection.is_selected(&id("synthesizer")));
    assert!(!selection.toggle(&id("synthesizer")));
    assert!(selection.is_selected(&id("synthesizer")));
}

#[test]
fn selection_never_drops_below_two() {
    let mut selection = AgentSelection::all();
    for agent in ["analyst", "optimist", "pragmatist", "critic", "skeptic", "technical_expert"] {
        selection.deselect(&id(agent));
    }
    assert_eq!(selection.len(), 2);
    // market_expert is the last removable agent; removing it would leave
    // only the synthesizer.
    assert!(!selection.deselect(&id("market_expert")));
    assert_eq!(selection.len(), 2);
}

#[test]
fn toggle_round_trips() {
    let mut selection = AgentSelection::all();
    assert!(selection.toggle(&id("critic")));
    assert!(!selection.is_selected(&id("critic")));
    assert!(selection.toggle(&id("critic")));
    assert!(selection.is_selected(&id("critic")));
}

#[test]
fn unknown_agents_cannot_be_selected() {
    let mut selection = AgentSelection::all();
    assert!(!selection.select(&id("intruder")));
    assert_eq!(selection.len(), 8);
}
