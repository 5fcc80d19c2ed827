use bridge_core::{MatchKind, SystemState};
use bridge_test::{guest, key, EventBuilder};

use super::*;

fn run(state: &SystemState, threshold: u32) -> (Vec<MatchRecord>, Vec<RequestUpdate>) {
    let mut scope = MatchScope::new(state);
    SpecialRequestPhase::new(threshold).solve(&mut scope);
    (scope.records().to_vec(), scope.request_updates().to_vec())
}

fn pair() -> EventBuilder {
    EventBuilder::new()
        .present(guest(1, "Ada Park").woman_seeking_men())
        .present(guest(2, "Ben Cho").man_seeking_women())
}

#[test]
fn test_first_co_presence_only_stages_counter() {
    let state = pair().request(1, 2).build();

    let (records, updates) = run(&state, 2);

    assert!(records.is_empty());
    assert_eq!(updates.len(), 1);
    assert!(!updates[0].fulfill);
}

#[test]
fn test_fires_at_threshold_despite_history() {
    let state = pair()
        .matched(MatchKind::Romantic, &[1, 2])
        .request_with_count(1, Some(2), None, 1)
        .build();

    let (records, updates) = run(&state, 2);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, MatchKind::Special);
    assert_eq!(records[0].score, SPECIAL_SCORE);
    assert!(records[0].contains(&key(1)) && records[0].contains(&key(2)));
    assert!(updates[0].fulfill);
}

#[test]
fn test_lower_threshold_fires_immediately() {
    let state = pair().request(1, 2).build();

    let (records, _) = run(&state, 1);
    assert_eq!(records.len(), 1);
}

#[test]
fn test_requested_resolved_by_normalized_name() {
    let state = pair()
        .request_with_count(1, None, Some("  ben   CHO "), 1)
        .build();

    let (records, _) = run(&state, 2);

    assert_eq!(records.len(), 1);
    assert!(records[0].contains(&key(2)));
}

#[test]
fn test_partial_name_does_not_resolve() {
    let state = pair().request_with_count(1, None, Some("Ben"), 1).build();

    let (records, updates) = run(&state, 2);
    assert!(records.is_empty());
    assert!(updates.is_empty());
}

#[test]
fn test_absent_party_does_not_advance() {
    let state = EventBuilder::new()
        .present(guest(1, "Ada").woman_seeking_men())
        .absent(guest(2, "Ben").man_seeking_women())
        .present(guest(3, "Cy").man_seeking_women())
        .request_with_count(1, Some(2), None, 1)
        .build();

    let (records, updates) = run(&state, 2);
    assert!(records.is_empty());
    assert!(updates.is_empty());
}

#[test]
fn test_self_request_never_resolves() {
    let state = pair().request_with_count(1, Some(1), None, 5).build();

    let (records, updates) = run(&state, 2);
    assert!(records.is_empty());
    assert!(updates.is_empty());
}

#[test]
fn test_mutual_requests_emit_one_record() {
    let state = pair()
        .request_with_count(1, Some(2), None, 1)
        .request_with_count(2, Some(1), None, 1)
        .build();

    let (records, updates) = run(&state, 2);

    assert_eq!(records.len(), 1);
    assert_eq!(updates.len(), 2);
    assert!(updates.iter().all(|u| u.fulfill));
}

#[test]
fn test_claimed_party_waits_for_later_run() {
    let state = pair()
        .present(guest(3, "Cy").woman_seeking_men())
        .request_with_count(1, Some(2), None, 1)
        .request_with_count(3, Some(2), None, 1)
        .build();

    let (records, updates) = run(&state, 2);

    assert_eq!(records.len(), 1);
    assert!(!records[0].contains(&key(3)));
    assert_eq!(updates.len(), 2);
    assert!(updates[0].fulfill);
    assert!(!updates[1].fulfill);
}

#[test]
fn test_fulfilled_requests_skipped() {
    let mut state = pair().request_with_count(1, Some(2), None, 1).build();
    let mut scope = MatchScope::new(&state);
    SpecialRequestPhase::new(2).solve(&mut scope);
    let (records, updates, _) = scope.into_parts();
    let base = state.ledger().last_number();
    state
        .commit_batch(base, records, &updates, bridge_test::fixture_time())
        .unwrap();
    assert!(state.special_requests()[0].fulfilled);

    let (records, updates) = run(&state, 2);
    assert!(records.is_empty());
    assert!(updates.is_empty());
}
