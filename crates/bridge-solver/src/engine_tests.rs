use std::collections::BTreeSet;

use bridge_core::{Lane, MatchKind, ParticipantKey};
use bridge_test::{fixture_time, guest, key, EventBuilder};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::*;

fn engine() -> MatchEngine {
    MatchEngine::new(&MatchingConfig::default())
}

#[test]
fn test_phase_order() {
    assert_eq!(
        engine().phase_names(),
        vec!["Special Requests", "Romantic", "Friend"]
    );
}

#[test]
fn test_insufficient_participants_leaves_state_untouched() {
    let state = EventBuilder::new()
        .present(guest(1, "Ada").woman_seeking_men())
        .absent(guest(2, "Ben").man_seeking_women())
        .request(1, 2)
        .build();
    let before = state.clone();

    let err = engine().generate(&state).unwrap_err();

    assert!(matches!(
        err,
        BridgeError::InsufficientParticipants { checked_in: 1 }
    ));
    assert_eq!(state, before);
}

#[test]
fn test_no_compatible_matches() {
    let state = EventBuilder::new()
        .present(guest(1, "Ada").woman_seeking_men())
        .present(guest(2, "Ben").man_seeking_women())
        .matched(MatchKind::Romantic, &[1, 2])
        .build();

    assert!(matches!(
        engine().generate(&state),
        Err(BridgeError::NoCompatibleMatches)
    ));
}

#[test]
fn test_special_request_at_count_one_fires_and_commits() {
    let mut state = EventBuilder::new()
        .present(guest(1, "Ada").woman_seeking_men())
        .present(guest(2, "Ben").man_seeking_women())
        .matched(MatchKind::Romantic, &[1, 2])
        .request_with_count(1, Some(2), None, 1)
        .build();

    let proposal = engine().generate(&state).unwrap();
    assert_eq!(proposal.count_of(MatchKind::Special), 1);
    assert!(proposal.unmatched.is_empty());

    let number = proposal.commit(&mut state, fixture_time()).unwrap();
    assert_eq!(state.ledger().last_number(), number);
    let request = &state.special_requests()[0];
    assert_eq!(request.consecutive_co_presence_count, 2);
    assert!(request.fulfilled);
}

#[test]
fn test_generation_is_side_effect_free() {
    let state = EventBuilder::new()
        .present(guest(1, "Ada").woman_seeking_men())
        .present(guest(2, "Ben").man_seeking_women())
        .present(guest(3, "Cy").man_seeking_women())
        .request(3, 1)
        .build();
    let before = state.clone();

    let proposal = engine().generate(&state).unwrap();

    assert_eq!(state, before);
    assert_eq!(proposal.base, state.ledger().last_number());
    assert_eq!(proposal.request_updates.len(), 1);
}

#[test]
fn test_stale_proposal_refused() {
    let mut state = EventBuilder::new()
        .present(guest(1, "Ada").woman_seeking_men())
        .present(guest(2, "Ben").man_seeking_women())
        .build();

    let first = engine().generate(&state).unwrap();
    let second = engine().generate(&state).unwrap();
    first.commit(&mut state, fixture_time()).unwrap();

    assert!(matches!(
        second.commit(&mut state, fixture_time()),
        Err(BridgeError::StaleProposal { .. })
    ));
    assert_eq!(state.ledger().len(), 1);
}

#[test]
fn test_commit_clears_undo_slot() {
    let mut state = EventBuilder::new()
        .present(guest(1, "Ada").woman_seeking_men())
        .absent(guest(2, "Ben").man_seeking_women())
        .build();
    state.check_in(&key(2), Lane::Walkin).unwrap();

    engine()
        .generate(&state)
        .unwrap()
        .commit(&mut state, fixture_time())
        .unwrap();

    assert!(state.last_operation().is_none());
    assert!(matches!(state.undo_last(), Err(BridgeError::NothingToUndo)));
}

#[test]
fn test_unmatched_reported() {
    let state = EventBuilder::new()
        .present(guest(1, "Ada").woman_seeking_men())
        .present(guest(2, "Ben").man_seeking_women())
        .present(guest(3, "Cy").man_seeking_women())
        .absent(guest(4, "Dan").man_seeking_women())
        .matched(MatchKind::Friend, &[3, 4])
        .build();

    let proposal = engine().generate(&state).unwrap();

    // Cy's friend designation wins him the only romantic pairing.
    assert_eq!(proposal.unmatched, vec![key(2)]);
    assert_eq!(proposal.stats.len(), 3);
    assert_eq!(proposal.message_count(), 2);
}

#[test]
fn test_random_events_keep_invariants() {
    let genders = ["Male", "Female", "Nonbinary"];
    let grades = ["Freshman", "Sophomore", "Junior", "Senior", ""];
    let mut rng = ChaCha8Rng::seed_from_u64(2025);

    for _ in 0..20 {
        let mut builder = EventBuilder::new();
        for i in 1..=24 {
            let accepted: Vec<&str> = genders
                .iter()
                .copied()
                .filter(|_| rng.random_bool(0.5))
                .collect();
            let g = guest(i, &format!("Guest {i}"))
                .gender(genders[rng.random_range(0..genders.len())])
                .accepts(&accepted)
                .grade(grades[rng.random_range(0..grades.len())])
                .school(["Baker", "Hanszen"][rng.random_range(0..2)]);
            builder = if rng.random_bool(0.8) {
                builder.present(g)
            } else {
                builder.absent(g)
            };
        }
        for _ in 0..4 {
            builder = builder.request(rng.random_range(1..=24), rng.random_range(1..=24));
        }
        let mut state = builder.build();
        let mut engine = engine();

        for _ in 0..6 {
            let history_before = state.clone();
            let proposal = match engine.generate(&state) {
                Ok(proposal) => proposal,
                Err(
                    BridgeError::NoCompatibleMatches
                    | BridgeError::InsufficientParticipants { .. },
                ) => break,
                Err(other) => panic!("unexpected error: {other}"),
            };

            let mut seen: BTreeSet<ParticipantKey> = BTreeSet::new();
            for record in &proposal.records {
                assert!(matches!(record.members.len(), 2 | 3));
                for member in record.keys() {
                    assert!(seen.insert(member.clone()), "{member} claimed twice");
                }
                if matches!(record.kind, MatchKind::Romantic | MatchKind::Friend) {
                    for (a, b) in record.links() {
                        let a = history_before.participant(a).unwrap();
                        assert!(!a.has_matched_with(b), "non-special rematch");
                    }
                }
            }

            proposal.commit(&mut state, fixture_time()).unwrap();
            for participant in state.participants() {
                for partner in &participant.match_history {
                    assert!(state
                        .participant(partner)
                        .unwrap()
                        .has_matched_with(&participant.key));
                }
            }
        }
    }
}
