//! Test utilities for bridge-core
//!
//! Provides participant fixtures used across the crate's test modules.

use crate::participant::{Participant, RosterEntry};
use crate::state::{PaymentPolicy, SystemState};

/// Deterministic phone number for fixture `index`.
pub fn phone_for(index: u32) -> String {
    format!("713555{index:04}")
}

/// A roster entry with a generated phone and no scoring attributes.
pub fn roster_entry(index: u32, name: &str) -> RosterEntry {
    RosterEntry {
        name: name.to_string(),
        phone: Some(phone_for(index)),
        email: Some(format!("{}@rice.edu", name.to_lowercase().replace(' ', "."))),
        gender: Some("Female".into()),
        accepted_genders: vec!["Male".into()],
        ..RosterEntry::default()
    }
}

/// A participant built from [`roster_entry`].
pub fn participant(index: u32, name: &str) -> Participant {
    Participant::new(roster_entry(index, name).parse().unwrap())
}

/// A state holding `names` (indexed from 1), nobody checked in.
pub fn state_with(names: &[&str]) -> SystemState {
    let mut state = SystemState::new(250);
    let roster = names
        .iter()
        .enumerate()
        .map(|(i, name)| roster_entry(i as u32 + 1, name))
        .collect();
    state.merge_roster(roster, &PaymentPolicy::default());
    state
}
