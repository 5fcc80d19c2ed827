//! Whole-event fixtures.
//!
//! # Example
//!
//! ```
//! use bridge_test::{guest, key, EventBuilder};
//!
//! let state = EventBuilder::new()
//!     .present(guest(1, "Ada").woman_seeking_men())
//!     .present(guest(2, "Ben").man_seeking_women())
//!     .absent(guest(3, "Cy").man_seeking_women())
//!     .build();
//! assert_eq!(state.checked_in().count(), 2);
//! assert!(!state.participant(&key(3)).unwrap().checked_in);
//! ```

use chrono::{DateTime, TimeZone, Utc};

use bridge_core::{
    BlockReason, Lane, MatchKind, MatchRecord, PaymentPolicy, SpecialRequestEntry, SystemState,
};

use crate::guest::{key, phone_for, GuestBuilder};

/// Fixed timestamp used for fixture batches.
pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 7, 21, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Builds a [`SystemState`] through the public store operations.
#[derive(Debug, Default)]
pub struct EventBuilder {
    guests: Vec<(GuestBuilder, bool)>,
    past: Vec<(MatchKind, Vec<u32>)>,
    requests: Vec<(SpecialRequestEntry, u32)>,
    exemptions: Vec<String>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a guest who will be checked in (in insertion order, standard lane).
    pub fn present(mut self, guest: GuestBuilder) -> Self {
        self.guests.push((guest, true));
        self
    }

    /// Adds a guest who stays on the roster without checking in.
    pub fn absent(mut self, guest: GuestBuilder) -> Self {
        self.guests.push((guest, false));
        self
    }

    /// Records a past batch containing one record over fixture indices.
    pub fn matched(mut self, kind: MatchKind, members: &[u32]) -> Self {
        self.past.push((kind, members.to_vec()));
        self
    }

    /// Adds a request from fixture `from` to fixture `to` by phone.
    pub fn request(self, from: u32, to: u32) -> Self {
        self.request_with_count(from, Some(to), None, 0)
    }

    /// Adds a request whose counter has already advanced `count` times.
    pub fn request_with_count(
        mut self,
        from: u32,
        to: Option<u32>,
        requested_name: Option<&str>,
        count: u32,
    ) -> Self {
        let entry = SpecialRequestEntry {
            requester_phone: phone_for(from),
            requester_name: format!("guest {from}"),
            requested_phone: to.map(phone_for),
            requested_name: requested_name.map(str::to_string),
        };
        self.requests.push((entry, count));
        self
    }

    pub fn exempt(mut self, entry: &str) -> Self {
        self.exemptions.push(entry.to_string());
        self
    }

    /// Merges the roster, replays past batches, advances request counters,
    /// then checks guests in.
    ///
    /// # Panics
    ///
    /// If a fixture refers to an index that is not on the roster.
    pub fn build(self) -> SystemState {
        let mut state = SystemState::default();
        let roster = self.guests.iter().map(|(g, _)| g.clone().build()).collect();
        state.merge_roster(roster, &PaymentPolicy::new(&self.exemptions));
        state.merge_special_requests(self.requests.iter().map(|(e, _)| e.clone()).collect());

        // Past batches are committed while everyone is out, so the
        // wristbands issued below follow insertion order.
        for (kind, members) in &self.past {
            let participants: Vec<_> = members
                .iter()
                .map(|&i| {
                    state
                        .participant(&key(i))
                        .cloned()
                        .unwrap_or_else(|| panic!("fixture index {i} not on roster"))
                })
                .collect();
            let mut record = match kind {
                MatchKind::Friend | MatchKind::FriendGroup => MatchRecord::friend(
                    &participants[0],
                    &participants[1],
                    0,
                    BlockReason::GenderPreference,
                ),
                _ => MatchRecord::pair(*kind, &participants[0], &participants[1], 0),
            };
            if let Some(third) = participants.get(2) {
                record = record.into_group(third);
            }
            let base = state.ledger().last_number();
            state
                .commit_batch(base, vec![record], &[], fixture_time())
                .unwrap_or_else(|err| panic!("fixture batch rejected: {err}"));
        }

        for (entry, count) in &self.requests {
            let Ok(request) = entry.clone().parse() else {
                continue;
            };
            let update = bridge_core::RequestUpdate {
                identity: request.identity(),
                fulfill: false,
            };
            for _ in 0..*count {
                let base = state.ledger().last_number();
                state
                    .commit_batch(base, Vec::new(), std::slice::from_ref(&update), fixture_time())
                    .unwrap_or_else(|err| panic!("fixture request rejected: {err}"));
            }
        }

        for (guest, present) in &self.guests {
            if *present {
                state
                    .check_in(&key(guest.index()), Lane::Standard)
                    .unwrap_or_else(|err| panic!("fixture check-in failed: {err}"));
            }
        }
        state
    }
}
