//! Generation and phase scopes.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use bridge_core::{
    normalize_name, MatchRecord, Participant, ParticipantKey, Phone, RequestUpdate,
    SpecialRequest, SystemState,
};

use crate::proposal::PhaseStats;

/// Read-only snapshot of one generation run plus the state the phases
/// thread through it.
pub struct MatchScope<'s> {
    present: Vec<&'s Participant>,
    requests: &'s [SpecialRequest],
    friend_designated: BTreeSet<ParticipantKey>,
    claimed: BTreeSet<ParticipantKey>,
    records: Vec<MatchRecord>,
    request_updates: Vec<RequestUpdate>,
    stats: Vec<PhaseStats>,
    start_time: Instant,
}

impl<'s> MatchScope<'s> {
    /// Snapshots the checked-in participants (in key order) and request list.
    pub fn new(state: &'s SystemState) -> Self {
        Self {
            present: state.checked_in().collect(),
            requests: state.special_requests(),
            friend_designated: state.ledger().friend_designated(),
            claimed: BTreeSet::new(),
            records: Vec::new(),
            request_updates: Vec::new(),
            stats: Vec::new(),
            start_time: Instant::now(),
        }
    }

    /// Checked-in participants in key order.
    pub fn present(&self) -> &[&'s Participant] {
        &self.present
    }

    pub fn requests(&self) -> &'s [SpecialRequest] {
        self.requests
    }

    /// Checked-in participants not yet claimed by a record this run.
    pub fn unclaimed(&self) -> Vec<&'s Participant> {
        self.present
            .iter()
            .copied()
            .filter(|p| !self.claimed.contains(&p.key))
            .collect()
    }

    /// Unclaimed participants who have never had a friend designation.
    pub fn eligible_for_friends(&self) -> Vec<&'s Participant> {
        self.unclaimed()
            .into_iter()
            .filter(|p| !self.is_friend_designated(&p.key))
            .collect()
    }

    pub fn is_friend_designated(&self, key: &ParticipantKey) -> bool {
        self.friend_designated.contains(key)
    }

    pub fn is_claimed(&self, key: &ParticipantKey) -> bool {
        self.claimed.contains(key)
    }

    /// Checked-in participant whose phone is `phone`.
    pub fn find_by_phone(&self, phone: &Phone) -> Option<&'s Participant> {
        self.present
            .iter()
            .copied()
            .find(|p| p.phone.as_ref() == Some(phone))
    }

    /// Checked-in participant whose normalized full name equals `name`'s.
    pub fn find_by_name(&self, name: &str) -> Option<&'s Participant> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }
        self.present
            .iter()
            .copied()
            .find(|p| p.normalized_name() == wanted)
    }

    /// Appends a record and claims all of its members.
    pub fn accept(&mut self, record: MatchRecord) {
        self.claimed.extend(record.keys().cloned());
        self.records.push(record);
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut Vec<MatchRecord> {
        &mut self.records
    }

    pub(crate) fn claim(&mut self, key: ParticipantKey) {
        self.claimed.insert(key);
    }

    pub fn stage_request_update(&mut self, update: RequestUpdate) {
        self.request_updates.push(update);
    }

    pub fn request_updates(&self) -> &[RequestUpdate] {
        &self.request_updates
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub(crate) fn into_parts(self) -> (Vec<MatchRecord>, Vec<RequestUpdate>, Vec<PhaseStats>) {
        (self.records, self.request_updates, self.stats)
    }
}

/// Scope for a single phase of generation.
pub struct PhaseScope<'a, 's> {
    scope: &'a mut MatchScope<'s>,
    phase_index: usize,
    candidates: u64,
    accepted: u64,
    start_time: Instant,
}

impl<'a, 's> PhaseScope<'a, 's> {
    /// Opens the next phase; its index is the number of phases already finished.
    pub fn new(scope: &'a mut MatchScope<'s>) -> Self {
        let phase_index = scope.stats.len();
        Self {
            scope,
            phase_index,
            candidates: 0,
            accepted: 0,
            start_time: Instant::now(),
        }
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn scope(&self) -> &MatchScope<'s> {
        self.scope
    }

    pub fn scope_mut(&mut self) -> &mut MatchScope<'s> {
        self.scope
    }

    pub fn candidates(&self) -> u64 {
        self.candidates
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn add_candidates(&mut self, count: usize) {
        self.candidates += count as u64;
    }

    /// Accepts a record into the run.
    pub fn accept(&mut self, record: MatchRecord) {
        self.accepted += 1;
        self.scope.accept(record);
    }

    /// Records this phase's statistics on the parent scope.
    pub fn finish(self, phase: &'static str) -> PhaseStats {
        let stats = PhaseStats {
            phase,
            candidates: self.candidates,
            accepted: self.accepted,
            duration: self.start_time.elapsed(),
        };
        self.scope.stats.push(stats.clone());
        stats
    }
}
