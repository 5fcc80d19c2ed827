//! The aggregate root: participants, requests, ledger and counters.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::allocator::Lane;
use crate::error::{BridgeError, Result};
use crate::ledger::{BatchLedger, MatchRecord};
use crate::participant::{Participant, ParticipantAttributes, ParticipantKey, RosterEntry};
use crate::request::{RequestIdentity, SpecialRequest, SpecialRequestEntry};

/// Default first number of the walk-in wristband range.
pub const DEFAULT_WALKIN_START: u32 = 250;

/// The two monotonic wristband counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WristbandCounters {
    pub next_standard: u32,
    pub next_walkin: u32,
    pub walkin_start: u32,
}

impl WristbandCounters {
    pub fn new(walkin_start: u32) -> Self {
        Self {
            next_standard: 1,
            next_walkin: walkin_start,
            walkin_start,
        }
    }
}

impl Default for WristbandCounters {
    fn default() -> Self {
        Self::new(DEFAULT_WALKIN_START)
    }
}

/// Kind of the undoable operation held in the single undo slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum OperationKind {
    CheckIn { lane: Lane },
    CheckOut,
}

/// The single-slot undo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastOperation {
    #[serde(flatten)]
    pub kind: OperationKind,
    pub key: ParticipantKey,
}

/// Who is exempt from the entry fee.
///
/// Entries are compared lower-cased against the participant key, email,
/// and underscore-joined name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentPolicy {
    exemptions: BTreeSet<String>,
}

impl PaymentPolicy {
    pub fn new<I, S>(exemptions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            exemptions: exemptions
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    pub fn is_exempt(&self, participant: &Participant) -> bool {
        let slug = participant
            .name
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("_");
        self.exemptions.contains(&participant.key.as_str().to_lowercase())
            || participant
                .email
                .as_deref()
                .is_some_and(|e| self.exemptions.contains(&e.to_lowercase()))
            || self.exemptions.contains(&slug)
    }
}

/// A roster record that failed validation.
#[derive(Debug)]
pub struct RejectedEntry {
    pub name: String,
    pub error: BridgeError,
}

/// Outcome of [`SystemState::merge_roster`].
#[derive(Debug, Default)]
pub struct RosterMergeReport {
    pub added: usize,
    pub updated: usize,
    pub removed: Vec<ParticipantKey>,
    pub rejected: Vec<RejectedEntry>,
}

/// Outcome of [`SystemState::merge_special_requests`].
#[derive(Debug, Default)]
pub struct RequestMergeReport {
    pub added: usize,
    pub updated: usize,
    pub rejected: Vec<RejectedEntry>,
}

/// A staged change to one special request, applied on commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUpdate {
    pub identity: RequestIdentity,
    pub fulfill: bool,
}

/// Restricts [`SystemState::search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    All,
    CheckedIn,
}

/// Aggregate counts for the operator status view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub total: usize,
    pub checked_in: usize,
    pub checked_in_by_gender: BTreeMap<String, usize>,
    pub batches: usize,
    pub batches_dispatched: usize,
    pub records: usize,
    pub never_matched_checked_in: usize,
    /// Number of participants per history size.
    pub match_distribution: BTreeMap<usize, usize>,
    pub payment_owed: usize,
    pub payment_exempt: usize,
}

/// Whole persisted event state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemState {
    participants: BTreeMap<ParticipantKey, Participant>,
    #[serde(default)]
    special_requests: Vec<SpecialRequest>,
    #[serde(default)]
    batches: BatchLedger,
    #[serde(default)]
    counters: WristbandCounters,
    /// Every number ever handed out, whether drawn or set by an edit.
    #[serde(default)]
    issued_wristbands: BTreeSet<u32>,
    #[serde(default)]
    last_operation: Option<LastOperation>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl Default for SystemState {
    fn default() -> Self {
        Self::new(DEFAULT_WALKIN_START)
    }
}

impl SystemState {
    /// Creates an empty state whose walk-in range starts at `walkin_start`.
    pub fn new(walkin_start: u32) -> Self {
        Self {
            participants: BTreeMap::new(),
            special_requests: Vec::new(),
            batches: BatchLedger::new(),
            counters: WristbandCounters::new(walkin_start),
            issued_wristbands: BTreeSet::new(),
            last_operation: None,
            updated_at: None,
        }
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    pub fn participant(&self, key: &ParticipantKey) -> Option<&Participant> {
        self.participants.get(key)
    }

    pub(crate) fn participant_mut(&mut self, key: &ParticipantKey) -> Result<&mut Participant> {
        self.participants
            .get_mut(key)
            .ok_or_else(|| BridgeError::UnknownParticipant(key.clone()))
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Checked-in participants in key order.
    pub fn checked_in(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values().filter(|p| p.checked_in)
    }

    pub fn special_requests(&self) -> &[SpecialRequest] {
        &self.special_requests
    }

    pub fn ledger(&self) -> &BatchLedger {
        &self.batches
    }

    pub fn ledger_mut(&mut self) -> &mut BatchLedger {
        &mut self.batches
    }

    pub fn counters(&self) -> WristbandCounters {
        self.counters
    }

    pub(crate) fn counters_mut(&mut self) -> &mut WristbandCounters {
        &mut self.counters
    }

    /// True once `number` has been issued to anyone since the last reset.
    pub fn was_issued(&self, number: u32) -> bool {
        self.issued_wristbands.contains(&number)
    }

    pub(crate) fn record_issued(&mut self, number: u32) {
        self.issued_wristbands.insert(number);
    }

    pub fn last_operation(&self) -> Option<&LastOperation> {
        self.last_operation.as_ref()
    }

    pub(crate) fn set_last_operation(&mut self, operation: Option<LastOperation>) {
        self.last_operation = operation;
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub(crate) fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }

    /// The participant currently holding wristband `number`, if any.
    pub fn wristband_holder(&self, number: u32) -> Option<&Participant> {
        self.participants
            .values()
            .find(|p| p.wristband == Some(number))
    }

    /// Merges a fresh roster into the store.
    ///
    /// Existing keys keep their check-in, wristband and history; new keys
    /// start fresh; keys missing from `roster` are purged. Malformed
    /// records are reported and skipped.
    pub fn merge_roster(
        &mut self,
        roster: Vec<RosterEntry>,
        policy: &PaymentPolicy,
    ) -> RosterMergeReport {
        let mut report = RosterMergeReport::default();
        let mut seen = BTreeSet::new();

        for entry in roster {
            let name = entry.name.clone();
            match entry.parse() {
                Ok(attributes) => {
                    seen.insert(attributes.key.clone());
                    self.upsert(attributes, &mut report);
                }
                Err(error) => {
                    warn!(event = "roster_rejected", name = %name, error = %error);
                    report.rejected.push(RejectedEntry { name, error });
                }
            }
        }

        let stale: Vec<ParticipantKey> = self
            .participants
            .keys()
            .filter(|key| !seen.contains(*key))
            .cloned()
            .collect();
        for key in stale {
            self.participants.remove(&key);
            if self.last_operation.as_ref().is_some_and(|op| op.key == key) {
                self.last_operation = None;
            }
            report.removed.push(key);
        }

        for participant in self.participants.values_mut() {
            participant.payment_required = !policy.is_exempt(participant);
        }

        info!(
            event = "roster_merged",
            added = report.added as u64,
            updated = report.updated as u64,
            removed = report.removed.len() as u64,
            rejected = report.rejected.len() as u64,
        );
        report
    }

    fn upsert(&mut self, attributes: ParticipantAttributes, report: &mut RosterMergeReport) {
        match self.participants.get_mut(&attributes.key) {
            Some(existing) => {
                existing.update_attributes(attributes);
                report.updated += 1;
            }
            None => {
                let participant = Participant::new(attributes);
                self.participants
                    .insert(participant.key.clone(), participant);
                report.added += 1;
            }
        }
    }

    /// Merges ingested requests by `(requester_phone, requested_phone)`.
    ///
    /// Known requests keep their counter and fulfilled flag; only display
    /// names are replaced.
    pub fn merge_special_requests(&mut self, entries: Vec<SpecialRequestEntry>) -> RequestMergeReport {
        let mut report = RequestMergeReport::default();

        for entry in entries {
            let name = entry.requester_name.clone();
            let incoming = match entry.parse() {
                Ok(request) => request,
                Err(error) => {
                    report.rejected.push(RejectedEntry { name, error });
                    continue;
                }
            };

            let identity = incoming.identity();
            match self
                .special_requests
                .iter_mut()
                .find(|r| r.identity() == identity)
            {
                Some(existing) => {
                    existing.requester_name = incoming.requester_name;
                    existing.requested_name = incoming.requested_name;
                    report.updated += 1;
                }
                None => {
                    self.special_requests.push(incoming);
                    report.added += 1;
                }
            }
        }

        info!(
            event = "requests_merged",
            added = report.added as u64,
            updated = report.updated as u64,
            rejected = report.rejected.len() as u64,
        );
        report
    }

    /// Finds participants by wristband number (numeric query, exact) or by
    /// case-insensitive substring of name, email or key.
    pub fn search(&self, query: &str, scope: SearchScope) -> Vec<&Participant> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let in_scope = |p: &&Participant| scope == SearchScope::All || p.checked_in;

        if let Ok(number) = query.parse::<u32>() {
            let by_wristband: Vec<&Participant> = self
                .participants
                .values()
                .filter(in_scope)
                .filter(|p| p.wristband == Some(number))
                .collect();
            // Long digit strings are phone keys rather than wristbands.
            if !by_wristband.is_empty() || query.len() < 6 {
                return by_wristband;
            }
        }

        let needle = query.to_lowercase();
        self.participants
            .values()
            .filter(in_scope)
            .filter(|p| p.matches_text(&needle))
            .collect()
    }

    /// Resolves a query to exactly one participant key.
    ///
    /// # Errors
    ///
    /// [`BridgeError::NotFound`] or [`BridgeError::AmbiguousSearch`].
    pub fn resolve(&self, query: &str, scope: SearchScope) -> Result<ParticipantKey> {
        let found = self.search(query, scope);
        match found.as_slice() {
            [] => Err(BridgeError::NotFound {
                query: query.to_string(),
            }),
            [only] => Ok(only.key.clone()),
            many => Err(BridgeError::AmbiguousSearch {
                query: query.to_string(),
                candidates: many.iter().map(|p| p.key.clone()).collect(),
            }),
        }
    }

    /// Writes a confirmed batch back into the store.
    ///
    /// `base` is the ledger's last batch number when the batch was
    /// generated; a mismatch means the proposal is stale. Every pair in every
    /// record is linked symmetrically, the batch is appended, and staged
    /// request updates are applied. Returns the new batch number.
    pub fn commit_batch(
        &mut self,
        base: u32,
        records: Vec<MatchRecord>,
        request_updates: &[RequestUpdate],
        now: DateTime<Utc>,
    ) -> Result<u32> {
        let actual = self.batches.last_number();
        if actual != base {
            return Err(BridgeError::StaleProposal {
                expected: base,
                actual,
            });
        }
        if let Some(missing) = records
            .iter()
            .flat_map(MatchRecord::keys)
            .find(|key| !self.participants.contains_key(*key))
        {
            return Err(BridgeError::UnknownParticipant(missing.clone()));
        }

        for record in &records {
            for (a, b) in record.links() {
                self.link(a, b);
            }
        }

        for update in request_updates {
            if let Some(request) = self
                .special_requests
                .iter_mut()
                .find(|r| r.identity() == update.identity)
            {
                request.consecutive_co_presence_count += 1;
                if update.fulfill {
                    request.fulfilled = true;
                }
            }
        }

        let number = self.batches.append(records, now).number;
        self.last_operation = None;
        self.touch(now);
        Ok(number)
    }

    fn link(&mut self, a: &ParticipantKey, b: &ParticipantKey) {
        if let Some(p) = self.participants.get_mut(a) {
            p.match_history.insert(b.clone());
        }
        if let Some(p) = self.participants.get_mut(b) {
            p.match_history.insert(a.clone());
        }
    }

    /// Clears check-ins, wristbands, histories, batches and request
    /// progress; participant attributes are kept.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        for participant in self.participants.values_mut() {
            participant.checked_in = false;
            participant.wristband = None;
            participant.match_history.clear();
        }
        for request in &mut self.special_requests {
            request.consecutive_co_presence_count = 0;
            request.fulfilled = false;
        }
        self.batches.clear();
        self.counters = WristbandCounters::new(self.counters.walkin_start);
        self.issued_wristbands.clear();
        self.last_operation = None;
        self.touch(now);
        warn!(event = "state_reset", participants = self.participants.len() as u64);
    }

    /// Counts for the status view.
    pub fn status(&self) -> StatusSummary {
        let mut summary = StatusSummary {
            total: self.participants.len(),
            batches: self.batches.len(),
            batches_dispatched: self.batches.len() - self.batches.undispatched_count(),
            records: self.batches.record_count(),
            ..StatusSummary::default()
        };

        for participant in self.participants.values() {
            *summary
                .match_distribution
                .entry(participant.match_history.len())
                .or_default() += 1;

            if !participant.checked_in {
                continue;
            }
            summary.checked_in += 1;
            let gender = participant
                .gender
                .as_ref()
                .map_or_else(|| "Unspecified".to_string(), ToString::to_string);
            *summary.checked_in_by_gender.entry(gender).or_default() += 1;
            if participant.match_history.is_empty() {
                summary.never_matched_checked_in += 1;
            }
            if participant.payment_required {
                summary.payment_owed += 1;
            } else {
                summary.payment_exempt += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
