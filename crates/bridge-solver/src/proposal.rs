//! Uncommitted generation result.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use bridge_core::{MatchKind, MatchRecord, ParticipantKey, RequestUpdate, Result, SystemState};

/// Statistics for one phase of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseStats {
    pub phase: &'static str,
    /// Pairs (or resolved requests) the phase considered.
    pub candidates: u64,
    /// Records the phase accepted.
    pub accepted: u64,
    pub duration: Duration,
}

/// A generated batch awaiting operator confirmation.
///
/// Holds everything [`Proposal::commit`] needs; the state it was generated
/// from is not touched until then.
#[derive(Debug, Clone)]
pub struct Proposal {
    /// Ledger position the proposal was generated against.
    pub base: u32,
    pub records: Vec<MatchRecord>,
    pub request_updates: Vec<RequestUpdate>,
    /// Checked-in participants left out of every record.
    pub unmatched: Vec<ParticipantKey>,
    pub stats: Vec<PhaseStats>,
}

impl Proposal {
    /// Number the batch will receive if committed now.
    pub fn batch_number(&self) -> u32 {
        self.base + 1
    }

    pub fn count_of(&self, kind: MatchKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }

    /// Number of outgoing messages the batch will produce.
    pub fn message_count(&self) -> usize {
        self.records.iter().map(|r| r.members.len()).sum()
    }

    /// Writes the batch, history links and request progress into `state`.
    ///
    /// # Errors
    ///
    /// [`bridge_core::BridgeError::StaleProposal`] when another batch was
    /// committed since this proposal was generated.
    pub fn commit(self, state: &mut SystemState, now: DateTime<Utc>) -> Result<u32> {
        let records = self.records.len();
        let number = state.commit_batch(self.base, self.records, &self.request_updates, now)?;
        info!(
            event = "batch_committed",
            batch = number as u64,
            records = records as u64,
            request_updates = self.request_updates.len() as u64,
        );
        Ok(number)
    }
}
