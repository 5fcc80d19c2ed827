//! Committed match batches.
//!
//! The ledger is append-only: a batch is never edited after it is
//! appended, except to stamp its dispatch time exactly once.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::participant::{Participant, ParticipantKey};
use crate::phone::Phone;

/// Informational score carried by forced-request records.
pub const SPECIAL_SCORE: u32 = 999;

/// Classification of a match record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Special,
    Romantic,
    Friend,
    FriendGroup,
}

impl MatchKind {
    /// Friend designations rotate: someone who received one is not offered another.
    pub fn is_friend_designation(self) -> bool {
        matches!(self, MatchKind::Friend | MatchKind::FriendGroup)
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchKind::Special => "special",
            MatchKind::Romantic => "romantic",
            MatchKind::Friend => "friend",
            MatchKind::FriendGroup => "friend_group",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Hard constraint that kept a pair from romantic eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    GenderPreference,
    GradeIncompatibility,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::GenderPreference => f.write_str("gender_preference"),
            BlockReason::GradeIncompatibility => f.write_str("grade_incompatibility"),
        }
    }
}

/// Member display fields captured when the record is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchMember {
    pub key: ParticipantKey,
    pub name: String,
    pub wristband: Option<u32>,
    pub phone: Option<Phone>,
}

impl MatchMember {
    pub fn snapshot(participant: &Participant) -> Self {
        Self {
            key: participant.key.clone(),
            name: participant.name.clone(),
            wristband: participant.wristband,
            phone: participant.phone.clone(),
        }
    }

    /// `#12`, or `#?` for a member who somehow had no wristband.
    pub fn wristband_label(&self) -> String {
        match self.wristband {
            Some(number) => format!("#{number}"),
            None => "#?".to_string(),
        }
    }
}

/// An immutable pairing (or triple) inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub kind: MatchKind,
    pub members: Vec<MatchMember>,
    pub score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<BlockReason>,
}

impl MatchRecord {
    pub fn pair(kind: MatchKind, a: &Participant, b: &Participant, score: u32) -> Self {
        Self {
            kind,
            members: vec![MatchMember::snapshot(a), MatchMember::snapshot(b)],
            score,
            reason: None,
        }
    }

    pub fn friend(a: &Participant, b: &Participant, score: u32, reason: BlockReason) -> Self {
        Self {
            reason: Some(reason),
            ..Self::pair(MatchKind::Friend, a, b, score)
        }
    }

    /// Turns a friend pair into a group of three.
    pub fn into_group(mut self, third: &Participant) -> Self {
        self.members.push(MatchMember::snapshot(third));
        self.kind = MatchKind::FriendGroup;
        self.score = 0;
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &ParticipantKey> {
        self.members.iter().map(|m| &m.key)
    }

    pub fn contains(&self, key: &ParticipantKey) -> bool {
        self.keys().any(|k| k == key)
    }

    /// Every unordered pair of member keys (one for a pair, three for a triple).
    pub fn links(&self) -> Vec<(&ParticipantKey, &ParticipantKey)> {
        let mut links = Vec::new();
        for (i, a) in self.members.iter().enumerate() {
            for b in &self.members[i + 1..] {
                links.push((&a.key, &b.key));
            }
        }
        links
    }

    /// The other members of the record from `key`'s point of view.
    pub fn partners_of<'a>(&'a self, key: &'a ParticipantKey) -> impl Iterator<Item = &'a MatchMember> {
        self.members.iter().filter(move |m| &m.key != key)
    }
}

/// One committed generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchBatch {
    pub number: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub dispatched_at: Option<DateTime<Utc>>,
    pub records: Vec<MatchRecord>,
}

impl MatchBatch {
    pub fn is_dispatched(&self) -> bool {
        self.dispatched_at.is_some()
    }

    /// Stamps the dispatch time.
    ///
    /// # Errors
    ///
    /// [`BridgeError::AlreadyDispatched`] if the timestamp is already set.
    pub fn mark_dispatched(&mut self, at: DateTime<Utc>) -> Result<()> {
        if self.dispatched_at.is_some() {
            return Err(BridgeError::AlreadyDispatched(self.number));
        }
        self.dispatched_at = Some(at);
        Ok(())
    }

    /// Number of outgoing messages this batch produces (one per member).
    pub fn message_count(&self) -> usize {
        self.records.iter().map(|r| r.members.len()).sum()
    }

    pub fn count_of(&self, kind: MatchKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }
}

/// Append-only sequence of batches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchLedger {
    batches: Vec<MatchBatch>,
}

impl BatchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Sequence number of the most recent batch (0 when empty).
    pub fn last_number(&self) -> u32 {
        self.batches.last().map_or(0, |b| b.number)
    }

    pub fn next_number(&self) -> u32 {
        self.last_number() + 1
    }

    pub fn batches(&self) -> &[MatchBatch] {
        &self.batches
    }

    pub fn get(&self, number: u32) -> Option<&MatchBatch> {
        self.batches.iter().find(|b| b.number == number)
    }

    pub fn get_mut(&mut self, number: u32) -> Result<&mut MatchBatch> {
        self.batches
            .iter_mut()
            .find(|b| b.number == number)
            .ok_or(BridgeError::UnknownBatch(number))
    }

    /// Most recent batch that has not been dispatched yet.
    pub fn latest_undispatched(&self) -> Option<&MatchBatch> {
        self.batches.iter().rev().find(|b| !b.is_dispatched())
    }

    pub fn undispatched_count(&self) -> usize {
        self.batches.iter().filter(|b| !b.is_dispatched()).count()
    }

    /// Appends a new batch with the next sequence number.
    pub fn append(&mut self, records: Vec<MatchRecord>, created_at: DateTime<Utc>) -> &MatchBatch {
        let number = self.next_number();
        self.batches.push(MatchBatch {
            number,
            created_at,
            dispatched_at: None,
            records,
        });
        &self.batches[self.batches.len() - 1]
    }

    /// Everyone who has ever received a friend or friend-group record.
    pub fn friend_designated(&self) -> BTreeSet<ParticipantKey> {
        self.batches
            .iter()
            .flat_map(|b| &b.records)
            .filter(|r| r.kind.is_friend_designation())
            .flat_map(|r| r.keys().cloned())
            .collect()
    }

    /// Total records across every batch.
    pub fn record_count(&self) -> usize {
        self.batches.iter().map(|b| b.records.len()).sum()
    }

    pub(crate) fn clear(&mut self) {
        self.batches.clear();
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
