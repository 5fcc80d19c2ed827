//! Bridge Core - event state for the Bridge matcher
//!
//! This crate owns everything that is persisted between operator commands:
//! - Participant records and roster merging
//! - The wristband allocator (check-in / check-out / one-step undo)
//! - Special requests and their co-presence counters
//! - The append-only batch ledger
//! - Whole-document JSON persistence

pub mod allocator;
pub mod error;
pub mod ledger;
pub mod participant;
pub mod persistence;
pub mod phone;
pub mod request;
pub mod state;

#[cfg(test)]
mod test_utils;

pub use allocator::{CheckIn, Lane, Undone};
pub use error::{BridgeError, Result};
pub use ledger::{
    BatchLedger, BlockReason, MatchBatch, MatchKind, MatchMember, MatchRecord, SPECIAL_SCORE,
};
pub use participant::{
    normalize_name, FitnessImportance, Gender, Grade, Participant, ParticipantAttributes,
    ParticipantKey, Profile, RosterEntry,
};
pub use persistence::StateStore;
pub use phone::Phone;
pub use request::{RequestIdentity, SpecialRequest, SpecialRequestEntry};
pub use state::{
    LastOperation, OperationKind, PaymentPolicy, RejectedEntry, RequestMergeReport,
    RequestUpdate, RosterMergeReport, SearchScope, StatusSummary, SystemState,
    WristbandCounters, DEFAULT_WALKIN_START,
};
