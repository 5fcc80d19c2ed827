//! Error types for the Bridge matcher

use thiserror::Error;

use crate::participant::ParticipantKey;

/// Main error type for Bridge matcher operations.
///
/// Every variant is recoverable: the operator front end reports it and
/// carries on with the session.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Participant is already checked in
    #[error("{name} is already checked in (wristband #{wristband})")]
    AlreadyCheckedIn { name: String, wristband: u32 },

    /// Participant is not checked in
    #[error("{name} is not checked in")]
    NotCheckedIn { name: String },

    /// The undo slot is empty
    #[error("no recent check-in or check-out to undo")]
    NothingToUndo,

    /// A lookup matched more than one participant
    #[error("'{query}' matches {} participants", candidates.len())]
    AmbiguousSearch {
        query: String,
        candidates: Vec<ParticipantKey>,
    },

    /// A lookup matched nobody
    #[error("no participant found matching '{query}'")]
    NotFound { query: String },

    /// A key that is not in the store
    #[error("unknown participant: {0}")]
    UnknownParticipant(ParticipantKey),

    /// Wristband number already held by someone else
    #[error("wristband #{number} is already assigned to {holder}")]
    WristbandCollision { number: u32, holder: String },

    /// Wristband numbers are positive
    #[error("invalid wristband number: {0}")]
    InvalidWristband(u32),

    /// Fewer than two participants checked in
    #[error("need at least 2 people checked in to generate matches (currently {checked_in})")]
    InsufficientParticipants { checked_in: usize },

    /// No phase produced a single record
    #[error("no compatible matches found")]
    NoCompatibleMatches,

    /// The ledger moved on since the proposal was generated
    #[error("proposal was generated against batch #{expected}, ledger is now at #{actual}")]
    StaleProposal { expected: u32, actual: u32 },

    /// A phone number that does not normalize to ten digits
    #[error("malformed phone number '{raw}'")]
    MalformedPhone { raw: String },

    /// A single message could not be delivered
    #[error("failed to send to {recipient}: {reason}")]
    DispatchFailure { recipient: String, reason: String },

    /// Dispatch timestamp is already set
    #[error("batch #{0} was already dispatched")]
    AlreadyDispatched(u32),

    /// Batch number not in the ledger
    #[error("unknown batch #{0}")]
    UnknownBatch(u32),

    /// Every batch has been dispatched
    #[error("no undispatched batch to send")]
    NothingToDispatch,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Bridge matcher operations
pub type Result<T> = std::result::Result<T, BridgeError>;
