//! Matching engine for the Bridge matcher.
//!
//! Generation runs a fixed sequence of phases over a read-only snapshot of
//! the checked-in participants:
//!
//! - [`SpecialRequestPhase`] - forced pairs once a request has waited long enough
//! - [`RomanticPhase`] - greedy romantic pairing, friend-designated people first
//! - [`FriendPhase`] - pairs blocked only by a hard constraint, plus one triple
//!
//! Nothing is written until the resulting [`Proposal`] is committed.

pub mod engine;
pub mod phase;
pub mod proposal;
pub mod scope;

pub use engine::MatchEngine;
pub use phase::{FriendPhase, Phase, RomanticPhase, SpecialRequestPhase};
pub use proposal::{PhaseStats, Proposal};
pub use scope::{MatchScope, PhaseScope};
