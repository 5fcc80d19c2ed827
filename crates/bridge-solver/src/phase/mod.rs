//! Matching phases.
//!
//! Phases run in a fixed order and share one [`MatchScope`]:
//! - SpecialRequestPhase: forced pairs from long-standing requests
//! - RomanticPhase: priority-weighted greedy romantic pairing
//! - FriendPhase: friend pairs for people blocked by a hard constraint

pub mod friend;
pub mod romantic;
pub mod special;

use std::fmt::Debug;

pub use friend::FriendPhase;
pub use romantic::RomanticPhase;
pub use special::SpecialRequestPhase;

use crate::scope::MatchScope;

/// A phase of match generation.
///
/// Each phase appends records to the scope and claims their members so
/// later phases skip them.
pub trait Phase: Debug {
    /// Executes this phase.
    fn solve(&mut self, scope: &mut MatchScope<'_>);

    /// Returns the name of this phase type.
    fn phase_type_name(&self) -> &'static str;
}

/// A scored candidate pair, by index into a participant slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub a: usize,
    pub b: usize,
    pub score: u32,
    pub priority: u8,
}
