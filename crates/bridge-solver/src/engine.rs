//! Generation driver.

use std::time::Instant;

use tracing::info;

use bridge_config::MatchingConfig;
use bridge_core::{BridgeError, Result, SystemState};

use crate::phase::{FriendPhase, Phase, RomanticPhase, SpecialRequestPhase};
use crate::proposal::Proposal;
use crate::scope::MatchScope;

/// Runs the matching phases in order over a state snapshot.
#[derive(Debug)]
pub struct MatchEngine {
    phases: Vec<Box<dyn Phase>>,
}

impl MatchEngine {
    /// The standard phase sequence: special requests, romantic, friend.
    pub fn new(config: &MatchingConfig) -> Self {
        Self::with_phases(vec![
            Box::new(SpecialRequestPhase::new(config.special_request_threshold)),
            Box::new(RomanticPhase::new()),
            Box::new(FriendPhase::new()),
        ])
    }

    pub fn with_phases(phases: Vec<Box<dyn Phase>>) -> Self {
        Self { phases }
    }

    pub fn phase_names(&self) -> Vec<&'static str> {
        self.phases.iter().map(|p| p.phase_type_name()).collect()
    }

    /// Generates a proposal without modifying `state`.
    ///
    /// # Errors
    ///
    /// [`BridgeError::InsufficientParticipants`] with fewer than two people
    /// checked in, [`BridgeError::NoCompatibleMatches`] when no phase
    /// produced a record.
    pub fn generate(&mut self, state: &SystemState) -> Result<Proposal> {
        let start = Instant::now();
        let checked_in = state.checked_in().count();
        if checked_in < 2 {
            return Err(BridgeError::InsufficientParticipants { checked_in });
        }

        info!(
            event = "solve_start",
            participant_count = checked_in as u64,
            request_count = state.special_requests().len() as u64,
            batch = state.ledger().next_number() as u64,
        );

        let mut scope = MatchScope::new(state);
        for phase in &mut self.phases {
            phase.solve(&mut scope);
        }

        let unmatched = scope
            .unclaimed()
            .into_iter()
            .map(|p| p.key.clone())
            .collect::<Vec<_>>();
        let (records, request_updates, stats) = scope.into_parts();

        info!(
            event = "solve_end",
            records = records.len() as u64,
            unmatched = unmatched.len() as u64,
            duration_ms = start.elapsed().as_millis() as u64,
        );

        if records.is_empty() {
            return Err(BridgeError::NoCompatibleMatches);
        }

        Ok(Proposal {
            base: state.ledger().last_number(),
            records,
            request_updates,
            unmatched,
            stats,
        })
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
