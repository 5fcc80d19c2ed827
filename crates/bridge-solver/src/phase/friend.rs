//! Friend pairing for people a hard constraint kept from romance.

use tracing::{info, trace};

use bridge_core::MatchRecord;
use bridge_scoring::{basic_eligible, compatibility_score, romantic_block};

use super::{Candidate, Phase};
use crate::scope::{MatchScope, PhaseScope};

/// Friend pairing over participants who never had a friend designation.
///
/// Only pairs blocked by gender preference or grade distance are offered;
/// a pair that is merely a poor fit is left unmatched. When exactly one
/// eligible person is left over, they join the last accepted pair as a
/// friend group of three.
#[derive(Debug, Clone, Default)]
pub struct FriendPhase;

impl FriendPhase {
    pub fn new() -> Self {
        Self
    }
}

impl Phase for FriendPhase {
    fn solve(&mut self, scope: &mut MatchScope<'_>) {
        let mut phase_scope = PhaseScope::new(scope);
        let phase_index = phase_scope.phase_index();
        let eligible = phase_scope.scope().eligible_for_friends();
        info!(
            event = "phase_start",
            phase = self.phase_type_name(),
            phase_index = phase_index as u64,
            eligible = eligible.len() as u64,
        );

        let mut candidates = Vec::new();
        let mut reasons = Vec::new();
        for (i, a) in eligible.iter().enumerate() {
            for (j, b) in eligible.iter().enumerate().skip(i + 1) {
                if !basic_eligible(a, b) {
                    continue;
                }
                let Some(reason) = romantic_block(a, b) else {
                    continue;
                };
                candidates.push(Candidate {
                    a: i,
                    b: j,
                    score: compatibility_score(a, b),
                    priority: 0,
                });
                reasons.push(reason);
            }
        }
        phase_scope.add_candidates(candidates.len());

        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&x, &y| candidates[y].score.cmp(&candidates[x].score));

        let mut last_accepted = None;
        for index in order {
            let candidate = candidates[index];
            let (a, b) = (eligible[candidate.a], eligible[candidate.b]);
            let free = !phase_scope.scope().is_claimed(&a.key)
                && !phase_scope.scope().is_claimed(&b.key);
            trace!(
                event = "step",
                phase = self.phase_type_name(),
                score = candidate.score as u64,
                accepted = free,
            );
            if free {
                phase_scope.accept(MatchRecord::friend(a, b, candidate.score, reasons[index]));
                last_accepted = Some(phase_scope.scope().records().len() - 1);
            }
        }

        let leftover: Vec<_> = eligible
            .iter()
            .copied()
            .filter(|p| !phase_scope.scope().is_claimed(&p.key))
            .collect();
        let mut grouped = false;
        if let ([third], Some(position)) = (leftover.as_slice(), last_accepted) {
            let scope = phase_scope.scope_mut();
            let record = scope.records_mut().remove(position);
            scope.records_mut().insert(position, record.into_group(third));
            scope.claim(third.key.clone());
            grouped = true;
        }

        let stats = phase_scope.finish(self.phase_type_name());
        info!(
            event = "phase_end",
            phase = self.phase_type_name(),
            phase_index = phase_index as u64,
            duration_ms = stats.duration.as_millis() as u64,
            steps = stats.candidates,
            accepted = stats.accepted,
            grouped = grouped,
        );
    }

    fn phase_type_name(&self) -> &'static str {
        "Friend"
    }
}

#[cfg(test)]
#[path = "friend_tests.rs"]
mod tests;
