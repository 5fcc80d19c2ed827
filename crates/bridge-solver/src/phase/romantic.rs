//! Priority-weighted romantic pairing.

use tracing::{info, trace};

use bridge_core::{MatchKind, MatchRecord};
use bridge_scoring::{can_match, compatibility_score};

use super::{Candidate, Phase};
use crate::scope::{MatchScope, PhaseScope};

/// Greedy romantic pairing.
///
/// Every romantically eligible pair of unclaimed participants is ranked by
/// how many of the two already received a friend designation, then by
/// compatibility score. Pairs are accepted in that order while both members
/// are still free.
#[derive(Debug, Clone, Default)]
pub struct RomanticPhase;

impl RomanticPhase {
    pub fn new() -> Self {
        Self
    }
}

impl Phase for RomanticPhase {
    fn solve(&mut self, scope: &mut MatchScope<'_>) {
        let mut phase_scope = PhaseScope::new(scope);
        let phase_index = phase_scope.phase_index();
        info!(
            event = "phase_start",
            phase = self.phase_type_name(),
            phase_index = phase_index as u64,
        );

        let pool = phase_scope.scope().unclaimed();
        let mut candidates = Vec::new();
        for (i, a) in pool.iter().enumerate() {
            for (j, b) in pool.iter().enumerate().skip(i + 1) {
                if !can_match(a, b, true) {
                    continue;
                }
                let scope = phase_scope.scope();
                let priority = u8::from(scope.is_friend_designated(&a.key))
                    + u8::from(scope.is_friend_designated(&b.key));
                candidates.push(Candidate {
                    a: i,
                    b: j,
                    score: compatibility_score(a, b),
                    priority,
                });
            }
        }
        phase_scope.add_candidates(candidates.len());

        // Stable: equal keys keep enumeration order.
        candidates.sort_by(|x, y| {
            y.priority
                .cmp(&x.priority)
                .then_with(|| y.score.cmp(&x.score))
        });

        let mut by_priority = [0u64; 3];
        for candidate in candidates {
            let (a, b) = (pool[candidate.a], pool[candidate.b]);
            let free = !phase_scope.scope().is_claimed(&a.key)
                && !phase_scope.scope().is_claimed(&b.key);
            trace!(
                event = "step",
                phase = self.phase_type_name(),
                score = candidate.score as u64,
                accepted = free,
            );
            if free {
                by_priority[usize::from(candidate.priority)] += 1;
                phase_scope.accept(MatchRecord::pair(
                    MatchKind::Romantic,
                    a,
                    b,
                    candidate.score,
                ));
            }
        }

        let stats = phase_scope.finish(self.phase_type_name());
        info!(
            event = "phase_end",
            phase = self.phase_type_name(),
            phase_index = phase_index as u64,
            duration_ms = stats.duration.as_millis() as u64,
            steps = stats.candidates,
            accepted = stats.accepted,
            both_prioritized = by_priority[2],
            one_prioritized = by_priority[1],
            neither_prioritized = by_priority[0],
        );
    }

    fn phase_type_name(&self) -> &'static str {
        "Romantic"
    }
}

#[cfg(test)]
#[path = "romantic_tests.rs"]
mod tests;
