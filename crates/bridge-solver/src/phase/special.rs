//! Forced pairing from special requests.

use tracing::{debug, info};

use bridge_core::{MatchKind, MatchRecord, RequestUpdate, SPECIAL_SCORE};

use super::Phase;
use crate::scope::{MatchScope, PhaseScope};

/// Pairs requester and requested once they have been present together for
/// `threshold` consecutive confirmed runs, regardless of match history.
#[derive(Debug, Clone)]
pub struct SpecialRequestPhase {
    threshold: u32,
}

impl SpecialRequestPhase {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl Phase for SpecialRequestPhase {
    fn solve(&mut self, scope: &mut MatchScope<'_>) {
        let mut phase_scope = PhaseScope::new(scope);
        let phase_index = phase_scope.phase_index();
        info!(
            event = "phase_start",
            phase = self.phase_type_name(),
            phase_index = phase_index as u64,
        );

        let requests = phase_scope.scope().requests();
        for request in requests.iter().filter(|r| !r.fulfilled) {
            let scope = phase_scope.scope();
            let Some(requester) = scope.find_by_phone(&request.requester_phone) else {
                continue;
            };
            let requested = request
                .requested_phone
                .as_ref()
                .and_then(|phone| scope.find_by_phone(phone))
                .or_else(|| {
                    request
                        .requested_name
                        .as_deref()
                        .and_then(|name| scope.find_by_name(name))
                });
            let Some(requested) = requested else {
                continue;
            };
            if requester.key == requested.key {
                continue;
            }

            phase_scope.add_candidates(1);
            let staged = request.consecutive_co_presence_count + 1;
            let mut update = RequestUpdate {
                identity: request.identity(),
                fulfill: false,
            };
            debug!(
                event = "special_request",
                request = %request.label(),
                together = staged as u64,
                threshold = self.threshold as u64,
            );

            if staged >= self.threshold {
                let scope = phase_scope.scope();
                let already_paired = scope.records().iter().any(|r| {
                    r.kind == MatchKind::Special
                        && r.contains(&requester.key)
                        && r.contains(&requested.key)
                });
                if already_paired {
                    update.fulfill = true;
                } else if !scope.is_claimed(&requester.key) && !scope.is_claimed(&requested.key) {
                    phase_scope.accept(MatchRecord::pair(
                        MatchKind::Special,
                        requester,
                        requested,
                        SPECIAL_SCORE,
                    ));
                    update.fulfill = true;
                }
            }
            phase_scope.scope_mut().stage_request_update(update);
        }

        let stats = phase_scope.finish(self.phase_type_name());
        info!(
            event = "phase_end",
            phase = self.phase_type_name(),
            phase_index = phase_index as u64,
            duration_ms = stats.duration.as_millis() as u64,
            steps = stats.candidates,
            accepted = stats.accepted,
        );
    }

    fn phase_type_name(&self) -> &'static str {
        "Special Requests"
    }
}

#[cfg(test)]
#[path = "special_tests.rs"]
mod tests;
