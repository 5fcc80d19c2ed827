//! Check-in state machine and wristband issuance.
//!
//! ```text
//! NotCheckedIn --check_in--> CheckedIn --check_out--> NotCheckedIn --check_in--> CheckedIn
//!                 (draws a wristband once)                          (reuses it)
//! ```
//!
//! Counters only ever move forward. Undoing a check-in leaves the number
//! with its holder, so no two keys can ever be issued the same number.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{BridgeError, Result};
use crate::participant::ParticipantKey;
use crate::state::{LastOperation, OperationKind, SystemState};

/// Wristband range a new check-in draws from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    #[default]
    Standard,
    Walkin,
}

/// Outcome of a successful check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckIn {
    pub key: ParticipantKey,
    pub wristband: u32,
    /// True when a previously issued wristband was handed back.
    pub reused: bool,
}

/// What [`SystemState::undo_last`] reversed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Undone {
    CheckIn { key: ParticipantKey, wristband: Option<u32> },
    CheckOut { key: ParticipantKey },
}

impl SystemState {
    /// Checks a participant in, issuing a wristband from `lane` on first entry.
    ///
    /// # Errors
    ///
    /// [`BridgeError::AlreadyCheckedIn`] or [`BridgeError::UnknownParticipant`].
    pub fn check_in(&mut self, key: &ParticipantKey, lane: Lane) -> Result<CheckIn> {
        let participant = self.participant_mut(key)?;
        if participant.checked_in {
            return Err(BridgeError::AlreadyCheckedIn {
                name: participant.name.clone(),
                wristband: participant.wristband.unwrap_or_default(),
            });
        }

        let issued = participant.wristband;

        let (wristband, reused) = match issued {
            Some(number) => (number, true),
            None => (self.draw_wristband(lane), false),
        };
        self.record_issued(wristband);

        let participant = self.participant_mut(key)?;
        participant.wristband = Some(wristband);
        participant.checked_in = true;
        info!(
            event = "check_in",
            name = %participant.name,
            wristband = wristband as u64,
            reused = reused,
        );

        self.set_last_operation(Some(LastOperation {
            kind: OperationKind::CheckIn { lane },
            key: key.clone(),
        }));
        self.touch(Utc::now());
        Ok(CheckIn {
            key: key.clone(),
            wristband,
            reused,
        })
    }

    /// Checks a participant out; the wristband stays with them.
    pub fn check_out(&mut self, key: &ParticipantKey) -> Result<u32> {
        let participant = self.participant_mut(key)?;
        if !participant.checked_in {
            return Err(BridgeError::NotCheckedIn {
                name: participant.name.clone(),
            });
        }
        participant.checked_in = false;
        let wristband = participant.wristband.unwrap_or_default();
        info!(event = "check_out", name = %participant.name, wristband = wristband as u64);

        self.set_last_operation(Some(LastOperation {
            kind: OperationKind::CheckOut,
            key: key.clone(),
        }));
        self.touch(Utc::now());
        Ok(wristband)
    }

    /// Reverses the most recent check-in or check-out, once.
    ///
    /// # Errors
    ///
    /// [`BridgeError::NothingToUndo`] when the slot is empty, or when the
    /// participant's state no longer matches the recorded operation.
    pub fn undo_last(&mut self) -> Result<Undone> {
        let Some(operation) = self.last_operation().cloned() else {
            return Err(BridgeError::NothingToUndo);
        };

        let participant = self.participant_mut(&operation.key)?;
        let undone = match operation.kind {
            OperationKind::CheckIn { .. } => {
                if !participant.checked_in {
                    return Err(BridgeError::NothingToUndo);
                }
                participant.checked_in = false;
                Undone::CheckIn {
                    key: operation.key.clone(),
                    wristband: participant.wristband,
                }
            }
            OperationKind::CheckOut => {
                if participant.checked_in {
                    return Err(BridgeError::NothingToUndo);
                }
                participant.checked_in = true;
                Undone::CheckOut {
                    key: operation.key.clone(),
                }
            }
        };
        info!(event = "undo", name = %participant.name, operation = ?operation.kind);

        self.set_last_operation(None);
        self.touch(Utc::now());
        Ok(undone)
    }

    /// Overrides a participant's wristband number without touching counters.
    ///
    /// # Errors
    ///
    /// [`BridgeError::InvalidWristband`] for zero, and
    /// [`BridgeError::WristbandCollision`] when another participant holds
    /// `number` and `force` is false.
    pub fn edit_wristband(&mut self, key: &ParticipantKey, number: u32, force: bool) -> Result<Option<u32>> {
        if number == 0 {
            return Err(BridgeError::InvalidWristband(number));
        }
        if let Some(holder) = self.wristband_holder(number).filter(|p| &p.key != key) {
            if !force {
                return Err(BridgeError::WristbandCollision {
                    number,
                    holder: holder.name.clone(),
                });
            }
        }

        let participant = self.participant_mut(key)?;
        let previous = participant.wristband.replace(number);
        let name = participant.name.clone();
        self.record_issued(number);
        info!(
            event = "edit_wristband",
            name = %name,
            wristband = number as u64,
            forced = force,
        );

        self.set_last_operation(None);
        self.touch(Utc::now());
        Ok(previous)
    }

    /// Checks in everyone not yet checked in on the standard lane.
    ///
    /// Returns how many were checked in. Not undoable.
    pub fn check_in_everyone(&mut self) -> usize {
        let pending: Vec<ParticipantKey> = self
            .participants()
            .filter(|p| !p.checked_in)
            .map(|p| p.key.clone())
            .collect();

        for key in &pending {
            let issued = match self.participant(key).and_then(|p| p.wristband) {
                Some(number) => number,
                None => self.draw_wristband(Lane::Standard),
            };
            self.record_issued(issued);
            if let Ok(participant) = self.participant_mut(key) {
                participant.wristband = Some(issued);
                participant.checked_in = true;
            }
        }

        info!(event = "check_in_everyone", checked_in = pending.len() as u64);
        self.set_last_operation(None);
        self.touch(Utc::now());
        pending.len()
    }

    // Takes the next number from the lane's counter that was never issued.
    // Numbers freed by an edit or a purge are skipped, never reissued.
    fn draw_wristband(&mut self, lane: Lane) -> u32 {
        loop {
            let counters = self.counters_mut();
            let counter = match lane {
                Lane::Standard => &mut counters.next_standard,
                Lane::Walkin => &mut counters.next_walkin,
            };
            let number = *counter;
            *counter += 1;
            if !self.was_issued(number) && self.wristband_holder(number).is_none() {
                self.record_issued(number);
                return number;
            }
        }
    }
}

#[cfg(test)]
#[path = "allocator_tests.rs"]
mod tests;
