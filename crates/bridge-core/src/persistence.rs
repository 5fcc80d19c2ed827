//! Whole-state persistence.
//!
//! The state is always read and written as one JSON document. Writes go to
//! a sibling temporary file which is then renamed over the target, so a
//! crash mid-write leaves the previous document intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::error::Result;
use crate::state::SystemState;

/// Reads and rewrites the state document at a fixed path.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the state, or returns `fresh()` when no document exists yet.
    pub fn load_or_else(&self, fresh: impl FnOnce() -> SystemState) -> Result<SystemState> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let state: SystemState = serde_json::from_str(&contents)?;
                info!(
                    event = "state_loaded",
                    path = %self.path.display(),
                    participants = state.len() as u64,
                    batches = state.ledger().len() as u64,
                );
                Ok(state)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(event = "state_fresh", path = %self.path.display());
                Ok(fresh())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Stamps `updated_at` and rewrites the whole document.
    pub fn save(&self, state: &mut SystemState) -> Result<()> {
        state.touch(Utc::now());
        let json = serde_json::to_string_pretty(state)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(event = "state_saved", path = %self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::Lane;
    use crate::participant::ParticipantKey;
    use crate::test_utils::{phone_for, state_with};

    #[test]
    fn test_missing_file_yields_fresh_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("bridge_state.json"));

        let state = store.load_or_else(|| SystemState::new(500)).unwrap();
        assert!(state.is_empty());
        assert_eq!(state.counters().next_walkin, 500);
    }

    #[test]
    fn test_save_then_load_restores_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("bridge_state.json"));
        let mut state = state_with(&["Ada", "Ben"]);
        let ada = ParticipantKey::new(phone_for(1));
        state.check_in(&ada, Lane::Walkin).unwrap();

        store.save(&mut state).unwrap();
        let loaded = store.load_or_else(SystemState::default).unwrap();

        assert_eq!(loaded, state);
        assert_eq!(loaded.last_operation().map(|op| &op.key), Some(&ada));
        assert!(!dir.path().join("bridge_state.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge_state.json");
        fs::write(&path, "{ not json").unwrap();

        let err = StateStore::new(path)
            .load_or_else(SystemState::default)
            .unwrap_err();
        assert!(matches!(err, crate::BridgeError::Json(_)));
    }
}
