//! Loaded configuration plus the state document it points at.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use bridge_config::{BridgeConfig, ConfigError};
use bridge_core::{StateStore, SystemState};

use crate::error::CliResult;

pub struct Session {
    pub config: BridgeConfig,
    pub store: StateStore,
    pub state: SystemState,
}

impl Session {
    /// Loads the configuration (defaults only when the file is absent) and
    /// then the state document.
    ///
    /// # Errors
    ///
    /// A config file that exists but cannot be read or parsed is an error.
    pub fn open(config_path: &Path, state_override: Option<PathBuf>) -> CliResult<Self> {
        let config = match BridgeConfig::load(config_path) {
            Ok(config) => config,
            Err(ConfigError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                debug!(event = "config_default", path = %config_path.display());
                BridgeConfig::default()
            }
            Err(err) => return Err(err.into()),
        };
        Self::with_config(config, state_override)
    }

    pub fn with_config(mut config: BridgeConfig, state_override: Option<PathBuf>) -> CliResult<Self> {
        if let Some(path) = state_override {
            config = config.with_state_file(path);
        }
        let store = StateStore::new(config.state_file.clone());
        let walkin_start = config.wristbands.walkin_start;
        let state = store.load_or_else(|| SystemState::new(walkin_start))?;
        Ok(Self {
            config,
            store,
            state,
        })
    }

    pub fn save(&mut self) -> CliResult<()> {
        self.store.save(&mut self.state)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use bridge_core::Lane;
    use bridge_test::{guest, key, EventBuilder};

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::open(
            &dir.path().join("absent.toml"),
            Some(dir.path().join("state.json")),
        )
        .unwrap();

        assert!(session.state.is_empty());
        assert_eq!(session.state.counters().next_walkin, 250);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("bridge.toml");
        std::fs::write(
            &config_path,
            "state_file = \"event.json\"\n[wristbands]\nwalkin_start = \"lots\"\n",
        )
        .unwrap();

        let result = Session::open(&config_path, None);
        assert!(matches!(
            result,
            Err(CliError::Config(ConfigError::Toml(_)))
        ));
    }

    #[test]
    fn test_config_state_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("bridge.toml");
        let state_path = dir.path().join("event.json");
        std::fs::write(
            &config_path,
            format!("state_file = {:?}\n", state_path.display().to_string()),
        )
        .unwrap();

        let session = Session::open(&config_path, None).unwrap();
        assert_eq!(session.store.path(), state_path.as_path());
    }

    #[test]
    fn test_walkin_start_comes_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = BridgeConfig::default().with_walkin_start(900);
        let session = Session::with_config(config, Some(dir.path().join("state.json"))).unwrap();

        assert_eq!(session.state.counters().next_walkin, 900);
    }

    #[test]
    fn test_saved_state_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let state_path = dir.path().join("state.json");
        let config = BridgeConfig::default();

        let mut session = Session::with_config(config.clone(), Some(state_path.clone())).unwrap();
        session.state = EventBuilder::new().absent(guest(1, "Ada Park")).build();
        session.state.check_in(&key(1), Lane::Walkin).unwrap();
        session.save().unwrap();

        let reopened = Session::with_config(config, Some(state_path)).unwrap();
        assert_eq!(reopened.state.participant(&key(1)).unwrap().wristband, Some(250));
    }
}
