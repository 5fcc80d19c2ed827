//! CLI error type.

use thiserror::Error;

use bridge_config::ConfigError;
use bridge_core::BridgeError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("no dispatch.test_recipient configured")]
    MissingTestRecipient,
}

pub type CliResult<T> = Result<T, CliError>;
