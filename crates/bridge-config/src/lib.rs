//! Configuration system for the Bridge matcher.
//!
//! Load event configuration from TOML (or YAML) so the state file,
//! wristband ranges, fee exemptions and message texts can change without
//! code changes.
//!
//! # Examples
//!
//! ```
//! use bridge_config::BridgeConfig;
//! use std::time::Duration;
//!
//! let config = BridgeConfig::from_toml_str(r#"
//!     state_file = "friday.json"
//!
//!     [wristbands]
//!     walkin_start = 500
//!
//!     [dispatch]
//!     delay_ms = 250
//! "#).unwrap();
//!
//! assert_eq!(config.wristbands.walkin_start, 500);
//! assert_eq!(config.dispatch.delay(), Duration::from_millis(250));
//! assert_eq!(config.matching.special_request_threshold, 2);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use bridge_config::BridgeConfig;
//!
//! let config = BridgeConfig::load("bridge.toml").unwrap_or_default();
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use bridge_core::{PaymentPolicy, DEFAULT_WALKIN_START};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main event configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BridgeConfig {
    /// Path of the persisted state document.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    #[serde(default)]
    pub wristbands: WristbandConfig,

    #[serde(default)]
    pub payment: PaymentConfig,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            wristbands: WristbandConfig::default(),
            payment: PaymentConfig::default(),
            matching: MatchingConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

fn default_state_file() -> PathBuf {
    PathBuf::from("bridge_state.json")
}

impl BridgeConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file, choosing the format by extension
    /// (`.yaml`/`.yml`, otherwise TOML).
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, fails to parse, or holds
    /// values that cannot work together.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.wristbands.walkin_start == 0 {
            return Err(ConfigError::Invalid(
                "wristbands.walkin_start must be positive".to_string(),
            ));
        }
        if self.matching.special_request_threshold == 0 {
            return Err(ConfigError::Invalid(
                "matching.special_request_threshold must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }

    /// Sets the state document path.
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = path.into();
        self
    }

    /// Sets the first walk-in wristband number.
    pub fn with_walkin_start(mut self, start: u32) -> Self {
        self.wristbands.walkin_start = start;
        self
    }

    /// Adds a fee exemption (key, email or underscore-joined name).
    pub fn with_exemption(mut self, entry: impl Into<String>) -> Self {
        self.payment.exemptions.push(entry.into());
        self
    }

    /// Sets how many consecutive runs a special request waits before firing.
    pub fn with_special_request_threshold(mut self, threshold: u32) -> Self {
        self.matching.special_request_threshold = threshold;
        self
    }

    /// Sets the pause between outgoing messages.
    pub fn with_dispatch_delay_ms(mut self, delay_ms: u64) -> Self {
        self.dispatch.delay_ms = delay_ms;
        self
    }

    /// Sets the phone number test sends are redirected to.
    pub fn with_test_recipient(mut self, phone: impl Into<String>) -> Self {
        self.dispatch.test_recipient = Some(phone.into());
        self
    }

    /// Sets the outbox file real sends are written to.
    pub fn with_outbox_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.dispatch.outbox_file = path.into();
        self
    }

    /// Builds the fee policy from the exemption list.
    pub fn payment_policy(&self) -> PaymentPolicy {
        PaymentPolicy::new(&self.payment.exemptions)
    }
}

/// Wristband numbering.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WristbandConfig {
    /// First number of the walk-in range.
    #[serde(default = "default_walkin_start")]
    pub walkin_start: u32,
}

impl Default for WristbandConfig {
    fn default() -> Self {
        Self {
            walkin_start: default_walkin_start(),
        }
    }
}

fn default_walkin_start() -> u32 {
    DEFAULT_WALKIN_START
}

/// Entry fee exemptions.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PaymentConfig {
    /// Keys, emails or underscore-joined names of people who enter free.
    #[serde(default)]
    pub exemptions: Vec<String>,
}

/// Matching engine settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchingConfig {
    /// Consecutive co-present runs before a special request fires.
    #[serde(default = "default_special_request_threshold")]
    pub special_request_threshold: u32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            special_request_threshold: default_special_request_threshold(),
        }
    }
}

fn default_special_request_threshold() -> u32 {
    2
}

/// Message dispatch settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchConfig {
    /// Pause between consecutive messages in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Destination every message is redirected to on a test send.
    #[serde(default)]
    pub test_recipient: Option<String>,

    /// JSON-lines file the outbox gateway appends to.
    #[serde(default = "default_outbox_file")]
    pub outbox_file: PathBuf,

    /// Text log failed sends are appended to.
    #[serde(default = "default_failure_log")]
    pub failure_log: PathBuf,

    #[serde(default)]
    pub templates: TemplateConfig,
}

impl DispatchConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            test_recipient: None,
            outbox_file: default_outbox_file(),
            failure_log: default_failure_log(),
            templates: TemplateConfig::default(),
        }
    }
}

fn default_delay_ms() -> u64 {
    100
}

fn default_outbox_file() -> PathBuf {
    PathBuf::from("outbox.jsonl")
}

fn default_failure_log() -> PathBuf {
    PathBuf::from("failed_sends.txt")
}

/// Message texts.
///
/// `{partner}` expands to one wristband label (`#12`); `{partners}` to one
/// or two labels joined with " and ".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TemplateConfig {
    #[serde(default = "default_match_message")]
    pub match_message: String,

    #[serde(default = "default_friend_message")]
    pub friend_message: String,

    #[serde(default = "default_friend_message")]
    pub friend_group_message: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            match_message: default_match_message(),
            friend_message: default_friend_message(),
            friend_group_message: default_friend_message(),
        }
    }
}

fn default_match_message() -> String {
    "Your Bridge match is {partner}!".to_string()
}

fn default_friend_message() -> String {
    "We didn't find a romantic interest for you this round, but you'd make great friends \
     with {partners}! You'll be prioritized for a romantic match next round."
        .to_string()
}
