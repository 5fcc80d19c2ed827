//! Outbound message gateways.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use bridge_core::Phone;

/// Gateway error
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rejected by gateway: {0}")]
    Rejected(String),
}

/// Delivers one text message.
///
/// Implementations wrap an SMS provider; the workspace ships an outbox file
/// and a dry run.
pub trait MessageGateway {
    fn send(&mut self, to: &Phone, body: &str) -> Result<(), GatewayError>;

    /// Returns the name of this gateway.
    fn gateway_name(&self) -> &'static str;
}

/// One line of the outbox file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxLine {
    pub to: String,
    pub body: String,
    pub queued_at: DateTime<Utc>,
}

/// Appends each message as a JSON line for an external sender to pick up.
#[derive(Debug, Clone)]
pub struct OutboxGateway {
    path: PathBuf,
}

impl OutboxGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MessageGateway for OutboxGateway {
    fn send(&mut self, to: &Phone, body: &str) -> Result<(), GatewayError> {
        let line = OutboxLine {
            to: to.to_e164(),
            body: body.to_string(),
            queued_at: Utc::now(),
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", serde_json::to_string(&line)?)?;
        Ok(())
    }

    fn gateway_name(&self) -> &'static str {
        "outbox"
    }
}

/// Logs messages instead of sending them and keeps a copy.
#[derive(Debug, Default)]
pub struct DryRunGateway {
    sent: Vec<(Phone, String)>,
}

impl DryRunGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> &[(Phone, String)] {
        &self.sent
    }
}

impl MessageGateway for DryRunGateway {
    fn send(&mut self, to: &Phone, body: &str) -> Result<(), GatewayError> {
        info!(event = "dry_run_send", to = %to, body = body);
        self.sent.push((to.clone(), body.to_string()));
        Ok(())
    }

    fn gateway_name(&self) -> &'static str {
        "dry-run"
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_outbox_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut gateway = OutboxGateway::new(dir.path().join("outbox.jsonl"));
        let phone = Phone::parse("713-555-0001").unwrap();

        gateway.send(&phone, "first").unwrap();
        gateway.send(&phone, "second").unwrap();

        let contents = fs::read_to_string(gateway.path()).unwrap();
        let lines: Vec<OutboxLine> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].to, "+17135550001");
        assert_eq!(lines[1].body, "second");
    }

    #[test]
    fn test_dry_run_records() {
        let mut gateway = DryRunGateway::new();
        let phone = Phone::parse("7135550002").unwrap();

        gateway.send(&phone, "hello").unwrap();

        assert_eq!(gateway.sent(), &[(phone, "hello".to_string())]);
    }
}
