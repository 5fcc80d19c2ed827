//! Batch dispatch.
//!
//! Real sends, resends and test sends all go through [`dispatch`]; a test
//! send is a dispatch with a redirect.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use bridge_config::TemplateConfig;
use bridge_core::{BridgeError, MatchBatch, Phone, Result};

use crate::gateway::MessageGateway;
use crate::message::{messages_for, Outgoing};

/// How a batch is sent.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Sends every message to this number instead of the member's.
    pub redirect: Option<Phone>,
    /// Pause between consecutive messages.
    pub delay: Duration,
    pub templates: TemplateConfig,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            redirect: None,
            delay: Duration::from_millis(100),
            templates: TemplateConfig::default(),
        }
    }
}

/// A message that could not be delivered.
#[derive(Debug)]
pub struct FailedSend {
    pub name: String,
    pub phone: Option<Phone>,
    pub wristband: Option<u32>,
    pub partners: Vec<String>,
    pub error: BridgeError,
}

/// Per-batch dispatch outcome.
#[derive(Debug)]
pub struct DispatchReport {
    pub batch: u32,
    pub sent: usize,
    pub failures: Vec<FailedSend>,
    pub redirected: bool,
    /// True when this dispatch stamped the batch as sent.
    pub marked_dispatched: bool,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.sent + self.failures.len()
    }
}

/// Sends one message per record member, sequentially.
///
/// A failed message is recorded and the batch carries on. Once every
/// message was attempted, a non-redirected dispatch stamps the batch's
/// dispatch time if it was not already set.
///
/// # Errors
///
/// [`BridgeError::NothingToDispatch`] for a batch without records.
pub fn dispatch(
    batch: &mut MatchBatch,
    gateway: &mut dyn MessageGateway,
    options: &DispatchOptions,
    now: DateTime<Utc>,
) -> Result<DispatchReport> {
    if batch.records.is_empty() {
        return Err(BridgeError::NothingToDispatch);
    }

    let outgoing: Vec<Outgoing> = batch
        .records
        .iter()
        .flat_map(|record| messages_for(record, &options.templates))
        .collect();
    info!(
        event = "dispatch_start",
        batch = batch.number as u64,
        messages = outgoing.len() as u64,
        gateway = gateway.gateway_name(),
        redirected = options.redirect.is_some(),
    );

    let mut report = DispatchReport {
        batch: batch.number,
        sent: 0,
        failures: Vec::new(),
        redirected: options.redirect.is_some(),
        marked_dispatched: false,
    };

    for (index, message) in outgoing.into_iter().enumerate() {
        if index > 0 && !options.delay.is_zero() {
            thread::sleep(options.delay);
        }

        let destination = options.redirect.as_ref().or(message.phone.as_ref());
        let outcome = match destination {
            Some(to) => gateway.send(to, &message.body).map_err(|e| e.to_string()),
            None => Err("no phone number on record".to_string()),
        };

        match outcome {
            Ok(()) => report.sent += 1,
            Err(reason) => {
                warn!(
                    event = "send_failed",
                    batch = batch.number as u64,
                    name = %message.name,
                    reason = %reason,
                );
                report.failures.push(FailedSend {
                    error: BridgeError::DispatchFailure {
                        recipient: message.name.clone(),
                        reason,
                    },
                    name: message.name,
                    phone: message.phone,
                    wristband: message.wristband,
                    partners: message.partners,
                });
            }
        }
    }

    if options.redirect.is_none() && !batch.is_dispatched() {
        batch.mark_dispatched(now)?;
        report.marked_dispatched = true;
    }

    info!(
        event = "dispatch_end",
        batch = batch.number as u64,
        sent = report.sent as u64,
        failed = report.failures.len() as u64,
        marked_dispatched = report.marked_dispatched,
    );
    Ok(report)
}

/// Appends a report's failures to the text failure log.
///
/// Does nothing when every message was delivered.
pub fn append_failure_log(
    path: &Path,
    report: &DispatchReport,
    at: DateTime<Utc>,
) -> std::io::Result<()> {
    if report.failures.is_empty() {
        return Ok(());
    }

    let rule = "=".repeat(60);
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file)?;
    writeln!(file, "{rule}")?;
    writeln!(file, "Batch #{} - {}", report.batch, at.to_rfc3339())?;
    writeln!(file, "{rule}")?;
    for failure in &report.failures {
        let wristband = failure
            .wristband
            .map_or_else(|| "?".to_string(), |n| n.to_string());
        let phone = failure
            .phone
            .as_ref()
            .map_or_else(|| "none".to_string(), ToString::to_string);
        writeln!(file, "{} (Wristband #{wristband})", failure.name)?;
        writeln!(file, "  Phone: {phone}")?;
        writeln!(file, "  Match: {}", failure.partners.join(", "))?;
        writeln!(file, "  Error: {}", failure.error)?;
        writeln!(file)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
