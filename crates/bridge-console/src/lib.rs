//! Colourful console output for matcher events.
//!
//! Provides a custom `tracing` layer that formats Bridge events with colours.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (check-ins, generation and phase start/end, dispatch)
//! - **WARN**: Failed sends, rejected roster rows, resets
//! - **DEBUG**: Special request progress, state saves
//! - **TRACE**: Individual candidate pairs

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "bridge=info";

/// Initializes console output.
///
/// Safe to call multiple times - only the first call has effect.
pub fn init() {
    init_with(DEFAULT_FILTER);
}

/// Initializes console output with `default_filter` used when `RUST_LOG`
/// is unset.
pub fn init_with(default_filter: &str) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(BridgeConsoleLayer)
            .try_init();
    });
}

/// A tracing layer that formats matcher events with colours.
///
/// Lines go to stderr so command output on stdout stays clean.
pub struct BridgeConsoleLayer;

impl<S: Subscriber> Layer<S> for BridgeConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("bridge_") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stderr(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    phase: Option<String>,
    name: Option<String>,
    reason: Option<String>,
    message: Option<String>,
    phase_index: Option<u64>,
    steps: Option<u64>,
    accepted_count: Option<u64>,
    duration_ms: Option<u64>,
    participant_count: Option<u64>,
    request_count: Option<u64>,
    batch: Option<u64>,
    records: Option<u64>,
    unmatched: Option<u64>,
    wristband: Option<u64>,
    messages: Option<u64>,
    sent: Option<u64>,
    failed: Option<u64>,
    score: Option<u64>,
    accepted: Option<bool>,
    reused: Option<bool>,
    grouped: Option<bool>,
    redirected: Option<bool>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        let s = s.trim_matches('"').to_string();
        match field.name() {
            "event" => self.event = Some(s),
            "phase" => self.phase = Some(s),
            "name" => self.name = Some(s),
            "reason" | "error" => self.reason = Some(s),
            "message" => self.message = Some(s),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "phase_index" => self.phase_index = Some(value),
            "steps" => self.steps = Some(value),
            "accepted" => self.accepted_count = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            "participant_count" => self.participant_count = Some(value),
            "request_count" => self.request_count = Some(value),
            "batch" => self.batch = Some(value),
            "records" => self.records = Some(value),
            "unmatched" => self.unmatched = Some(value),
            "wristband" => self.wristband = Some(value),
            "messages" => self.messages = Some(value),
            "sent" => self.sent = Some(value),
            "failed" => self.failed = Some(value),
            "score" => self.score = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value as u64);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            "accepted" => self.accepted = Some(value),
            "reused" => self.reused = Some(value),
            "grouped" => self.grouped = Some(value),
            "redirected" => self.redirected = Some(value),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "phase" => self.phase = Some(value.to_string()),
            "name" => self.name = Some(value.to_string()),
            "reason" | "error" => self.reason = Some(value.to_string()),
            "message" => self.message = Some(value.to_string()),
            _ => {}
        }
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    let event = v.event.as_deref().unwrap_or("");

    match event {
        "solve_start" => format_solve_start(v),
        "solve_end" => format_solve_end(v),
        "phase_start" => format_phase_start(v),
        "phase_end" => format_phase_end(v),
        "step" => format_step(v, level),
        "check_in" => format_check_in(v),
        "check_out" => format_check_out(v),
        "batch_committed" => format_batch_committed(v),
        "dispatch_start" => format_dispatch_start(v),
        "dispatch_end" => format_dispatch_end(v),
        "send_failed" | "roster_rejected" => format_warning(v),
        "" => v.message.clone().unwrap_or_default(),
        _ if level <= Level::INFO => format_generic(event, level),
        _ => String::new(),
    }
}

fn count(n: u64) -> String {
    n.to_formatted_string(&Locale::en)
}

fn format_solve_start(v: &EventVisitor) -> String {
    format!(
        "{} Generating batch #{} │ {} checked in │ {} requests",
        "▶".bright_green().bold(),
        v.batch.unwrap_or(0).bright_white().bold(),
        count(v.participant_count.unwrap_or(0)).bright_yellow(),
        count(v.request_count.unwrap_or(0)).bright_yellow(),
    )
}

fn format_solve_end(v: &EventVisitor) -> String {
    format!(
        "{} Generation complete │ {} records │ {} unmatched │ {}",
        "■".bright_cyan().bold(),
        count(v.records.unwrap_or(0)).bright_green(),
        count(v.unmatched.unwrap_or(0)).yellow(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
    )
}

fn format_phase_start(v: &EventVisitor) -> String {
    let phase = v.phase.as_deref().unwrap_or("Unknown");
    format!("  {} {} started", "▶".bright_blue(), phase.white().bold())
}

fn format_phase_end(v: &EventVisitor) -> String {
    let phase = v.phase.as_deref().unwrap_or("Unknown");
    let mut output = format!(
        "  {} {} ended │ {} │ {} candidates │ {} accepted",
        "◀".bright_blue(),
        phase.white().bold(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
        count(v.steps.unwrap_or(0)).white(),
        count(v.accepted_count.unwrap_or(0)).bright_magenta().bold(),
    );
    if v.grouped == Some(true) {
        output.push_str(&format!(" │ {}", "group of 3".bright_yellow()));
    }
    output
}

fn format_step(v: &EventVisitor, level: Level) -> String {
    if level != Level::TRACE {
        return String::new();
    }
    let icon = if v.accepted.unwrap_or(false) {
        "✓".bright_green().to_string()
    } else {
        "✗".bright_red().to_string()
    };
    format!(
        "    {} {} │ score {}",
        icon,
        v.phase.as_deref().unwrap_or("").bright_black(),
        v.score.unwrap_or(0).bright_black(),
    )
}

fn format_check_in(v: &EventVisitor) -> String {
    let reused = if v.reused == Some(true) {
        " (returning)".bright_black().to_string()
    } else {
        String::new()
    };
    format!(
        "{} {} checked in │ wristband #{}{}",
        "✓".bright_green().bold(),
        v.name.as_deref().unwrap_or("?").white().bold(),
        v.wristband.unwrap_or(0).bright_yellow().bold(),
        reused,
    )
}

fn format_check_out(v: &EventVisitor) -> String {
    format!(
        "{} {} checked out │ wristband #{}",
        "←".bright_blue(),
        v.name.as_deref().unwrap_or("?").white(),
        v.wristband.unwrap_or(0).yellow(),
    )
}

fn format_batch_committed(v: &EventVisitor) -> String {
    format!(
        "{} Batch #{} saved │ {} records",
        "■".bright_green().bold(),
        v.batch.unwrap_or(0).bright_white().bold(),
        count(v.records.unwrap_or(0)).bright_green(),
    )
}

fn format_dispatch_start(v: &EventVisitor) -> String {
    let mode = if v.redirected == Some(true) {
        "TEST".bright_yellow().bold().to_string()
    } else {
        "LIVE".bright_red().bold().to_string()
    };
    format!(
        "{} Sending batch #{} │ {} messages │ {}",
        "▶".bright_green().bold(),
        v.batch.unwrap_or(0).bright_white().bold(),
        count(v.messages.unwrap_or(0)).bright_yellow(),
        mode,
    )
}

fn format_dispatch_end(v: &EventVisitor) -> String {
    let failed = v.failed.unwrap_or(0);
    let failed_text = if failed > 0 {
        count(failed).bright_red().bold().to_string()
    } else {
        count(failed).white().to_string()
    };
    format!(
        "{} Batch #{} │ {} sent │ {} failed",
        "■".bright_cyan().bold(),
        v.batch.unwrap_or(0).bright_white().bold(),
        count(v.sent.unwrap_or(0)).bright_green(),
        failed_text,
    )
}

fn format_warning(v: &EventVisitor) -> String {
    format!(
        "{} {}: {}",
        "⚠".bright_yellow().bold(),
        v.name.as_deref().unwrap_or("?").white(),
        v.reason.as_deref().unwrap_or("").bright_red(),
    )
}

fn format_generic(event: &str, level: Level) -> String {
    let label = event.replace('_', " ");
    match level {
        Level::ERROR | Level::WARN => format!("{} {}", "⚠".bright_yellow(), label.yellow()),
        _ => format!("{} {}", "·".bright_black(), label.bright_black()),
    }
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_formatting() {
        assert_eq!(format_duration_ms(15), "15ms");
        assert_eq!(format_duration_ms(2500), "2.50s");
        assert_eq!(format_duration_ms(125_000), "2m 5s");
    }

    #[test]
    fn test_unknown_debug_event_is_silent() {
        let visitor = EventVisitor {
            event: Some("state_saved".into()),
            ..EventVisitor::default()
        };
        assert!(format_event(&visitor, Level::DEBUG).is_empty());
        assert!(!format_event(&visitor, Level::INFO).is_empty());
    }

    #[test]
    fn test_phase_end_mentions_counts() {
        let visitor = EventVisitor {
            event: Some("phase_end".into()),
            phase: Some("Friend".into()),
            steps: Some(1200),
            accepted_count: Some(3),
            grouped: Some(true),
            ..EventVisitor::default()
        };
        let line = format_event(&visitor, Level::INFO);
        assert!(line.contains("Friend"));
        assert!(line.contains("1,200"));
        assert!(line.contains("group of 3"));
    }
}
