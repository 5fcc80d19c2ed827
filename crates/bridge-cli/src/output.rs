//! Terminal output helpers.

use owo_colors::OwoColorize;

use bridge_core::{MatchRecord, Participant};

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

pub fn print_header(title: &str) {
    println!();
    println!("{}", "=".repeat(60).bright_black());
    println!("{}", title.bold());
    println!("{}", "=".repeat(60).bright_black());
}

/// `#12`, or a placeholder when no wristband was issued.
pub fn wristband(participant: &Participant) -> String {
    participant
        .wristband
        .map_or_else(|| "not assigned".to_string(), |n| format!("#{n}"))
}

pub fn payment(participant: &Participant) -> String {
    if participant.payment_required {
        "OWES ENTRY FEE".yellow().to_string()
    } else {
        "FREE ENTRY".green().to_string()
    }
}

/// One line per record: members with wristbands, score and friend reason.
pub fn record_line(index: usize, record: &MatchRecord) -> String {
    let members = record
        .members
        .iter()
        .map(|m| format!("{} ({})", m.name, m.wristband_label()))
        .collect::<Vec<_>>()
        .join(" ↔ ");
    let mut line = format!("{:>3}. {members}", index + 1);
    if let Some(reason) = record.reason {
        line.push_str(&format!(" [{}]", reason.to_string().bright_black()));
    }
    line.push_str(&format!(" [score {}]", record.score));
    line
}
