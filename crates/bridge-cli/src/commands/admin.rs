//! Status, export and reset.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;

use bridge_core::{MatchBatch, SystemState};

use crate::error::CliResult;
use crate::output::{print_header, print_success, print_warning};
use crate::prompt::confirm_steps;
use crate::session::Session;

/// Document written by `bridge export`.
#[derive(Debug, Serialize)]
pub(crate) struct LedgerExport<'a> {
    pub exported_at: DateTime<Utc>,
    pub total_batches: usize,
    pub total_records: usize,
    pub batches: &'a [MatchBatch],
}

impl<'a> LedgerExport<'a> {
    pub(crate) fn of(state: &'a SystemState, exported_at: DateTime<Utc>) -> Self {
        let ledger = state.ledger();
        Self {
            exported_at,
            total_batches: ledger.len(),
            total_records: ledger.record_count(),
            batches: ledger.batches(),
        }
    }
}

pub fn status(session: &Session) -> CliResult<()> {
    let summary = session.state.status();
    print_header("Bridge status");

    println!("  Participants:   {}", summary.total);
    println!("  Checked in:     {}", summary.checked_in.to_string().green());
    for (gender, count) in &summary.checked_in_by_gender {
        println!("    {gender}: {count}");
    }
    println!(
        "  Batches:        {} ({} sent)",
        summary.batches, summary.batches_dispatched
    );
    println!("  Matches made:   {}", summary.records);
    println!(
        "  Never matched:  {} checked in",
        summary.never_matched_checked_in
    );
    println!("  Match counts:");
    for (matches, people) in &summary.match_distribution {
        println!("    {matches} match(es): {people}");
    }
    println!(
        "  Payment:        {} owe, {} exempt",
        summary.payment_owed.to_string().yellow(),
        summary.payment_exempt
    );

    let counters = session.state.counters();
    println!(
        "  Next wristband: #{} (walk-in #{})",
        counters.next_standard, counters.next_walkin
    );
    if let Some(updated) = session.state.updated_at() {
        println!("  Last saved:     {}", updated.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}

pub fn export(session: &Session, path: &Path) -> CliResult<()> {
    let document = LedgerExport::of(&session.state, Utc::now());
    fs::write(path, serde_json::to_string_pretty(&document)?)?;
    print_success(&format!(
        "Exported {} batches to {}",
        document.total_batches,
        path.display()
    ));
    Ok(())
}

pub fn reset(session: &mut Session) -> CliResult<()> {
    print_warning("This clears every check-in, wristband, match history, request counter and batch");
    if !confirm_steps(&[("Reset the event?", "RESET".to_string())])? {
        return Ok(());
    }

    session.state.reset(Utc::now());
    session.save()?;
    print_success("Event reset; the roster is kept");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::MatchKind;
    use bridge_test::{fixture_time, guest, EventBuilder};

    #[test]
    fn test_export_lists_every_batch() {
        let state = EventBuilder::new()
            .present(guest(1, "Ada Park"))
            .present(guest(2, "Ben Cho"))
            .present(guest(3, "Cy Diaz"))
            .present(guest(4, "Dee Ellis"))
            .matched(MatchKind::Romantic, &[1, 2])
            .matched(MatchKind::Romantic, &[3, 4])
            .build();

        let document = LedgerExport::of(&state, fixture_time());
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&document).unwrap()).unwrap();

        assert_eq!(json["total_batches"], 2);
        assert_eq!(json["total_records"], 2);
        assert_eq!(json["batches"][1]["number"], 2);
        assert_eq!(json["batches"][0]["records"][0]["kind"], "romantic");
    }

    #[test]
    fn test_export_of_empty_ledger() {
        let state = SystemState::default();
        let document = LedgerExport::of(&state, fixture_time());

        assert_eq!(document.total_batches, 0);
        assert!(document.batches.is_empty());
    }
}
