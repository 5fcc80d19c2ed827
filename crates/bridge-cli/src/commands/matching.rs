//! Batch generation with operator preview.

use chrono::Utc;
use owo_colors::OwoColorize;

use bridge_core::{MatchKind, MatchRecord, SystemState};
use bridge_scoring::ScoreBreakdown;
use bridge_solver::{MatchEngine, Proposal};

use crate::error::CliResult;
use crate::output::{print_header, print_info, print_success, print_warning, record_line};
use crate::prompt::confirm;
use crate::session::Session;

const SECTIONS: [(MatchKind, &str); 4] = [
    (MatchKind::Special, "Special requests"),
    (MatchKind::Romantic, "Romantic matches"),
    (MatchKind::Friend, "Friend matches"),
    (MatchKind::FriendGroup, "Friend group"),
];

pub fn generate(session: &mut Session, yes: bool, verbose: bool) -> CliResult<()> {
    let mut engine = MatchEngine::new(&session.config.matching);
    let proposal = engine.generate(&session.state)?;

    print_preview(&session.state, &proposal, verbose);

    if !yes && !confirm(&format!("Commit batch #{}?", proposal.batch_number()))? {
        print_warning("Batch discarded; nothing was saved");
        return Ok(());
    }

    let number = proposal.commit(&mut session.state, Utc::now())?;
    session.save()?;
    print_success(&format!(
        "Batch #{number} saved. Run `bridge send` to notify participants."
    ));
    Ok(())
}

fn print_preview(state: &SystemState, proposal: &Proposal, verbose: bool) {
    print_header(&format!("Proposed batch #{}", proposal.batch_number()));

    for (kind, title) in SECTIONS {
        let records: Vec<&MatchRecord> = proposal.records.iter().filter(|r| r.kind == kind).collect();
        if records.is_empty() {
            continue;
        }
        println!();
        println!("{} ({})", title.bold(), records.len());
        for (index, record) in records.iter().enumerate() {
            println!("{}", record_line(index, record));
            if verbose && kind == MatchKind::Romantic {
                if let Some(breakdown) = breakdown_of(state, record) {
                    println!("       {}", breakdown.to_string().bright_black());
                }
            }
        }
    }

    if !proposal.unmatched.is_empty() {
        let names: Vec<String> = proposal
            .unmatched
            .iter()
            .map(|key| state.participant(key).map_or_else(|| key.to_string(), |p| p.name.clone()))
            .collect();
        println!();
        print_warning(&format!("Unmatched this round: {}", names.join(", ")));
    }

    println!();
    for stats in &proposal.stats {
        print_info(&format!(
            "{}: {} accepted of {} considered ({:.1?})",
            stats.phase, stats.accepted, stats.candidates, stats.duration
        ));
    }
    print_info(&format!(
        "{} records, {} messages",
        proposal.records.len(),
        proposal.message_count()
    ));
}

fn breakdown_of(state: &SystemState, record: &MatchRecord) -> Option<ScoreBreakdown> {
    let [a, b] = record.members.as_slice() else {
        return None;
    };
    let a = state.participant(&a.key)?;
    let b = state.participant(&b.key)?;
    Some(ScoreBreakdown::between(a, b))
}
