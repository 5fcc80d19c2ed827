//! Door commands: search, check-in/out, undo and wristband edits.

use owo_colors::OwoColorize;

use bridge_core::{BridgeError, Lane, Participant, ParticipantKey, SearchScope, Undone};

use crate::error::CliResult;
use crate::output::{payment, print_info, print_success, print_warning, wristband};
use crate::prompt::{confirm, pick_participant};
use crate::session::Session;

pub fn search(session: &Session, query: &str, checked_in: bool) -> CliResult<()> {
    let scope = if checked_in {
        SearchScope::CheckedIn
    } else {
        SearchScope::All
    };
    let found = session.state.search(query, scope);
    if found.is_empty() {
        print_warning(&format!("No participant found matching '{query}'"));
        return Ok(());
    }

    print_info(&format!("{} result(s) for '{query}'", found.len()));
    for participant in found {
        print_card(session, participant);
    }
    Ok(())
}

pub fn check_in(session: &mut Session, query: &str, walkin: bool) -> CliResult<()> {
    let Some(key) = pick_participant(&session.state, query, SearchScope::All)? else {
        return Ok(());
    };
    let lane = if walkin { Lane::Walkin } else { Lane::Standard };
    let outcome = session.state.check_in(&key, lane)?;
    session.save()?;

    if let Some(participant) = session.state.participant(&key) {
        let note = if outcome.reused { " (returning)" } else { "" };
        print_success(&format!(
            "{} checked in with wristband {}{note}",
            participant.name.bold(),
            format!("#{}", outcome.wristband).cyan()
        ));
        println!("  Payment: {}", payment(participant));
    }
    Ok(())
}

pub fn check_out(session: &mut Session, query: &str) -> CliResult<()> {
    let Some(key) = pick_participant(&session.state, query, SearchScope::CheckedIn)? else {
        return Ok(());
    };
    let number = session.state.check_out(&key)?;
    session.save()?;

    let name = session
        .state
        .participant(&key)
        .map(|p| p.name.clone())
        .unwrap_or_default();
    print_success(&format!("{name} checked out (keeps wristband #{number})"));
    Ok(())
}

pub fn check_in_everyone(session: &mut Session, yes: bool) -> CliResult<()> {
    let pending = session.state.participants().filter(|p| !p.checked_in).count();
    if pending == 0 {
        print_info("Everyone is already checked in");
        return Ok(());
    }
    if !yes && !confirm(&format!("Check in all {pending} remaining participants?"))? {
        print_warning("Nothing changed");
        return Ok(());
    }

    let count = session.state.check_in_everyone();
    session.save()?;
    print_success(&format!("Checked in {count} participants"));
    Ok(())
}

pub fn undo(session: &mut Session) -> CliResult<()> {
    let undone = session.state.undo_last()?;
    session.save()?;

    let name_of = |key: &ParticipantKey| {
        session
            .state
            .participant(key)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    };
    match &undone {
        Undone::CheckIn { key, wristband } => {
            let held = wristband.map(|n| format!(" (wristband #{n} stays reserved)"));
            print_success(&format!(
                "Undid check-in of {}{}",
                name_of(key),
                held.unwrap_or_default()
            ));
        }
        Undone::CheckOut { key } => {
            print_success(&format!("Undid check-out of {}", name_of(key)));
        }
    }
    Ok(())
}

pub fn edit_wristband(session: &mut Session, query: &str, number: u32, force: bool) -> CliResult<()> {
    let Some(key) = pick_participant(&session.state, query, SearchScope::All)? else {
        return Ok(());
    };

    let previous = match session.state.edit_wristband(&key, number, force) {
        Err(BridgeError::WristbandCollision { number, holder }) => {
            print_warning(&format!("Wristband #{number} is already assigned to {holder}"));
            if !confirm("Assign it anyway?")? {
                return Ok(());
            }
            session.state.edit_wristband(&key, number, true)?
        }
        other => other?,
    };
    session.save()?;

    let was = previous.map_or_else(|| "none".to_string(), |n| format!("#{n}"));
    print_success(&format!("Wristband changed from {was} to #{number}"));
    Ok(())
}

fn print_card(session: &Session, participant: &Participant) {
    let status = if participant.checked_in {
        "CHECKED IN".green().to_string()
    } else {
        "not checked in".bright_black().to_string()
    };
    println!();
    println!("{} [{}]", participant.name.bold(), status);
    println!("  Wristband: {}", wristband(participant));
    if let Some(phone) = &participant.phone {
        println!("  Phone:     {phone}");
    }
    if let Some(email) = &participant.email {
        println!("  Email:     {email}");
    }
    if let Some(gender) = &participant.gender {
        let accepts = participant
            .accepted_genders
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!("  Gender:    {gender} (interested in: {accepts})");
    }
    if let Some(grade) = participant.grade {
        println!("  Grade:     {grade:?}");
    }
    println!("  Payment:   {}", payment(participant));

    let partners: Vec<String> = participant
        .match_history
        .iter()
        .map(|key| {
            session
                .state
                .participant(key)
                .map_or_else(|| key.to_string(), |p| p.name.clone())
        })
        .collect();
    if partners.is_empty() {
        println!("  Matches:   none yet");
    } else {
        println!("  Matches:   {} ({})", partners.len(), partners.join(", "));
    }
}
