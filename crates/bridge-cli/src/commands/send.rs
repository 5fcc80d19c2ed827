//! Sending batches: latest, resend and redirected test sends.

use chrono::Utc;
use owo_colors::OwoColorize;

use bridge_core::{BridgeError, MatchBatch, MatchKind, Phone};
use bridge_dispatch::{append_failure_log, dispatch, DispatchOptions, DispatchReport, OutboxGateway};

use crate::error::{CliError, CliResult};
use crate::output::{print_error, print_header, print_info, print_success, print_warning, record_line};
use crate::prompt::{confirm, confirm_steps};
use crate::session::Session;

/// Sends the most recent undispatched batch after three typed confirmations.
pub fn send(session: &mut Session) -> CliResult<()> {
    let number = session
        .state
        .ledger()
        .latest_undispatched()
        .map(|batch| batch.number)
        .ok_or(BridgeError::NothingToDispatch)?;
    let batch = find_batch(session, number)?;
    print_batch(batch);

    let records = batch.records.len().to_string();
    let steps = [
        ("Send real messages now?", "SEND".to_string()),
        ("How many matches are in this batch?", records),
        ("Final confirmation", format!("SEND BATCH {number}")),
    ];
    if !confirm_steps(&steps)? {
        return Ok(());
    }

    send_batch(session, number)
}

/// Sends `number` again, dispatched or not.
pub fn resend(session: &mut Session, number: u32) -> CliResult<()> {
    let batch = find_batch(session, number)?;
    print_batch(batch);
    if batch.is_dispatched() {
        print_warning("This batch was already sent; everyone in it will be texted again");
    }

    if !confirm_steps(&[("Resend every message in this batch?", "RESEND ALL".to_string())])? {
        return Ok(());
    }
    send_batch(session, number)
}

/// Sends the latest batch with every message redirected to the test phone.
/// The batch is never marked dispatched.
pub fn send_test(session: &Session) -> CliResult<()> {
    let raw = session
        .config
        .dispatch
        .test_recipient
        .as_deref()
        .ok_or(CliError::MissingTestRecipient)?;
    let recipient = Phone::parse(raw)?;

    let ledger = session.state.ledger();
    let mut batch = ledger
        .latest_undispatched()
        .or_else(|| ledger.batches().last())
        .cloned()
        .ok_or(BridgeError::NothingToDispatch)?;
    print_batch(&batch);

    if !confirm(&format!(
        "Send {} test messages to {recipient}?",
        batch.message_count()
    ))? {
        return Ok(());
    }

    let options = options_for(session, Some(recipient));
    let mut gateway = OutboxGateway::new(session.config.dispatch.outbox_file.clone());
    let report = dispatch(&mut batch, &mut gateway, &options, Utc::now())?;
    finish(session, &report)
}

fn find_batch(session: &Session, number: u32) -> CliResult<&MatchBatch> {
    Ok(session
        .state
        .ledger()
        .get(number)
        .ok_or(BridgeError::UnknownBatch(number))?)
}

fn send_batch(session: &mut Session, number: u32) -> CliResult<()> {
    let options = options_for(session, None);
    let mut gateway = OutboxGateway::new(session.config.dispatch.outbox_file.clone());

    let batch = session.state.ledger_mut().get_mut(number)?;
    let report = dispatch(batch, &mut gateway, &options, Utc::now())?;
    if report.marked_dispatched {
        session.save()?;
    }
    finish(session, &report)
}

fn options_for(session: &Session, redirect: Option<Phone>) -> DispatchOptions {
    DispatchOptions {
        redirect,
        delay: session.config.dispatch.delay(),
        templates: session.config.dispatch.templates.clone(),
    }
}

fn finish(session: &Session, report: &DispatchReport) -> CliResult<()> {
    let log = &session.config.dispatch.failure_log;
    append_failure_log(log, report, Utc::now())?;

    if report.failures.is_empty() {
        print_success(&format!(
            "Batch #{}: all {} messages sent",
            report.batch, report.sent
        ));
    } else {
        print_warning(&format!(
            "Batch #{}: {} of {} messages sent",
            report.batch,
            report.sent,
            report.attempted()
        ));
        for failure in &report.failures {
            let wristband = failure.wristband.map_or_else(|| "?".to_string(), |n| n.to_string());
            print_error(&format!("{} (#{wristband}): {}", failure.name, failure.error));
        }
        print_info(&format!("Failures appended to {}", log.display()));
    }
    if report.redirected {
        print_info("Test send: batch left unsent");
    }
    Ok(())
}

fn print_batch(batch: &MatchBatch) {
    let sent = batch.dispatched_at.map_or_else(
        || "not sent".yellow().to_string(),
        |at| format!("sent {}", at.format("%H:%M:%S")).green().to_string(),
    );
    print_header(&format!("Batch #{} ({sent})", batch.number));
    println!(
        "  {} special, {} romantic, {} friend, {} friend group; {} messages",
        batch.count_of(MatchKind::Special),
        batch.count_of(MatchKind::Romantic),
        batch.count_of(MatchKind::Friend),
        batch.count_of(MatchKind::FriendGroup),
        batch.message_count()
    );
    for (index, record) in batch.records.iter().enumerate() {
        println!("{}", record_line(index, record));
    }
}
