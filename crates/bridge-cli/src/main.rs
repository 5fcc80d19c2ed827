//! Bridge CLI - operator console for the matching event
//!
//! Subcommands cover the whole evening:
//! - Import the roster and special requests
//! - Check guests in and out, fix wristbands, undo the last step
//! - Generate and commit a batch of matches
//! - Send a batch (for real, or redirected to a test phone)
//! - Export the ledger and reset between events

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;
mod error;
mod output;
mod prompt;
mod session;

use commands::{admin, checkin, matching, roster, send};
use error::CliResult;
use session::Session;

/// Bridge CLI application
#[derive(Parser)]
#[command(name = "bridge")]
#[command(about = "Bridge - live matching and check-in for singles events", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path (TOML or YAML)
    #[arg(short, long, env = "BRIDGE_CONFIG", default_value = "bridge.toml")]
    config: PathBuf,

    /// Override the state file from the configuration
    #[arg(short, long, env = "BRIDGE_STATE")]
    state: Option<PathBuf>,

    /// Show per-pair scoring detail
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Show check-in and matching totals
    Status,

    /// Look participants up by name, email, phone or wristband
    Search {
        query: String,

        /// Only show people who are checked in
        #[arg(long)]
        checked_in: bool,
    },

    /// Check a participant in
    CheckIn {
        query: String,

        /// Issue a number from the walk-in range
        #[arg(long)]
        walkin: bool,
    },

    /// Check a participant out (the wristband stays theirs)
    CheckOut { query: String },

    /// Check in everyone on the roster who is not here yet
    CheckInEveryone {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Reverse the last check-in or check-out
    Undo,

    /// Assign a specific wristband number
    EditWristband {
        query: String,
        number: u32,

        /// Take the number even if someone else holds it
        #[arg(long)]
        force: bool,
    },

    /// Import the roster from a JSON array of registrations
    Roster { path: PathBuf },

    /// Import special requests from a JSON array
    Requests { path: PathBuf },

    /// Generate the next batch of matches
    Generate {
        /// Commit without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Send the latest unsent batch
    Send {
        /// Redirect every message to the configured test phone
        #[arg(long)]
        test: bool,
    },

    /// Send an already dispatched batch again
    Resend { batch: u32 },

    /// Write the batch ledger to a JSON file
    Export { path: PathBuf },

    /// Clear check-ins, wristbands, requests and batches
    Reset,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    bridge_console::init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut session = Session::open(&cli.config, cli.state)?;

    match cli.command {
        Commands::Status => admin::status(&session),
        Commands::Search { query, checked_in } => checkin::search(&session, &query, checked_in),
        Commands::CheckIn { query, walkin } => checkin::check_in(&mut session, &query, walkin),
        Commands::CheckOut { query } => checkin::check_out(&mut session, &query),
        Commands::CheckInEveryone { yes } => checkin::check_in_everyone(&mut session, yes),
        Commands::Undo => checkin::undo(&mut session),
        Commands::EditWristband {
            query,
            number,
            force,
        } => checkin::edit_wristband(&mut session, &query, number, force),
        Commands::Roster { path } => roster::import_roster(&mut session, &path),
        Commands::Requests { path } => roster::import_requests(&mut session, &path),
        Commands::Generate { yes } => matching::generate(&mut session, yes, cli.verbose),
        Commands::Send { test } => {
            if test {
                send::send_test(&session)
            } else {
                send::send(&mut session)
            }
        }
        Commands::Resend { batch } => send::resend(&mut session, batch),
        Commands::Export { path } => admin::export(&session, &path),
        Commands::Reset => admin::reset(&mut session),
    }
}
