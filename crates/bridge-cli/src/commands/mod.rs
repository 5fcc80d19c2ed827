//! Subcommand implementations.

pub mod admin;
pub mod checkin;
pub mod matching;
pub mod roster;
pub mod send;
