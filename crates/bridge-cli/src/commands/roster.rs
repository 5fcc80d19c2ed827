//! Roster and special-request ingestion from JSON files.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::warn;

use bridge_core::{RejectedEntry, RosterEntry, SpecialRequestEntry};

use crate::error::CliResult;
use crate::output::{print_success, print_warning};
use crate::session::Session;

pub fn import_roster(session: &mut Session, path: &Path) -> CliResult<()> {
    let entries: Vec<RosterEntry> = read_entries(path)?;
    let policy = session.config.payment_policy();
    let report = session.state.merge_roster(entries, &policy);
    session.save()?;

    print_success(&format!(
        "Roster merged: {} added, {} updated, {} removed",
        report.added,
        report.updated,
        report.removed.len()
    ));
    report_rejected("roster_rejected", &report.rejected);
    Ok(())
}

pub fn import_requests(session: &mut Session, path: &Path) -> CliResult<()> {
    let entries: Vec<SpecialRequestEntry> = read_entries(path)?;
    let report = session.state.merge_special_requests(entries);
    session.save()?;

    print_success(&format!(
        "Special requests merged: {} added, {} updated",
        report.added, report.updated
    ));
    report_rejected("request_rejected", &report.rejected);
    Ok(())
}

pub(crate) fn read_entries<T: DeserializeOwned>(path: &Path) -> CliResult<Vec<T>> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn report_rejected(event: &'static str, rejected: &[RejectedEntry]) {
    for entry in rejected {
        warn!(event = event, name = %entry.name, error = %entry.error);
        print_warning(&format!("Skipped {}: {}", entry.name, entry.error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_partial_roster_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        fs::write(
            &path,
            r#"[
                {"name": "Ada Park", "phone": "713-555-0001", "gender": "Female", "accepted_genders": ["Male"]},
                {"name": "Ben Cho", "email": "ben.cho@rice.edu"}
            ]"#,
        )
        .unwrap();

        let entries: Vec<RosterEntry> = read_entries(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].accepted_genders, vec!["Male".to_string()]);
        assert_eq!(entries[1].phone, None);
    }

    #[test]
    fn test_rejects_non_array_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requests.json");
        fs::write(&path, r#"{"requester_phone": "7135550001"}"#).unwrap();

        let result: CliResult<Vec<SpecialRequestEntry>> = read_entries(&path);
        assert!(matches!(result, Err(crate::error::CliError::Json(_))));
    }
}
