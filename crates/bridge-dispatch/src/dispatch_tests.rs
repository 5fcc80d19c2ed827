use std::fs;

use bridge_core::{BlockReason, MatchKind, MatchRecord};
use bridge_test::{fixture_time, guest};

use super::*;
use crate::gateway::{DryRunGateway, GatewayError};

// Rejects every message to one phone number.
struct FlakyGateway {
    refuse: Phone,
    sent: Vec<Phone>,
}

impl MessageGateway for FlakyGateway {
    fn send(&mut self, to: &Phone, _body: &str) -> std::result::Result<(), GatewayError> {
        if *to == self.refuse {
            return Err(GatewayError::Rejected("carrier unreachable".into()));
        }
        self.sent.push(to.clone());
        Ok(())
    }

    fn gateway_name(&self) -> &'static str {
        "flaky"
    }
}

fn batch() -> MatchBatch {
    let a = guest(1, "Ada").present(1);
    let b = guest(2, "Ben").present(2);
    let c = guest(3, "Cy").present(3);
    let d = guest(4, "Dee").present(4);
    let e = guest(5, "Eve").present(5);
    MatchBatch {
        number: 3,
        created_at: fixture_time(),
        dispatched_at: None,
        records: vec![
            MatchRecord::pair(MatchKind::Romantic, &a, &b, 40),
            MatchRecord::friend(&c, &d, 5, BlockReason::GenderPreference).into_group(&e),
        ],
    }
}

fn quick() -> DispatchOptions {
    DispatchOptions {
        delay: Duration::ZERO,
        ..DispatchOptions::default()
    }
}

#[test]
fn test_real_send_marks_batch() {
    let mut batch = batch();
    let mut gateway = DryRunGateway::new();

    let report = dispatch(&mut batch, &mut gateway, &quick(), fixture_time()).unwrap();

    assert_eq!(report.sent, 5);
    assert!(report.failures.is_empty());
    assert!(report.marked_dispatched);
    assert_eq!(batch.dispatched_at, Some(fixture_time()));
    assert_eq!(gateway.sent()[0].1, "Your Bridge match is #2!");
}

#[test]
fn test_single_failure_does_not_abort() {
    let mut batch = batch();
    let mut gateway = FlakyGateway {
        refuse: Phone::parse("7135550002").unwrap(),
        sent: Vec::new(),
    };

    let report = dispatch(&mut batch, &mut gateway, &quick(), fixture_time()).unwrap();

    assert_eq!(report.attempted(), 5);
    assert_eq!(report.sent, 4);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "Ben");
    assert_eq!(report.failures[0].partners, vec!["#1"]);
    assert!(batch.is_dispatched());
}

#[test]
fn test_redirect_keeps_batch_unsent() {
    let mut batch = batch();
    let mut gateway = DryRunGateway::new();
    let tester = Phone::parse("7135559999").unwrap();
    let options = DispatchOptions {
        redirect: Some(tester.clone()),
        ..quick()
    };

    let report = dispatch(&mut batch, &mut gateway, &options, fixture_time()).unwrap();

    assert!(report.redirected);
    assert!(!report.marked_dispatched);
    assert!(!batch.is_dispatched());
    assert!(gateway.sent().iter().all(|(to, _)| *to == tester));
}

#[test]
fn test_resend_keeps_original_timestamp() {
    let mut batch = batch();
    batch.dispatched_at = Some(fixture_time());
    let later = fixture_time() + chrono::Duration::hours(1);

    let report = dispatch(&mut batch, &mut DryRunGateway::new(), &quick(), later).unwrap();

    assert_eq!(report.sent, 5);
    assert!(!report.marked_dispatched);
    assert_eq!(batch.dispatched_at, Some(fixture_time()));
}

#[test]
fn test_member_without_phone_fails_alone() {
    let a = guest(1, "Ada").present(1);
    let b = guest(2, "Ben").without_phone().present(2);
    let mut batch = MatchBatch {
        number: 1,
        created_at: fixture_time(),
        dispatched_at: None,
        records: vec![MatchRecord::pair(MatchKind::Special, &a, &b, 999)],
    };

    let report = dispatch(&mut batch, &mut DryRunGateway::new(), &quick(), fixture_time()).unwrap();

    assert_eq!(report.sent, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        BridgeError::DispatchFailure { .. }
    ));
}

#[test]
fn test_empty_batch_rejected() {
    let mut batch = MatchBatch {
        number: 1,
        created_at: fixture_time(),
        dispatched_at: None,
        records: Vec::new(),
    };

    assert!(matches!(
        dispatch(&mut batch, &mut DryRunGateway::new(), &quick(), fixture_time()),
        Err(BridgeError::NothingToDispatch)
    ));
}

#[test]
fn test_failure_log_appends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("failed_sends.txt");
    let mut batch = batch();
    let mut gateway = FlakyGateway {
        refuse: Phone::parse("7135550004").unwrap(),
        sent: Vec::new(),
    };
    let report = dispatch(&mut batch, &mut gateway, &quick(), fixture_time()).unwrap();

    append_failure_log(&path, &report, fixture_time()).unwrap();
    append_failure_log(&path, &report, fixture_time()).unwrap();

    let log = fs::read_to_string(&path).unwrap();
    assert_eq!(log.matches("Batch #3").count(), 2);
    assert!(log.contains("Dee (Wristband #4)"));
    assert!(log.contains("Match: #3, #5"));
    assert!(log.contains("carrier unreachable"));
}
