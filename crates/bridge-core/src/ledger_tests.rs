use chrono::{TimeZone, Utc};

use super::*;
use crate::test_utils::participant;

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 7, 21, minute, 0).unwrap()
}

#[test]
fn test_append_numbers_from_one() {
    let mut ledger = BatchLedger::new();
    assert_eq!(ledger.next_number(), 1);

    let a = participant(1, "Ada");
    let b = participant(2, "Ben");
    let number = ledger
        .append(vec![MatchRecord::pair(MatchKind::Romantic, &a, &b, 40)], at(0))
        .number;
    assert_eq!(number, 1);
    assert_eq!(ledger.append(Vec::new(), at(5)).number, 2);
    assert_eq!(ledger.last_number(), 2);
}

#[test]
fn test_dispatch_stamped_once() {
    let mut ledger = BatchLedger::new();
    ledger.append(Vec::new(), at(0));

    let batch = ledger.get_mut(1).unwrap();
    batch.mark_dispatched(at(10)).unwrap();
    let err = batch.mark_dispatched(at(20)).unwrap_err();

    assert!(matches!(err, BridgeError::AlreadyDispatched(1)));
    assert_eq!(ledger.get(1).unwrap().dispatched_at, Some(at(10)));
}

#[test]
fn test_latest_undispatched() {
    let mut ledger = BatchLedger::new();
    ledger.append(Vec::new(), at(0));
    ledger.append(Vec::new(), at(1));
    ledger.get_mut(2).unwrap().mark_dispatched(at(2)).unwrap();

    assert_eq!(ledger.latest_undispatched().map(|b| b.number), Some(1));
    assert_eq!(ledger.undispatched_count(), 1);
    assert!(matches!(ledger.get_mut(9), Err(BridgeError::UnknownBatch(9))));
}

#[test]
fn test_group_links_and_partners() {
    let a = participant(1, "Ada");
    let b = participant(2, "Ben");
    let c = participant(3, "Cy");
    let group = MatchRecord::friend(&a, &b, 35, BlockReason::GenderPreference).into_group(&c);

    assert_eq!(group.kind, MatchKind::FriendGroup);
    assert_eq!(group.score, 0);
    assert_eq!(group.links().len(), 3);
    let partners: Vec<_> = group.partners_of(&b.key).map(|m| m.name.as_str()).collect();
    assert_eq!(partners, vec!["Ada", "Cy"]);
}

#[test]
fn test_friend_designated_scans_every_batch() {
    let a = participant(1, "Ada");
    let b = participant(2, "Ben");
    let c = participant(3, "Cy");
    let d = participant(4, "Dee");

    let mut ledger = BatchLedger::new();
    ledger.append(vec![MatchRecord::pair(MatchKind::Romantic, &a, &b, 50)], at(0));
    ledger.append(
        vec![MatchRecord::friend(&c, &d, 10, BlockReason::GradeIncompatibility)],
        at(1),
    );

    let designated = ledger.friend_designated();
    assert!(designated.contains(&c.key));
    assert!(designated.contains(&d.key));
    assert!(!designated.contains(&a.key));
}

#[test]
fn test_snapshot_is_detached_from_participant() {
    let mut a = participant(1, "Ada");
    a.wristband = Some(4);
    let b = participant(2, "Ben");
    let record = MatchRecord::pair(MatchKind::Romantic, &a, &b, 10);

    a.name = "Ada Park".into();
    a.wristband = Some(99);

    assert_eq!(record.members[0].name, "Ada");
    assert_eq!(record.members[0].wristband_label(), "#4");
    assert_eq!(record.members[1].wristband_label(), "#?");
}
