//! Hard eligibility constraints.
//!
//! These predicates decide which pairs a phase may consider at all. The
//! compatibility score only orders pairs that already passed.

use bridge_core::{BlockReason, Participant};

/// Grades this far apart (or further) never match romantically.
pub const MAX_GRADE_DISTANCE: u8 = 3;

/// Each side's gender is in the other's accepted set.
///
/// A missing gender or an empty accepted set never matches.
pub fn gender_compatible(a: &Participant, b: &Participant) -> bool {
    match (&a.gender, &b.gender) {
        (Some(ga), Some(gb)) => b.accepted_genders.contains(ga) && a.accepted_genders.contains(gb),
        _ => false,
    }
}

/// Grades are less than [`MAX_GRADE_DISTANCE`] apart, or either is unknown.
pub fn grade_compatible(a: &Participant, b: &Participant) -> bool {
    match (a.grade, b.grade) {
        (Some(ga), Some(gb)) => ga.distance(gb) < MAX_GRADE_DISTANCE,
        _ => true,
    }
}

/// Either side's history already contains the other.
pub fn already_matched(a: &Participant, b: &Participant) -> bool {
    a.has_matched_with(&b.key) || b.has_matched_with(&a.key)
}

/// Both present and reachable, distinct, and never paired before.
pub fn basic_eligible(a: &Participant, b: &Participant) -> bool {
    a.key != b.key
        && a.checked_in
        && b.checked_in
        && a.phone.is_some()
        && b.phone.is_some()
        && !already_matched(a, b)
}

/// [`basic_eligible`], plus the romantic constraints when `romantic`.
pub fn can_match(a: &Participant, b: &Participant, romantic: bool) -> bool {
    basic_eligible(a, b) && (!romantic || romantic_block(a, b).is_none())
}

/// The constraint keeping a pair from romantic eligibility, if any.
///
/// Gender preference is reported before grade when both apply.
pub fn romantic_block(a: &Participant, b: &Participant) -> Option<BlockReason> {
    if !gender_compatible(a, b) {
        Some(BlockReason::GenderPreference)
    } else if !grade_compatible(a, b) {
        Some(BlockReason::GradeIncompatibility)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "filters_tests.rs"]
mod tests;
