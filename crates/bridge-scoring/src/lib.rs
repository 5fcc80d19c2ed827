//! Pairwise scoring for the Bridge matcher.
//!
//! - [`score`] - symmetric compatibility score with a per-category breakdown
//! - [`filters`] - hard eligibility predicates used by every matching phase
//!
//! Both modules are pure functions over [`bridge_core::Participant`]; they
//! never look at the store.

pub mod filters;
pub mod score;

pub use filters::{
    already_matched, basic_eligible, can_match, gender_compatible, grade_compatible,
    romantic_block, MAX_GRADE_DISTANCE,
};
pub use score::{compatibility_score, Category, CategoryScore, ScoreBreakdown, MAX_SCORE};
