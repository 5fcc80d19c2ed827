//! Participant records and roster ingestion types.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::phone::Phone;

/// Stable identity of a participant.
///
/// The normalized phone number when one was supplied, otherwise the
/// lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantKey(String);

impl ParticipantKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&Phone> for ParticipantKey {
    fn from(phone: &Phone) -> Self {
        Self(phone.as_str().to_string())
    }
}

impl fmt::Display for ParticipantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Self-reported gender category, compared exactly after trimming.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gender(String);

impl Gender {
    pub fn new(label: &str) -> Self {
        Self(label.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Academic year, ordered 1 (freshman) to 4 (senior).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Freshman,
    Sophomore,
    Junior,
    Senior,
}

impl Grade {
    pub fn ordinal(self) -> u8 {
        match self {
            Grade::Freshman => 1,
            Grade::Sophomore => 2,
            Grade::Junior => 3,
            Grade::Senior => 4,
        }
    }

    /// Distance in years between two grades.
    pub fn distance(self, other: Grade) -> u8 {
        self.ordinal().abs_diff(other.ordinal())
    }

    /// Parses a roster label ("Junior", "junior", "3"); unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "freshman" | "1" => Some(Grade::Freshman),
            "sophomore" | "2" => Some(Grade::Sophomore),
            "junior" | "3" => Some(Grade::Junior),
            "senior" | "4" => Some(Grade::Senior),
            _ => None,
        }
    }
}

/// How important fitness and nutrition are, ordered 1 to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessImportance {
    NotVeryImportant,
    Neutral,
    SomewhatImportant,
    ExtremelyImportant,
}

impl FitnessImportance {
    pub fn ordinal(self) -> u8 {
        match self {
            FitnessImportance::NotVeryImportant => 1,
            FitnessImportance::Neutral => 2,
            FitnessImportance::SomewhatImportant => 3,
            FitnessImportance::ExtremelyImportant => 4,
        }
    }

    pub fn distance(self, other: FitnessImportance) -> u8 {
        self.ordinal().abs_diff(other.ordinal())
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "not very important" | "1" => Some(FitnessImportance::NotVeryImportant),
            "neutral" | "2" => Some(FitnessImportance::Neutral),
            "somewhat important" | "3" => Some(FitnessImportance::SomewhatImportant),
            "extremely important" | "4" => Some(FitnessImportance::ExtremelyImportant),
            _ => None,
        }
    }
}

/// Secondary attributes used only by the compatibility scorer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub ideal_evening: Option<String>,
    #[serde(default)]
    pub decision_style: Option<String>,
    #[serde(default)]
    pub planning_style: Option<String>,
    #[serde(default)]
    pub fitness_importance: Option<FitnessImportance>,
    #[serde(default)]
    pub core_value: Option<String>,
    #[serde(default)]
    pub reading_habit: Option<String>,
}

/// A participant and their per-event state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub key: ParticipantKey,
    pub name: String,
    pub phone: Option<Phone>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub accepted_genders: BTreeSet<Gender>,
    #[serde(default)]
    pub grade: Option<Grade>,
    #[serde(default)]
    pub profile: Profile,

    #[serde(default)]
    pub checked_in: bool,
    #[serde(default)]
    pub wristband: Option<u32>,
    #[serde(default)]
    pub payment_required: bool,
    #[serde(default)]
    pub match_history: BTreeSet<ParticipantKey>,
}

impl Participant {
    /// Creates a participant with fresh event state from parsed roster attributes.
    pub fn new(attributes: ParticipantAttributes) -> Self {
        let mut participant = Self {
            key: attributes.key.clone(),
            name: String::new(),
            phone: None,
            email: None,
            gender: None,
            accepted_genders: BTreeSet::new(),
            grade: None,
            profile: Profile::default(),
            checked_in: false,
            wristband: None,
            payment_required: true,
            match_history: BTreeSet::new(),
        };
        participant.update_attributes(attributes);
        participant
    }

    /// Replaces self-reported attributes, leaving event state untouched.
    pub fn update_attributes(&mut self, attributes: ParticipantAttributes) {
        debug_assert_eq!(self.key, attributes.key);
        self.name = attributes.name;
        self.phone = attributes.phone;
        self.email = attributes.email;
        self.gender = attributes.gender;
        self.accepted_genders = attributes.accepted_genders;
        self.grade = attributes.grade;
        self.profile = attributes.profile;
    }

    /// Returns true if this participant was ever paired with `other`.
    pub fn has_matched_with(&self, other: &ParticipantKey) -> bool {
        self.match_history.contains(other)
    }

    /// Lower-cased name with whitespace runs collapsed, used for exact name lookups.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Returns true if any of name, email or key contains `needle` (already lower-cased).
    pub fn matches_text(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .email
                .as_deref()
                .is_some_and(|email| email.to_lowercase().contains(needle))
            || self.key.as_str().to_lowercase().contains(needle)
    }
}

/// Lower-cases and collapses whitespace in a display name.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Validated roster attributes ready to be merged into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantAttributes {
    pub key: ParticipantKey,
    pub name: String,
    pub phone: Option<Phone>,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub accepted_genders: BTreeSet<Gender>,
    pub grade: Option<Grade>,
    pub profile: Profile,
}

/// One deduplicated roster record as supplied by the ingestion collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterEntry {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub accepted_genders: Vec<String>,
    pub grade: Option<String>,
    pub school: Option<String>,
    pub ideal_evening: Option<String>,
    pub decision_style: Option<String>,
    pub planning_style: Option<String>,
    pub fitness_importance: Option<String>,
    pub core_value: Option<String>,
    pub reading_habit: Option<String>,
}

impl RosterEntry {
    /// Validates the record and derives its key.
    ///
    /// # Errors
    ///
    /// [`BridgeError::MalformedPhone`] when the phone does not normalize, or
    /// when neither a phone nor an email is available to key the record.
    pub fn parse(self) -> Result<ParticipantAttributes> {
        let phone = Phone::parse_optional(self.phone.as_deref())?;
        let email = non_blank(self.email);
        let key = match (&phone, &email) {
            (Some(phone), _) => ParticipantKey::from(phone),
            (None, Some(email)) => ParticipantKey::new(email.to_lowercase()),
            (None, None) => {
                return Err(BridgeError::MalformedPhone {
                    raw: self.phone.unwrap_or_default(),
                })
            }
        };

        Ok(ParticipantAttributes {
            key,
            name: self.name.trim().to_string(),
            phone,
            email,
            gender: non_blank(self.gender).map(|g| Gender::new(&g)),
            accepted_genders: self
                .accepted_genders
                .iter()
                .filter(|g| !g.trim().is_empty())
                .map(|g| Gender::new(g))
                .collect(),
            grade: self.grade.as_deref().and_then(Grade::from_label),
            profile: Profile {
                school: non_blank(self.school),
                ideal_evening: non_blank(self.ideal_evening),
                decision_style: non_blank(self.decision_style),
                planning_style: non_blank(self.planning_style),
                fitness_importance: self
                    .fitness_importance
                    .as_deref()
                    .and_then(FitnessImportance::from_label),
                core_value: non_blank(self.core_value),
                reading_habit: non_blank(self.reading_habit),
            },
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "participant_tests.rs"]
mod tests;
