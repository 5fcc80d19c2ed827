//! Roster entry fixtures.
//!
//! # Example
//!
//! ```
//! use bridge_test::guest;
//!
//! let entry = guest(1, "Ada Park").woman_seeking_men().grade("Junior").build();
//! assert_eq!(entry.phone.as_deref(), Some("7135550001"));
//! ```

use bridge_core::{Participant, ParticipantKey, RosterEntry};

/// Deterministic ten-digit phone for fixture `index`.
pub fn phone_for(index: u32) -> String {
    format!("713555{index:04}")
}

/// Key of the participant built from fixture `index`.
pub fn key(index: u32) -> ParticipantKey {
    ParticipantKey::new(phone_for(index))
}

/// Starts a guest with a generated phone and email and no attributes.
pub fn guest(index: u32, name: &str) -> GuestBuilder {
    GuestBuilder {
        index,
        entry: RosterEntry {
            name: name.to_string(),
            phone: Some(phone_for(index)),
            email: Some(format!(
                "{}@rice.edu",
                name.to_lowercase().replace(' ', ".")
            )),
            ..RosterEntry::default()
        },
    }
}

/// Builder over a [`RosterEntry`].
#[derive(Debug, Clone)]
pub struct GuestBuilder {
    index: u32,
    entry: RosterEntry,
}

impl GuestBuilder {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn gender(mut self, gender: &str) -> Self {
        self.entry.gender = Some(gender.to_string());
        self
    }

    pub fn accepts(mut self, genders: &[&str]) -> Self {
        self.entry.accepted_genders = genders.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn man_seeking_women(self) -> Self {
        self.gender("Male").accepts(&["Female"])
    }

    pub fn woman_seeking_men(self) -> Self {
        self.gender("Female").accepts(&["Male"])
    }

    pub fn grade(mut self, grade: &str) -> Self {
        self.entry.grade = Some(grade.to_string());
        self
    }

    pub fn school(mut self, school: &str) -> Self {
        self.entry.school = Some(school.to_string());
        self
    }

    pub fn ideal_evening(mut self, value: &str) -> Self {
        self.entry.ideal_evening = Some(value.to_string());
        self
    }

    pub fn decision_style(mut self, value: &str) -> Self {
        self.entry.decision_style = Some(value.to_string());
        self
    }

    pub fn planning_style(mut self, value: &str) -> Self {
        self.entry.planning_style = Some(value.to_string());
        self
    }

    pub fn fitness(mut self, value: &str) -> Self {
        self.entry.fitness_importance = Some(value.to_string());
        self
    }

    pub fn core_value(mut self, value: &str) -> Self {
        self.entry.core_value = Some(value.to_string());
        self
    }

    pub fn reading_habit(mut self, value: &str) -> Self {
        self.entry.reading_habit = Some(value.to_string());
        self
    }

    pub fn without_phone(mut self) -> Self {
        self.entry.phone = None;
        self
    }

    pub fn build(self) -> RosterEntry {
        self.entry
    }

    /// A detached participant, for scorer and filter tests.
    ///
    /// # Panics
    ///
    /// If the entry cannot be keyed.
    pub fn participant(self) -> Participant {
        let attributes = self
            .entry
            .parse()
            .unwrap_or_else(|err| panic!("invalid fixture guest: {err}"));
        Participant::new(attributes)
    }

    /// A detached participant marked as checked in with wristband `number`.
    pub fn present(self, number: u32) -> Participant {
        let mut participant = self.participant();
        participant.checked_in = true;
        participant.wristband = Some(number);
        participant
    }
}
