//! Compatibility score.
//!
//! The score is an unweighted sum over independent categories. A category
//! contributes nothing when either side left the attribute blank.

use std::fmt;

use bridge_core::{Participant, Profile};

/// Highest score any pair can reach.
pub const MAX_SCORE: u32 = 125;

/// A scored category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    GradeProximity,
    School,
    IdealEvening,
    DecisionStyle,
    PlanningStyle,
    FitnessImportance,
    CoreValue,
    ReadingHabit,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::GradeProximity,
        Category::School,
        Category::IdealEvening,
        Category::DecisionStyle,
        Category::PlanningStyle,
        Category::FitnessImportance,
        Category::CoreValue,
        Category::ReadingHabit,
    ];

    /// Points awarded for a perfect match in this category.
    pub fn max_points(self) -> u32 {
        match self {
            Category::GradeProximity | Category::FitnessImportance | Category::CoreValue => 20,
            Category::IdealEvening | Category::DecisionStyle | Category::PlanningStyle => 15,
            Category::School | Category::ReadingHabit => 10,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::GradeProximity => "grade proximity",
            Category::School => "school",
            Category::IdealEvening => "ideal evening",
            Category::DecisionStyle => "decision style",
            Category::PlanningStyle => "planning style",
            Category::FitnessImportance => "fitness importance",
            Category::CoreValue => "core value",
            Category::ReadingHabit => "reading habit",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Points earned in one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryScore {
    pub category: Category,
    pub points: u32,
}

/// Per-category explanation of a compatibility score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub categories: Vec<CategoryScore>,
}

impl ScoreBreakdown {
    /// Scores every category for the pair.
    pub fn between(a: &Participant, b: &Participant) -> Self {
        let categories = Category::ALL
            .iter()
            .map(|&category| CategoryScore {
                category,
                points: category_points(category, a, b),
            })
            .collect();
        Self { categories }
    }

    pub fn total(&self) -> u32 {
        self.categories.iter().map(|c| c.points).sum()
    }

    pub fn points(&self, category: Category) -> u32 {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map_or(0, |c| c.points)
    }

    /// Categories that earned points, highest first.
    pub fn contributing(&self) -> impl Iterator<Item = &CategoryScore> {
        let mut scored: Vec<&CategoryScore> =
            self.categories.iter().filter(|c| c.points > 0).collect();
        scored.sort_by(|x, y| y.points.cmp(&x.points));
        scored.into_iter()
    }
}

impl fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.total(), MAX_SCORE)?;
        for entry in self.contributing() {
            write!(f, " {}+{}", entry.category, entry.points)?;
        }
        Ok(())
    }
}

/// Symmetric compatibility score in `0..=MAX_SCORE`.
pub fn compatibility_score(a: &Participant, b: &Participant) -> u32 {
    Category::ALL
        .iter()
        .map(|&category| category_points(category, a, b))
        .sum()
}

fn category_points(category: Category, a: &Participant, b: &Participant) -> u32 {
    let (pa, pb) = (&a.profile, &b.profile);
    match category {
        Category::GradeProximity => match (a.grade, b.grade) {
            (Some(x), Some(y)) => match x.distance(y) {
                0 => 20,
                1 => 10,
                2 => 5,
                _ => 0,
            },
            _ => 0,
        },
        Category::FitnessImportance => match (pa.fitness_importance, pb.fitness_importance) {
            (Some(x), Some(y)) => match x.distance(y) {
                0 => 20,
                1 => 10,
                _ => 0,
            },
            _ => 0,
        },
        _ => same(
            text_field(category, pa),
            text_field(category, pb),
            category.max_points(),
        ),
    }
}

fn text_field(category: Category, profile: &Profile) -> Option<&str> {
    match category {
        Category::School => profile.school.as_deref(),
        Category::IdealEvening => profile.ideal_evening.as_deref(),
        Category::DecisionStyle => profile.decision_style.as_deref(),
        Category::PlanningStyle => profile.planning_style.as_deref(),
        Category::CoreValue => profile.core_value.as_deref(),
        Category::ReadingHabit => profile.reading_habit.as_deref(),
        Category::GradeProximity | Category::FitnessImportance => None,
    }
}

fn same(x: Option<&str>, y: Option<&str>, points: u32) -> u32 {
    match (x, y) {
        (Some(x), Some(y)) if x == y => points,
        _ => 0,
    }
}

#[cfg(test)]
#[path = "score_tests.rs"]
mod tests;
