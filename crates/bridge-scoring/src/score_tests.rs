use bridge_test::guest;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::*;

fn full(index: u32, name: &str) -> Participant {
    guest(index, name)
        .grade("Junior")
        .school("Baker")
        .ideal_evening("Game night")
        .decision_style("Logic")
        .planning_style("Planner")
        .fitness("Somewhat important")
        .core_value("Honesty")
        .reading_habit("Weekly")
        .participant()
}

#[test]
fn test_identical_profiles_reach_max() {
    let a = full(1, "Ada");
    let b = full(2, "Ben");

    assert_eq!(compatibility_score(&a, &b), MAX_SCORE);
    assert_eq!(ScoreBreakdown::between(&a, &b).total(), MAX_SCORE);
    assert_eq!(
        Category::ALL.iter().map(|c| c.max_points()).sum::<u32>(),
        MAX_SCORE
    );
}

#[test]
fn test_blank_attributes_score_zero() {
    let a = guest(1, "Ada").participant();
    let b = full(2, "Ben");

    assert_eq!(compatibility_score(&a, &b), 0);
}

#[test]
fn test_grade_proximity_steps() {
    let at = |grade: &str| guest(9, "X").grade(grade).participant();
    let freshman = at("Freshman");

    let points = |other: &str| {
        ScoreBreakdown::between(&freshman, &at(other)).points(Category::GradeProximity)
    };
    assert_eq!(points("Freshman"), 20);
    assert_eq!(points("Sophomore"), 10);
    assert_eq!(points("Junior"), 5);
    assert_eq!(points("Senior"), 0);
}

#[test]
fn test_fitness_steps() {
    let at = |level: &str| guest(9, "X").fitness(level).participant();
    let base = at("Neutral");

    let points =
        |other: &str| ScoreBreakdown::between(&base, &at(other)).points(Category::FitnessImportance);
    assert_eq!(points("Neutral"), 20);
    assert_eq!(points("Somewhat important"), 10);
    assert_eq!(points("Not very important"), 10);
    assert_eq!(points("Extremely important"), 0);
}

#[test]
fn test_breakdown_lists_contributors_highest_first() {
    let a = guest(1, "Ada").school("Baker").core_value("Honesty").participant();
    let b = guest(2, "Ben").school("Baker").core_value("Honesty").participant();

    let breakdown = ScoreBreakdown::between(&a, &b);
    let order: Vec<Category> = breakdown.contributing().map(|c| c.category).collect();
    assert_eq!(order, vec![Category::CoreValue, Category::School]);
    assert_eq!(breakdown.to_string(), "30/125 core value+20 school+10");
}

#[test]
fn test_score_symmetric_and_bounded() {
    let grades = ["Freshman", "Sophomore", "Junior", "Senior", ""];
    let fitness = [
        "Not very important",
        "Neutral",
        "Somewhat important",
        "Extremely important",
        "",
    ];
    let words = ["a", "b", ""];
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let mut random_guest = |index: u32| {
        let pick = |rng: &mut ChaCha8Rng| words.choose(rng).copied().unwrap_or_default();
        guest(index, "Guest")
            .grade(grades[rng.random_range(0..grades.len())])
            .fitness(fitness[rng.random_range(0..fitness.len())])
            .school(pick(&mut rng))
            .ideal_evening(pick(&mut rng))
            .decision_style(pick(&mut rng))
            .planning_style(pick(&mut rng))
            .core_value(pick(&mut rng))
            .reading_habit(pick(&mut rng))
            .participant()
    };

    for i in 0..500 {
        let a = random_guest(i * 2);
        let b = random_guest(i * 2 + 1);
        let ab = compatibility_score(&a, &b);
        assert_eq!(ab, compatibility_score(&b, &a));
        assert!(ab <= MAX_SCORE);
        assert!(ab <= 130);
    }
}
