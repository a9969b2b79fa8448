#[macro_use]
extern crate assert_float_eq;

use meal_portion_planner_rs::models::{ActiveMeal, CustomMealShare, DailyGoals};
use meal_portion_planner_rs::planner::allocation::custom_weights;
use meal_portion_planner_rs::planner::{
    allocate_meal_targets, default_meal_plan, largest_remainder, normalize_percentages,
    SolverPolicy,
};

fn meals(ids: &[&str]) -> Vec<ActiveMeal> {
    ids.iter().map(|id| ActiveMeal::canonical(id)).collect()
}

fn goals(meal_count: u32) -> DailyGoals {
    DailyGoals::new(2000.0, 150.0, 220.0, 65.0, meal_count)
}

#[test]
fn test_breakfast_dinner_day_split() {
    let targets = allocate_meal_targets(
        &meals(&["breakfast", "dinner"]),
        &goals(2),
        None,
        &SolverPolicy::default(),
    );

    assert_eq!(targets.len(), 2);
    assert_eq!(targets[0].percentage_of_daily_total, 56);
    assert_eq!(targets[1].percentage_of_daily_total, 44);
    assert_float_absolute_eq!(targets[0].target.calories, 1111.0, 1e-9);
    assert_float_absolute_eq!(targets[1].target.calories, 889.0, 1e-9);
}

#[test]
fn test_every_default_plan_sums_to_full_day() {
    let policy = SolverPolicy::default();
    for count in 1..=7 {
        let targets = allocate_meal_targets(&default_meal_plan(count), &goals(count), None, &policy);
        let pct: u32 = targets.iter().map(|t| t.percentage_of_daily_total).sum();
        let kcal: f64 = targets.iter().map(|t| t.target.calories).sum();
        assert_eq!(pct, 100, "meal count {}", count);
        assert_float_absolute_eq!(kcal, 2000.0, 1e-9);
    }
}

#[test]
fn test_removed_meal_keeps_remaining_proportions() {
    let shares = vec![
        CustomMealShare::new("breakfast", 20.0),
        CustomMealShare::new("lunch", 30.0),
        CustomMealShare::new("dinner", 50.0),
    ];
    let (weights, _) = custom_weights(&meals(&["lunch", "dinner"]), &shares).unwrap();

    assert_float_absolute_eq!(weights[0], 30.0 / 80.0, 1e-9);
    assert_float_absolute_eq!(weights[1], 50.0 / 80.0, 1e-9);
    assert_float_absolute_eq!(weights[1] / weights[0], 50.0 / 30.0, 1e-9);
}

#[test]
fn test_partial_overrides_fall_back_to_defaults() {
    let policy = SolverPolicy::default();
    let active = meals(&["breakfast", "lunch", "dinner"]);
    let partial = vec![CustomMealShare::new("breakfast", 70.0)];

    let with_partial = allocate_meal_targets(&active, &goals(3), Some(&partial), &policy);
    let defaults = allocate_meal_targets(&active, &goals(3), None, &policy);
    assert_eq!(with_partial, defaults);
}

#[test]
fn test_remainder_goes_to_largest_fraction() {
    // Quotas 33.4, 33.3, 33.3 -> the first seat is not favored by position alone
    assert_eq!(largest_remainder(&[3.34, 3.33, 3.33], 100), vec![34, 33, 33]);
    assert_eq!(normalize_percentages(&[1.0, 1.0, 4.0]), vec![17, 17, 66]);
    assert_eq!(largest_remainder(&[0.2, 0.7], 1), vec![0, 1]);
}
