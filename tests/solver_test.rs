#[macro_use]
extern crate assert_float_eq;

use meal_portion_planner_rs::models::{
    AnimalSource, FoodCategory, FoodItem, MacroTotals, NutrientProfile, PortionArchetype,
};
use meal_portion_planner_rs::planner::{solve_meal, weighted_deviation, SolveBias, SolverPolicy};

fn egg() -> FoodItem {
    FoodItem::new("egg", "Egg", NutrientProfile::new(143.0, 12.6, 0.7, 9.5), FoodCategory::Protein)
        .with_archetype(PortionArchetype::Egg)
        .with_unit("egg", 50.0)
        .with_animal_source(AnimalSource::Egg)
}

fn lunch_foods() -> Vec<FoodItem> {
    vec![
        FoodItem::new("chicken", "Chicken", NutrientProfile::new(165.0, 31.0, 0.0, 3.6), FoodCategory::Protein)
            .with_archetype(PortionArchetype::WholeProtein),
        FoodItem::new("rice", "Rice", NutrientProfile::new(123.0, 2.7, 25.6, 1.0), FoodCategory::Carb)
            .with_archetype(PortionArchetype::Starch),
        FoodItem::new("broccoli", "Broccoli", NutrientProfile::new(34.0, 2.8, 6.6, 0.4), FoodCategory::Vegetable),
        FoodItem::new("oil", "Olive oil", NutrientProfile::new(884.0, 0.0, 0.0, 100.0), FoodCategory::Fat)
            .with_archetype(PortionArchetype::Oil),
        egg(),
    ]
}

fn lunch_target() -> MacroTotals {
    MacroTotals::new(750.0, 55.0, 75.0, 22.0)
}

#[test]
fn test_egg_portion_snaps_to_half_units() {
    let food = egg();
    assert_float_absolute_eq!(food.finalize_portion(170.0), 175.0, 1e-9);
    assert_float_absolute_eq!(food.units_for(175.0).unwrap(), 3.5, 1e-9);
}

#[test]
fn test_solved_portions_stay_valid() {
    let foods = lunch_foods();
    let solution = solve_meal(&lunch_target(), &foods, &SolveBias::neutral(), &SolverPolicy::default());

    assert_eq!(solution.assignments.len(), foods.len());
    for assignment in &solution.assignments {
        let limits = assignment.food.limits();
        assert!(
            limits.contains(assignment.portion),
            "{} at {} g outside {:?}",
            assignment.food.id(),
            assignment.portion,
            limits
        );
    }

    let egg = &solution.assignments[4];
    let units = egg.units.unwrap();
    assert_float_absolute_eq!(units * 2.0, (units * 2.0).round(), 1e-9);
}

#[test]
fn test_solver_improves_on_starting_portions() {
    let foods = lunch_foods();
    let target = lunch_target();
    let start: MacroTotals = foods.iter().map(|f| f.totals_for(f.initial_portion())).sum();

    let solution = solve_meal(&target, &foods, &SolveBias::neutral(), &SolverPolicy::default());
    assert!(solution.deviation <= weighted_deviation(&start, &target));
    assert_float_absolute_eq!(solution.deviation, weighted_deviation(&solution.totals, &target), 1e-9);
}

#[test]
fn test_solver_is_deterministic() {
    let foods = lunch_foods();
    let policy = SolverPolicy::default();
    let a = solve_meal(&lunch_target(), &foods, &SolveBias::neutral(), &policy);
    let b = solve_meal(&lunch_target(), &foods, &SolveBias::neutral(), &policy);
    assert_eq!(a, b);
}
