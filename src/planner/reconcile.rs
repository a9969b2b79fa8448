use tracing::debug;

use crate::models::{
    DailyGoals, DaySummary, DominantMacro, FoodItem, MacroTotals, MealTarget, Nutrient, Suggestion,
};
use crate::planner::calculations::{max_macro_deviation, relative_deviation, weighted_deviation};
use crate::planner::policy::SolverPolicy;
use crate::planner::solver::{solution_from_portions, solve_meal, MealSolution, SolveBias};

const ALL_NUTRIENTS: [Nutrient; 4] = [
    Nutrient::Calories,
    Nutrient::Protein,
    Nutrient::Carbs,
    Nutrient::Fat,
];

/// A meal's target and the foods chosen to fill it.
#[derive(Debug, Clone, PartialEq)]
pub struct MealInput {
    pub target: MealTarget,
    pub candidates: Vec<FoodItem>,
}

impl MealInput {
    pub fn new(target: MealTarget, candidates: Vec<FoodItem>) -> Self {
        Self { target, candidates }
    }
}

/// Outcome of reconciling all meals against the daily goals.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub suggestions: Vec<Suggestion>,
    pub summary: DaySummary,
}

/// A full set of meal solutions, the targets they were solved for, and how they sum up.
#[derive(Debug, Clone)]
struct Distribution {
    solutions: Vec<MealSolution>,
    targets: Vec<MacroTotals>,
    achieved: MacroTotals,
    deviation: f64,
}

impl Distribution {
    fn new(pairs: Vec<(MacroTotals, MealSolution)>, goal: &MacroTotals) -> Self {
        let (targets, solutions): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        let achieved = solutions.iter().map(|s| s.totals).sum();
        let deviation = weighted_deviation(&achieved, goal);
        Self {
            solutions,
            targets,
            achieved,
            deviation,
        }
    }
}

/// Cumulative correction factors, one per nutrient.
fn unit_bias() -> MacroTotals {
    MacroTotals::new(1.0, 1.0, 1.0, 1.0)
}

fn scale_target(target: &MacroTotals, bias: &MacroTotals) -> MacroTotals {
    MacroTotals::new(
        target.calories * bias.calories,
        target.protein * bias.protein,
        target.carbs * bias.carbs,
        target.fat * bias.fat,
    )
}

/// Fold one iteration's dampened correction into the cumulative bias.
fn update_bias(
    bias: &mut MacroTotals,
    goal: &MacroTotals,
    achieved: &MacroTotals,
    intensity: f64,
    policy: &SolverPolicy,
) {
    for nutrient in ALL_NUTRIENTS {
        let actual = achieved.get(nutrient);
        let raw = if actual > 0.0 {
            goal.get(nutrient) / actual
        } else {
            policy.correction_max
        };
        let dampened = 1.0 + (raw - 1.0) / intensity;
        let next = (bias.get(nutrient) * dampened).clamp(policy.correction_min, policy.correction_max);
        bias.set(nutrient, next);
    }
}

fn needs_redistribution(achieved: &MacroTotals, goal: &MacroTotals, policy: &SolverPolicy) -> bool {
    relative_deviation(achieved.calories, goal.calories) > policy.final_calorie_tolerance
        || relative_deviation(achieved.protein, goal.protein) > policy.final_protein_tolerance
        || achieved.fat > goal.fat * policy.final_fat_ceiling
}

/// Share of a daily total held by one meal, falling back to its allocated share.
fn share_of(meal: f64, day: f64, fallback: f64) -> f64 {
    if day > 0.0 { meal / day } else { fallback }
}

fn ratio_of(wanted: f64, actual: f64) -> f64 {
    if actual > 0.0 { wanted / actual } else { 1.0 }
}

/// One pass that re-targets each meal by its share of what was achieved and
/// scales its portions towards that target.
fn redistribute(
    inputs: &[MealInput],
    current: &Distribution,
    goal: &MacroTotals,
    policy: &SolverPolicy,
) -> Distribution {
    let day = current.achieved;
    let boost_protein = day.protein < goal.protein * policy.final_protein_floor;
    let damp_fat = day.fat > goal.fat * policy.final_fat_ceiling;

    let solutions = inputs
        .iter()
        .zip(&current.solutions)
        .map(|(input, solution)| {
            let fallback = f64::from(input.target.percentage_of_daily_total) / 100.0;
            let meal = solution.totals;
            let wanted = MacroTotals::new(
                goal.calories * share_of(meal.calories, day.calories, fallback),
                goal.protein * share_of(meal.protein, day.protein, fallback),
                input.target.target.carbs,
                goal.fat * share_of(meal.fat, day.fat, fallback),
            );

            let mut protein_ratio = ratio_of(wanted.protein, meal.protein);
            if boost_protein {
                protein_ratio *= policy.final_protein_boost;
            }
            let mut fat_ratio = ratio_of(wanted.fat, meal.fat);
            if damp_fat {
                fat_ratio *= policy.final_fat_damping;
            }
            let bound = |r: f64| r.clamp(policy.final_ratio_min, policy.final_ratio_max);
            let protein_ratio = bound(protein_ratio);
            let fat_ratio = bound(fat_ratio);
            let calorie_ratio = bound(ratio_of(wanted.calories, meal.calories));

            let portions: Vec<f64> = solution
                .assignments
                .iter()
                .map(|a| {
                    let ratio = match a.food.dominant() {
                        DominantMacro::Protein => protein_ratio,
                        DominantMacro::Fat => fat_ratio,
                        _ => calorie_ratio,
                    };
                    a.food.finalize_portion(a.portion * ratio)
                })
                .collect();

            let retargeted = solution_from_portions(&input.candidates, &portions, &wanted, solution.passes);
            (wanted, retargeted)
        })
        .collect();

    Distribution::new(solutions, goal)
}

/// Describe a meal by the target its portions were last solved for.
fn rationale(meal: &MealTarget, solved_for: &MacroTotals, solution: &MealSolution) -> String {
    format!(
        "Sized for {:.0} kcal ({}% of the day), P:{:.1}g C:{:.1}g F:{:.1}g; \
         weighted deviation {:.0} after {} passes",
        solved_for.calories,
        meal.percentage_of_daily_total,
        solved_for.protein,
        solved_for.carbs,
        solved_for.fat,
        weighted_deviation(&solution.totals, solved_for),
        solution.passes
    )
}

/// Solve every meal, then iteratively bias targets until the day's macros
/// land within the per-macro threshold or iterations run out.
///
/// The best distribution seen (lowest daily weighted deviation) is kept.
/// If it still misses the calorie or protein tolerance, or exceeds the fat
/// ceiling, one redistribution pass is applied to it. Failing to converge is
/// not an error.
pub fn reconcile(inputs: &[MealInput], goals: &DailyGoals, policy: &SolverPolicy) -> Reconciliation {
    let goal = goals.totals();
    let initial = inputs
        .iter()
        .map(|input| {
            let target = input.target.target;
            (target, solve_meal(&target, &input.candidates, &SolveBias::neutral(), policy))
        })
        .collect();

    let mut current = Distribution::new(initial, &goal);
    let mut best = current.clone();
    let mut bias = unit_bias();
    let mut iterations = 0;

    while iterations < policy.reconcile_iterations
        && max_macro_deviation(&current.achieved, &goal) > policy.reconcile_threshold
    {
        update_bias(&mut bias, &goal, &current.achieved, policy.intensity(iterations), policy);
        iterations += 1;

        let solutions = inputs
            .iter()
            .map(|input| {
                let scaled = scale_target(&input.target.target, &bias);
                let meal_bias = SolveBias::for_meal(&input.target.meal_id, policy);
                (scaled, solve_meal(&scaled, &input.candidates, &meal_bias, policy))
            })
            .collect();
        current = Distribution::new(solutions, &goal);

        debug!(
            "Reconcile iteration {}: deviation {:.1}, bias {:.3}/{:.3}/{:.3}/{:.3}",
            iterations, current.deviation, bias.calories, bias.protein, bias.carbs, bias.fat
        );
        if current.deviation < best.deviation {
            best = current.clone();
        }
    }

    if max_macro_deviation(&best.achieved, &goal) > policy.reconcile_threshold {
        debug!(
            "Daily macros not within {:.0}% after {} iterations; using best found",
            policy.reconcile_threshold * 100.0,
            iterations
        );
    }

    let redistributed = !inputs.is_empty() && needs_redistribution(&best.achieved, &goal, policy);
    if redistributed {
        let adjusted = redistribute(inputs, &best, &goal, policy);
        debug!(
            "Redistribution pass: {} -> {} (deviation {:.1} -> {:.1})",
            best.achieved, adjusted.achieved, best.deviation, adjusted.deviation
        );
        best = adjusted;
    }

    let summary = DaySummary {
        goal,
        achieved: best.achieved,
        weighted_deviation: best.deviation,
        global_iterations: iterations,
        redistributed,
    };

    let suggestions = inputs
        .iter()
        .zip(best.targets.iter().zip(best.solutions))
        .map(|(input, (solved_for, solution))| {
            let text = rationale(&input.target, solved_for, &solution);
            solution.into_suggestion(
                input.target.meal_id.clone(),
                input.target.meal_name.clone(),
                text,
            )
        })
        .collect();

    Reconciliation {
        suggestions,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FoodCategory, NutrientProfile, PortionArchetype};

    fn food(id: &str, n: NutrientProfile, category: FoodCategory, archetype: PortionArchetype) -> FoodItem {
        FoodItem::new(id, id, n, category).with_archetype(archetype)
    }

    fn inputs() -> Vec<MealInput> {
        let oats = food("oats", NutrientProfile::new(389.0, 16.9, 66.3, 6.9), FoodCategory::Carb, PortionArchetype::Starch);
        let yogurt = food("yogurt", NutrientProfile::new(59.0, 10.0, 3.6, 0.4), FoodCategory::Dairy, PortionArchetype::LiquidDairy);
        let chicken = food("chicken", NutrientProfile::new(165.0, 31.0, 0.0, 3.6), FoodCategory::Protein, PortionArchetype::WholeProtein);
        let rice = food("rice", NutrientProfile::new(130.0, 2.7, 28.0, 0.3), FoodCategory::Carb, PortionArchetype::Starch);
        let oil = food("oil", NutrientProfile::new(884.0, 0.0, 0.0, 100.0), FoodCategory::Fat, PortionArchetype::Oil);

        vec![
            MealInput::new(
                MealTarget {
                    meal_id: "breakfast".into(),
                    meal_name: "Breakfast".into(),
                    target: MacroTotals::new(900.0, 57.4, 123.2, 31.1),
                    percentage_of_daily_total: 56,
                },
                vec![oats, yogurt],
            ),
            MealInput::new(
                MealTarget {
                    meal_id: "dinner".into(),
                    meal_name: "Dinner".into(),
                    target: MacroTotals::new(700.0, 53.3, 71.1, 24.9),
                    percentage_of_daily_total: 44,
                },
                vec![chicken, rice, oil],
            ),
        ]
    }

    fn goals() -> DailyGoals {
        DailyGoals::new(1600.0, 120.0, 180.0, 56.0, 2)
    }

    fn single_meal(food: FoodItem, target: MacroTotals) -> Vec<MealInput> {
        let meal = MealTarget {
            meal_id: "lunch".into(),
            meal_name: "Lunch".into(),
            target,
            percentage_of_daily_total: 100,
        };
        vec![MealInput::new(meal, vec![food])]
    }

    fn chicken() -> FoodItem {
        food("chicken", NutrientProfile::new(165.0, 31.0, 0.0, 3.6), FoodCategory::Protein, PortionArchetype::WholeProtein)
    }

    /// Portions stay at their starting values, so only the final pass moves them.
    fn starting_portions_policy() -> SolverPolicy {
        SolverPolicy {
            max_passes: 0,
            reconcile_iterations: 0,
            ..SolverPolicy::default()
        }
    }

    #[test]
    fn test_reconcile_never_worse_than_first_solve() {
        let inputs = inputs();
        let policy = SolverPolicy {
            final_calorie_tolerance: f64::INFINITY,
            final_protein_tolerance: f64::INFINITY,
            final_fat_ceiling: f64::INFINITY,
            ..SolverPolicy::default()
        };
        let first: MacroTotals = inputs
            .iter()
            .map(|i| solve_meal(&i.target.target, &i.candidates, &SolveBias::neutral(), &policy).totals)
            .sum();
        let result = reconcile(&inputs, &goals(), &policy);
        assert!(result.summary.weighted_deviation <= weighted_deviation(&first, &goals().totals()));
        assert!(result.summary.global_iterations <= 4);
    }

    #[test]
    fn test_reconcile_keeps_meal_order_and_limits() {
        let result = reconcile(&inputs(), &goals(), &SolverPolicy::default());
        assert_eq!(result.suggestions.len(), 2);
        assert_eq!(result.suggestions[0].meal_id, "breakfast");
        assert_eq!(result.suggestions[1].meal_id, "dinner");
        for s in &result.suggestions {
            assert!(!s.rationale.is_empty());
            for a in &s.items {
                assert!(a.food.limits().contains(a.portion));
            }
        }
    }

    #[test]
    fn test_summary_matches_suggestions() {
        let result = reconcile(&inputs(), &goals(), &SolverPolicy::default());
        let total: MacroTotals = result.suggestions.iter().map(|s| s.totals).sum();
        assert!((total.calories - result.summary.achieved.calories).abs() < 1e-6);
        assert!((total.protein - result.summary.achieved.protein).abs() < 1e-6);
    }

    #[test]
    fn test_bias_is_clamped() {
        let policy = SolverPolicy::default();
        let mut bias = unit_bias();
        let goal = MacroTotals::new(2000.0, 150.0, 200.0, 70.0);
        let achieved = MacroTotals::new(500.0, 300.0, 0.0, 70.0);
        update_bias(&mut bias, &goal, &achieved, 1.0, &policy);
        assert_eq!(bias.calories, 1.1);
        assert_eq!(bias.protein, 0.8);
        assert_eq!(bias.carbs, 1.1);
        assert_eq!(bias.fat, 1.0);
    }

    #[test]
    fn test_bias_dampened_by_intensity() {
        let policy = SolverPolicy::default();
        let mut bias = unit_bias();
        let goal = MacroTotals::new(2000.0, 100.0, 200.0, 70.0);
        let achieved = MacroTotals::new(2000.0, 105.0, 200.0, 70.0);
        update_bias(&mut bias, &goal, &achieved, 2.0, &policy);
        let expected = 1.0 + (100.0 / 105.0 - 1.0) / 2.0;
        assert!((bias.protein - expected).abs() < 1e-12);
    }

    #[test]
    fn test_final_pass_brings_day_within_tolerances() {
        // 190g chicken: 313.5 kcal, 58.9g protein (5.8% short)
        let policy = starting_portions_policy();
        let goals = DailyGoals::new(330.0, 62.5, 10.0, 7.0, 1);
        let inputs = single_meal(chicken(), MacroTotals::new(300.0, 55.0, 10.0, 6.0));

        let result = reconcile(&inputs, &goals, &policy);
        assert!(result.summary.redistributed);
        assert_eq!(result.suggestions[0].items[0].portion, 200.0);
        assert!(!needs_redistribution(&result.summary.achieved, &goals.totals(), &policy));
        assert!(result.suggestions[0].rationale.starts_with("Sized for 330 kcal"));
    }

    #[test]
    fn test_final_pass_boosts_low_protein() {
        // 58.9g of 66g is under the 90% floor: ratio 66/58.9 boosted x1.1
        let policy = starting_portions_policy();
        let goals = DailyGoals::new(330.0, 66.0, 10.0, 7.0, 1);
        let result = reconcile(&single_meal(chicken(), goals.totals()), &goals, &policy);
        assert!(result.summary.redistributed);
        assert_eq!(result.suggestions[0].items[0].portion, 235.0);
    }

    #[test]
    fn test_final_pass_damps_excess_fat() {
        // 10g oil against an 8g goal: ratio 0.8 damped x0.9 -> 7.2g -> 7g
        let policy = starting_portions_policy();
        let oil = food("oil", NutrientProfile::new(884.0, 0.0, 0.0, 100.0), FoodCategory::Fat, PortionArchetype::Oil);
        let goals = DailyGoals::new(88.0, 1.0, 1.0, 8.0, 1);
        let result = reconcile(&single_meal(oil, goals.totals()), &goals, &policy);
        assert!(result.summary.redistributed);
        assert_eq!(result.suggestions[0].items[0].portion, 7.0);
    }

    #[test]
    fn test_day_within_tolerances_skips_final_pass() {
        let policy = starting_portions_policy();
        let goals = DailyGoals::new(313.5, 58.9, 1.0, 6.84, 1);
        let result = reconcile(&single_meal(chicken(), goals.totals()), &goals, &policy);
        assert!(!result.summary.redistributed);
        assert_eq!(result.suggestions[0].items[0].portion, 190.0);
    }

    #[test]
    fn test_empty_inputs() {
        let result = reconcile(&[], &goals(), &SolverPolicy::default());
        assert!(result.suggestions.is_empty());
        assert!(!result.summary.redistributed);
    }
}
