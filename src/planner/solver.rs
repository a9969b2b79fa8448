use tracing::trace;

use crate::models::{DominantMacro, FoodItem, MacroTotals, PortionAssignment, Suggestion};
use crate::planner::calculations::weighted_deviation;
use crate::planner::policy::SolverPolicy;

/// Per-food step multipliers applied while re-solving a meal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveBias {
    /// Multiplier for steps on protein-dominant foods.
    pub protein: f64,
    /// Multiplier for steps on fat-dominant foods.
    pub fat: f64,
}

impl Default for SolveBias {
    fn default() -> Self {
        Self::neutral()
    }
}

impl SolveBias {
    pub fn neutral() -> Self {
        Self {
            protein: 1.0,
            fat: 1.0,
        }
    }

    /// Meal-specific bias: protein favored at breakfast and dinner, fat held back at dinner.
    pub fn for_meal(meal_id: &str, policy: &SolverPolicy) -> Self {
        let protein = match meal_id {
            "breakfast" | "dinner" => policy.meal_protein_bias,
            _ => 1.0,
        };
        let fat = if meal_id == "dinner" {
            policy.dinner_fat_bias
        } else {
            1.0
        };
        Self { protein, fat }
    }

    #[inline]
    fn factor_for(&self, dominant: DominantMacro) -> f64 {
        match dominant {
            DominantMacro::Protein => self.protein,
            DominantMacro::Fat => self.fat,
            _ => 1.0,
        }
    }
}

/// Portions found for one meal.
#[derive(Debug, Clone, PartialEq)]
pub struct MealSolution {
    pub assignments: Vec<PortionAssignment>,
    pub totals: MacroTotals,
    pub passes: usize,
    pub deviation: f64,
}

impl MealSolution {
    /// Grams per assignment, in candidate order.
    pub fn portions(&self) -> Vec<f64> {
        self.assignments.iter().map(|a| a.portion).collect()
    }

    pub fn into_suggestion(
        self,
        meal_id: impl Into<String>,
        meal_name: impl Into<String>,
        rationale: impl Into<String>,
    ) -> Suggestion {
        Suggestion::new(meal_id, meal_name, self.assignments, rationale)
    }
}

/// Sum of nutrients over paired foods and portions.
pub fn meal_totals(candidates: &[FoodItem], portions: &[f64]) -> MacroTotals {
    candidates
        .iter()
        .zip(portions)
        .map(|(food, &grams)| food.totals_for(grams))
        .sum()
}

/// Build a solution from explicit portions, measuring it against `target`.
pub fn solution_from_portions(
    candidates: &[FoodItem],
    portions: &[f64],
    target: &MacroTotals,
    passes: usize,
) -> MealSolution {
    let totals = meal_totals(candidates, portions);
    MealSolution {
        assignments: candidates
            .iter()
            .zip(portions)
            .map(|(food, &grams)| PortionAssignment::new(food.clone(), grams))
            .collect(),
        totals,
        passes,
        deviation: weighted_deviation(&totals, target),
    }
}

/// Greedy coordinate search for portions approximating `target`.
///
/// Each pass visits foods in the given order and steps the food's dominant
/// nutrient (calories for balanced foods) towards the meal's shortfall. A
/// step is kept only if it strictly lowers the weighted deviation. Stops at
/// `policy.tolerance`, after a pass with no accepted step, or after
/// `policy.max_passes`.
pub fn solve_meal(
    target: &MacroTotals,
    candidates: &[FoodItem],
    bias: &SolveBias,
    policy: &SolverPolicy,
) -> MealSolution {
    let mut portions: Vec<f64> = candidates.iter().map(FoodItem::initial_portion).collect();
    let mut totals = meal_totals(candidates, &portions);
    let mut deviation = weighted_deviation(&totals, target);
    let mut passes = 0;

    while passes < policy.max_passes && deviation > policy.tolerance {
        passes += 1;
        let mut changed = false;

        for (i, food) in candidates.iter().enumerate() {
            let nutrient = food.dominant().nutrient();
            let per_gram = food.nutrients().per_gram(nutrient);
            if per_gram <= 0.0 {
                trace!("Skipping {}: no {} to steer with", food.id(), nutrient);
                continue;
            }

            let shortfall = target.get(nutrient) - totals.get(nutrient);
            let step = (shortfall / per_gram * bias.factor_for(food.dominant()))
                .clamp(-policy.max_step_grams, policy.max_step_grams);
            let proposed = food.finalize_portion(portions[i] + step);
            if proposed == portions[i] {
                continue;
            }

            let previous = portions[i];
            portions[i] = proposed;
            let candidate_totals = meal_totals(candidates, &portions);
            let candidate_deviation = weighted_deviation(&candidate_totals, target);

            if candidate_deviation < deviation {
                totals = candidate_totals;
                deviation = candidate_deviation;
                changed = true;
            } else {
                portions[i] = previous;
            }
        }

        if !changed {
            break;
        }
    }

    trace!(
        "Solved meal in {} passes, deviation {:.1} ({})",
        passes, deviation, totals
    );
    solution_from_portions(candidates, &portions, target, passes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FoodCategory, NutrientProfile, PortionArchetype};

    fn chicken() -> FoodItem {
        FoodItem::new(
            "chicken_breast",
            "Chicken breast",
            NutrientProfile::new(165.0, 31.0, 0.0, 3.6),
            FoodCategory::Protein,
        )
        .with_archetype(PortionArchetype::WholeProtein)
    }

    fn rice() -> FoodItem {
        FoodItem::new(
            "rice",
            "Cooked rice",
            NutrientProfile::new(130.0, 2.7, 28.0, 0.3),
            FoodCategory::Carb,
        )
        .with_archetype(PortionArchetype::Starch)
    }

    fn oil() -> FoodItem {
        FoodItem::new(
            "olive_oil",
            "Olive oil",
            NutrientProfile::new(884.0, 0.0, 0.0, 100.0),
            FoodCategory::Fat,
        )
        .with_archetype(PortionArchetype::Oil)
    }

    fn egg() -> FoodItem {
        FoodItem::new(
            "egg",
            "Egg",
            NutrientProfile::new(143.0, 12.6, 0.7, 9.5),
            FoodCategory::Protein,
        )
        .with_archetype(PortionArchetype::Egg)
        .with_unit("egg", 50.0)
    }

    #[test]
    fn test_solver_reduces_deviation() {
        let foods = vec![chicken(), rice(), oil()];
        let target = MacroTotals::new(700.0, 45.0, 70.0, 20.0);
        let initial: Vec<f64> = foods.iter().map(FoodItem::initial_portion).collect();
        let start = weighted_deviation(&meal_totals(&foods, &initial), &target);

        let solution = solve_meal(&target, &foods, &SolveBias::neutral(), &SolverPolicy::default());
        assert!(solution.deviation < start);
        assert!(solution.passes >= 1);
        assert!(solution.passes <= 200);
    }

    #[test]
    fn test_portions_stay_within_limits() {
        // Huge target pushes every food to its ceiling
        let foods = vec![chicken(), rice(), oil(), egg()];
        let target = MacroTotals::new(6000.0, 400.0, 600.0, 200.0);
        let solution = solve_meal(&target, &foods, &SolveBias::neutral(), &SolverPolicy::default());
        for a in &solution.assignments {
            assert!(a.food.limits().contains(a.portion), "{} at {}", a.food.id(), a.portion);
        }
    }

    #[test]
    fn test_unit_foods_land_on_half_units() {
        let foods = vec![egg(), rice()];
        let target = MacroTotals::new(520.0, 24.0, 60.0, 14.0);
        let solution = solve_meal(&target, &foods, &SolveBias::neutral(), &SolverPolicy::default());
        let egg = &solution.assignments[0];
        let units = egg.units.unwrap();
        assert_eq!((units * 2.0).fract(), 0.0);
        assert_eq!(units * 50.0, egg.portion);
    }

    #[test]
    fn test_solver_is_deterministic() {
        let foods = vec![chicken(), rice(), oil()];
        let target = MacroTotals::new(650.0, 40.0, 60.0, 22.0);
        let policy = SolverPolicy::default();
        let a = solve_meal(&target, &foods, &SolveBias::neutral(), &policy);
        let b = solve_meal(&target, &foods, &SolveBias::neutral(), &policy);
        assert_eq!(a, b);
    }

    #[test]
    fn test_degenerate_food_is_skipped() {
        let water = FoodItem::new(
            "water",
            "Water",
            NutrientProfile::new(0.0, 0.0, 0.0, 0.0),
            FoodCategory::Balanced,
        );
        let foods = vec![water, rice()];
        let target = MacroTotals::new(400.0, 8.0, 85.0, 1.0);
        let solution = solve_meal(&target, &foods, &SolveBias::neutral(), &SolverPolicy::default());
        // Water never moves from its starting portion
        assert_eq!(solution.assignments[0].portion, foods[0].initial_portion());
    }

    #[test]
    fn test_empty_candidates() {
        let target = MacroTotals::new(300.0, 20.0, 30.0, 10.0);
        let solution = solve_meal(&target, &[], &SolveBias::neutral(), &SolverPolicy::default());
        assert!(solution.assignments.is_empty());
        assert_eq!(solution.passes, 1);
        assert_eq!(solution.deviation, weighted_deviation(&MacroTotals::default(), &target));
    }

    #[test]
    fn test_biased_step_respects_step_cap() {
        let whey = FoodItem::new(
            "whey",
            "Whey protein",
            NutrientProfile::new(400.0, 80.0, 8.0, 6.0),
            FoodCategory::Supplement,
        )
        .with_archetype(PortionArchetype::ProteinPowder);
        let policy = SolverPolicy {
            max_passes: 1,
            ..SolverPolicy::default()
        };
        let bias = SolveBias::for_meal("breakfast", &policy);
        let target = MacroTotals::new(250.0, 50.0, 5.0, 4.0);

        // Unclamped biased step would be 42.5 * 1.1 g; one pass moves 20 g at most
        let solution = solve_meal(&target, &[whey], &bias, &policy);
        assert_eq!(solution.assignments[0].portion, 40.0);
    }

    #[test]
    fn test_meal_bias() {
        let policy = SolverPolicy::default();
        assert_eq!(SolveBias::for_meal("lunch", &policy), SolveBias::neutral());
        assert_eq!(SolveBias::for_meal("breakfast", &policy).protein, 1.1);
        assert_eq!(SolveBias::for_meal("breakfast", &policy).fat, 1.0);
        let dinner = SolveBias::for_meal("dinner", &policy);
        assert_eq!((dinner.protein, dinner.fat), (1.1, 0.9));
    }
}
