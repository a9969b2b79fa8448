use std::collections::HashMap;

use tracing::debug;

use crate::models::{ActiveMeal, CustomMealShare, DailyGoals, MacroRatio, MacroTotals, MealTarget};
use crate::planner::calculations::round_to_step;
use crate::planner::constants::{
    KCAL_PER_GRAM_CARBS, KCAL_PER_GRAM_FAT, KCAL_PER_GRAM_PROTEIN, MACRO_GRAM_STEP,
    default_meal_weight,
};
use crate::planner::normalize::{normalize_percentages, normalize_to_total};
use crate::planner::policy::SolverPolicy;

/// Meal id that receives the protein-to-carbohydrate shift.
const BREAKFAST_ID: &str = "breakfast";

/// Per-meal weights and optional macro ratio overrides, aligned with the active meals.
#[derive(Debug, Clone, PartialEq)]
pub struct MealWeights {
    pub weights: Vec<f64>,
    pub ratios: Vec<Option<MacroRatio>>,
    pub custom: bool,
}

/// Default importance weights for the active meals, normalized to sum to 1.
///
/// Canonical ids take their table weight; unknown ids split whatever the
/// known meals leave unassigned.
pub fn default_weights(meals: &[ActiveMeal]) -> Vec<f64> {
    if meals.is_empty() {
        return Vec::new();
    }

    let known: Vec<Option<f64>> = meals.iter().map(|m| default_meal_weight(&m.id)).collect();
    let known_sum: f64 = known.iter().flatten().sum();
    let unknown_count = known.iter().filter(|w| w.is_none()).count();
    let unknown_share = if unknown_count > 0 {
        (1.0 - known_sum).max(0.0) / unknown_count as f64
    } else {
        0.0
    };

    let weights: Vec<f64> = known.iter().map(|w| w.unwrap_or(unknown_share)).collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        // Only unknown meals competing for an exhausted remainder
        return vec![1.0 / meals.len() as f64; meals.len()];
    }
    weights.into_iter().map(|w| w / total).collect()
}

/// Custom weights, when the overrides are valid and cover every active meal.
///
/// Overrides for meals that are no longer active are dropped and the rest
/// renormalized proportionally. Anything less than full coverage yields
/// `None` so callers fall back to defaults for all meals.
pub fn custom_weights(
    meals: &[ActiveMeal],
    shares: &[CustomMealShare],
) -> Option<(Vec<f64>, Vec<Option<MacroRatio>>)> {
    if meals.is_empty() || shares.is_empty() {
        return None;
    }
    if let Some(bad) = shares.iter().find(|s| !s.is_valid()) {
        debug!("Ignoring custom shares: '{}' has invalid percentage {}", bad.meal_id, bad.percentage);
        return None;
    }

    let mut by_meal: HashMap<&str, &CustomMealShare> = HashMap::new();
    for share in shares {
        by_meal.entry(share.meal_id.as_str()).or_insert(share);
    }

    let mut matched = Vec::with_capacity(meals.len());
    for meal in meals {
        match by_meal.get(meal.id.as_str()) {
            Some(share) => matched.push(*share),
            None => {
                debug!("Ignoring custom shares: no entry for active meal '{}'", meal.id);
                return None;
            }
        }
    }

    let dropped = shares.len() - matched.len();
    if dropped > 0 {
        debug!("Dropped {} custom shares for inactive meals", dropped);
    }

    let total: f64 = matched.iter().map(|s| s.percentage).sum();
    if total <= 0.0 {
        return None;
    }

    let weights = matched.iter().map(|s| s.percentage / total).collect();
    let ratios = matched.iter().map(|s| s.valid_ratio()).collect();
    Some((weights, ratios))
}

/// Resolve the weights used for a day: custom when complete, default otherwise.
pub fn resolve_weights(meals: &[ActiveMeal], custom: Option<&[CustomMealShare]>) -> MealWeights {
    if let Some((weights, ratios)) = custom.and_then(|shares| custom_weights(meals, shares)) {
        return MealWeights {
            weights,
            ratios,
            custom: true,
        };
    }
    MealWeights {
        weights: default_weights(meals),
        ratios: vec![None; meals.len()],
        custom: false,
    }
}

/// Macro grams for a meal's calories under a percentage split.
fn macros_from_ratio(calories: f64, ratio: &MacroRatio) -> (f64, f64, f64) {
    (
        calories * ratio.protein / 100.0 / KCAL_PER_GRAM_PROTEIN,
        calories * ratio.carbs / 100.0 / KCAL_PER_GRAM_CARBS,
        calories * ratio.fat / 100.0 / KCAL_PER_GRAM_FAT,
    )
}

/// Split daily goals into one target per active meal.
///
/// Returns an empty list when the goals are incomplete or no meal is
/// active. Percentages always sum to 100 and calories to the daily goal.
pub fn allocate_meal_targets(
    meals: &[ActiveMeal],
    goals: &DailyGoals,
    custom: Option<&[CustomMealShare]>,
    policy: &SolverPolicy,
) -> Vec<MealTarget> {
    if meals.is_empty() || !goals.is_complete() {
        debug!("Skipping allocation: incomplete goals or no active meals");
        return Vec::new();
    }

    let resolved = resolve_weights(meals, custom);
    let percentages = normalize_percentages(&resolved.weights);
    let raw_calories: Vec<f64> = resolved.weights.iter().map(|w| w * goals.calories).collect();
    let calories = normalize_to_total(&raw_calories, goals.calories, 1.0);

    debug!(
        "Allocated {} meals ({} weights): {:?}",
        meals.len(),
        if resolved.custom { "custom" } else { "default" },
        percentages
    );

    meals
        .iter()
        .enumerate()
        .map(|(i, meal)| {
            let weight = resolved.weights[i];
            let meal_calories = calories[i];
            let (mut protein, mut carbs, fat) = match &resolved.ratios[i] {
                Some(ratio) => macros_from_ratio(meal_calories, ratio),
                None => (
                    weight * goals.protein,
                    weight * goals.carbs,
                    weight * goals.fat,
                ),
            };

            if meal.id == BREAKFAST_ID && resolved.ratios[i].is_none() {
                let shifted = protein * policy.breakfast_protein_shift;
                protein -= shifted;
                carbs += shifted;
            }

            MealTarget {
                meal_id: meal.id.clone(),
                meal_name: meal.name.clone(),
                target: MacroTotals::new(
                    meal_calories,
                    round_to_step(protein, MACRO_GRAM_STEP),
                    round_to_step(carbs, MACRO_GRAM_STEP),
                    round_to_step(fat, MACRO_GRAM_STEP),
                ),
                percentage_of_daily_total: percentages[i],
            }
        })
        .collect()
}
