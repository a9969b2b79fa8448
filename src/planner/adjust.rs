use tracing::debug;

use crate::error::{PlannerError, Result};
use crate::models::{FoodItem, Nutrient, PortionAssignment, Suggestion};
use crate::planner::calculations::{round_to_step, round_up_to_step, snap_units};
use crate::planner::constants::UNIT_QUANTUM;
use crate::planner::policy::SolverPolicy;

/// Grams of `food` that deliver `target` of `nutrient`.
///
/// Protein gets a safety margin and rounds up, carbs round up, fat gets a
/// conservative factor and rounds to nearest, all on the adjustment step.
/// Unit-measured foods then snap to the nearest half unit. Returns `None` when the food contains none of the nutrient.
pub fn portion_for_macro(
    food: &FoodItem,
    nutrient: Nutrient,
    target: f64,
    policy: &SolverPolicy,
) -> Option<f64> {
    let per_gram = food.nutrients().per_gram(nutrient);
    if per_gram <= 0.0 || !target.is_finite() || target < 0.0 {
        return None;
    }

    let raw = target / per_gram;
    let step = policy.adjustment_step;
    let grams = match nutrient {
        Nutrient::Protein => round_up_to_step(raw * policy.protein_margin, step),
        Nutrient::Carbs => round_up_to_step(raw, step),
        Nutrient::Fat => round_to_step(raw * policy.fat_margin, step),
        Nutrient::Calories => round_to_step(raw, step),
    };
    Some(match food.unit_grams() {
        Some(unit) => snap_units(grams / unit).max(UNIT_QUANTUM) * unit,
        None => grams,
    })
}

/// Portion of `replacement` with the same calories as `grams` of `original`, finalized.
pub fn calorie_equivalent_portion(original: &FoodItem, grams: f64, replacement: &FoodItem) -> f64 {
    let calories = original.totals_for(grams).calories;
    let per_gram = replacement.nutrients().per_gram(Nutrient::Calories);
    if per_gram <= 0.0 {
        return replacement.initial_portion();
    }
    replacement.finalize_portion(calories / per_gram)
}

/// Portion of `replacement` matching what `grams` of `original` gave of its dominant macro.
///
/// Falls back to caloric equivalence when the original is balanced or the
/// replacement lacks that macro.
pub fn substitute_portion(original: &FoodItem, grams: f64, replacement: &FoodItem) -> f64 {
    let nutrient = original.dominant().nutrient();
    let per_gram = replacement.nutrients().per_gram(nutrient);
    if nutrient == Nutrient::Calories || per_gram <= 0.0 {
        return calorie_equivalent_portion(original, grams, replacement);
    }
    let contribution = original.totals_for(grams).get(nutrient);
    replacement.finalize_portion(contribution / per_gram)
}

impl Suggestion {
    fn item(&self, index: usize) -> Result<&PortionAssignment> {
        self.items.get(index).ok_or_else(|| {
            PlannerError::InvalidInput(format!(
                "item {} out of range for {} ({} items)",
                index,
                self.meal_id,
                self.items.len()
            ))
        })
    }

    fn replace_item(&self, index: usize, item: PortionAssignment) -> Suggestion {
        let mut items = self.items.clone();
        items[index] = item;
        self.with_items(items)
    }

    /// New suggestion with item `index` set to `grams`.
    pub fn with_portion(&self, index: usize, grams: f64) -> Result<Suggestion> {
        let item = self.item(index)?;
        if !grams.is_finite() || grams <= 0.0 {
            return Err(PlannerError::InvalidInput(format!("invalid portion {}", grams)));
        }
        Ok(self.replace_item(index, PortionAssignment::new(item.food.clone(), grams)))
    }

    /// New suggestion with item `index` set to `units` of its native unit, snapped to half units.
    pub fn with_units(&self, index: usize, units: f64) -> Result<Suggestion> {
        let item = self.item(index)?;
        let unit_grams = item.food.unit_grams().ok_or_else(|| {
            PlannerError::InvalidInput(format!("{} is measured in grams", item.food.id()))
        })?;
        let units = snap_units(units);
        if !units.is_finite() || units <= 0.0 {
            return Err(PlannerError::InvalidInput(format!("invalid unit count {}", units)));
        }
        Ok(self.replace_item(
            index,
            PortionAssignment::new(item.food.clone(), units * unit_grams),
        ))
    }

    /// New suggestion with item `index` swapped for `replacement` at an equivalent portion.
    pub fn with_substitute(&self, index: usize, replacement: &FoodItem) -> Result<Suggestion> {
        let item = self.item(index)?;
        let grams = substitute_portion(&item.food, item.portion, replacement);
        debug!(
            "Substituting {} {:.1}g -> {} {:.1}g",
            item.food.id(),
            item.portion,
            replacement.id(),
            grams
        );
        Ok(self.replace_item(index, PortionAssignment::new(replacement.clone(), grams)))
    }

    /// New suggestion with item `index` sized to deliver `target` of `nutrient`.
    pub fn with_macro_target(
        &self,
        index: usize,
        nutrient: Nutrient,
        target: f64,
        policy: &SolverPolicy,
    ) -> Result<Suggestion> {
        let item = self.item(index)?;
        let grams = portion_for_macro(&item.food, nutrient, target, policy).ok_or_else(|| {
            PlannerError::InvalidInput(format!("{} has no {}", item.food.id(), nutrient))
        })?;
        Ok(self.replace_item(index, PortionAssignment::new(item.food.clone(), grams)))
    }
}
