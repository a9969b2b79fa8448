use serde::{Deserialize, Serialize};

use crate::models::food::FoodItem;
use crate::models::meal::MealTarget;
use crate::models::nutrients::MacroTotals;

/// One food and its portion within a suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortionAssignment {
    pub food: FoodItem,

    /// Portion in grams.
    pub portion: f64,

    /// Portion in the food's native unit, for unit-measured foods.
    pub units: Option<f64>,
}

impl PortionAssignment {
    /// Pair a food with a portion, deriving the unit count.
    pub fn new(food: FoodItem, portion: f64) -> Self {
        let units = food.units_for(portion);
        Self {
            food,
            portion,
            units,
        }
    }

    /// Nutrients delivered by this portion.
    #[inline]
    pub fn totals(&self) -> MacroTotals {
        self.food.totals_for(self.portion)
    }
}

/// A proposed set of portions for one meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub meal_id: String,
    pub meal_name: String,
    pub items: Vec<PortionAssignment>,
    pub totals: MacroTotals,
    pub rationale: String,
}

impl Suggestion {
    pub fn new(
        meal_id: impl Into<String>,
        meal_name: impl Into<String>,
        items: Vec<PortionAssignment>,
        rationale: impl Into<String>,
    ) -> Self {
        let totals = items.iter().map(PortionAssignment::totals).sum();
        Self {
            meal_id: meal_id.into(),
            meal_name: meal_name.into(),
            items,
            totals,
            rationale: rationale.into(),
        }
    }

    /// Copy with the items replaced and totals recomputed.
    pub fn with_items(&self, items: Vec<PortionAssignment>) -> Self {
        Suggestion::new(
            self.meal_id.clone(),
            self.meal_name.clone(),
            items,
            self.rationale.clone(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Day-level outcome of a planning run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DaySummary {
    pub goal: MacroTotals,
    pub achieved: MacroTotals,
    pub weighted_deviation: f64,
    pub global_iterations: usize,
    pub redistributed: bool,
}

/// Targets and suggestions for every active meal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DayPlan {
    pub targets: Vec<MealTarget>,
    pub suggestions: Vec<Suggestion>,
    pub summary: DaySummary,
}

impl DayPlan {
    /// The "profile incomplete" result.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}
