use serde::{Deserialize, Serialize};

use crate::models::nutrients::MacroTotals;
use crate::planner::constants::meal_display_name;

/// A meal the user currently has enabled. The id space is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveMeal {
    pub id: String,
    pub name: String,
}

impl ActiveMeal {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// A meal named after its canonical display name.
    pub fn canonical(id: &str) -> Self {
        Self::new(id, meal_display_name(id))
    }
}

/// Daily nutrition goals from the user profile.
///
/// Missing values deserialize as zero and make the goals incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DailyGoals {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub meal_count: u32,
}

impl DailyGoals {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64, meal_count: u32) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
            meal_count,
        }
    }

    /// All fields present and positive.
    pub fn is_complete(&self) -> bool {
        [self.calories, self.protein, self.carbs, self.fat]
            .into_iter()
            .all(|v| v.is_finite() && v > 0.0)
            && self.meal_count > 0
    }

    pub fn totals(&self) -> MacroTotals {
        MacroTotals::new(self.calories, self.protein, self.carbs, self.fat)
    }
}

/// Per-meal calorie split between protein, carbs and fat, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroRatio {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroRatio {
    pub fn new(protein: f64, carbs: f64, fat: f64) -> Self {
        Self { protein, carbs, fat }
    }

    /// Non-negative parts summing to exactly 100.
    pub fn is_valid(&self) -> bool {
        let parts = [self.protein, self.carbs, self.fat];
        parts.iter().all(|p| p.is_finite() && *p >= 0.0)
            && (parts.iter().sum::<f64>() - 100.0).abs() < 1e-9
    }
}

/// User-authored override of one meal's share of the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMealShare {
    pub meal_id: String,
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macro_ratio: Option<MacroRatio>,
}

impl CustomMealShare {
    pub fn new(meal_id: impl Into<String>, percentage: f64) -> Self {
        Self {
            meal_id: meal_id.into(),
            percentage,
            macro_ratio: None,
        }
    }

    pub fn with_macro_ratio(mut self, ratio: MacroRatio) -> Self {
        self.macro_ratio = Some(ratio);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.percentage.is_finite() && (0.0..=100.0).contains(&self.percentage)
    }

    /// The override ratio, only when it sums to 100.
    pub fn valid_ratio(&self) -> Option<MacroRatio> {
        self.macro_ratio.filter(MacroRatio::is_valid)
    }
}

/// Absolute per-meal targets and the meal's integer share of the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealTarget {
    pub meal_id: String,
    pub meal_name: String,
    pub target: MacroTotals,
    pub percentage_of_daily_total: u32,
}
