use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

use crate::planner::constants::{
    DOMINANT_MACRO_SHARE, KCAL_PER_GRAM_CARBS, KCAL_PER_GRAM_FAT, KCAL_PER_GRAM_PROTEIN,
};

/// One of the four tracked quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Calories,
    Protein,
    Carbs,
    Fat,
}

impl Nutrient {
    pub const MACROS: [Nutrient; 3] = [Nutrient::Protein, Nutrient::Carbs, Nutrient::Fat];

    /// Kcal-equivalent weight used when scoring deviations.
    pub fn kcal_weight(self) -> f64 {
        match self {
            Nutrient::Calories => 1.0,
            Nutrient::Protein => KCAL_PER_GRAM_PROTEIN,
            Nutrient::Carbs => KCAL_PER_GRAM_CARBS,
            Nutrient::Fat => KCAL_PER_GRAM_FAT,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Carbs => "carbs",
            Nutrient::Fat => "fat",
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Nutrient {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "calories" | "kcal" => Ok(Nutrient::Calories),
            "protein" => Ok(Nutrient::Protein),
            "carbs" | "carb" | "carbohydrate" => Ok(Nutrient::Carbs),
            "fat" | "fats" => Ok(Nutrient::Fat),
            other => Err(format!("unknown nutrient '{}'", other)),
        }
    }
}

/// The macro contributing more than half of a food's macro mass, or `Balanced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DominantMacro {
    Protein,
    Carbs,
    Fat,
    Balanced,
}

impl DominantMacro {
    /// The nutrient the solver steers with for this food.
    pub fn nutrient(self) -> Nutrient {
        match self {
            DominantMacro::Protein => Nutrient::Protein,
            DominantMacro::Carbs => Nutrient::Carbs,
            DominantMacro::Fat => Nutrient::Fat,
            DominantMacro::Balanced => Nutrient::Calories,
        }
    }
}

/// Nutrient content per 100 units (grams) of portion.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutrientProfile {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl NutrientProfile {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// Every value finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.calories, self.protein, self.carbs, self.fat]
            .into_iter()
            .all(|v| v.is_finite() && v >= 0.0)
    }

    #[inline]
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Carbs => self.carbs,
            Nutrient::Fat => self.fat,
        }
    }

    /// Amount of `nutrient` in one gram of food.
    #[inline]
    pub fn per_gram(&self, nutrient: Nutrient) -> f64 {
        self.get(nutrient) / 100.0
    }

    /// Absolute amounts for a portion in grams.
    pub fn for_portion(&self, grams: f64) -> MacroTotals {
        let factor = grams / 100.0;
        MacroTotals {
            calories: self.calories * factor,
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
        }
    }

    /// Classify by the macro holding more than half of combined macro grams.
    pub fn dominant_macro(&self) -> DominantMacro {
        let total = self.protein + self.carbs + self.fat;
        if total <= 0.0 {
            return DominantMacro::Balanced;
        }
        if self.protein / total > DOMINANT_MACRO_SHARE {
            DominantMacro::Protein
        } else if self.carbs / total > DOMINANT_MACRO_SHARE {
            DominantMacro::Carbs
        } else if self.fat / total > DOMINANT_MACRO_SHARE {
            DominantMacro::Fat
        } else {
            DominantMacro::Balanced
        }
    }
}

/// Absolute calorie and macro amounts (targets, achieved sums, goals).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroTotals {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// Totals whose calories are derived from the macros at 4/4/9 kcal per gram.
    pub fn from_macros(protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories: crate::planner::calculations::calories_from_macros(protein, carbs, fat),
            protein,
            carbs,
            fat,
        }
    }

    #[inline]
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Carbs => self.carbs,
            Nutrient::Fat => self.fat,
        }
    }

    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        match nutrient {
            Nutrient::Calories => self.calories = value,
            Nutrient::Protein => self.protein = value,
            Nutrient::Carbs => self.carbs = value,
            Nutrient::Fat => self.fat = value,
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
        }
    }
}

impl Add for MacroTotals {
    type Output = MacroTotals;

    fn add(self, rhs: Self) -> Self::Output {
        MacroTotals {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl AddAssign for MacroTotals {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for MacroTotals {
    type Output = MacroTotals;

    fn sub(self, rhs: Self) -> Self::Output {
        MacroTotals {
            calories: self.calories - rhs.calories,
            protein: self.protein - rhs.protein,
            carbs: self.carbs - rhs.carbs,
            fat: self.fat - rhs.fat,
        }
    }
}

impl Sum for MacroTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(MacroTotals::default(), |acc, t| acc + t)
    }
}

impl fmt::Display for MacroTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0} kcal, P:{:.1}g C:{:.1}g F:{:.1}g",
            self.calories, self.protein, self.carbs, self.fat
        )
    }
}
