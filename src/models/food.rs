use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::models::nutrients::{DominantMacro, MacroTotals, NutrientProfile};
use crate::planner::calculations::{round_down_to_step, round_portion, round_up_to_step, snap_units};
use crate::planner::constants::UNIT_QUANTUM;

/// Catalog category of a food.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Protein,
    Carb,
    Fat,
    Fruit,
    Vegetable,
    Dairy,
    Supplement,
    Balanced,
}

impl FoodCategory {
    pub fn label(self) -> &'static str {
        match self {
            FoodCategory::Protein => "protein",
            FoodCategory::Carb => "carb",
            FoodCategory::Fat => "fat",
            FoodCategory::Fruit => "fruit",
            FoodCategory::Vegetable => "vegetable",
            FoodCategory::Dairy => "dairy",
            FoodCategory::Supplement => "supplement",
            FoodCategory::Balanced => "balanced",
        }
    }
}

/// Portion behavior class; drives initial portions and limit ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortionArchetype {
    Bread,
    Egg,
    LiquidDairy,
    Oil,
    Starch,
    Legume,
    WholeProtein,
    Fruit,
    ProteinPowder,
    NutButter,
    #[default]
    Generic,
}

impl PortionArchetype {
    /// Gram limits for this archetype.
    ///
    /// Bread and egg limits scale with the unit weight; without one they
    /// fall back to the generic range.
    pub fn limits(self, unit_grams: Option<f64>) -> PortionLimits {
        match (self, unit_grams) {
            (PortionArchetype::Bread | PortionArchetype::Egg, Some(unit)) => {
                PortionLimits::new(0.5 * unit, 5.0 * unit)
            }
            (PortionArchetype::LiquidDairy, _) => PortionLimits::new(100.0, 200.0),
            (PortionArchetype::Oil, _) => PortionLimits::new(5.0, 15.0),
            (PortionArchetype::Starch, _) => PortionLimits::new(50.0, 400.0),
            (PortionArchetype::Legume, _) => PortionLimits::new(50.0, 150.0),
            (PortionArchetype::WholeProtein, _) => PortionLimits::new(80.0, 300.0),
            (PortionArchetype::Fruit, _) => PortionLimits::new(50.0, 300.0),
            (PortionArchetype::ProteinPowder, _) => PortionLimits::new(15.0, 60.0),
            (PortionArchetype::NutButter, _) => PortionLimits::new(10.0, 40.0),
            _ => PortionLimits::new(20.0, 150.0),
        }
    }

    /// Fixed starting portion, if this archetype has one.
    pub fn initial_portion(self) -> Option<f64> {
        match self {
            PortionArchetype::ProteinPowder => Some(20.0),
            PortionArchetype::NutButter => Some(15.0),
            PortionArchetype::Fruit => Some(100.0),
            PortionArchetype::LiquidDairy => Some(150.0),
            _ => None,
        }
    }
}

/// Animal origin of a food; `None` on a food means plant-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimalSource {
    Meat,
    Fish,
    Dairy,
    Egg,
}

/// Dietary pattern used to filter the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Diet {
    #[default]
    Omnivore,
    Pescatarian,
    Vegetarian,
    Vegan,
}

impl Diet {
    /// Whether a food with the given animal source fits this diet.
    pub fn allows(self, source: Option<AnimalSource>) -> bool {
        match (self, source) {
            (_, None) | (Diet::Omnivore, _) => true,
            (Diet::Pescatarian, Some(s)) => s != AnimalSource::Meat,
            (Diet::Vegetarian, Some(s)) => !matches!(s, AnimalSource::Meat | AnimalSource::Fish),
            (Diet::Vegan, Some(_)) => false,
        }
    }
}

impl FromStr for Diet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "omnivore" | "none" => Ok(Diet::Omnivore),
            "pescatarian" => Ok(Diet::Pescatarian),
            "vegetarian" => Ok(Diet::Vegetarian),
            "vegan" => Ok(Diet::Vegan),
            other => Err(format!("unknown diet '{}'", other)),
        }
    }
}

impl fmt::Display for Diet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Diet::Omnivore => "omnivore",
            Diet::Pescatarian => "pescatarian",
            Diet::Vegetarian => "vegetarian",
            Diet::Vegan => "vegan",
        };
        f.write_str(s)
    }
}

/// Inclusive gram range a portion must stay within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortionLimits {
    pub min_grams: f64,
    pub max_grams: f64,
}

impl PortionLimits {
    pub fn new(min_grams: f64, max_grams: f64) -> Self {
        Self {
            min_grams,
            max_grams: max_grams.max(min_grams),
        }
    }

    #[inline]
    pub fn clamp(&self, grams: f64) -> f64 {
        grams.clamp(self.min_grams, self.max_grams)
    }

    #[inline]
    pub fn contains(&self, grams: f64) -> bool {
        grams >= self.min_grams && grams <= self.max_grams
    }

    #[inline]
    pub fn midpoint(&self) -> f64 {
        (self.min_grams + self.max_grams) / 2.0
    }

    /// Shrink the range to half-unit multiples of `unit_grams`, at least half a unit.
    fn aligned_to_units(&self, unit_grams: f64) -> PortionLimits {
        let min_units = round_up_to_step(self.min_grams / unit_grams, UNIT_QUANTUM).max(UNIT_QUANTUM);
        let max_units = round_down_to_step(self.max_grams / unit_grams, UNIT_QUANTUM).max(min_units);
        PortionLimits::new(min_units * unit_grams, max_units * unit_grams)
    }
}

/// Serialized shape of a catalog record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FoodRecord {
    id: String,
    name: String,
    #[serde(flatten)]
    nutrients: NutrientProfile,
    category: FoodCategory,
    #[serde(default)]
    archetype: PortionArchetype,
    #[serde(default = "default_unit")]
    measurement_unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit_grams: Option<f64>,
    #[serde(default)]
    substitutes: Vec<String>,
    #[serde(default)]
    meal_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    animal_source: Option<AnimalSource>,
}

fn default_unit() -> String {
    GRAM_UNIT.to_string()
}

/// Measurement unit name meaning "plain grams".
pub const GRAM_UNIT: &str = "g";

/// A catalog food. Derived fields (dominant macro, limits) are fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FoodRecord", into = "FoodRecord")]
pub struct FoodItem {
    id: String,
    name: String,
    nutrients: NutrientProfile,
    category: FoodCategory,
    archetype: PortionArchetype,
    measurement_unit: String,
    unit_grams: Option<f64>,
    substitutes: Vec<String>,
    meal_types: Vec<String>,
    animal_source: Option<AnimalSource>,
    dominant: DominantMacro,
    limits: PortionLimits,
}

impl FoodItem {
    /// A gram-measured, plant-based food with the generic archetype.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        nutrients: NutrientProfile,
        category: FoodCategory,
    ) -> Self {
        let mut food = Self {
            id: id.into(),
            name: name.into(),
            nutrients,
            category,
            archetype: PortionArchetype::Generic,
            measurement_unit: GRAM_UNIT.to_string(),
            unit_grams: None,
            substitutes: Vec::new(),
            meal_types: Vec::new(),
            animal_source: None,
            dominant: nutrients.dominant_macro(),
            limits: PortionArchetype::Generic.limits(None),
        };
        food.refresh_derived();
        food
    }

    pub fn with_archetype(mut self, archetype: PortionArchetype) -> Self {
        self.archetype = archetype;
        self.refresh_derived();
        self
    }

    /// Measure in a native unit (e.g. "egg") weighing `grams_per_unit`.
    pub fn with_unit(mut self, unit: impl Into<String>, grams_per_unit: f64) -> Self {
        self.measurement_unit = unit.into();
        self.unit_grams = Some(grams_per_unit);
        self.refresh_derived();
        self
    }

    pub fn with_substitutes<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.substitutes = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_meal_types<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meal_types = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_animal_source(mut self, source: AnimalSource) -> Self {
        self.animal_source = Some(source);
        self
    }

    fn refresh_derived(&mut self) {
        self.dominant = self.nutrients.dominant_macro();
        let unit = self.unit_grams();
        let limits = self.archetype.limits(unit);
        self.limits = match unit {
            Some(u) => limits.aligned_to_units(u),
            None => limits,
        };
    }

    /// Check the record invariants enforced at catalog load.
    pub fn validate(&self) -> Result<(), PlannerError> {
        let invalid = |reason: &str| PlannerError::InvalidFood {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("empty id"));
        }
        if !self.nutrients.is_valid() {
            return Err(invalid("nutrient values must be non-negative"));
        }
        let is_gram_unit = self.measurement_unit == GRAM_UNIT;
        match (is_gram_unit, self.unit_grams) {
            (false, None) => Err(invalid("unit_grams is required for non-gram units")),
            (false, Some(g)) if !(g.is_finite() && g > 0.0) => {
                Err(invalid("unit_grams must be positive"))
            }
            (true, Some(_)) => Err(invalid("unit_grams is only allowed for non-gram units")),
            _ => Ok(()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nutrients(&self) -> &NutrientProfile {
        &self.nutrients
    }

    pub fn category(&self) -> FoodCategory {
        self.category
    }

    pub fn archetype(&self) -> PortionArchetype {
        self.archetype
    }

    pub fn measurement_unit(&self) -> &str {
        &self.measurement_unit
    }

    pub fn substitutes(&self) -> &[String] {
        &self.substitutes
    }

    pub fn meal_types(&self) -> &[String] {
        &self.meal_types
    }

    pub fn animal_source(&self) -> Option<AnimalSource> {
        self.animal_source
    }

    pub fn dominant(&self) -> DominantMacro {
        self.dominant
    }

    pub fn limits(&self) -> PortionLimits {
        self.limits
    }

    /// Grams per native unit, for unit-measured foods only.
    pub fn unit_grams(&self) -> Option<f64> {
        if self.measurement_unit == GRAM_UNIT {
            None
        } else {
            self.unit_grams
        }
    }

    #[inline]
    pub fn is_unit_measured(&self) -> bool {
        self.unit_grams().is_some()
    }

    /// An empty tag list means the food fits every meal type.
    pub fn fits_meal_type(&self, meal_type: &str) -> bool {
        self.meal_types.is_empty() || self.meal_types.iter().any(|t| t == meal_type)
    }

    /// Absolute nutrients for a portion in grams.
    #[inline]
    pub fn totals_for(&self, grams: f64) -> MacroTotals {
        self.nutrients.for_portion(grams)
    }

    /// Starting portion before any optimization.
    pub fn initial_portion(&self) -> f64 {
        let raw = self
            .archetype
            .initial_portion()
            .unwrap_or_else(|| self.limits.midpoint());
        self.finalize_portion(raw)
    }

    /// Clamp, round and quantize a raw gram amount to a valid portion.
    ///
    /// Unit-measured foods land on half-unit multiples inside their
    /// (half-unit aligned) limits.
    pub fn finalize_portion(&self, raw_grams: f64) -> f64 {
        let clamped = self.limits.clamp(raw_grams);
        match self.unit_grams() {
            Some(unit) => self.units_to_grams(snap_units(clamped / unit)),
            None => self.limits.clamp(round_portion(clamped)),
        }
    }

    /// Portion for a unit count, snapped and limited like any portion.
    pub fn units_to_grams(&self, units: f64) -> f64 {
        match self.unit_grams() {
            Some(unit) => {
                let min_units = self.limits.min_grams / unit;
                let max_units = self.limits.max_grams / unit;
                snap_units(snap_units(units).clamp(min_units, max_units)) * unit
            }
            None => units,
        }
    }

    /// Native unit count for a portion, for unit-measured foods.
    pub fn units_for(&self, grams: f64) -> Option<f64> {
        self.unit_grams().map(|unit| grams / unit)
    }
}

impl TryFrom<FoodRecord> for FoodItem {
    type Error = PlannerError;

    fn try_from(record: FoodRecord) -> Result<Self, Self::Error> {
        let mut food = FoodItem {
            id: record.id,
            name: record.name,
            nutrients: record.nutrients,
            category: record.category,
            archetype: record.archetype,
            measurement_unit: record.measurement_unit,
            unit_grams: record.unit_grams,
            substitutes: record.substitutes,
            meal_types: record.meal_types,
            animal_source: record.animal_source,
            dominant: DominantMacro::Balanced,
            limits: PortionArchetype::Generic.limits(None),
        };
        food.validate()?;
        food.refresh_derived();
        Ok(food)
    }
}

impl From<FoodItem> for FoodRecord {
    fn from(food: FoodItem) -> Self {
        FoodRecord {
            id: food.id,
            name: food.name,
            nutrients: food.nutrients,
            category: food.category,
            archetype: food.archetype,
            measurement_unit: food.measurement_unit,
            unit_grams: food.unit_grams,
            substitutes: food.substitutes,
            meal_types: food.meal_types,
            animal_source: food.animal_source,
        }
    }
}
