use std::collections::HashMap;
use std::sync::LazyLock;

/// Energy density of protein (kcal per gram).
pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;

/// Energy density of carbohydrate (kcal per gram).
pub const KCAL_PER_GRAM_CARBS: f64 = 4.0;

/// Energy density of fat (kcal per gram).
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// Share of combined macro grams a macro needs to be considered dominant.
pub const DOMINANT_MACRO_SHARE: f64 = 0.5;

// ─────────────────────────────────────────────────────────────────────────────
// Meal share allocation
// ─────────────────────────────────────────────────────────────────────────────

/// Default fraction of daily calories per canonical meal id.
pub const DEFAULT_MEAL_WEIGHTS: &[(&str, f64)] = &[
    ("breakfast", 0.25),
    ("morning_snack", 0.10),
    ("lunch", 0.25),
    ("afternoon_snack", 0.10),
    ("dinner", 0.20),
    ("supper", 0.05),
    ("snack", 0.05),
];

/// Share of breakfast protein moved into carbohydrate when no macro override exists.
pub const BREAKFAST_PROTEIN_TO_CARB_SHIFT: f64 = 0.15;

/// Macro grams in meal targets are rounded to this step.
pub const MACRO_GRAM_STEP: f64 = 0.1;

// ─────────────────────────────────────────────────────────────────────────────
// Single-meal solver
// ─────────────────────────────────────────────────────────────────────────────

/// Maximum refinement passes per meal solve.
pub const MAX_SOLVER_PASSES: usize = 200;

/// Weighted deviation (kcal-equivalent) at which a meal solve stops.
pub const SOLVER_TOLERANCE: f64 = 5.0;

/// Largest gram change applied to one food in one pass.
pub const MAX_STEP_GRAMS: f64 = 20.0;

/// Portions below this are rounded to `FINE_ROUNDING_STEP`.
pub const FINE_ROUNDING_LIMIT: f64 = 10.0;
pub const FINE_ROUNDING_STEP: f64 = 0.5;

/// Portions below this (and above the fine limit) are rounded to whole grams.
pub const MEDIUM_ROUNDING_LIMIT: f64 = 50.0;
pub const MEDIUM_ROUNDING_STEP: f64 = 1.0;

/// Larger portions are rounded to this step.
pub const COARSE_ROUNDING_STEP: f64 = 5.0;

/// Unit-measured foods are quantized to multiples of this many units.
pub const UNIT_QUANTUM: f64 = 0.5;

// ─────────────────────────────────────────────────────────────────────────────
// Multi-meal reconciliation
// ─────────────────────────────────────────────────────────────────────────────

/// Maximum global correction iterations.
pub const MAX_RECONCILE_ITERATIONS: usize = 4;

/// Relative macro deviation that triggers another global iteration.
pub const RECONCILE_THRESHOLD: f64 = 0.01;

/// Intensity grows by this much per global iteration.
pub const INTENSITY_STEP: f64 = 0.2;

/// Bounds on the cumulative correction factor.
pub const CORRECTION_MIN: f64 = 0.8;
pub const CORRECTION_MAX: f64 = 1.1;

/// Extra protein bias for protein-dominant foods at breakfast and dinner.
pub const MEAL_PROTEIN_BIAS: f64 = 1.1;

/// Fat bias for fat-dominant foods at dinner.
pub const DINNER_FAT_BIAS: f64 = 0.9;

/// Final pass triggers: relative calorie/protein error and fat ceiling.
pub const FINAL_CALORIE_TOLERANCE: f64 = 0.05;
pub const FINAL_PROTEIN_TOLERANCE: f64 = 0.05;
pub const FINAL_FAT_CEILING: f64 = 1.10;

/// Protein below this fraction of goal boosts the final protein ratio.
pub const FINAL_PROTEIN_FLOOR: f64 = 0.90;
pub const FINAL_PROTEIN_BOOST: f64 = 1.1;

/// Final fat ratio damping when fat exceeds the ceiling.
pub const FINAL_FAT_DAMPING: f64 = 0.9;

/// Bounds on the per-food rescale ratio of the final pass.
pub const FINAL_RATIO_MIN: f64 = 0.5;
pub const FINAL_RATIO_MAX: f64 = 1.5;

// ─────────────────────────────────────────────────────────────────────────────
// User-driven adjustments
// ─────────────────────────────────────────────────────────────────────────────

/// Safety margin applied when sizing a portion for a protein target.
pub const PROTEIN_MARGIN: f64 = 1.05;

/// Conservative multiplier applied when sizing a portion for a fat target.
pub const FAT_MARGIN: f64 = 0.95;

/// Rounding step for macro-targeted portions.
pub const ADJUSTMENT_STEP: f64 = 5.0;

/// Minimum Jaro-Winkler similarity for fuzzy food name matches.
pub const NAME_MATCH_THRESHOLD: f64 = 0.7;

/// Display names of the canonical meal ids.
pub static CANONICAL_MEAL_NAMES: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();
        m.insert("breakfast", "Breakfast");
        m.insert("morning_snack", "Morning snack");
        m.insert("lunch", "Lunch");
        m.insert("afternoon_snack", "Afternoon snack");
        m.insert("dinner", "Dinner");
        m.insert("supper", "Supper");
        m.insert("snack", "Snack");
        m
    });

/// Get the default weight for a canonical meal id.
pub fn default_meal_weight(meal_id: &str) -> Option<f64> {
    DEFAULT_MEAL_WEIGHTS
        .iter()
        .find(|(id, _)| *id == meal_id)
        .map(|(_, w)| *w)
}

/// Get the display name for a meal id, falling back to the id itself.
pub fn meal_display_name(meal_id: &str) -> String {
    CANONICAL_MEAL_NAMES
        .get(meal_id)
        .map(|s| s.to_string())
        .unwrap_or_else(|| meal_id.to_string())
}
