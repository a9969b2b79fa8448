use serde::{Deserialize, Serialize};

use crate::planner::constants::*;

/// Every tunable constant of the allocator, solver and reconciler.
///
/// Defaults come from `planner::constants`; a tuned policy can be loaded
/// from JSON. Missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverPolicy {
    pub max_passes: usize,
    pub tolerance: f64,
    pub max_step_grams: f64,

    pub reconcile_iterations: usize,
    pub reconcile_threshold: f64,
    pub intensity_step: f64,
    pub correction_min: f64,
    pub correction_max: f64,
    pub meal_protein_bias: f64,
    pub dinner_fat_bias: f64,

    pub final_calorie_tolerance: f64,
    pub final_protein_tolerance: f64,
    pub final_fat_ceiling: f64,
    pub final_protein_floor: f64,
    pub final_protein_boost: f64,
    pub final_fat_damping: f64,
    pub final_ratio_min: f64,
    pub final_ratio_max: f64,

    pub breakfast_protein_shift: f64,
    pub protein_margin: f64,
    pub fat_margin: f64,
    pub adjustment_step: f64,
}

impl Default for SolverPolicy {
    fn default() -> Self {
        Self {
            max_passes: MAX_SOLVER_PASSES,
            tolerance: SOLVER_TOLERANCE,
            max_step_grams: MAX_STEP_GRAMS,
            reconcile_iterations: MAX_RECONCILE_ITERATIONS,
            reconcile_threshold: RECONCILE_THRESHOLD,
            intensity_step: INTENSITY_STEP,
            correction_min: CORRECTION_MIN,
            correction_max: CORRECTION_MAX,
            meal_protein_bias: MEAL_PROTEIN_BIAS,
            dinner_fat_bias: DINNER_FAT_BIAS,
            final_calorie_tolerance: FINAL_CALORIE_TOLERANCE,
            final_protein_tolerance: FINAL_PROTEIN_TOLERANCE,
            final_fat_ceiling: FINAL_FAT_CEILING,
            final_protein_floor: FINAL_PROTEIN_FLOOR,
            final_protein_boost: FINAL_PROTEIN_BOOST,
            final_fat_damping: FINAL_FAT_DAMPING,
            final_ratio_min: FINAL_RATIO_MIN,
            final_ratio_max: FINAL_RATIO_MAX,
            breakfast_protein_shift: BREAKFAST_PROTEIN_TO_CARB_SHIFT,
            protein_margin: PROTEIN_MARGIN,
            fat_margin: FAT_MARGIN,
            adjustment_step: ADJUSTMENT_STEP,
        }
    }
}

impl SolverPolicy {
    /// Intensity of the correction at a zero-based global iteration.
    #[inline]
    pub fn intensity(&self, iteration: usize) -> f64 {
        1.0 + self.intensity_step * iteration as f64
    }
}
