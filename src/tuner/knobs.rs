use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::planner::SolverPolicy;

/// The subset of `SolverPolicy` explored by the tuner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyKnobs {
    pub max_step_grams: f64,
    pub intensity_step: f64,
    pub correction_min: f64,
    pub correction_max: f64,
    pub meal_protein_bias: f64,
    pub dinner_fat_bias: f64,
    pub final_protein_boost: f64,
    pub final_fat_damping: f64,
}

impl Default for PolicyKnobs {
    fn default() -> Self {
        Self::from_policy(&SolverPolicy::default())
    }
}

impl PolicyKnobs {
    /// Number of tunable knobs.
    pub const NUM_KNOBS: usize = 8;

    pub fn from_policy(policy: &SolverPolicy) -> Self {
        Self {
            max_step_grams: policy.max_step_grams,
            intensity_step: policy.intensity_step,
            correction_min: policy.correction_min,
            correction_max: policy.correction_max,
            meal_protein_bias: policy.meal_protein_bias,
            dinner_fat_bias: policy.dinner_fat_bias,
            final_protein_boost: policy.final_protein_boost,
            final_fat_damping: policy.final_fat_damping,
        }
    }

    /// The default policy with these knobs applied.
    pub fn to_policy(&self) -> SolverPolicy {
        SolverPolicy {
            max_step_grams: self.max_step_grams,
            intensity_step: self.intensity_step,
            correction_min: self.correction_min,
            correction_max: self.correction_max,
            meal_protein_bias: self.meal_protein_bias,
            dinner_fat_bias: self.dinner_fat_bias,
            final_protein_boost: self.final_protein_boost,
            final_fat_damping: self.final_fat_damping,
            ..SolverPolicy::default()
        }
    }

    /// Generate random knobs within the given ranges.
    pub fn random(rng: &mut impl Rng, ranges: &KnobRanges) -> Self {
        let mut sample = |range: (f64, f64)| rng.gen_range(range.0..=range.1);
        Self {
            max_step_grams: sample(ranges.max_step_grams),
            intensity_step: sample(ranges.intensity_step),
            correction_min: sample(ranges.correction_min),
            correction_max: sample(ranges.correction_max),
            meal_protein_bias: sample(ranges.meal_protein_bias),
            dinner_fat_bias: sample(ranges.dinner_fat_bias),
            final_protein_boost: sample(ranges.final_protein_boost),
            final_fat_damping: sample(ranges.final_fat_damping),
        }
    }

    /// Format knobs as a compact string for display.
    pub fn display(&self) -> String {
        format!(
            "step={:.1} int={:.3} cmin={:.3} cmax={:.3} pb={:.3} fb={:.3} fpb={:.3} ffd={:.3}",
            self.max_step_grams,
            self.intensity_step,
            self.correction_min,
            self.correction_max,
            self.meal_protein_bias,
            self.dinner_fat_bias,
            self.final_protein_boost,
            self.final_fat_damping
        )
    }

    /// Create a copy with one knob multiplied by a factor, clamped to its range.
    ///
    /// `knob_idx` follows field order: 0=max_step_grams, 1=intensity_step,
    /// 2=correction_min, 3=correction_max, 4=meal_protein_bias,
    /// 5=dinner_fat_bias, 6=final_protein_boost, 7=final_fat_damping.
    pub fn perturb(&self, knob_idx: usize, factor: f64, ranges: &KnobRanges) -> Self {
        let mut new = self.clone();
        let (value, range) = match knob_idx {
            0 => (&mut new.max_step_grams, ranges.max_step_grams),
            1 => (&mut new.intensity_step, ranges.intensity_step),
            2 => (&mut new.correction_min, ranges.correction_min),
            3 => (&mut new.correction_max, ranges.correction_max),
            4 => (&mut new.meal_protein_bias, ranges.meal_protein_bias),
            5 => (&mut new.dinner_fat_bias, ranges.dinner_fat_bias),
            6 => (&mut new.final_protein_boost, ranges.final_protein_boost),
            7 => (&mut new.final_fat_damping, ranges.final_fat_damping),
            _ => return new,
        };
        *value = (*value * factor).clamp(range.0, range.1);
        new
    }
}

/// Min/max ranges for each tunable knob.
#[derive(Debug, Clone)]
pub struct KnobRanges {
    pub max_step_grams: (f64, f64),
    pub intensity_step: (f64, f64),
    /// Kept at or below 1 so the bias can always shrink a target.
    pub correction_min: (f64, f64),
    /// Kept at or above 1 so the bias can always grow a target.
    pub correction_max: (f64, f64),
    pub meal_protein_bias: (f64, f64),
    pub dinner_fat_bias: (f64, f64),
    pub final_protein_boost: (f64, f64),
    pub final_fat_damping: (f64, f64),
}

impl Default for KnobRanges {
    fn default() -> Self {
        Self {
            max_step_grams: (5.0, 40.0),
            intensity_step: (0.0, 0.5),
            correction_min: (0.6, 1.0),
            correction_max: (1.0, 1.4),
            meal_protein_bias: (0.8, 1.4),
            dinner_fat_bias: (0.6, 1.2),
            final_protein_boost: (1.0, 1.3),
            final_fat_damping: (0.7, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_knobs_match_policy() {
        let knobs = PolicyKnobs::default();
        assert_eq!(knobs.max_step_grams, 20.0);
        assert_eq!(knobs.correction_min, 0.8);
        assert_eq!(knobs.correction_max, 1.1);
        assert_eq!(knobs.to_policy(), SolverPolicy::default());
    }

    #[test]
    fn test_random_knobs_within_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let ranges = KnobRanges::default();
        for _ in 0..20 {
            let knobs = PolicyKnobs::random(&mut rng, &ranges);
            assert!(knobs.max_step_grams >= ranges.max_step_grams.0);
            assert!(knobs.max_step_grams <= ranges.max_step_grams.1);
            assert!(knobs.correction_min <= 1.0);
            assert!(knobs.correction_max >= 1.0);
            assert!(knobs.final_fat_damping >= ranges.final_fat_damping.0);
            assert!(knobs.final_fat_damping <= ranges.final_fat_damping.1);
        }
    }

    #[test]
    fn test_same_seed_same_knobs() {
        let ranges = KnobRanges::default();
        let a = PolicyKnobs::random(&mut StdRng::seed_from_u64(7), &ranges);
        let b = PolicyKnobs::random(&mut StdRng::seed_from_u64(7), &ranges);
        assert_eq!(a, b);
    }

    #[test]
    fn test_perturb_modifies_single_knob() {
        let knobs = PolicyKnobs::default();
        let ranges = KnobRanges::default();

        let perturbed = knobs.perturb(0, 1.1, &ranges);
        assert!((perturbed.max_step_grams - 22.0).abs() < 0.001);
        assert_eq!(perturbed.intensity_step, knobs.intensity_step);
        assert_eq!(perturbed.final_fat_damping, knobs.final_fat_damping);
    }

    #[test]
    fn test_perturb_clamps_to_range() {
        let knobs = PolicyKnobs::default();
        let ranges = KnobRanges::default();

        // 1.1 * 1.5 = 1.65 exceeds the 1.4 ceiling
        let perturbed = knobs.perturb(3, 1.5, &ranges);
        assert_eq!(perturbed.correction_max, 1.4);

        // Unknown index leaves knobs unchanged
        assert_eq!(knobs.perturb(99, 2.0, &ranges), knobs);
    }
}
