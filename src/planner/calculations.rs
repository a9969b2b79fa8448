use crate::models::{MacroTotals, Nutrient};
use crate::planner::constants::*;

/// Tolerance absorbing float noise before directed rounding.
const ROUNDING_EPSILON: f64 = 1e-9;

/// Calories implied by macro grams (4/4/9 kcal per gram).
#[inline]
pub fn calories_from_macros(protein: f64, carbs: f64, fat: f64) -> f64 {
    protein * KCAL_PER_GRAM_PROTEIN + carbs * KCAL_PER_GRAM_CARBS + fat * KCAL_PER_GRAM_FAT
}

/// Kcal-equivalent deviation between achieved and target amounts.
///
/// `|Δcalories| + |Δprotein|·4 + |Δcarbs|·4 + |Δfat|·9`
pub fn weighted_deviation(achieved: &MacroTotals, target: &MacroTotals) -> f64 {
    [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Carbs,
        Nutrient::Fat,
    ]
    .into_iter()
    .map(|n| (achieved.get(n) - target.get(n)).abs() * n.kcal_weight())
    .sum()
}

/// Relative deviation `|achieved - target| / target`; zero when the target is not positive.
pub fn relative_deviation(achieved: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    (achieved - target).abs() / target
}

/// Largest relative deviation over protein, carbs and fat.
pub fn max_macro_deviation(achieved: &MacroTotals, target: &MacroTotals) -> f64 {
    Nutrient::MACROS
        .into_iter()
        .map(|n| relative_deviation(achieved.get(n), target.get(n)))
        .fold(0.0, f64::max)
}

/// Round to the nearest multiple of `step`.
#[inline]
pub fn round_to_step(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

/// Round up to the next multiple of `step` (exact multiples stay put).
#[inline]
pub fn round_up_to_step(value: f64, step: f64) -> f64 {
    ((value / step) - ROUNDING_EPSILON).ceil() * step
}

/// Round down to the previous multiple of `step` (exact multiples stay put).
#[inline]
pub fn round_down_to_step(value: f64, step: f64) -> f64 {
    ((value / step) + ROUNDING_EPSILON).floor() * step
}

/// Round a gram portion by size band.
///
/// Below 10 g: nearest 0.5 g. Below 50 g: nearest gram. Otherwise nearest 5 g.
pub fn round_portion(grams: f64) -> f64 {
    if grams < FINE_ROUNDING_LIMIT {
        round_to_step(grams, FINE_ROUNDING_STEP)
    } else if grams < MEDIUM_ROUNDING_LIMIT {
        round_to_step(grams, MEDIUM_ROUNDING_STEP)
    } else {
        round_to_step(grams, COARSE_ROUNDING_STEP)
    }
}

/// Snap a unit count to the nearest half unit.
#[inline]
pub fn snap_units(units: f64) -> f64 {
    round_to_step(units, UNIT_QUANTUM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calories_from_macros() {
        assert!((calories_from_macros(10.0, 20.0, 5.0) - 165.0).abs() < 1e-9);
        assert_eq!(calories_from_macros(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_weighted_deviation_weights() {
        let target = MacroTotals::new(500.0, 30.0, 50.0, 20.0);
        let achieved = MacroTotals::new(510.0, 28.0, 51.0, 19.0);
        // 10 + 2*4 + 1*4 + 1*9
        assert!((weighted_deviation(&achieved, &target) - 31.0).abs() < 1e-9);
        assert_eq!(weighted_deviation(&target, &target), 0.0);
    }

    #[test]
    fn test_relative_deviation() {
        assert!((relative_deviation(90.0, 100.0) - 0.1).abs() < 1e-9);
        assert!((relative_deviation(110.0, 100.0) - 0.1).abs() < 1e-9);
        assert_eq!(relative_deviation(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_round_portion_bands() {
        assert_eq!(round_portion(7.3), 7.5);
        assert_eq!(round_portion(7.2), 7.0);
        assert_eq!(round_portion(23.4), 23.0);
        assert_eq!(round_portion(49.6), 50.0);
        assert_eq!(round_portion(52.4), 50.0);
        assert_eq!(round_portion(157.6), 160.0);
    }

    #[test]
    fn test_directed_rounding() {
        assert_eq!(round_up_to_step(157.5, 5.0), 160.0);
        assert_eq!(round_up_to_step(150.0, 5.0), 150.0);
        assert_eq!(round_up_to_step(150.0000000001, 5.0), 150.0);
        assert_eq!(round_down_to_step(14.9, 5.0), 10.0);
        assert_eq!(round_down_to_step(15.0, 5.0), 15.0);
    }

    #[test]
    fn test_snap_units() {
        assert_eq!(snap_units(3.4), 3.5);
        assert_eq!(snap_units(3.2), 3.0);
        assert_eq!(snap_units(0.76), 1.0);
    }
}
