use std::cmp::Ordering;

/// Apportion `total_units` proportionally to `weights` using the largest-remainder method.
///
/// Each entry first receives the floor of its exact quota; leftover units go
/// to the largest fractional remainders, ties to the earliest index.
/// Non-positive weights receive nothing. If no weight is positive the units
/// are spread evenly, earliest entries first.
pub fn largest_remainder(weights: &[f64], total_units: u64) -> Vec<u64> {
    let n = weights.len();
    if n == 0 {
        return Vec::new();
    }

    let positive: Vec<f64> = weights
        .iter()
        .map(|&w| if w.is_finite() && w > 0.0 { w } else { 0.0 })
        .collect();
    let sum: f64 = positive.iter().sum();

    if sum <= 0.0 {
        let base = total_units / n as u64;
        let extra = (total_units % n as u64) as usize;
        return (0..n).map(|i| base + u64::from(i < extra)).collect();
    }

    let quotas: Vec<f64> = positive
        .iter()
        .map(|w| w / sum * total_units as f64)
        .collect();
    let mut units: Vec<u64> = quotas.iter().map(|q| q.floor() as u64).collect();

    let assigned: u64 = units.iter().sum();
    let leftover = total_units.saturating_sub(assigned) as usize;

    let mut order: Vec<usize> = (0..n).filter(|&i| positive[i] > 0.0).collect();
    order.sort_by(|&a, &b| {
        let frac_a = quotas[a] - quotas[a].floor();
        let frac_b = quotas[b] - quotas[b].floor();
        frac_b
            .partial_cmp(&frac_a)
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    for &i in order.iter().take(leftover) {
        units[i] += 1;
    }

    units
}

/// Integer percentages proportional to `weights`, summing to exactly 100.
pub fn normalize_percentages(weights: &[f64]) -> Vec<u32> {
    largest_remainder(weights, 100)
        .into_iter()
        .map(|u| u as u32)
        .collect()
}

/// Values rescaled to multiples of `step` that sum to exactly `total`.
///
/// `total` is itself rounded to the nearest multiple of `step`.
pub fn normalize_to_total(values: &[f64], total: f64, step: f64) -> Vec<f64> {
    if total <= 0.0 || step <= 0.0 {
        return vec![0.0; values.len()];
    }
    let total_units = (total / step).round() as u64;
    largest_remainder(values, total_units)
        .into_iter()
        .map(|u| u as f64 * step)
        .collect()
}
