use std::path::Path;

use crate::catalog::save_policy;
use crate::error::Result;
use crate::tuner::evaluation::EvaluationResult;

/// Write all results to a CSV file.
pub fn write_csv(results: &[EvaluationResult], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "rank",
        "max_step_grams",
        "intensity_step",
        "correction_min",
        "correction_max",
        "meal_protein_bias",
        "dinner_fat_bias",
        "final_protein_boost",
        "final_fat_damping",
        "avg_deviation",
        "avg_calorie_error",
        "avg_protein_error",
    ])?;

    for (i, result) in results.iter().enumerate() {
        let k = &result.knobs;
        wtr.write_record([
            (i + 1).to_string(),
            format!("{:.1}", k.max_step_grams),
            format!("{:.3}", k.intensity_step),
            format!("{:.3}", k.correction_min),
            format!("{:.3}", k.correction_max),
            format!("{:.3}", k.meal_protein_bias),
            format!("{:.3}", k.dinner_fat_bias),
            format!("{:.3}", k.final_protein_boost),
            format!("{:.3}", k.final_fat_damping),
            format!("{:.2}", result.avg_deviation),
            format!("{:.4}", result.avg_calorie_error),
            format!("{:.4}", result.avg_protein_error),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the best result as a complete solver policy, loadable with `plan --policy`.
pub fn write_best_policy(best: &EvaluationResult, path: &Path) -> Result<()> {
    save_policy(path, &best.knobs.to_policy())
}

/// Print top-k results to stdout.
pub fn print_topk(results: &[EvaluationResult], k: usize) {
    println!("\n=== Top {} Results (by deviation) ===\n", k.min(results.len()));

    for (i, result) in results.iter().take(k).enumerate() {
        println!(
            "#{}: deviation={:.1} kcal_err={:.2}% protein_err={:.2}%",
            i + 1,
            result.avg_deviation,
            result.avg_calorie_error * 100.0,
            result.avg_protein_error * 100.0
        );
        println!("    {}", result.knobs.display());
        println!();
    }
}
