use std::path::PathBuf;

use clap::Parser;

use meal_portion_planner_rs::catalog::load_catalog;
use meal_portion_planner_rs::error::Result;
use meal_portion_planner_rs::logging;
use meal_portion_planner_rs::tuner::{
    print_topk, run_tuner, write_best_policy, write_csv, HillClimbConfig, TunerConfig,
};

#[derive(Parser, Debug)]
#[command(name = "tuner")]
#[command(about = "Solver policy tuner for the meal portion planner")]
struct Args {
    /// Number of random search iterations
    #[arg(long, default_value = "200")]
    iters: usize,

    /// Random seed for reproducibility
    #[arg(long, default_value = "123")]
    seed: u64,

    /// Path to the food catalog
    #[arg(long, default_value = "data/catalog.json")]
    catalog: PathBuf,

    /// Output CSV file for all results
    #[arg(long, default_value = "tuner_results.csv")]
    csv: PathBuf,

    /// Output JSON file for the best policy
    #[arg(long, default_value = "tuner_best.json")]
    json: PathBuf,

    /// Number of top results to display
    #[arg(long, default_value = "10")]
    topk: usize,

    /// Number of leading results refined by hill climbing
    #[arg(long, default_value = "3")]
    refine_top: usize,

    /// Disable hill climbing refinement
    #[arg(long)]
    no_hill_climb: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let catalog = load_catalog(&args.catalog)?;
    println!("Loaded {} foods from {:?}", catalog.len(), args.catalog);

    let hill_climb = if args.no_hill_climb {
        None
    } else {
        Some(HillClimbConfig::default())
    };

    let config = TunerConfig {
        iterations: args.iters,
        seed: args.seed,
        refine_top: args.refine_top,
        hill_climb,
        ..TunerConfig::default()
    };

    let tuner_results = run_tuner(config, &catalog)?;
    print_topk(&tuner_results.results, args.topk);

    let best = tuner_results.best();
    let baseline = &tuner_results.baseline;

    println!("=== Comparison: Best vs Baseline ===");
    println!(
        "Baseline: deviation={:.1} kcal_err={:.2}% protein_err={:.2}%",
        baseline.avg_deviation,
        baseline.avg_calorie_error * 100.0,
        baseline.avg_protein_error * 100.0
    );
    println!(
        "Best:     deviation={:.1} kcal_err={:.2}% protein_err={:.2}%",
        best.avg_deviation,
        best.avg_calorie_error * 100.0,
        best.avg_protein_error * 100.0
    );
    println!(
        "Change:   deviation {:+.1}",
        best.avg_deviation - baseline.avg_deviation
    );
    println!();

    write_csv(&tuner_results.results, &args.csv)?;
    println!("Wrote all results to {:?}", args.csv);

    write_best_policy(best, &args.json)?;
    println!("Wrote best policy to {:?} (use with `meal_planner plan --policy`)", args.json);

    Ok(())
}
