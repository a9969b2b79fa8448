use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::models::Diet;

/// Meal portion planner: splits daily macro goals across meals and sizes food portions to match.
#[derive(Parser, Debug)]
#[command(name = "meal_planner")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the food catalog JSON file.
    #[arg(short, long, global = true, default_value = "data/catalog.json")]
    pub catalog: PathBuf,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Daily goals and meal selection shared by `plan` and `targets`.
#[derive(Args, Debug, Clone, Default)]
pub struct GoalArgs {
    /// Daily calories (kcal). Prompted when absent.
    #[arg(long)]
    pub calories: Option<f64>,

    /// Daily protein (g). Prompted when absent.
    #[arg(long)]
    pub protein: Option<f64>,

    /// Daily carbohydrate (g). Prompted when absent.
    #[arg(long)]
    pub carbs: Option<f64>,

    /// Daily fat (g). Prompted when absent.
    #[arg(long)]
    pub fat: Option<f64>,

    /// Comma-separated meal ids, e.g. breakfast,lunch,dinner.
    #[arg(long, value_delimiter = ',')]
    pub meals: Vec<String>,

    /// Use the default meals for this many meals per day (1-7).
    #[arg(long)]
    pub meal_count: Option<u32>,

    /// Custom meal shares JSON file.
    #[arg(long)]
    pub shares: Option<PathBuf>,

    /// Solver policy JSON file (e.g. written by the tuner).
    #[arg(long)]
    pub policy: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Plan portions for every meal of the day.
    Plan {
        #[command(flatten)]
        goals: GoalArgs,

        /// Dietary pattern: omnivore, pescatarian, vegetarian or vegan.
        #[arg(long, default_value_t = Diet::Omnivore)]
        diet: Diet,

        /// Write the plan as JSON.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Adjust portions interactively after planning.
        #[arg(long)]
        edit: bool,
    },

    /// Show the per-meal target table only.
    Targets {
        #[command(flatten)]
        goals: GoalArgs,
    },

    /// List catalog foods.
    Foods {
        /// Only foods compatible with this meal type.
        #[arg(long)]
        meal_type: Option<String>,

        /// Only foods allowed by this diet.
        #[arg(long)]
        diet: Option<Diet>,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Plan {
            goals: GoalArgs::default(),
            diet: Diet::Omnivore,
            output: None,
            edit: false,
        }
    }
}
