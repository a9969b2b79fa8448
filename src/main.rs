use clap::Parser;
use std::path::Path;

use tracing::{info, warn};

use meal_portion_planner_rs::catalog::{
    load_catalog, load_custom_shares, load_policy, save_day_plan, FoodCatalog,
};
use meal_portion_planner_rs::cli::{Cli, Command, GoalArgs};
use meal_portion_planner_rs::error::Result;
use meal_portion_planner_rs::interface::{
    display_day_plan, display_food_list, display_suggestion, display_targets, pick_food,
    prompt_daily_goals, prompt_edit_action, prompt_item_choice, prompt_macro_target,
    prompt_meal_choice, prompt_meals, prompt_number, prompt_yes_no, EditAction,
};
use meal_portion_planner_rs::logging;
use meal_portion_planner_rs::models::{ActiveMeal, DayPlan, Diet, Suggestion};
use meal_portion_planner_rs::planner::{
    allocate_meal_targets, default_meal_plan, default_meal_templates, generate_day_plan,
    weighted_deviation, PlanRequest, SolverPolicy,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let command = cli.command.unwrap_or_default();

    match command {
        Command::Plan {
            goals,
            diet,
            output,
            edit,
        } => cmd_plan(&cli.catalog, &goals, diet, output.as_deref(), edit),
        Command::Targets { goals } => cmd_targets(&goals),
        Command::Foods { meal_type, diet } => cmd_foods(&cli.catalog, meal_type.as_deref(), diet),
    }
}

/// Resolve the active meals from flags, prompting when neither is given.
fn resolve_meals(args: &GoalArgs) -> Result<Vec<ActiveMeal>> {
    if !args.meals.is_empty() {
        return Ok(args
            .meals
            .iter()
            .map(|id| ActiveMeal::canonical(id.trim()))
            .collect());
    }
    match args.meal_count {
        Some(count) => Ok(default_meal_plan(count)),
        None => prompt_meals(3),
    }
}

fn resolve_policy(args: &GoalArgs) -> Result<SolverPolicy> {
    match &args.policy {
        Some(path) => {
            let policy = load_policy(path)?;
            info!("Using solver policy from {}", path.display());
            Ok(policy)
        }
        None => Ok(SolverPolicy::default()),
    }
}

fn build_request(args: &GoalArgs, diet: Diet) -> Result<PlanRequest> {
    let meals = resolve_meals(args)?;
    let goals = prompt_daily_goals(
        args.calories,
        args.protein,
        args.carbs,
        args.fat,
        meals.len() as u32,
    )?;

    let mut request = PlanRequest::new(goals, meals).with_diet(diet);
    if let Some(path) = &args.shares {
        request = request.with_custom_shares(load_custom_shares(path)?);
    }
    Ok(request)
}

/// Plan portions for the day.
fn cmd_plan(
    catalog_path: &Path,
    args: &GoalArgs,
    diet: Diet,
    output: Option<&Path>,
    edit: bool,
) -> Result<()> {
    if !catalog_path.exists() {
        eprintln!("Food catalog not found: {}", catalog_path.display());
        eprintln!("Pass --catalog or run from the repository root (data/catalog.json).");
        return Ok(());
    }

    let catalog = load_catalog(catalog_path)?;
    println!("Loaded {} foods", catalog.len());

    let policy = resolve_policy(args)?;
    let request = build_request(args, diet)?;
    let templates = default_meal_templates();

    let mut plan = generate_day_plan(&catalog, &templates, &request, &policy)?;
    display_day_plan(&plan);

    if edit && !plan.is_empty() {
        edit_plan(&catalog, &mut plan, &policy)?;
    }

    if let Some(path) = output {
        if !plan.is_empty() {
            save_day_plan(path, &plan)?;
            println!("Plan saved to {}", path.display());
        } else {
            warn!("Nothing to save; plan is empty");
        }
    }

    Ok(())
}

/// Apply one edit to a suggestion, reporting errors without leaving the loop.
fn apply_edit(
    catalog: &FoodCatalog,
    suggestion: &Suggestion,
    index: usize,
    action: EditAction,
    policy: &SolverPolicy,
) -> Result<Option<Suggestion>> {
    let updated = match action {
        EditAction::SetGrams => {
            let grams = prompt_number("Portion (g)", Some(suggestion.items[index].portion))?;
            suggestion.with_portion(index, grams)?
        }
        EditAction::SetUnits => {
            let units = prompt_number("Units", suggestion.items[index].units)?;
            suggestion.with_units(index, units)?
        }
        EditAction::Substitute => match pick_food(catalog)? {
            Some(food) => suggestion.with_substitute(index, food)?,
            None => return Ok(None),
        },
        EditAction::HitMacroTarget => {
            let (nutrient, grams) = prompt_macro_target()?;
            suggestion.with_macro_target(index, nutrient, grams, policy)?
        }
        EditAction::Back => return Ok(None),
    };
    Ok(Some(updated))
}

/// Interactive adjustment loop over a generated plan.
fn edit_plan(catalog: &FoodCatalog, plan: &mut DayPlan, policy: &SolverPolicy) -> Result<()> {
    while let Some(meal) = prompt_meal_choice(&plan.suggestions)? {
        while let Some(index) = prompt_item_choice(&plan.suggestions[meal])? {
            let action = prompt_edit_action()?;
            match apply_edit(catalog, &plan.suggestions[meal], index, action, policy) {
                Ok(Some(updated)) => {
                    display_suggestion(&updated);
                    plan.suggestions[meal] = updated;
                }
                Ok(None) => {}
                Err(e) => println!("Could not apply change: {}", e),
            }
        }
    }

    plan.summary.achieved = plan.suggestions.iter().map(|s| s.totals).sum();
    plan.summary.weighted_deviation = weighted_deviation(&plan.summary.achieved, &plan.summary.goal);
    if prompt_yes_no("Show the updated plan?", true)? {
        display_day_plan(plan);
    }
    Ok(())
}

/// Print the per-meal target table.
fn cmd_targets(args: &GoalArgs) -> Result<()> {
    let policy = resolve_policy(args)?;
    let request = build_request(args, Diet::Omnivore)?;
    let targets = allocate_meal_targets(
        &request.meals,
        &request.goals,
        request.custom_shares.as_deref(),
        &policy,
    );
    display_targets(&targets);
    Ok(())
}

/// List catalog foods, optionally filtered.
fn cmd_foods(catalog_path: &Path, meal_type: Option<&str>, diet: Option<Diet>) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;

    let foods: Vec<_> = catalog
        .iter()
        .filter(|f| meal_type.is_none_or(|t| f.fits_meal_type(t)))
        .filter(|f| diet.is_none_or(|d| d.allows(f.animal_source())))
        .collect();

    let title = match (meal_type, diet) {
        (Some(t), Some(d)) => format!("Foods for {} ({})", t, d),
        (Some(t), None) => format!("Foods for {}", t),
        (None, Some(d)) => format!("Foods ({})", d),
        (None, None) => "All foods".to_string(),
    };
    display_food_list(&foods, &title);
    Ok(())
}
