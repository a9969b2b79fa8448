use std::str::FromStr;

use dialoguer::{Confirm, Input, MultiSelect, Select};

use crate::catalog::FoodCatalog;
use crate::error::{PlannerError, Result};
use crate::models::{ActiveMeal, DailyGoals, FoodItem, Nutrient, Suggestion};
use crate::planner::constants::CANONICAL_MEAL_NAMES;
use crate::planner::templates::default_meal_plan;

/// Canonical meal ids in the order they occur during a day.
const MEAL_ORDER: [&str; 7] = [
    "breakfast",
    "morning_snack",
    "lunch",
    "afternoon_snack",
    "dinner",
    "supper",
    "snack",
];

/// One change the user can make to a suggestion item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    SetGrams,
    SetUnits,
    Substitute,
    HitMacroTarget,
    Back,
}

impl EditAction {
    const ALL: [EditAction; 5] = [
        EditAction::SetGrams,
        EditAction::SetUnits,
        EditAction::Substitute,
        EditAction::HitMacroTarget,
        EditAction::Back,
    ];

    fn label(self) -> &'static str {
        match self {
            EditAction::SetGrams => "Set portion in grams",
            EditAction::SetUnits => "Set portion in units",
            EditAction::Substitute => "Substitute another food",
            EditAction::HitMacroTarget => "Size for a macro target",
            EditAction::Back => "Back",
        }
    }
}

/// Prompt for a non-negative number.
pub fn prompt_number(prompt: &str, default: Option<f64>) -> Result<f64> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(d) = default {
        input = input.default(format!("{}", d));
    }
    let text = input.interact_text()?;

    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| PlannerError::InvalidInput(format!("Invalid number '{}'", text.trim())))?;
    if !value.is_finite() || value < 0.0 {
        return Err(PlannerError::InvalidInput(format!("{} must be >= 0", prompt)));
    }
    Ok(value)
}

/// Fill in whichever daily goals were not given on the command line.
pub fn prompt_daily_goals(
    calories: Option<f64>,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    meal_count: u32,
) -> Result<DailyGoals> {
    let ask = |value: Option<f64>, prompt: &str, default: f64| match value {
        Some(v) => Ok(v),
        None => prompt_number(prompt, Some(default)),
    };

    Ok(DailyGoals::new(
        ask(calories, "Daily calories (kcal)", 2000.0)?,
        ask(protein, "Daily protein (g)", 150.0)?,
        ask(carbs, "Daily carbohydrate (g)", 200.0)?,
        ask(fat, "Daily fat (g)", 70.0)?,
        meal_count,
    ))
}

/// Let the user tick which canonical meals they eat.
pub fn prompt_meals(default_count: u32) -> Result<Vec<ActiveMeal>> {
    let defaults: Vec<String> = default_meal_plan(default_count)
        .into_iter()
        .map(|m| m.id)
        .collect();
    let labels: Vec<&str> = MEAL_ORDER
        .iter()
        .map(|id| CANONICAL_MEAL_NAMES.get(id).copied().unwrap_or(*id))
        .collect();
    let checked: Vec<bool> = MEAL_ORDER
        .iter()
        .map(|id| defaults.iter().any(|d| d == id))
        .collect();

    let picked = MultiSelect::new()
        .with_prompt("Which meals do you eat? (space to toggle)")
        .items(&labels)
        .defaults(&checked)
        .interact()?;

    Ok(picked
        .into_iter()
        .map(|i| ActiveMeal::canonical(MEAL_ORDER[i]))
        .collect())
}

/// Find a catalog food by (fuzzy) name.
pub fn pick_food<'a>(catalog: &'a FoodCatalog) -> Result<Option<&'a FoodItem>> {
    let input: String = Input::new()
        .with_prompt("Food name (or press Enter to cancel)")
        .allow_empty(true)
        .interact_text()?;

    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let candidates = catalog.search_by_name(input);
    match candidates.as_slice() {
        [] => {
            println!("No matching food found for '{}'", input);
            Ok(None)
        }
        [only] => {
            if only.name().eq_ignore_ascii_case(input) || only.id() == input {
                return Ok(Some(*only));
            }
            let confirm = Confirm::new()
                .with_prompt(format!("Did you mean '{}'?", only.name()))
                .default(true)
                .interact()?;
            Ok(confirm.then_some(*only))
        }
        many => {
            let shown: Vec<&FoodItem> = many.iter().take(5).copied().collect();
            let mut options: Vec<String> = shown.iter().map(|f| f.name().to_string()).collect();
            options.push("None of these".to_string());

            let selection = Select::new()
                .with_prompt("Which did you mean?")
                .items(&options)
                .default(0)
                .interact()?;
            Ok(shown.get(selection).copied())
        }
    }
}

/// Pick a meal to edit; `None` when the user is done.
pub fn prompt_meal_choice(suggestions: &[Suggestion]) -> Result<Option<usize>> {
    let mut options: Vec<String> = suggestions
        .iter()
        .map(|s| format!("{} ({})", s.meal_name, s.totals))
        .collect();
    options.push("Done".to_string());

    let selection = Select::new()
        .with_prompt("Adjust which meal?")
        .items(&options)
        .default(options.len() - 1)
        .interact()?;
    Ok((selection < suggestions.len()).then_some(selection))
}

/// Pick an item of a suggestion; `None` to go back.
pub fn prompt_item_choice(suggestion: &Suggestion) -> Result<Option<usize>> {
    let mut options: Vec<String> = suggestion
        .items
        .iter()
        .map(|a| format!("{} {:.1}g", a.food.name(), a.portion))
        .collect();
    options.push("Back".to_string());

    let selection = Select::new()
        .with_prompt("Which item?")
        .items(&options)
        .default(0)
        .interact()?;
    Ok((selection < suggestion.items.len()).then_some(selection))
}

pub fn prompt_edit_action() -> Result<EditAction> {
    let labels: Vec<&str> = EditAction::ALL.iter().map(|a| a.label()).collect();
    let selection = Select::new()
        .with_prompt("What would you like to change?")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(EditAction::ALL
        .get(selection)
        .copied()
        .unwrap_or(EditAction::Back))
}

/// Prompt for a nutrient and the amount to hit.
pub fn prompt_macro_target() -> Result<(Nutrient, f64)> {
    let options = ["protein", "carbs", "fat"];
    let selection = Select::new()
        .with_prompt("Which macro?")
        .items(&options)
        .default(0)
        .interact()?;
    let nutrient = Nutrient::from_str(options[selection]).map_err(PlannerError::InvalidInput)?;
    let grams = prompt_number(&format!("Target {} (g)", nutrient), None)?;
    Ok((nutrient, grams))
}

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}
