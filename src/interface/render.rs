use crate::models::{DayPlan, DaySummary, FoodItem, MealTarget, Suggestion};
use crate::planner::calculations::relative_deviation;

/// Display the per-meal target table.
pub fn display_targets(targets: &[MealTarget]) {
    if targets.is_empty() {
        println!("No targets (daily goals incomplete or no meals selected).");
        return;
    }

    println!();
    println!("=== Meal Targets ===");
    println!();

    let max_name_len = targets.iter().map(|t| t.meal_name.len()).max().unwrap_or(10);

    for target in targets {
        println!(
            "  {:<width$} {:>3}%  {:>5.0} kcal | P:{:>6.1}g C:{:>6.1}g F:{:>5.1}g",
            target.meal_name,
            target.percentage_of_daily_total,
            target.target.calories,
            target.target.protein,
            target.target.carbs,
            target.target.fat,
            width = max_name_len
        );
    }
    println!();
}

/// Display one meal's portions.
pub fn display_suggestion(suggestion: &Suggestion) {
    println!("--- {} ---", suggestion.meal_name);

    let max_name_len = suggestion
        .items
        .iter()
        .map(|a| a.food.name().len())
        .max()
        .unwrap_or(10);

    for (i, item) in suggestion.items.iter().enumerate() {
        let units = match item.units {
            Some(u) => format!(" ({} {})", u, item.food.measurement_unit()),
            None => String::new(),
        };
        let totals = item.totals();
        println!(
            "{:>3}. {:<width$} {:>6.1}g{}  - {:>4.0} kcal P:{:.1} C:{:.1} F:{:.1}",
            i + 1,
            item.food.name(),
            item.portion,
            units,
            totals.calories,
            totals.protein,
            totals.carbs,
            totals.fat,
            width = max_name_len
        );
    }

    println!("     Total: {}", suggestion.totals);
    if !suggestion.rationale.is_empty() {
        println!("     {}", suggestion.rationale);
    }
    println!();
}

pub fn display_suggestions(suggestions: &[Suggestion]) {
    for suggestion in suggestions {
        display_suggestion(suggestion);
    }
}

fn display_summary(summary: &DaySummary) {
    let pct = |achieved: f64, goal: f64| relative_deviation(achieved, goal) * 100.0;

    println!("--- Day Summary ---");
    println!("Goal:     {}", summary.goal);
    println!("Achieved: {}", summary.achieved);
    println!(
        "Off by:   kcal {:.1}% | P {:.1}% | C {:.1}% | F {:.1}%",
        pct(summary.achieved.calories, summary.goal.calories),
        pct(summary.achieved.protein, summary.goal.protein),
        pct(summary.achieved.carbs, summary.goal.carbs),
        pct(summary.achieved.fat, summary.goal.fat)
    );
    println!(
        "Weighted deviation: {:.0} ({} global iterations{})",
        summary.weighted_deviation,
        summary.global_iterations,
        if summary.redistributed {
            ", redistributed"
        } else {
            ""
        }
    );
    println!();
}

/// Display a complete day plan.
pub fn display_day_plan(plan: &DayPlan) {
    if plan.is_empty() {
        println!("No plan generated (daily goals incomplete or no meals selected).");
        return;
    }

    display_targets(&plan.targets);
    println!("=== Suggested Portions ===");
    println!();
    display_suggestions(&plan.suggestions);
    display_summary(&plan.summary);
}

/// Display a simple list of foods with their details.
pub fn display_food_list(foods: &[&FoodItem], title: &str) {
    if foods.is_empty() {
        println!("{}: (none)", title);
        return;
    }

    println!();
    println!("=== {} ({} items) ===", title, foods.len());
    println!();

    for food in foods {
        let n = food.nutrients();
        let unit = match food.unit_grams() {
            Some(g) => format!(", 1 {} = {}g", food.measurement_unit(), g),
            None => String::new(),
        };
        println!(
            "  {} [{}] - {} kcal, P:{} C:{} F:{} per 100g, {:.0}-{:.0}g{}",
            food.name(),
            food.category().label(),
            n.calories,
            n.protein,
            n.carbs,
            n.fat,
            food.limits().min_grams,
            food.limits().max_grams,
            unit
        );
    }

    println!();
}
