use std::cmp::Ordering;

use crate::catalog::FoodCatalog;
use crate::error::Result;
use crate::models::{ActiveMeal, DailyGoals};
use crate::planner::calculations::relative_deviation;
use crate::planner::engine::{generate_day_plan, PlanRequest};
use crate::planner::templates::{default_meal_plan, MealTemplates};
use crate::tuner::knobs::{KnobRanges, PolicyKnobs};

/// One day profile the tuner plans for.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub goals: DailyGoals,
    pub meals: Vec<ActiveMeal>,
}

/// Goal profiles crossed with common meal counts.
pub fn scenario_grid() -> Vec<Scenario> {
    let profiles = [
        ("cut", 1600.0, 140.0, 140.0, 55.0),
        ("maintain", 2200.0, 150.0, 250.0, 75.0),
        ("bulk", 3000.0, 180.0, 380.0, 95.0),
    ];
    let meal_counts = [2, 3, 5];

    let mut grid = Vec::with_capacity(profiles.len() * meal_counts.len());
    for (name, calories, protein, carbs, fat) in profiles {
        for count in meal_counts {
            grid.push(Scenario {
                name: format!("{}-{}meals", name, count),
                goals: DailyGoals::new(calories, protein, carbs, fat, count),
                meals: default_meal_plan(count),
            });
        }
    }
    grid
}

/// Result of planning a single scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub scenario: String,
    pub weighted_deviation: f64,
    pub calorie_error: f64,
    pub protein_error: f64,
    pub iterations: usize,
}

/// Aggregated result of evaluating knobs across all scenarios.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub knobs: PolicyKnobs,
    pub avg_deviation: f64,
    pub avg_calorie_error: f64,
    pub avg_protein_error: f64,
    pub per_scenario: Vec<ScenarioResult>,
}

impl EvaluationResult {
    /// Lexicographic comparison: (avg_deviation, avg_protein_error, avg_calorie_error).
    /// Lower is better for all metrics; `Greater` means `self` is better.
    pub fn cmp_score(&self, other: &Self) -> Ordering {
        let keys = |r: &Self| [r.avg_deviation, r.avg_protein_error, r.avg_calorie_error];
        for (mine, theirs) in keys(self).into_iter().zip(keys(other)) {
            match theirs.partial_cmp(&mine) {
                Some(Ordering::Equal) | None => {}
                Some(ord) => return ord,
            }
        }
        Ordering::Equal
    }

    pub fn is_better_than(&self, other: &Self) -> bool {
        self.cmp_score(other) == Ordering::Greater
    }
}

/// Plan one scenario with a policy built from `knobs`.
pub fn evaluate_scenario(
    catalog: &FoodCatalog,
    templates: &MealTemplates,
    scenario: &Scenario,
    knobs: &PolicyKnobs,
) -> Result<ScenarioResult> {
    let policy = knobs.to_policy();
    let request = PlanRequest::new(scenario.goals, scenario.meals.clone());
    let plan = generate_day_plan(catalog, templates, &request, &policy)?;
    let summary = &plan.summary;

    Ok(ScenarioResult {
        scenario: scenario.name.clone(),
        weighted_deviation: summary.weighted_deviation,
        calorie_error: relative_deviation(summary.achieved.calories, summary.goal.calories),
        protein_error: relative_deviation(summary.achieved.protein, summary.goal.protein),
        iterations: summary.global_iterations,
    })
}

/// Evaluate knobs across every scenario.
pub fn evaluate_knobs(
    knobs: &PolicyKnobs,
    catalog: &FoodCatalog,
    templates: &MealTemplates,
    scenarios: &[Scenario],
) -> Result<EvaluationResult> {
    let per_scenario = scenarios
        .iter()
        .map(|s| evaluate_scenario(catalog, templates, s, knobs))
        .collect::<Result<Vec<_>>>()?;

    let n = per_scenario.len().max(1) as f64;
    let avg = |f: fn(&ScenarioResult) -> f64| per_scenario.iter().map(f).sum::<f64>() / n;

    Ok(EvaluationResult {
        knobs: knobs.clone(),
        avg_deviation: avg(|r| r.weighted_deviation),
        avg_calorie_error: avg(|r| r.calorie_error),
        avg_protein_error: avg(|r| r.protein_error),
        per_scenario,
    })
}

/// Coordinate hill climbing settings.
#[derive(Debug, Clone)]
pub struct HillClimbConfig {
    pub factors: Vec<f64>,
    pub max_rounds: usize,
}

impl Default for HillClimbConfig {
    fn default() -> Self {
        Self {
            factors: vec![0.9, 1.1],
            max_rounds: 10,
        }
    }
}

/// Refine a result by nudging one knob at a time, keeping strict improvements.
pub fn hill_climb(
    start: &EvaluationResult,
    catalog: &FoodCatalog,
    templates: &MealTemplates,
    scenarios: &[Scenario],
    ranges: &KnobRanges,
    config: &HillClimbConfig,
) -> Result<EvaluationResult> {
    let mut current = start.clone();

    for _ in 0..config.max_rounds {
        let mut improved = false;
        for knob_idx in 0..PolicyKnobs::NUM_KNOBS {
            for &factor in &config.factors {
                let knobs = current.knobs.perturb(knob_idx, factor, ranges);
                if knobs == current.knobs {
                    continue;
                }
                let candidate = evaluate_knobs(&knobs, catalog, templates, scenarios)?;
                if candidate.is_better_than(&current) {
                    current = candidate;
                    improved = true;
                }
            }
        }
        if !improved {
            break;
        }
    }

    Ok(current)
}
