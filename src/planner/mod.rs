pub mod adjust;
pub mod allocation;
pub mod calculations;
pub mod constants;
pub mod engine;
pub mod normalize;
pub mod policy;
pub mod reconcile;
pub mod solver;
pub mod templates;

pub use adjust::{calorie_equivalent_portion, portion_for_macro, substitute_portion};
pub use allocation::{allocate_meal_targets, default_weights, resolve_weights, MealWeights};
pub use calculations::{
    calories_from_macros, max_macro_deviation, relative_deviation, round_portion, snap_units,
    weighted_deviation,
};
pub use engine::{generate_day_plan, select_candidates, PlanRequest};
pub use normalize::{largest_remainder, normalize_percentages, normalize_to_total};
pub use policy::SolverPolicy;
pub use reconcile::{reconcile, MealInput, Reconciliation};
pub use solver::{solve_meal, MealSolution, SolveBias};
pub use templates::{default_meal_plan, default_meal_templates, MealTemplate, MealTemplates};
