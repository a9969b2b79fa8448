pub mod catalog;
pub mod cli;
pub mod error;
pub mod interface;
pub mod logging;
pub mod models;
pub mod planner;
pub mod tuner;

pub use catalog::FoodCatalog;
pub use error::{PlannerError, Result};
pub use models::{DayPlan, FoodItem, MealTarget, Suggestion};
pub use planner::{generate_day_plan, PlanRequest, SolverPolicy};
