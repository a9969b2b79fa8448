pub mod food;
pub mod meal;
pub mod nutrients;
pub mod plan;

pub use food::{
    AnimalSource, Diet, FoodCategory, FoodItem, GRAM_UNIT, PortionArchetype, PortionLimits,
};
pub use meal::{ActiveMeal, CustomMealShare, DailyGoals, MacroRatio, MealTarget};
pub use nutrients::{DominantMacro, MacroTotals, Nutrient, NutrientProfile};
pub use plan::{DayPlan, DaySummary, PortionAssignment, Suggestion};
