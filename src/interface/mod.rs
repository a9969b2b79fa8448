pub mod prompts;
pub mod render;

pub use prompts::{
    pick_food, prompt_daily_goals, prompt_edit_action, prompt_item_choice, prompt_macro_target,
    prompt_meal_choice, prompt_meals, prompt_number, prompt_yes_no, EditAction,
};
pub use render::{
    display_day_plan, display_food_list, display_suggestion, display_suggestions, display_targets,
};
