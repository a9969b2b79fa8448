use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{ActiveMeal, FoodCategory};

/// Composition of a meal: the meal-type tag foods must carry and the
/// category slots to fill, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealTemplate {
    pub meal_type: String,
    pub slots: Vec<FoodCategory>,
}

impl MealTemplate {
    pub fn new(meal_type: impl Into<String>, slots: Vec<FoodCategory>) -> Self {
        Self {
            meal_type: meal_type.into(),
            slots,
        }
    }
}

/// Templates keyed by meal id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MealTemplates {
    templates: HashMap<String, MealTemplate>,
}

impl MealTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, meal_id: impl Into<String>, template: MealTemplate) {
        self.templates.insert(meal_id.into(), template);
    }

    pub fn get(&self, meal_id: &str) -> Option<&MealTemplate> {
        self.templates.get(meal_id)
    }

    pub fn contains(&self, meal_id: &str) -> bool {
        self.templates.contains_key(meal_id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Fresh default templates for the canonical meals.
pub fn default_meal_templates() -> MealTemplates {
    use FoodCategory::*;

    let mut templates = MealTemplates::new();
    templates.insert("breakfast", MealTemplate::new("breakfast", vec![Carb, Protein, Dairy, Fruit]));
    templates.insert("morning_snack", MealTemplate::new("snack", vec![Dairy, Fruit]));
    templates.insert("lunch", MealTemplate::new("lunch", vec![Protein, Carb, Vegetable, Fat]));
    templates.insert("afternoon_snack", MealTemplate::new("snack", vec![Dairy, Fruit, Fat]));
    templates.insert("dinner", MealTemplate::new("dinner", vec![Protein, Carb, Vegetable, Fat]));
    templates.insert("supper", MealTemplate::new("snack", vec![Dairy, Fruit]));
    templates.insert("snack", MealTemplate::new("snack", vec![Fruit, Fat]));
    templates
}

/// Canonical meals for a daily meal count. Counts above 7 are capped.
pub fn default_meal_plan(meal_count: u32) -> Vec<ActiveMeal> {
    let ids: &[&str] = match meal_count {
        0 => &[],
        1 => &["lunch"],
        2 => &["breakfast", "dinner"],
        3 => &["breakfast", "lunch", "dinner"],
        4 => &["breakfast", "lunch", "afternoon_snack", "dinner"],
        5 => &["breakfast", "morning_snack", "lunch", "afternoon_snack", "dinner"],
        6 => &["breakfast", "morning_snack", "lunch", "afternoon_snack", "dinner", "supper"],
        _ => &[
            "breakfast",
            "morning_snack",
            "lunch",
            "afternoon_snack",
            "dinner",
            "supper",
            "snack",
        ],
    };
    ids.iter().map(|id| ActiveMeal::canonical(id)).collect()
}
