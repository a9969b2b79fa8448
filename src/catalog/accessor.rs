use std::collections::HashMap;

use strsim::jaro_winkler;

use crate::error::{PlannerError, Result};
use crate::models::{Diet, FoodCategory, FoodItem};
use crate::planner::adjust::calorie_equivalent_portion;
use crate::planner::constants::NAME_MATCH_THRESHOLD;

/// Read-only view over the food catalog, in load order.
#[derive(Debug, Clone, Default)]
pub struct FoodCatalog {
    foods: Vec<FoodItem>,
    index: HashMap<String, usize>,
}

impl FoodCatalog {
    /// Build a catalog, deduplicating by id.
    ///
    /// A later record replaces an earlier one but keeps its position.
    pub fn new(foods: Vec<FoodItem>) -> Self {
        let mut catalog = Self::default();
        for food in foods {
            match catalog.index.get(food.id()) {
                Some(&pos) => catalog.foods[pos] = food,
                None => {
                    catalog.index.insert(food.id().to_string(), catalog.foods.len());
                    catalog.foods.push(food);
                }
            }
        }
        catalog
    }

    pub fn get(&self, id: &str) -> Option<&FoodItem> {
        self.index.get(id).map(|&i| &self.foods[i])
    }

    pub fn require(&self, id: &str) -> Result<&FoodItem> {
        self.get(id)
            .ok_or_else(|| PlannerError::FoodNotFound(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FoodItem> {
        self.foods.iter()
    }

    pub fn foods(&self) -> &[FoodItem] {
        &self.foods
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    /// Foods compatible with a meal type; untagged foods fit every meal type.
    pub fn by_meal_type(&self, meal_type: &str) -> Vec<&FoodItem> {
        self.foods
            .iter()
            .filter(|f| f.fits_meal_type(meal_type))
            .collect()
    }

    pub fn by_diet(&self, diet: Diet) -> Vec<&FoodItem> {
        self.foods
            .iter()
            .filter(|f| diet.allows(f.animal_source()))
            .collect()
    }

    pub fn by_category(&self, category: FoodCategory) -> Vec<&FoodItem> {
        self.foods
            .iter()
            .filter(|f| f.category() == category)
            .collect()
    }

    /// Listed substitutes of a food that exist in the catalog, in listed order.
    pub fn substitutes_for(&self, id: &str) -> Result<Vec<&FoodItem>> {
        let food = self.require(id)?;
        Ok(food
            .substitutes()
            .iter()
            .filter_map(|sub| self.get(sub))
            .collect())
    }

    /// First substitute of `id` allowed by `diet` and compatible with `meal_type`.
    pub fn resolve_substitute(&self, id: &str, diet: Diet, meal_type: &str) -> Result<Option<&FoodItem>> {
        Ok(self
            .substitutes_for(id)?
            .into_iter()
            .find(|f| diet.allows(f.animal_source()) && f.fits_meal_type(meal_type)))
    }

    /// Portion of `to` with the calories of `grams` of `from`.
    pub fn equivalent_portion(&self, from: &str, grams: f64, to: &str) -> Result<f64> {
        let original = self.require(from)?;
        let replacement = self.require(to)?;
        Ok(calorie_equivalent_portion(original, grams, replacement))
    }

    /// Foods whose name resembles `query`, best match first.
    ///
    /// An exact (case-insensitive) name or id match is returned alone.
    pub fn search_by_name(&self, query: &str) -> Vec<&FoodItem> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        if let Some(food) = self
            .foods
            .iter()
            .find(|f| f.name().to_lowercase() == query || f.id() == query)
        {
            return vec![food];
        }

        let mut candidates: Vec<(&FoodItem, f64)> = self
            .foods
            .iter()
            .map(|f| (f, jaro_winkler(&f.name().to_lowercase(), &query)))
            .filter(|(_, score)| *score > NAME_MATCH_THRESHOLD)
            .collect();

        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        candidates.into_iter().map(|(f, _)| f).collect()
    }
}
