use std::collections::HashSet;

use tracing::{debug, info};

use crate::catalog::FoodCatalog;
use crate::error::{PlannerError, Result};
use crate::models::{ActiveMeal, CustomMealShare, DailyGoals, DayPlan, Diet, FoodItem};
use crate::planner::allocation::allocate_meal_targets;
use crate::planner::policy::SolverPolicy;
use crate::planner::reconcile::{reconcile, MealInput};
use crate::planner::templates::{MealTemplate, MealTemplates};

/// Everything the engine needs to plan one day.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlanRequest {
    pub goals: DailyGoals,
    pub meals: Vec<ActiveMeal>,
    pub custom_shares: Option<Vec<CustomMealShare>>,
    pub diet: Diet,
}

impl PlanRequest {
    pub fn new(goals: DailyGoals, meals: Vec<ActiveMeal>) -> Self {
        Self {
            goals,
            meals,
            custom_shares: None,
            diet: Diet::default(),
        }
    }

    pub fn with_custom_shares(mut self, shares: Vec<CustomMealShare>) -> Self {
        self.custom_shares = Some(shares);
        self
    }

    pub fn with_diet(mut self, diet: Diet) -> Self {
        self.diet = diet;
        self
    }
}

/// Fill a template's slots from the catalog.
///
/// Each slot takes the first food of its category, in catalog order, that
/// fits the meal type and is not already used. A food the diet excludes is
/// replaced by its first allowed substitute. Slots with no match stay empty.
pub fn select_candidates(
    catalog: &FoodCatalog,
    template: &MealTemplate,
    diet: Diet,
) -> Result<Vec<FoodItem>> {
    let mut used: HashSet<&str> = HashSet::new();
    let mut chosen = Vec::with_capacity(template.slots.len());

    for &slot in &template.slots {
        let mut picked = None;
        for food in catalog.by_category(slot) {
            if !food.fits_meal_type(&template.meal_type) {
                continue;
            }
            let candidate = if diet.allows(food.animal_source()) {
                Some(food)
            } else {
                catalog.resolve_substitute(food.id(), diet, &template.meal_type)?
            };
            if let Some(c) = candidate.filter(|c| !used.contains(c.id())) {
                picked = Some(c);
                break;
            }
        }

        match picked {
            Some(food) => {
                used.insert(food.id());
                chosen.push(food.clone());
            }
            None => debug!("No {} food for meal type '{}'", slot.label(), template.meal_type),
        }
    }

    Ok(chosen)
}

/// Plan portions for every active meal of the day.
///
/// Incomplete goals or no active meals give an empty plan. A meal with no
/// template is an error.
pub fn generate_day_plan(
    catalog: &FoodCatalog,
    templates: &MealTemplates,
    request: &PlanRequest,
    policy: &SolverPolicy,
) -> Result<DayPlan> {
    if request.meals.is_empty() || !request.goals.is_complete() {
        debug!("Profile incomplete; returning empty plan");
        return Ok(DayPlan::empty());
    }

    let mut meal_templates = Vec::with_capacity(request.meals.len());
    for meal in &request.meals {
        let template = templates
            .get(&meal.id)
            .ok_or_else(|| PlannerError::UnknownMealConfiguration(meal.id.clone()))?;
        meal_templates.push(template);
    }

    let targets = allocate_meal_targets(
        &request.meals,
        &request.goals,
        request.custom_shares.as_deref(),
        policy,
    );

    let mut inputs = Vec::with_capacity(targets.len());
    for (target, template) in targets.iter().zip(meal_templates) {
        let candidates = select_candidates(catalog, template, request.diet)?;
        debug!(
            "{}: {} candidates [{}]",
            target.meal_id,
            candidates.len(),
            candidates.iter().map(FoodItem::id).collect::<Vec<_>>().join(", ")
        );
        inputs.push(MealInput::new(target.clone(), candidates));
    }

    let result = reconcile(&inputs, &request.goals, policy);
    info!(
        "Planned {} meals: {} (goal {}), {} global iterations",
        result.suggestions.len(),
        result.summary.achieved,
        result.summary.goal,
        result.summary.global_iterations
    );

    Ok(DayPlan {
        targets,
        suggestions: result.suggestions,
        summary: result.summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnimalSource, FoodCategory, NutrientProfile, PortionArchetype};
    use crate::planner::templates::{default_meal_plan, default_meal_templates};

    fn catalog() -> FoodCatalog {
        FoodCatalog::new(vec![
            FoodItem::new("oats", "Oats", NutrientProfile::new(389.0, 16.9, 66.3, 6.9), FoodCategory::Carb)
                .with_archetype(PortionArchetype::Starch)
                .with_meal_types(["breakfast"]),
            FoodItem::new("rice", "Rice", NutrientProfile::new(130.0, 2.7, 28.0, 0.3), FoodCategory::Carb)
                .with_archetype(PortionArchetype::Starch),
            FoodItem::new("chicken", "Chicken", NutrientProfile::new(165.0, 31.0, 0.0, 3.6), FoodCategory::Protein)
                .with_archetype(PortionArchetype::WholeProtein)
                .with_animal_source(AnimalSource::Meat)
                .with_substitutes(["tofu"]),
            FoodItem::new("tofu", "Tofu", NutrientProfile::new(144.0, 17.0, 3.0, 8.0), FoodCategory::Protein)
                .with_archetype(PortionArchetype::WholeProtein),
            FoodItem::new("broccoli", "Broccoli", NutrientProfile::new(34.0, 2.8, 6.6, 0.4), FoodCategory::Vegetable),
            FoodItem::new("olive_oil", "Olive oil", NutrientProfile::new(884.0, 0.0, 0.0, 100.0), FoodCategory::Fat)
                .with_archetype(PortionArchetype::Oil),
        ])
    }

    #[test]
    fn test_slots_take_first_unused_match() {
        let template = default_meal_templates();
        let lunch = select_candidates(&catalog(), template.get("lunch").unwrap(), Diet::Omnivore).unwrap();
        let ids: Vec<&str> = lunch.iter().map(FoodItem::id).collect();
        // Oats are breakfast-only
        assert_eq!(ids, vec!["chicken", "rice", "broccoli", "olive_oil"]);
    }

    #[test]
    fn test_diet_excluded_food_uses_substitute() {
        let template = default_meal_templates();
        let lunch = select_candidates(&catalog(), template.get("lunch").unwrap(), Diet::Vegetarian).unwrap();
        assert_eq!(lunch[0].id(), "tofu");
    }

    #[test]
    fn test_unknown_meal_is_error() {
        let request = PlanRequest::new(
            DailyGoals::new(2000.0, 150.0, 200.0, 70.0, 1),
            vec![ActiveMeal::new("brunch", "Brunch")],
        );
        let err = generate_day_plan(&catalog(), &default_meal_templates(), &request, &SolverPolicy::default());
        assert!(matches!(err, Err(PlannerError::UnknownMealConfiguration(id)) if id == "brunch"));
    }

    #[test]
    fn test_zero_goals_give_empty_plan() {
        let request = PlanRequest::new(DailyGoals::default(), default_meal_plan(3));
        let plan = generate_day_plan(&catalog(), &default_meal_templates(), &request, &SolverPolicy::default())
            .unwrap();
        assert!(plan.is_empty());
        assert!(plan.targets.is_empty());
    }

    #[test]
    fn test_plan_covers_every_meal() {
        let request = PlanRequest::new(
            DailyGoals::new(2000.0, 150.0, 200.0, 70.0, 3),
            default_meal_plan(3),
        );
        let plan = generate_day_plan(&catalog(), &default_meal_templates(), &request, &SolverPolicy::default())
            .unwrap();
        assert_eq!(plan.targets.len(), 3);
        assert_eq!(plan.suggestions.len(), 3);
        let pct: u32 = plan.targets.iter().map(|t| t.percentage_of_daily_total).sum();
        assert_eq!(pct, 100);
    }
}
