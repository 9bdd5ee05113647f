use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{IngredientGroup, Recipe, RecipeSession, RecipeStep};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Empty,
    Loaded,
    Cooking,
    Complete,
}

impl Default for SessionPhase {
    fn default() -> Self {
        SessionPhase::Empty
    }
}

impl SessionPhase {
    pub fn of(session: &RecipeSession) -> Self {
        if session.recipe.is_none() {
            SessionPhase::Empty
        } else if session.is_complete() {
            SessionPhase::Complete
        } else if session.current_step > 0 || session.cooking_started {
            SessionPhase::Cooking
        } else {
            SessionPhase::Loaded
        }
    }
}

/// Read-only projection the cooking view renders from.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub phase: SessionPhase,
    pub recipe: Option<Recipe>,
    pub current_step: u32,
    pub total_steps: u32,
    pub is_complete: bool,
    pub active_step: Option<RecipeStep>,
    pub cooking_started: bool,
    pub scaled_servings: Option<u32>,
    pub checked_ingredients: BTreeSet<String>,
    pub ingredient_groups: Vec<IngredientGroup>,
    pub total_time_minutes: Option<u32>,
}

impl From<&RecipeSession> for SessionView {
    fn from(session: &RecipeSession) -> Self {
        let recipe = session.recipe.as_ref();
        Self {
            phase: SessionPhase::of(session),
            recipe: recipe.cloned(),
            current_step: session.current_step,
            total_steps: session.total_steps(),
            is_complete: session.is_complete(),
            active_step: session.active_step().cloned(),
            cooking_started: session.cooking_started,
            scaled_servings: session.scaled_servings,
            checked_ingredients: session.checked_ingredients.clone(),
            ingredient_groups: recipe.map(Recipe::grouped_ingredients).unwrap_or_default(),
            total_time_minutes: recipe.and_then(Recipe::total_time_minutes),
        }
    }
}
