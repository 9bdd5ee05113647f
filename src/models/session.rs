use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::recipe::{Recipe, RecipeStep};

/// Shared state between the cooking view and the agent. Whole-value
/// replacement is the only way external updates land.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct RecipeSession {
    pub document_text: Option<String>,
    pub recipe: Option<Recipe>,
    /// 0-based index of the step being worked on; equal to the step count
    /// once every step is done.
    pub current_step: u32,
    pub scaled_servings: Option<u32>,
    pub checked_ingredients: BTreeSet<String>,
    pub cooking_started: bool,
}

impl RecipeSession {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_recipe(recipe: Recipe) -> Self {
        Self {
            document_text: recipe.source_text.clone(),
            recipe: Some(recipe),
            ..Self::default()
        }
    }

    pub fn total_steps(&self) -> u32 {
        self.recipe
            .as_ref()
            .map(|recipe| recipe.steps.len() as u32)
            .unwrap_or(0)
    }

    pub fn is_complete(&self) -> bool {
        self.recipe.is_some() && self.current_step >= self.total_steps()
    }

    pub fn active_step(&self) -> Option<&RecipeStep> {
        self.recipe
            .as_ref()
            .and_then(|recipe| recipe.steps.get(self.current_step as usize))
    }

    /// Context block the agent is primed with on every run.
    pub fn agent_summary(&self) -> Option<String> {
        let recipe = self.recipe.as_ref()?;
        let mut summary = format!("CURRENT RECIPE: {}", recipe.title);
        summary.push_str(&format!("\nServings: {}", recipe.servings));
        if let Some(original) = recipe.original_servings {
            summary.push_str(&format!(" (originally {original})"));
        }
        summary.push_str(&format!("\nIngredients: {}", recipe.ingredients.len()));
        summary.push_str(&format!("\nSteps: {}", recipe.steps.len()));
        summary.push_str(&format!("\nCurrent step: {}", self.current_step));
        Some(summary)
    }
}
