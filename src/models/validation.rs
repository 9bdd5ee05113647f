use crate::error::ValidationError;

use super::recipe::Recipe;
use super::session::RecipeSession;

/// Reject a session that breaks any data-model invariant. Run on every
/// payload that crosses in from the agent or the upload backend.
pub fn validate_session(session: &RecipeSession) -> Result<(), ValidationError> {
    let Some(recipe) = session.recipe.as_ref() else {
        if session.current_step != 0 {
            return Err(ValidationError::ProgressWithoutRecipe {
                field: "current_step",
            });
        }
        if !session.checked_ingredients.is_empty() {
            return Err(ValidationError::ProgressWithoutRecipe {
                field: "checked_ingredients",
            });
        }
        return Ok(());
    };

    validate_recipe(recipe)?;

    let total = recipe.steps.len() as u32;
    if session.current_step > total {
        return Err(ValidationError::StepBeyondEnd {
            current: session.current_step,
            total,
        });
    }

    if session.scaled_servings == Some(0) {
        return Err(ValidationError::ZeroScaledServings);
    }

    Ok(())
}

pub fn validate_recipe(recipe: &Recipe) -> Result<(), ValidationError> {
    if recipe.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if recipe.servings == 0 {
        return Err(ValidationError::ZeroServings);
    }
    if recipe.original_servings == Some(0) {
        return Err(ValidationError::ZeroOriginalServings);
    }

    for (index, ingredient) in recipe.ingredients.iter().enumerate() {
        if ingredient.name.trim().is_empty() {
            return Err(ValidationError::EmptyIngredientName { index });
        }
        if let Some(quantity) = ingredient.quantity {
            if !quantity.is_finite() || quantity <= 0.0 {
                return Err(ValidationError::InvalidQuantity {
                    name: ingredient.name.clone(),
                    quantity,
                });
            }
        }
        if let Some(original) = ingredient.original_quantity {
            if !original.is_finite() || original < 0.0 {
                return Err(ValidationError::InvalidQuantity {
                    name: ingredient.name.clone(),
                    quantity: original,
                });
            }
        }
    }

    for (position, step) in recipe.steps.iter().enumerate() {
        let expected = position as u32 + 1;
        if step.step_number != expected {
            return Err(ValidationError::StepOutOfSequence {
                position,
                expected,
                found: step.step_number,
            });
        }
        if step.instruction.trim().is_empty() {
            return Err(ValidationError::EmptyInstruction {
                step_number: step.step_number,
            });
        }
        if let Some(minutes) = step.duration_minutes {
            if !minutes.is_finite() || minutes <= 0.0 {
                return Err(ValidationError::InvalidDuration {
                    step_number: step.step_number,
                    minutes,
                });
            }
        }
    }

    Ok(())
}
