//! Serving-size scaling.
//!
//! Every scale computes from the recipe's original serving count and each
//! ingredient's original quantity, so chaining scales never compounds
//! rounding: `scale(scale(r, a), b)` has the same quantities as `scale(r, b)`.

pub mod rounding;

pub use rounding::{round_quantity, scale_quantity, MIN_QUANTITY};

use crate::models::{Ingredient, Recipe};

/// Rescale `recipe` to `target_servings`. Callers clamp the target to at
/// least 1 beforehand; a recipe with zero servings, or one already at the
/// target, is returned unchanged.
pub fn scale(recipe: &Recipe, target_servings: u32) -> Recipe {
    if recipe.servings == 0 || recipe.servings == target_servings {
        return recipe.clone();
    }

    let baseline_servings = recipe.baseline_servings();
    if baseline_servings == 0 {
        return recipe.clone();
    }

    let ingredients = recipe
        .ingredients
        .iter()
        .map(|ingredient| scale_ingredient(ingredient, target_servings, baseline_servings))
        .collect();

    Recipe {
        servings: target_servings,
        original_servings: Some(baseline_servings),
        ingredients,
        ..recipe.clone()
    }
}

fn scale_ingredient(ingredient: &Ingredient, target: u32, base: u32) -> Ingredient {
    let baseline = ingredient.original_quantity.or(ingredient.quantity);
    let quantity = match baseline {
        Some(qty) if qty != 0.0 => Some(floor_at_smallest(scale_quantity(qty, target, base))),
        // "salt to taste" and friends stay unquantified.
        _ => None,
    };

    Ingredient {
        original_quantity: baseline,
        quantity,
        ..ingredient.clone()
    }
}

/// A real amount never scales away to nothing: anything that rounds to zero
/// is kept at the smallest representable quantity.
fn floor_at_smallest(scaled: f64) -> f64 {
    if scaled == 0.0 {
        MIN_QUANTITY
    } else {
        scaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IngredientCategory, RecipeStep};
    use pretty_assertions::assert_eq;

    fn baking_recipe() -> Recipe {
        Recipe {
            title: "Cake".into(),
            servings: 2,
            ingredients: vec![
                Ingredient::new("flour", Some(4.0), Some("cups")).with_category(IngredientCategory::Pantry),
                Ingredient::new("sugar", Some(2.0), Some("cups")).with_category(IngredientCategory::Pantry),
                Ingredient::new("salt", None, None).with_category(IngredientCategory::Spice),
                Ingredient::new("vanilla", Some(0.125), Some("tsp")),
            ],
            steps: vec![RecipeStep::new(1, "Mix"), RecipeStep::new(2, "Bake")],
            ..Recipe::default()
        }
    }

    fn quantities(recipe: &Recipe) -> Vec<Option<f64>> {
        recipe.ingredients.iter().map(|i| i.quantity).collect()
    }

    #[test]
    fn test_doubling_doubles_quantities() {
        let scaled = scale(&baking_recipe(), 4);
        assert_eq!(scaled.servings, 4);
        assert_eq!(scaled.original_servings, Some(2));
        assert_eq!(scaled.ingredients[0].quantity, Some(8.0));
        assert_eq!(scaled.ingredients[1].quantity, Some(4.0));
        assert_eq!(scaled.ingredients[0].original_quantity, Some(4.0));
        assert_eq!(scaled.ingredients[0].unit.as_deref(), Some("cups"));
    }

    #[test]
    fn test_grams_scale_from_single_serving() {
        let recipe = Recipe {
            title: "Chicken".into(),
            servings: 1,
            ingredients: vec![Ingredient::new("chicken", Some(500.0), Some("g"))],
            ..Recipe::default()
        };
        let scaled = scale(&recipe, 3);
        assert_eq!(scaled.ingredients[0].quantity, Some(1500.0));
        assert_eq!(scaled.ingredients[0].unit.as_deref(), Some("g"));
    }

    #[test]
    fn test_same_servings_is_identity() {
        let recipe = baking_recipe();
        assert_eq!(scale(&recipe, 2), recipe);
    }

    #[test]
    fn test_zero_servings_is_identity() {
        let recipe = Recipe {
            servings: 0,
            ..baking_recipe()
        };
        assert_eq!(scale(&recipe, 5), recipe);
    }

    #[test]
    fn test_unquantified_ingredients_stay_null() {
        let mut recipe = baking_recipe();
        recipe.ingredients.push(Ingredient::new("pepper", Some(0.0), None));

        for target in [1, 3, 7, 12] {
            let scaled = scale(&recipe, target);
            assert_eq!(scaled.ingredients[2].quantity, None);
            assert_eq!(scaled.ingredients[4].quantity, None);
        }
    }

    #[test]
    fn test_chained_scaling_anchors_to_original() {
        let recipe = baking_recipe();
        for (first, second) in [(3, 5), (7, 2), (1, 9), (5, 3)] {
            let chained = scale(&scale(&recipe, first), second);
            let direct = scale(&recipe, second);
            assert_eq!(quantities(&chained), quantities(&direct));
            assert_eq!(chained.original_servings, Some(2));
        }
    }

    #[test]
    fn test_original_quantity_is_never_overwritten() {
        let once = scale(&baking_recipe(), 3);
        let twice = scale(&once, 5);
        let thrice = scale(&twice, 1);
        assert_eq!(thrice.ingredients[3].original_quantity, Some(0.125));
        assert_eq!(thrice.ingredients[0].original_quantity, Some(4.0));
    }

    #[test]
    fn test_returning_to_baseline_reapplies_rounding() {
        // 0.125 tsp at the original count rounds to 0.13 once a scale runs.
        let round_trip = scale(&scale(&baking_recipe(), 4), 2);
        assert_eq!(round_trip.ingredients[3].quantity, Some(0.13));
        assert_eq!(round_trip.ingredients[0].quantity, Some(4.0));
    }

    #[test]
    fn test_tiny_amounts_never_scale_to_zero() {
        let recipe = Recipe {
            title: "Paella".into(),
            servings: 4,
            ingredients: vec![Ingredient::new("saffron", Some(0.01), Some("g"))],
            steps: vec![RecipeStep::new(1, "Bloom the saffron")],
            ..Recipe::default()
        };

        let scaled = scale(&recipe, 1);
        assert_eq!(scaled.ingredients[0].quantity, Some(MIN_QUANTITY));
        assert_eq!(scaled.ingredients[0].original_quantity, Some(0.01));
        assert_eq!(crate::models::validate_recipe(&scaled), Ok(()));

        // Back at the original count the real amount returns.
        assert_eq!(scale(&scaled, 4).ingredients[0].quantity, Some(0.01));
    }
}
