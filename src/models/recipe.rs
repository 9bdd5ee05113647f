use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum IngredientCategory {
    Produce,
    Protein,
    Dairy,
    Pantry,
    Spice,
    Other,
}

impl Default for IngredientCategory {
    fn default() -> Self {
        IngredientCategory::Other
    }
}

impl IngredientCategory {
    /// Display order for grouped ingredient lists.
    pub const ORDER: [IngredientCategory; 6] = [
        IngredientCategory::Produce,
        IngredientCategory::Protein,
        IngredientCategory::Dairy,
        IngredientCategory::Pantry,
        IngredientCategory::Spice,
        IngredientCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            IngredientCategory::Produce => "Produce",
            IngredientCategory::Protein => "Protein",
            IngredientCategory::Dairy => "Dairy",
            IngredientCategory::Pantry => "Pantry",
            IngredientCategory::Spice => "Spices",
            IngredientCategory::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    /// Quantity at the recipe's original serving count. Set by the first
    /// scale and never overwritten afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub preparation: Option<String>,
    #[serde(default)]
    pub category: IngredientCategory,
    #[serde(default)]
    pub substitutes: Vec<String>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: Option<f64>, unit: Option<&str>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: IngredientCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_preparation(mut self, preparation: &str) -> Self {
        self.preparation = Some(preparation.to_string());
        self
    }
}

/// Renders as `"2 cups flour (sifted)"`, skipping whatever is absent.
impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::with_capacity(3);
        if let Some(quantity) = self.quantity.filter(|q| *q != 0.0) {
            // f64's Display already drops trailing zeros ("2", "0.25").
            parts.push(quantity.to_string());
        }
        if let Some(unit) = self.unit.as_deref().filter(|u| !u.is_empty()) {
            parts.push(unit.to_string());
        }
        parts.push(self.name.clone());
        write!(f, "{}", parts.join(" "))?;
        if let Some(preparation) = self.preparation.as_deref().filter(|p| !p.is_empty()) {
            write!(f, " ({preparation})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RecipeStep {
    pub step_number: u32,
    pub instruction: String,
    #[serde(default)]
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub timer_label: Option<String>,
    #[serde(default)]
    pub requires_attention: bool,
    #[serde(default)]
    pub tips: Vec<String>,
}

impl RecipeStep {
    pub fn new(step_number: u32, instruction: impl Into<String>) -> Self {
        Self {
            step_number,
            instruction: instruction.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Recipe {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub servings: u32,
    #[serde(default)]
    pub original_servings: Option<u32>,
    #[serde(default)]
    pub prep_time_minutes: Option<u32>,
    #[serde(default)]
    pub cook_time_minutes: Option<u32>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub dietary_tags: BTreeSet<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<RecipeStep>,
    #[serde(default)]
    pub source_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngredientGroup {
    pub category: IngredientCategory,
    pub label: &'static str,
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Baseline used by scaling; falls back to the current servings.
    pub fn baseline_servings(&self) -> u32 {
        self.original_servings.unwrap_or(self.servings)
    }

    pub fn total_time_minutes(&self) -> Option<u32> {
        match (self.prep_time_minutes, self.cook_time_minutes) {
            (None, None) => None,
            (prep, cook) => Some(prep.unwrap_or(0) + cook.unwrap_or(0)),
        }
    }

    pub fn find_ingredient(&self, name: &str) -> Option<&Ingredient> {
        self.ingredients
            .iter()
            .find(|ingredient| ingredient.name.eq_ignore_ascii_case(name))
    }

    /// Swap one ingredient (matched case-insensitively) for another. The
    /// replacement keeps the original's preparation and category, and
    /// inherits quantity/unit unless new ones are given.
    pub fn substitute_ingredient(
        &self,
        original_name: &str,
        substitute_name: &str,
        substitute_quantity: Option<f64>,
        substitute_unit: Option<&str>,
    ) -> Recipe {
        let ingredients = self
            .ingredients
            .iter()
            .map(|ingredient| {
                if !ingredient.name.eq_ignore_ascii_case(original_name) {
                    return ingredient.clone();
                }
                Ingredient {
                    name: substitute_name.to_string(),
                    quantity: substitute_quantity.or(ingredient.quantity),
                    original_quantity: None,
                    unit: substitute_unit
                        .map(str::to_string)
                        .or_else(|| ingredient.unit.clone()),
                    preparation: ingredient.preparation.clone(),
                    category: ingredient.category,
                    substitutes: Vec::new(),
                }
            })
            .collect();

        Recipe {
            ingredients,
            ..self.clone()
        }
    }

    pub fn grouped_ingredients(&self) -> Vec<IngredientGroup> {
        group_by_category(&self.ingredients)
    }
}

/// Non-empty category groups in display order.
pub fn group_by_category(ingredients: &[Ingredient]) -> Vec<IngredientGroup> {
    IngredientCategory::ORDER
        .iter()
        .filter_map(|category| {
            let items: Vec<Ingredient> = ingredients
                .iter()
                .filter(|ingredient| ingredient.category == *category)
                .cloned()
                .collect();
            if items.is_empty() {
                None
            } else {
                Some(IngredientGroup {
                    category: *category,
                    label: category.label(),
                    ingredients: items,
                })
            }
        })
        .collect()
}
