pub mod conversation;
pub mod recipe;
pub mod session;
pub mod validation;

pub use conversation::{Conversation, ConversationSummary};
pub use recipe::{
    group_by_category, Difficulty, Ingredient, IngredientCategory, IngredientGroup, Recipe,
    RecipeStep,
};
pub use session::RecipeSession;
pub use validation::{validate_recipe, validate_session};
