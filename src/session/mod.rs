pub mod controller;
pub mod state;
pub mod store;

#[cfg(feature = "desktop")]
pub mod commands;

pub use controller::{RecipeController, RecipeSnapshot};
pub use state::{SessionPhase, SessionView};
pub use store::SessionStore;
