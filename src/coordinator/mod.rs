pub mod affordance;
pub mod config;
pub mod controller;
pub mod dispatch;

pub use affordance::{AffordanceState, PendingAction};
pub use config::CoordinatorConfig;
pub use controller::{clamp_servings, ActionCoordinator};
pub use dispatch::{wait_for_idle, ActionOutcome};
