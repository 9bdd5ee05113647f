use thiserror::Error;

/// Network-level failure talking to the backend, before or instead of a
/// usable response. The message is what the user sees.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("{context} failed: {reason}")]
    Request { context: String, reason: String },
    #[error("{context} failed: {status}")]
    Status { context: String, status: String },
    #[error("{context} returned an unreadable response: {reason}")]
    Decode { context: String, reason: String },
}

impl TransportError {
    pub fn request(context: &str, err: impl std::fmt::Display) -> Self {
        TransportError::Request {
            context: context.to_string(),
            reason: err.to_string(),
        }
    }

    pub fn status(context: &str, status: impl std::fmt::Display) -> Self {
        TransportError::Status {
            context: context.to_string(),
            status: status.to_string(),
        }
    }

    pub fn decode(context: &str, err: impl std::fmt::Display) -> Self {
        TransportError::Decode {
            context: context.to_string(),
            reason: err.to_string(),
        }
    }
}

/// An incoming session broke one of the data-model invariants.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("session has progress ({field}) but no recipe")]
    ProgressWithoutRecipe { field: &'static str },
    #[error("recipe title is empty")]
    EmptyTitle,
    #[error("recipe servings must be positive")]
    ZeroServings,
    #[error("original servings must be positive")]
    ZeroOriginalServings,
    #[error("ingredient #{index} has an empty name")]
    EmptyIngredientName { index: usize },
    #[error("ingredient '{name}' has invalid quantity {quantity}")]
    InvalidQuantity { name: String, quantity: f64 },
    #[error("step at position {position} is numbered {found}, expected {expected}")]
    StepOutOfSequence {
        position: usize,
        expected: u32,
        found: u32,
    },
    #[error("step {step_number} has an empty instruction")]
    EmptyInstruction { step_number: u32 },
    #[error("step {step_number} has invalid duration {minutes}")]
    InvalidDuration { step_number: u32, minutes: f64 },
    #[error("current step {current} exceeds total steps {total}")]
    StepBeyondEnd { current: u32, total: u32 },
    #[error("scaled servings must be positive")]
    ZeroScaledServings,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActionError {
    #[error("no recipe is loaded")]
    NoRecipe,
    #[error("'{name}' is not an ingredient of this recipe")]
    UnknownIngredient { name: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
