use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::agent::{compose_scale, compose_substitution, AgentChannel, AgentMessage};
use crate::error::ActionError;
use crate::models::RecipeSession;
use crate::scaling;
use crate::session::SessionStore;
use crate::settings::ScaleMode;

use super::affordance::{AffordanceState, PendingAction};
use super::config::CoordinatorConfig;
use super::dispatch::{wait_for_idle, ActionOutcome};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Turns cooking-view intents into store mutations or agent requests.
///
/// Deterministic actions (step advance, checklist, local scaling) mutate the
/// store directly. Agent-resolved actions are dispatched as chat messages and
/// confirmed by watching the agent's busy flag go idle; the open affordance
/// (dialog, stepper) is closed only on that confirmation.
#[derive(Clone)]
pub struct ActionCoordinator {
    store: SessionStore,
    channel: Arc<dyn AgentChannel>,
    config: CoordinatorConfig,
    affordance: Arc<Mutex<AffordanceState>>,
    cancel_token: Arc<Mutex<CancellationToken>>,
}

impl ActionCoordinator {
    pub fn new(store: SessionStore, channel: Arc<dyn AgentChannel>, config: CoordinatorConfig) -> Self {
        Self {
            store,
            channel,
            config,
            affordance: Arc::new(Mutex::new(AffordanceState::default())),
            cancel_token: Arc::new(Mutex::new(CancellationToken::new())),
        }
    }

    pub async fn affordance(&self) -> AffordanceState {
        self.affordance.lock().await.clone()
    }

    /// True while a dispatch is awaited or the agent reports work. The
    /// triggering control should stay disabled meanwhile.
    pub async fn is_pending(&self) -> bool {
        self.affordance.lock().await.in_flight || self.channel.is_busy()
    }

    pub fn advance_step(&self) -> Result<RecipeSession, ActionError> {
        self.require_recipe()?;
        Ok(self.store.mutate_local(|session| {
            let total = session.total_steps();
            RecipeSession {
                current_step: session.current_step.saturating_add(1).min(total),
                cooking_started: true,
                ..session.clone()
            }
        }))
    }

    /// Flip `name` on the checklist. Names match case-insensitively and the
    /// recipe's own spelling is what gets stored.
    pub fn toggle_ingredient(&self, name: &str) -> Result<RecipeSession, ActionError> {
        let recipe = self.store.recipe().ok_or(ActionError::NoRecipe)?;
        let name = recipe
            .find_ingredient(name)
            .map(|ingredient| ingredient.name.clone())
            .ok_or_else(|| ActionError::UnknownIngredient {
                name: name.to_string(),
            })?;
        Ok(self.store.mutate_local(move |session| {
            let mut next = session.clone();
            if !next.checked_ingredients.remove(&name) {
                next.checked_ingredients.insert(name);
            }
            next
        }))
    }

    /// Rescale to `requested` servings, floored and clamped to at least 1.
    pub async fn scale_servings(&self, requested: f64) -> Result<ActionOutcome, ActionError> {
        self.require_recipe()?;
        let target = clamp_servings(requested);

        match self.config.scale_mode {
            ScaleMode::Local => {
                self.store.mutate_local(|session| RecipeSession {
                    recipe: session
                        .recipe
                        .as_ref()
                        .map(|recipe| scaling::scale(recipe, target)),
                    scaled_servings: Some(target),
                    ..session.clone()
                });
                log_info!("scaled recipe locally to {target} servings");
                Ok(ActionOutcome::Applied)
            }
            ScaleMode::Dispatched => {
                self.affordance
                    .lock()
                    .await
                    .open(PendingAction::Scale { servings: target });
                self.dispatch_and_confirm(AgentMessage::user(compose_scale(target)))
                    .await
            }
        }
    }

    pub async fn open_substitution(&self, ingredient: &str) {
        self.affordance
            .lock()
            .await
            .open(PendingAction::Substitution {
                ingredient: ingredient.to_string(),
            });
    }

    pub async fn close_substitution(&self) {
        self.affordance.lock().await.dismiss();
    }

    /// Ask the agent to swap `ingredient`; `proposed` may be blank to let
    /// the agent choose.
    pub async fn substitute_ingredient(
        &self,
        ingredient: &str,
        proposed: &str,
    ) -> Result<ActionOutcome, ActionError> {
        self.require_recipe()?;
        self.open_substitution(ingredient).await;
        let message = AgentMessage::user(compose_substitution(ingredient, proposed));
        self.dispatch_and_confirm(message).await
    }

    /// Abandon any awaited dispatch (the cooking view went away). The poll
    /// loop stops without touching affordance state afterwards.
    pub async fn cancel_pending(&self) {
        {
            let mut token = self.cancel_token.lock().await;
            token.cancel();
            *token = CancellationToken::new();
        }
        self.affordance.lock().await.dismiss();
    }

    async fn dispatch_and_confirm(&self, message: AgentMessage) -> Result<ActionOutcome, ActionError> {
        let token = self.cancel_token.lock().await.child_token();

        {
            let mut affordance = self.affordance.lock().await;
            if affordance.in_flight {
                log_warn!("dispatching while an earlier request is unconfirmed; completion order is not guaranteed");
            }
            affordance.begin_dispatch();
        }

        log_info!("dispatching agent request: {}", message.content);

        if let Err(err) = self.channel.dispatch(&message).await {
            log_error!("agent dispatch failed: {err}");
            let mut affordance = self.affordance.lock().await;
            if token.is_cancelled() {
                return Ok(ActionOutcome::Cancelled);
            }
            affordance.fail(err.to_string());
            return Err(ActionError::Transport(err));
        }

        let outcome = wait_for_idle(
            self.channel.as_ref(),
            self.config.poll_interval,
            self.config.confirm_timeout,
            &token,
        )
        .await;

        let mut affordance = self.affordance.lock().await;
        if token.is_cancelled() {
            return Ok(ActionOutcome::Cancelled);
        }
        match outcome {
            ActionOutcome::Confirmed => affordance.confirm(),
            ActionOutcome::Ambiguous => {
                log_info!(
                    "agent still busy after {:?}; leaving request open",
                    self.config.confirm_timeout
                );
                affordance.leave_open();
            }
            ActionOutcome::Applied | ActionOutcome::Cancelled => {}
        }

        Ok(outcome)
    }

    fn require_recipe(&self) -> Result<(), ActionError> {
        if self.store.has_recipe() {
            Ok(())
        } else {
            Err(ActionError::NoRecipe)
        }
    }
}

/// Servings requested from a free-form control: fractions truncate, and
/// anything below 1 (or not a number) becomes 1.
pub fn clamp_servings(requested: f64) -> u32 {
    if !requested.is_finite() || requested < 1.0 {
        return 1;
    }
    requested.trunc().min(f64::from(u32::MAX)) as u32
}
