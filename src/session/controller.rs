use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tokio::{sync::Mutex, task::JoinHandle};

use crate::agent::AgentChannel;
use crate::coordinator::{ActionCoordinator, ActionOutcome, AffordanceState, CoordinatorConfig};
use crate::db::Database;
use crate::error::ActionError;
use crate::models::{validate_session, Conversation, RecipeSession};
use crate::upload::UploadIntake;

use super::state::SessionView;
use super::store::SessionStore;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

#[derive(Debug, Clone, Default)]
struct UiState {
    is_uploading: bool,
    error: Option<String>,
    thread_id: Option<String>,
}

/// Everything the cooking view renders in one payload.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSnapshot {
    #[serde(flatten)]
    pub view: SessionView,
    pub is_uploading: bool,
    pub error: Option<String>,
    pub thread_id: Option<String>,
    pub affordance: AffordanceState,
    pub is_pending: bool,
}

/// UI-facing entrypoints: upload, cooking actions, history resume.
#[derive(Clone)]
pub struct RecipeController {
    store: SessionStore,
    coordinator: ActionCoordinator,
    channel: Arc<dyn AgentChannel>,
    intake: Arc<dyn UploadIntake>,
    history: Option<Database>,
    ui: Arc<Mutex<UiState>>,
    autosave: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl RecipeController {
    pub fn new(
        store: SessionStore,
        channel: Arc<dyn AgentChannel>,
        intake: Arc<dyn UploadIntake>,
        config: CoordinatorConfig,
        history: Option<Database>,
    ) -> Self {
        let coordinator = ActionCoordinator::new(store.clone(), channel.clone(), config);
        Self {
            store,
            coordinator,
            channel,
            intake,
            history,
            ui: Arc::new(Mutex::new(UiState::default())),
            autosave: Arc::new(Mutex::new(None)),
        }
    }

    /// Upload a recipe document and adopt the session the backend parsed
    /// from it. On any failure the store is left empty and the message is
    /// kept for the view.
    pub async fn on_file_select(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), ActionError> {
        {
            let mut ui = self.ui.lock().await;
            ui.is_uploading = true;
            ui.error = None;
        }
        self.coordinator.cancel_pending().await;
        self.stop_autosave().await;

        let adopted = match self.intake.upload(file_name, bytes).await {
            Ok(result) => self
                .store
                .replace(result.session)
                .map(|()| result.thread_id)
                .map_err(ActionError::from),
            Err(err) => Err(ActionError::from(err)),
        };

        let mut ui = self.ui.lock().await;
        ui.is_uploading = false;

        match adopted {
            Ok(thread_id) => {
                log_info!("recipe loaded from {file_name} on thread {thread_id}");
                self.channel.bind_thread(&thread_id);
                ui.thread_id = Some(thread_id.clone());
                drop(ui);
                self.start_autosave(thread_id).await;
                Ok(())
            }
            Err(err) => {
                log_error!("failed to load {file_name}: {err}");
                self.store.reset();
                ui.thread_id = None;
                ui.error = Some(match &err {
                    ActionError::Validation(invalid) => format!("Upload failed: {invalid}"),
                    other => other.to_string(),
                });
                Err(err)
            }
        }
    }

    pub fn on_next_step(&self) -> Result<RecipeSession, ActionError> {
        self.coordinator.advance_step()
    }

    pub async fn on_scale(&self, requested: f64) -> Result<ActionOutcome, ActionError> {
        self.coordinator.scale_servings(requested).await
    }

    pub async fn on_substitute(
        &self,
        ingredient: &str,
        proposed: &str,
    ) -> Result<ActionOutcome, ActionError> {
        self.coordinator.substitute_ingredient(ingredient, proposed).await
    }

    pub fn toggle_ingredient(&self, name: &str) -> Result<RecipeSession, ActionError> {
        self.coordinator.toggle_ingredient(name)
    }

    pub async fn open_substitution(&self, ingredient: &str) {
        self.coordinator.open_substitution(ingredient).await;
    }

    pub async fn close_substitution(&self) {
        self.coordinator.close_substitution().await;
    }

    /// The cooking view unmounted: stop waiting on any dispatched action.
    pub async fn leave_cooking_view(&self) {
        self.coordinator.cancel_pending().await;
    }

    pub async fn snapshot(&self) -> RecipeSnapshot {
        let ui = self.ui.lock().await.clone();
        RecipeSnapshot {
            view: self.store.view(),
            is_uploading: ui.is_uploading,
            error: ui.error,
            thread_id: ui.thread_id,
            affordance: self.coordinator.affordance().await,
            is_pending: self.coordinator.is_pending().await,
        }
    }

    /// Re-adopt a stored conversation and continue on its agent thread.
    pub async fn resume(&self, conversation_id: &str) -> Result<()> {
        let history = self
            .history
            .as_ref()
            .context("conversation history is not available")?;
        let conversation = history
            .get_conversation(conversation_id)
            .await?
            .with_context(|| format!("conversation {conversation_id} not found"))?;

        // A corrupt row must not tear down the session that is already live.
        let session = conversation.recipe_context.unwrap_or_default();
        validate_session(&session)
            .with_context(|| format!("stored session for {conversation_id} is invalid"))?;

        self.coordinator.cancel_pending().await;
        self.stop_autosave().await;

        self.store
            .replace(session)
            .with_context(|| format!("stored session for {conversation_id} is invalid"))?;

        self.channel.bind_thread(conversation_id);
        {
            let mut ui = self.ui.lock().await;
            ui.thread_id = Some(conversation_id.to_string());
            ui.error = None;
        }
        self.start_autosave(conversation_id.to_string()).await;

        log_info!("resumed conversation {conversation_id}");
        Ok(())
    }

    async fn start_autosave(&self, thread_id: String) {
        let Some(history) = self.history.clone() else {
            return;
        };

        let mut guard = self.autosave.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }

        let mut updates = self.store.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                let session = updates.borrow_and_update().clone();
                if session.recipe.is_some() {
                    let record = Conversation::from_session(&thread_id, &session, Utc::now());
                    if let Err(err) = history.save_conversation(&record).await {
                        log_warn!("failed to save conversation {thread_id}: {err:#}");
                    }
                }
                if updates.changed().await.is_err() {
                    break;
                }
            }
        });

        *guard = Some(handle);
    }

    async fn stop_autosave(&self) {
        if let Some(handle) = self.autosave.lock().await.take() {
            handle.abort();
        }
    }
}
