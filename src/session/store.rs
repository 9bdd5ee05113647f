use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::watch;

use crate::error::ValidationError;
use crate::models::{validate_session, Recipe, RecipeSession};

use super::state::{SessionPhase, SessionView};

/// Single source of truth for the cooking session.
///
/// Two write paths exist: `replace` adopts a whole session from outside
/// (upload, agent snapshot) and `mutate_local` applies a deterministic
/// client-side change. Both go through the same channel, so whichever write
/// lands last is what readers see; nothing is merged field by field.
#[derive(Clone)]
pub struct SessionStore {
    sender: Arc<watch::Sender<RecipeSession>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(RecipeSession::empty());
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn current(&self) -> RecipeSession {
        self.sender.borrow().clone()
    }

    /// Adopt `session` verbatim after validating it. On rejection the prior
    /// session is kept.
    pub fn replace(&self, session: RecipeSession) -> Result<(), ValidationError> {
        validate_session(&session)?;
        self.sender.send_replace(session);
        debug!("session replaced ({:?})", self.phase());
        Ok(())
    }

    /// `replace` for agent pushes: a payload that breaks the data model is a
    /// contract violation on the agent side, so it is logged and dropped.
    pub fn replace_external(&self, session: RecipeSession) -> bool {
        match self.replace(session) {
            Ok(()) => true,
            Err(err) => {
                warn!("rejected session pushed by agent: {err}");
                false
            }
        }
    }

    /// Apply `mutate` to the current session and return exactly what it
    /// wrote, even if another write lands right after.
    pub fn mutate_local<F>(&self, mutate: F) -> RecipeSession
    where
        F: FnOnce(&RecipeSession) -> RecipeSession,
    {
        let mut written = None;
        self.sender.send_modify(|session| {
            let next = mutate(session);
            written = Some(next.clone());
            *session = next;
        });
        written.unwrap_or_else(|| self.current())
    }

    pub fn reset(&self) {
        self.sender.send_replace(RecipeSession::empty());
    }

    pub fn subscribe(&self) -> watch::Receiver<RecipeSession> {
        self.sender.subscribe()
    }

    pub fn recipe(&self) -> Option<Recipe> {
        self.sender.borrow().recipe.clone()
    }

    pub fn has_recipe(&self) -> bool {
        self.sender.borrow().recipe.is_some()
    }

    pub fn total_steps(&self) -> u32 {
        self.sender.borrow().total_steps()
    }

    pub fn current_step_index(&self) -> u32 {
        self.sender.borrow().current_step
    }

    pub fn is_complete(&self) -> bool {
        self.sender.borrow().is_complete()
    }

    pub fn phase(&self) -> SessionPhase {
        SessionPhase::of(&self.sender.borrow())
    }

    pub fn view(&self) -> SessionView {
        SessionView::from(&*self.sender.borrow())
    }
}
