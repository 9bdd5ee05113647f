#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use async_trait::async_trait;
use recipe_companion_lib::{
    agent::{AgentChannel, AgentMessage},
    coordinator::CoordinatorConfig,
    error::TransportError,
    models::{Ingredient, IngredientCategory, Recipe, RecipeSession, RecipeStep},
    session::SessionStore,
    settings::ScaleMode,
    upload::{UploadIntake, UploadResult},
};

/// How the scripted agent reacts to a dispatch.
#[derive(Clone)]
pub enum Script {
    /// Work for `after`, push `session` (if any), then go idle.
    FinishAfter {
        after: Duration,
        session: Option<RecipeSession>,
    },
    /// Accept the message and stay busy forever.
    NeverIdle,
    /// Reject the dispatch outright.
    Fail(TransportError),
}

pub struct ScriptedChannel {
    store: SessionStore,
    script: Mutex<Script>,
    busy: Arc<AtomicBool>,
    sent: Mutex<Vec<AgentMessage>>,
    thread: Mutex<Option<String>>,
}

impl ScriptedChannel {
    pub fn new(store: SessionStore, script: Script) -> Arc<Self> {
        Arc::new(Self {
            store,
            script: Mutex::new(script),
            busy: Arc::new(AtomicBool::new(false)),
            sent: Mutex::new(Vec::new()),
            thread: Mutex::new(None),
        })
    }

    pub fn set_script(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|message| message.content.clone())
            .collect()
    }

    pub fn bound_thread(&self) -> Option<String> {
        self.thread.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentChannel for ScriptedChannel {
    async fn dispatch(&self, message: &AgentMessage) -> Result<(), TransportError> {
        let script = self.script.lock().unwrap().clone();
        if let Script::Fail(err) = script {
            return Err(err);
        }

        self.sent.lock().unwrap().push(message.clone());
        self.busy.store(true, Ordering::SeqCst);

        if let Script::FinishAfter { after, session } = script {
            let busy = self.busy.clone();
            let store = self.store.clone();
            tokio::spawn(async move {
                tokio::time::sleep(after).await;
                if let Some(session) = session {
                    store.replace_external(session);
                }
                busy.store(false, Ordering::SeqCst);
            });
        }

        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn bind_thread(&self, thread_id: &str) {
        *self.thread.lock().unwrap() = Some(thread_id.to_string());
    }
}

pub struct FakeIntake {
    response: Mutex<Result<UploadResult, TransportError>>,
}

impl FakeIntake {
    pub fn succeeding(thread_id: &str, session: RecipeSession) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Ok(UploadResult {
                thread_id: thread_id.to_string(),
                session,
            })),
        })
    }

    pub fn failing(err: TransportError) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Err(err)),
        })
    }

    pub fn respond_with(&self, response: Result<UploadResult, TransportError>) {
        *self.response.lock().unwrap() = response;
    }
}

#[async_trait]
impl UploadIntake for FakeIntake {
    async fn upload(&self, _file_name: &str, _bytes: Vec<u8>) -> Result<UploadResult, TransportError> {
        self.response.lock().unwrap().clone()
    }
}

pub fn fast_config() -> CoordinatorConfig {
    CoordinatorConfig {
        poll_interval: Duration::from_millis(5),
        confirm_timeout: Duration::from_millis(150),
        scale_mode: ScaleMode::Local,
    }
}

/// Two servings: 4 cups flour, 2 cups sugar, tomatoes, salt to taste.
pub fn pancakes() -> Recipe {
    Recipe {
        title: "Tomato pancakes".into(),
        servings: 2,
        ingredients: vec![
            Ingredient::new("flour", Some(4.0), Some("cup")).with_category(IngredientCategory::Pantry),
            Ingredient::new("sugar", Some(2.0), Some("cup")).with_category(IngredientCategory::Pantry),
            Ingredient::new("Tomatoes", Some(3.0), None)
                .with_category(IngredientCategory::Produce)
                .with_preparation("diced"),
            Ingredient::new("salt", None, None).with_category(IngredientCategory::Spice),
        ],
        steps: vec![
            RecipeStep::new(1, "Mix the dry ingredients"),
            RecipeStep::new(2, "Fold in the tomatoes"),
            RecipeStep::new(3, "Fry until golden"),
        ],
        ..Recipe::default()
    }
}

pub fn loaded_store() -> SessionStore {
    let store = SessionStore::new();
    store
        .replace(RecipeSession::with_recipe(pancakes()))
        .unwrap();
    store
}
