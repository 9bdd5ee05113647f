pub mod agent;
pub mod coordinator;
pub mod db;
pub mod error;
pub mod models;
pub mod scaling;
pub mod session;
pub mod settings;
pub mod upload;
pub mod utils;

pub use agent::{AgentChannel, AgentMessage, HttpAgentChannel};
pub use coordinator::{ActionCoordinator, ActionOutcome, CoordinatorConfig};
pub use db::Database;
pub use error::{ActionError, TransportError, ValidationError};
pub use models::{Recipe, RecipeSession};
pub use session::{RecipeController, RecipeSnapshot, SessionStore};
pub use settings::{CompanionSettings, SettingsStore};
pub use upload::{HttpUploadIntake, UploadIntake};

#[cfg(feature = "desktop")]
pub(crate) struct AppState {
    pub(crate) db: Database,
    pub(crate) controller: RecipeController,
    pub(crate) settings: SettingsStore,
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use std::sync::Arc;

    use session::commands::{
        close_substitution, delete_conversation, get_recipe_snapshot, get_settings,
        leave_cooking_view, list_conversations, next_step, open_substitution,
        resume_conversation, scale_recipe, spawn_event_forwarder, substitute_ingredient,
        toggle_ingredient, update_settings, upload_recipe,
    };
    use tauri::Manager;

    utils::logging::init();

    log::info!("Recipe companion starting up...");

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let database = Database::new(app_data_dir.join("recipe-companion.sqlite3"))?;

                let settings_store = SettingsStore::new(app_data_dir.join("settings.json"))?;
                let settings = settings_store.get().with_env_overrides();
                log::info!("using backend {}", settings.backend_url);

                let store = SessionStore::new();
                let channel = Arc::new(HttpAgentChannel::new(&settings.backend_url, store.clone()));
                let intake = Arc::new(HttpUploadIntake::new(&settings.backend_url));
                let controller = RecipeController::new(
                    store.clone(),
                    channel,
                    intake,
                    CoordinatorConfig::from(&settings),
                    Some(database.clone()),
                );

                spawn_event_forwarder(app.handle().clone(), store);

                app.manage(AppState {
                    db: database,
                    controller,
                    settings: settings_store,
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            get_recipe_snapshot,
            upload_recipe,
            next_step,
            toggle_ingredient,
            scale_recipe,
            open_substitution,
            close_substitution,
            substitute_ingredient,
            leave_cooking_view,
            list_conversations,
            delete_conversation,
            resume_conversation,
            get_settings,
            update_settings,
        ])
        .build(tauri::generate_context!());

    match app {
        Ok(app) => app.run(|_, _| {}),
        Err(err) => log::error!("error while running tauri application: {err}"),
    }
}
