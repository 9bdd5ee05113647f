use tauri::{AppHandle, Emitter, State};

use crate::{
    coordinator::ActionOutcome,
    models::ConversationSummary,
    settings::CompanionSettings,
    AppState,
};

use super::{RecipeController, RecipeSnapshot, SessionStore, SessionView};

pub const SESSION_CHANGED_EVENT: &str = "recipe-session-changed";

fn controller_from_state(state: &State<'_, AppState>) -> RecipeController {
    state.controller.clone()
}

#[tauri::command]
pub async fn get_recipe_snapshot(state: State<'_, AppState>) -> Result<RecipeSnapshot, String> {
    Ok(controller_from_state(&state).snapshot().await)
}

#[tauri::command]
pub async fn upload_recipe(
    state: State<'_, AppState>,
    file_name: String,
    bytes: Vec<u8>,
) -> Result<RecipeSnapshot, String> {
    let controller = controller_from_state(&state);
    controller
        .on_file_select(&file_name, bytes)
        .await
        .map_err(|e| e.to_string())?;
    Ok(controller.snapshot().await)
}

#[tauri::command]
pub async fn next_step(state: State<'_, AppState>) -> Result<RecipeSnapshot, String> {
    let controller = controller_from_state(&state);
    controller.on_next_step().map_err(|e| e.to_string())?;
    Ok(controller.snapshot().await)
}

#[tauri::command]
pub async fn toggle_ingredient(
    state: State<'_, AppState>,
    name: String,
) -> Result<RecipeSnapshot, String> {
    let controller = controller_from_state(&state);
    controller
        .toggle_ingredient(&name)
        .map_err(|e| e.to_string())?;
    Ok(controller.snapshot().await)
}

#[tauri::command]
pub async fn scale_recipe(state: State<'_, AppState>, servings: f64) -> Result<ActionOutcome, String> {
    controller_from_state(&state)
        .on_scale(servings)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn open_substitution(state: State<'_, AppState>, ingredient: String) -> Result<(), String> {
    controller_from_state(&state)
        .open_substitution(&ingredient)
        .await;
    Ok(())
}

#[tauri::command]
pub async fn close_substitution(state: State<'_, AppState>) -> Result<(), String> {
    controller_from_state(&state).close_substitution().await;
    Ok(())
}

#[tauri::command]
pub async fn substitute_ingredient(
    state: State<'_, AppState>,
    ingredient: String,
    proposed: Option<String>,
) -> Result<ActionOutcome, String> {
    controller_from_state(&state)
        .on_substitute(&ingredient, proposed.as_deref().unwrap_or(""))
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn leave_cooking_view(state: State<'_, AppState>) -> Result<(), String> {
    controller_from_state(&state).leave_cooking_view().await;
    Ok(())
}

#[tauri::command]
pub async fn list_conversations(
    state: State<'_, AppState>,
) -> Result<Vec<ConversationSummary>, String> {
    state
        .db
        .list_conversations()
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_conversation(
    state: State<'_, AppState>,
    conversation_id: String,
) -> Result<bool, String> {
    state
        .db
        .delete_conversation(&conversation_id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn resume_conversation(
    state: State<'_, AppState>,
    conversation_id: String,
) -> Result<RecipeSnapshot, String> {
    let controller = controller_from_state(&state);
    controller
        .resume(&conversation_id)
        .await
        .map_err(|e| format!("{e:#}"))?;
    Ok(controller.snapshot().await)
}

#[tauri::command]
pub fn get_settings(state: State<'_, AppState>) -> Result<CompanionSettings, String> {
    Ok(state.settings.get())
}

/// Stored for the next launch; the running channel keeps its backend.
#[tauri::command]
pub fn update_settings(
    state: State<'_, AppState>,
    settings: CompanionSettings,
) -> Result<(), String> {
    state.settings.update(settings).map_err(|e| e.to_string())
}

/// Push every session change (local or agent-pushed) to the webview.
pub fn spawn_event_forwarder(app_handle: AppHandle, store: SessionStore) {
    let mut updates = store.subscribe();
    tauri::async_runtime::spawn(async move {
        while updates.changed().await.is_ok() {
            let view = SessionView::from(&*updates.borrow_and_update());
            if let Err(err) = app_handle.emit(SESSION_CHANGED_EVENT, view) {
                log::warn!("failed to emit {SESSION_CHANGED_EVENT}: {err}");
            }
        }
    });
}
