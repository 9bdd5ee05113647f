//! Stored cooking conversations, resumable from the history list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::RecipeSession;

pub const UNTITLED_CONVERSATION: &str = "Untitled recipe";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Agent thread id returned by the upload.
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub recipe_context: Option<RecipeSession>,
}

impl Conversation {
    pub fn from_session(id: &str, session: &RecipeSession, now: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            title: title_for(session),
            created_at: now,
            updated_at: now,
            recipe_context: Some(session.clone()),
        }
    }
}

pub fn title_for(session: &RecipeSession) -> String {
    session
        .recipe
        .as_ref()
        .map(|recipe| recipe.title.trim())
        .filter(|title| !title.is_empty())
        .unwrap_or(UNTITLED_CONVERSATION)
        .to_string()
}

/// Row shown in the history list; omits the session payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
