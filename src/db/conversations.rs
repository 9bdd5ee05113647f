use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Row};

use crate::models::{Conversation, ConversationSummary, RecipeSession};

use super::Database;

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {column} '{value}'"))
}

// Fixed precision keeps the text column sortable.
fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn row_to_summary(row: &Row) -> Result<ConversationSummary> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(ConversationSummary {
        id: row.get("id")?,
        title: row.get("title")?,
        created_at: parse_timestamp(&created_at, "created_at")?,
        updated_at: parse_timestamp(&updated_at, "updated_at")?,
    })
}

fn row_to_conversation(row: &Row) -> Result<Conversation> {
    let summary = row_to_summary(row)?;
    let raw_context: Option<String> = row.get("recipe_context")?;
    let recipe_context = match raw_context {
        Some(json) => Some(
            serde_json::from_str::<RecipeSession>(&json)
                .with_context(|| format!("corrupt recipe_context for {}", summary.id))?,
        ),
        None => None,
    };

    Ok(Conversation {
        id: summary.id,
        title: summary.title,
        created_at: summary.created_at,
        updated_at: summary.updated_at,
        recipe_context,
    })
}

impl Database {
    /// Insert or refresh a conversation. `created_at` of an existing row is
    /// left alone.
    pub async fn save_conversation(&self, conversation: &Conversation) -> Result<()> {
        let record = conversation.clone();
        let context_json = record
            .recipe_context
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("failed to serialize recipe context")?;

        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO conversations (id, title, recipe_context, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                     title = excluded.title,
                     recipe_context = excluded.recipe_context,
                     updated_at = excluded.updated_at",
                params![
                    record.id,
                    record.title,
                    context_json,
                    format_timestamp(&record.created_at),
                    format_timestamp(&record.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    /// Most recently touched first.
    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, created_at, updated_at
                 FROM conversations
                 ORDER BY updated_at DESC, id ASC",
            )?;
            let mut rows = stmt.query([])?;
            let mut conversations = Vec::new();
            while let Some(row) = rows.next()? {
                conversations.push(row_to_summary(row)?);
            }
            Ok(conversations)
        })
        .await
    }

    pub async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        let id = id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, recipe_context, created_at, updated_at
                 FROM conversations
                 WHERE id = ?1",
            )?;
            let mut rows = stmt.query(params![id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_conversation(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    /// Returns whether a row was removed.
    pub async fn delete_conversation(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.execute(move |conn| {
            let removed = conn.execute("DELETE FROM conversations WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
    }
}
