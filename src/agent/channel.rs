use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TransportError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
}

impl AgentMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Conversation channel to the cooking agent.
///
/// `dispatch` only acknowledges that the request was accepted; the agent's
/// resulting state arrives later as a pushed session. Implementations must
/// report `is_busy() == true` by the time `dispatch` returns if the agent
/// still has work to do for that message.
#[async_trait]
pub trait AgentChannel: Send + Sync {
    async fn dispatch(&self, message: &AgentMessage) -> Result<(), TransportError>;

    fn is_busy(&self) -> bool;

    /// Attach later dispatches to the conversation thread created by upload.
    fn bind_thread(&self, _thread_id: &str) {}
}
