use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::backend_service::{AskRequest, BackendClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

/// Chatbot conversation against `/rag/ask`, kept in memory.
pub struct ChatSession {
    backend: Arc<BackendClient>,
    background: String,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(backend: Arc<BackendClient>, background: &str) -> Self {
        Self {
            backend,
            background: background.to_string(),
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn set_background(&mut self, background: &str) {
        self.background = background.to_string();
    }

    /// Send `query` and append both sides of the exchange. Failures become a
    /// bot message. Returns the bot reply, or `None` for a blank query.
    pub async fn send(&mut self, query: &str) -> Option<&ChatMessage> {
        if query.trim().is_empty() {
            return None;
        }
        self.messages.push(ChatMessage {
            sender: Sender::User,
            text: query.to_string(),
        });

        let request = AskRequest {
            query: query.to_string(),
            background: self.background.clone(),
        };
        let text = match self.backend.ask(&request).await {
            Ok(response) => response.answer,
            Err(e) => {
                error!("Chat request failed: {}", e);
                format!("Error connecting to brain: {}", e.user_message("Unknown error"))
            }
        };

        self.messages.push(ChatMessage {
            sender: Sender::Bot,
            text,
        });
        self.messages.last()
    }
}
