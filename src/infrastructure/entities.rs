//! Backend wire entities

use crate::core::chat::ChatMessage;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`.
#[derive(Debug, Serialize)]
pub struct ChatPayload<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// One line of the backend's streaming response.
#[derive(Debug, Default, Deserialize)]
pub struct BackendEvent {
    #[serde(default)]
    pub message: Option<EventMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl BackendEvent {
    /// The token fragment carried by this event, if any.
    pub fn into_content(self) -> Option<String> {
        self.message.and_then(|m| m.content)
    }
}

/// Error body the backend sends alongside non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
