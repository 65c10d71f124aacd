//! Chat domain types shared by the relay and the backend client.

use crate::core::error::ValidationError;
use serde::Serialize;
use std::fmt::Display;

/// A validated user prompt. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    /// Validates a raw prompt. Only the empty string is rejected; whitespace is forwarded as-is.
    pub fn new(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.is_empty() {
            return Err(ValidationError::MissingPrompt);
        }
        Ok(Prompt(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, used for logging instead of the prompt text itself.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    role: Role,
    content: String,
}

impl ChatMessage {
    pub fn user(prompt: &Prompt) -> Self {
        Self {
            role: Role::User,
            content: prompt.as_str().to_owned(),
        }
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Renders a failure as the inline fragment appended to a relayed body.
pub fn error_marker(error: &impl Display) -> String {
    format!("[Error: {error}]")
}
