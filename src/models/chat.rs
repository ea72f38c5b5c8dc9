use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub is_error: bool,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), false)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into(), false)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, format!("Error: {}", content.into()), true)
    }

    fn new(role: Role, content: String, is_error: bool) -> Self {
        Self {
            role,
            content,
            is_error,
            sent_at: Utc::now(),
        }
    }
}
