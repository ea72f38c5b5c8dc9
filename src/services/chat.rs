use std::sync::Arc;

use tracing::warn;

use crate::api::SchedulerApi;
use crate::models::ChatMessage;

/// Conversation with the remote assistant. The transcript lives only as
/// long as this value.
pub struct ChatAssistant {
    api: Arc<dyn SchedulerApi>,
    transcript: Vec<ChatMessage>,
}

impl ChatAssistant {
    pub fn new(api: Arc<dyn SchedulerApi>) -> Self {
        Self {
            api,
            transcript: Vec::new(),
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    /// Sends `text` and appends both sides of the exchange. A failed call
    /// appends an error message in place of the reply. Blank input is
    /// ignored and returns `None`.
    pub async fn send_message(&mut self, text: &str) -> Option<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.transcript.push(ChatMessage::user(text));
        let reply = match self.api.chat(text).await {
            Ok(reply) => ChatMessage::assistant(reply),
            Err(e) => {
                warn!("chat request failed: {}", e);
                ChatMessage::error(e.to_string())
            }
        };
        self.transcript.push(reply);
        self.transcript.last()
    }
}
