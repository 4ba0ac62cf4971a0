use derive_setters::Setters;
use serde::Serialize;

use crate::{Message, SessionId};

/// Everything a chat model needs for one completion.
#[derive(Clone, Debug, Serialize, PartialEq, Setters)]
#[setters(into, strip_option)]
pub struct ChatContext {
    pub session: SessionId,
    pub system: Option<String>,
    pub messages: Vec<Message>,
}

impl ChatContext {
    pub fn new(session: SessionId, messages: Vec<Message>) -> Self {
        Self { session, system: None, messages }
    }
}

/// Opaque text-in, text-out model call.
///
/// Implementations report transient failures as [`crate::Error::Retryable`]
/// so callers can decide whether another attempt is worthwhile.
#[async_trait::async_trait]
pub trait ChatService: Send + Sync {
    async fn chat(&self, context: ChatContext) -> anyhow::Result<String>;
}
