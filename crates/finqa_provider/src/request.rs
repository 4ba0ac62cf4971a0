use finqa_domain::{Message, Role};
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq)]
pub struct Request {
    pub model: String,
    pub messages: Vec<RequestMessage>,
    pub temperature: f32,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RequestMessage {
    pub role: &'static str,
    pub content: String,
}

impl RequestMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system", content: content.into() }
    }
}

impl From<Message> for RequestMessage {
    fn from(message: Message) -> Self {
        let role = match message.role {
            Role::Human => "user",
            Role::Assistant => "assistant",
        };
        Self { role, content: message.content }
    }
}
