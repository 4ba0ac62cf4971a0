use finqa_domain::{Error, Message, Role, StructuredAnswer, Transcript};
use tracing::debug;

use crate::AnswerParser;

/// Substrings that mark a reply as carrying a structured answer.
pub const STRUCTURED_MARKERS: [&str; 2] = ["```", "json"];

/// Replaces single quotes with double quotes so loosely quoted objects read
/// as JSON.
pub fn normalize_quotes(text: &str) -> String {
    text.replace('\'', "\"")
}

/// The latest assistant message carrying a structured answer marker.
pub fn find_structured_reply(messages: &[Message]) -> Option<&Message> {
    messages.iter().rev().find(|message| {
        message.has_role(Role::Assistant)
            && STRUCTURED_MARKERS.iter().any(|marker| message.content.contains(marker))
    })
}

/// Pulls the final answer out of a finished transcript.
pub struct ResponseExtractor<P> {
    parser: P,
}

impl<P: AnswerParser> ResponseExtractor<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }

    pub async fn extract(&self, transcript: &Transcript) -> Result<StructuredAnswer, Error> {
        let reply =
            find_structured_reply(transcript.messages()).ok_or(Error::NoStructuredAnswer)?;
        let text = normalize_quotes(&reply.content);
        debug!(chars = text.len(), "Parsing structured answer");

        self.parser
            .parse(&text, Some(&transcript.question().content))
            .await
            .map_err(Error::MalformedAnswer)
    }
}
