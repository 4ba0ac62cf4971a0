use serde::{Deserialize, Serialize};

use crate::{Error, Message, Role};

/// Append-only conversation for a single question.
///
/// The first message is always the human question (with its grounding
/// context) and messages can only be appended, so the transcript never
/// shrinks while a refinement loop is running.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new(question: Message) -> Result<Self, Error> {
        if !question.has_role(Role::Human) {
            return Err(Error::InvalidTranscript(
                "the first message must be authored by the human".to_string(),
            ));
        }
        Ok(Self { messages: vec![question] })
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false; a transcript is created with its question.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn question(&self) -> &Message {
        &self.messages[0]
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The message before the latest one.
    pub fn second_to_last(&self) -> Option<&Message> {
        let len = self.messages.len();
        self.messages.get(len.checked_sub(2)?)
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

impl TryFrom<Vec<Message>> for Transcript {
    type Error = Error;

    fn try_from(messages: Vec<Message>) -> Result<Self, Self::Error> {
        let mut iter = messages.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| Error::InvalidTranscript("transcript is empty".to_string()))?;
        let mut transcript = Transcript::new(first)?;
        iter.for_each(|message| transcript.push(message));
        Ok(transcript)
    }
}
