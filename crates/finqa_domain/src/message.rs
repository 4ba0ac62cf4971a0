use derive_more::derive::Display;
use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

/// Author of a message in a refinement transcript.
#[derive(Clone, Copy, Debug, Display, Deserialize, Serialize, PartialEq, Eq, Hash, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[display("human")]
    Human,
    #[display("assistant")]
    Assistant,
}

impl Role {
    /// The opposite side of the conversation.
    pub fn flip(self) -> Self {
        match self {
            Role::Human => Role::Assistant,
            Role::Assistant => Role::Human,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl ToString) -> Self {
        Self { role, content: content.to_string() }
    }

    pub fn human(content: impl ToString) -> Self {
        Self::new(Role::Human, content)
    }

    pub fn assistant(content: impl ToString) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// Same content, opposite role.
    pub fn flipped(self) -> Self {
        Self { role: self.role.flip(), content: self.content }
    }
}
