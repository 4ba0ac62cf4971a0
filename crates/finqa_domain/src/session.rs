use derive_more::derive::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Thread key isolating one question's conversation from every other.
#[derive(Clone, Copy, Debug, Display, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn into_string(&self) -> String {
        self.0.to_string()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::generate()
    }
}
