use super::Transformer;
use crate::Message;

/// Presents a transcript from the critic's point of view.
///
/// The opening question keeps its role; every later message has its role
/// inverted, so the generator's answers reach the critic as human turns and
/// earlier critiques appear as the critic's own replies.
#[derive(Default)]
pub struct SwapRoles;

impl SwapRoles {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for SwapRoles {
    type Value = Vec<Message>;

    fn transform(&mut self, messages: Self::Value) -> Self::Value {
        messages
            .into_iter()
            .enumerate()
            .map(|(index, message)| if index == 0 { message } else { message.flipped() })
            .collect()
    }
}
