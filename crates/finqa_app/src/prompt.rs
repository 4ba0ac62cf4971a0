use strum_macros::{Display, EnumIter};

/// Templates the evaluation renders, by their registered name.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Prompt {
    FinancialAnalyst,
    Critic,
    UserProxy,
    AnswerRepair,
}

impl Prompt {
    pub fn name(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use finqa_template::TemplateEngine;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_every_prompt_is_bundled() {
        let engine = TemplateEngine::new().unwrap();
        for prompt in Prompt::iter() {
            assert!(engine.has_template(&prompt.name()), "missing {prompt}");
        }
    }
}
