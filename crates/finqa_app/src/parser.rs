use std::sync::Arc;

use finqa_domain::{Message, SessionId, StructuredAnswer};
use finqa_json_repair::from_str;
use finqa_template::TemplateEngine;
use serde_json::json;
use tracing::{debug, warn};

use crate::{Capability, Prompt};

/// Turns the text of a structured reply into a [`StructuredAnswer`].
///
/// `prompt` is the question the reply answers, when the caller has it.
#[async_trait::async_trait]
pub trait AnswerParser: Send + Sync {
    async fn parse(&self, text: &str, prompt: Option<&str>) -> anyhow::Result<StructuredAnswer>;
}

/// Local parsing only: fenced-block extraction plus lenient JSON repair.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonAnswerParser;

#[async_trait::async_trait]
impl AnswerParser for JsonAnswerParser {
    async fn parse(&self, text: &str, _: Option<&str>) -> anyhow::Result<StructuredAnswer> {
        Ok(from_str::<StructuredAnswer>(text)?)
    }
}

/// Falls back to asking a model to rewrite output that cannot be repaired
/// locally into the answer schema.
pub struct RepairingAnswerParser<C> {
    repairer: C,
    templates: Arc<TemplateEngine>,
}

impl<C: Capability> RepairingAnswerParser<C> {
    pub fn new(repairer: C, templates: Arc<TemplateEngine>) -> Self {
        Self { repairer, templates }
    }
}

#[async_trait::async_trait]
impl<C: Capability> AnswerParser for RepairingAnswerParser<C> {
    async fn parse(&self, text: &str, prompt: Option<&str>) -> anyhow::Result<StructuredAnswer> {
        let error = match from_str::<StructuredAnswer>(text) {
            Ok(answer) => return Ok(answer),
            Err(error) => error,
        };
        let Some(prompt) = prompt else {
            return Err(error.into());
        };

        debug!(error = %error, "Asking the model to repair a structured answer");
        let request = self.templates.render(
            &Prompt::AnswerRepair.name(),
            &json!({
                "prompt": prompt,
                "completion": text,
                "error": error.to_string(),
                "schema": StructuredAnswer::schema(),
            }),
        )?;

        let reply = self
            .repairer
            .invoke(&SessionId::generate(), vec![Message::human(request)])
            .await?;
        from_str::<StructuredAnswer>(&reply)
            .inspect_err(|error| warn!(error = %error, "Repaired answer is still not valid"))
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;

    struct Repairer {
        reply: String,
        requests: Mutex<Vec<Vec<Message>>>,
    }

    impl Repairer {
        fn new(reply: &str) -> Self {
            Self { reply: reply.to_string(), requests: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait::async_trait]
    impl Capability for Repairer {
        async fn invoke(&self, _: &SessionId, history: Vec<Message>) -> anyhow::Result<String> {
            self.requests.lock().unwrap().push(history);
            Ok(self.reply.clone())
        }
    }

    fn templates() -> Arc<TemplateEngine> {
        Arc::new(TemplateEngine::new().unwrap())
    }

    #[tokio::test]
    async fn test_json_parser_reads_fenced_block() {
        let fixture = "Steps done.\n```json\n{\"steps\": [\"a\"], \"answer\": \"5%\"}\n```";
        let actual = JsonAnswerParser.parse(fixture, None).await.unwrap();
        let expected = StructuredAnswer::new(vec!["a".to_string()], "5%");
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_json_parser_rejects_prose() {
        let actual = JsonAnswerParser.parse("the answer is five", None).await;
        assert!(actual.is_err());
    }

    #[tokio::test]
    async fn test_repairing_parser_skips_model_for_valid_json() {
        let fixture = RepairingAnswerParser::new(Repairer::new("unused"), templates());

        let actual = fixture
            .parse(r#"{"steps": [], "answer": "7"}"#, Some("Q"))
            .await
            .unwrap();

        assert_eq!(actual, StructuredAnswer::new(vec![], "7"));
        assert!(fixture.repairer.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repairing_parser_asks_model_with_schema() {
        let fixture = RepairingAnswerParser::new(
            Repairer::new(r#"{"steps": ["10 / 2 = 5"], "answer": "5"}"#),
            templates(),
        );

        let actual = fixture
            .parse("json: the answer is 5", Some("What is 10 / 2?"))
            .await
            .unwrap();

        assert_eq!(actual, StructuredAnswer::new(vec!["10 / 2 = 5".to_string()], "5"));
        let requests = fixture.repairer.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0][0].content;
        assert!(request.contains("What is 10 / 2?"));
        assert!(request.contains("json: the answer is 5"));
        assert!(request.contains("\"answer\""));
    }

    #[tokio::test]
    async fn test_repairing_parser_without_prompt_fails_locally() {
        let fixture = RepairingAnswerParser::new(Repairer::new("{}"), templates());

        let actual = fixture.parse("not json at all", None).await;

        assert!(actual.is_err());
        assert!(fixture.repairer.requests.lock().unwrap().is_empty());
    }
}
