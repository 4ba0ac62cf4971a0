use std::sync::Arc;
use std::time::Duration;

use finqa_domain::{ChatContext, ChatService, Message, RetryConfig, SessionId};
use finqa_template::TemplateEngine;
use serde_json::json;
use tracing::warn;

use crate::{Prompt, retry_with_config};

/// Something that turns a conversation into the next reply.
#[async_trait::async_trait]
pub trait Capability: Send + Sync {
    async fn invoke(&self, session: &SessionId, history: Vec<Message>) -> anyhow::Result<String>;
}

/// A chat model behind a fixed system prompt, retried on transient failures.
#[derive(Clone)]
pub struct Agent {
    name: String,
    system_prompt: Option<String>,
    service: Arc<dyn ChatService>,
    retry_config: RetryConfig,
}

impl Agent {
    pub fn new(name: impl Into<String>, service: Arc<dyn ChatService>) -> Self {
        Self {
            name: name.into(),
            system_prompt: None,
            service,
            retry_config: RetryConfig::default(),
        }
    }

    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The generator: works the problem and emits a structured answer.
    pub fn financial_analyst(
        templates: &TemplateEngine,
        service: Arc<dyn ChatService>,
    ) -> anyhow::Result<Self> {
        let system_prompt = templates.render(&Prompt::FinancialAnalyst.name(), &json!({}))?;
        Ok(Self::new("financial_analyst", service).system_prompt(system_prompt))
    }

    /// The critic: reviews the analyst and answers `sentinel` once satisfied.
    pub fn critic(
        templates: &TemplateEngine,
        sentinel: &str,
        service: Arc<dyn ChatService>,
    ) -> anyhow::Result<Self> {
        let system_prompt =
            templates.render(&Prompt::Critic.name(), &json!({ "sentinel": sentinel }))?;
        Ok(Self::new("critic", service).system_prompt(system_prompt))
    }
}

#[async_trait::async_trait]
impl Capability for Agent {
    async fn invoke(&self, session: &SessionId, history: Vec<Message>) -> anyhow::Result<String> {
        let name = self.name.clone();
        let session = *session;
        retry_with_config(
            &self.retry_config,
            || {
                let mut context = ChatContext::new(session, history.clone());
                if let Some(system_prompt) = &self.system_prompt {
                    context = context.system(system_prompt.clone());
                }
                self.service.chat(context)
            },
            Some(move |error: &anyhow::Error, delay: Duration| {
                warn!(agent = %name, %session, error = %error, ?delay, "Retrying model call");
            }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use finqa_domain::Error;
    use pretty_assertions::assert_eq;

    use super::*;

    /// Fails with a retryable error `failures` times, then echoes the last
    /// message.
    struct Flaky {
        failures: Mutex<usize>,
        contexts: Mutex<Vec<ChatContext>>,
    }

    impl Flaky {
        fn new(failures: usize) -> Self {
            Self { failures: Mutex::new(failures), contexts: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait::async_trait]
    impl ChatService for Flaky {
        async fn chat(&self, context: ChatContext) -> anyhow::Result<String> {
            let reply = context.messages.last().map(|m| m.content.clone()).unwrap_or_default();
            self.contexts.lock().unwrap().push(context);

            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(Error::Retryable(anyhow::anyhow!("rate limited")).into());
            }
            Ok(reply)
        }
    }

    fn retry_config() -> RetryConfig {
        RetryConfig::default().min_delay_ms(1u64)
    }

    #[tokio::test]
    async fn test_invoke_sends_system_prompt_and_history() {
        let service = Arc::new(Flaky::new(0));
        let agent = Agent::new("echo", service.clone())
            .system_prompt("be brief")
            .retry_config(retry_config());
        let session = SessionId::generate();

        let actual = agent.invoke(&session, vec![Message::human("hello")]).await.unwrap();

        assert_eq!(actual, "hello");
        let contexts = service.contexts.lock().unwrap();
        let expected = ChatContext::new(session, vec![Message::human("hello")]).system("be brief");
        assert_eq!(*contexts, vec![expected]);
    }

    #[tokio::test]
    async fn test_invoke_retries_transient_failures() {
        let service = Arc::new(Flaky::new(2));
        let agent = Agent::new("echo", service.clone()).retry_config(retry_config());

        let actual = agent
            .invoke(&SessionId::generate(), vec![Message::human("hello")])
            .await
            .unwrap();

        assert_eq!(actual, "hello");
        assert_eq!(service.contexts.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_invoke_gives_up_after_max_attempts() {
        let service = Arc::new(Flaky::new(10));
        let agent = Agent::new("echo", service.clone()).retry_config(retry_config());

        let actual = agent.invoke(&SessionId::generate(), vec![Message::human("hello")]).await;

        assert!(actual.is_err());
        assert_eq!(service.contexts.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_critic_prompt_names_the_sentinel() {
        let templates = TemplateEngine::new().unwrap();
        let agent = Agent::critic(&templates, "LGTM", Arc::new(Flaky::new(0))).unwrap();

        assert_eq!(agent.name(), "critic");
        assert!(agent.system_prompt.unwrap().contains("LGTM"));
    }
}
