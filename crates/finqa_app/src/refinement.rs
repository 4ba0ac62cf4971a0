use std::time::Duration;

use anyhow::Context as _;
use derive_setters::Setters;
use finqa_domain::{Error, Message, SessionId, SwapRoles, Transcript, Transformer};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::debug;

use crate::Capability;

pub const DEFAULT_MAX_MESSAGES: usize = 6;
pub const DEFAULT_SENTINEL: &str = "ALL_OK";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Setters)]
#[setters(into)]
pub struct RefinementConfig {
    /// The loop stops once the transcript holds more messages than this.
    pub max_messages: usize,
    /// Critic verdict that accepts the latest answer.
    pub sentinel: String,
    /// Upper bound on a single model call.
    #[setters(strip_option)]
    pub call_timeout: Option<Duration>,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            sentinel: DEFAULT_SENTINEL.to_string(),
            call_timeout: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum Step {
    Generate,
    Reflect,
    Done,
}

/// Whether another critique round is warranted after a generation.
///
/// Stops when the transcript has outgrown `max_messages` or when the message
/// right before the newest answer carries the sentinel.
pub fn should_continue(transcript: &Transcript, config: &RefinementConfig) -> bool {
    if transcript.len() > config.max_messages {
        return false;
    }
    !transcript
        .second_to_last()
        .is_some_and(|message| message.content.contains(&config.sentinel))
}

pub fn next_step(step: Step, transcript: &Transcript, config: &RefinementConfig) -> Step {
    match step {
        Step::Generate if should_continue(transcript, config) => Step::Reflect,
        Step::Generate => Step::Done,
        Step::Reflect => Step::Generate,
        Step::Done => Step::Done,
    }
}

/// Alternates a generator and a critic over one question's transcript.
pub struct RefinementLoop<G, C> {
    generator: G,
    critic: C,
    config: RefinementConfig,
}

impl<G: Capability, C: Capability> RefinementLoop<G, C> {
    pub fn new(generator: G, critic: C, config: RefinementConfig) -> Self {
        Self { generator, critic, config }
    }

    pub fn config(&self) -> &RefinementConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn critic(&self) -> &C {
        &self.critic
    }

    /// Runs the loop to completion. Any failed model call aborts the run.
    pub async fn run(&self, session: &SessionId, question: Message) -> anyhow::Result<Transcript> {
        let mut transcript = Transcript::new(question)?;
        let mut step = Step::Generate;

        loop {
            match step {
                Step::Generate => {
                    let history = transcript.messages().to_vec();
                    let reply = self
                        .call(&self.generator, session, history)
                        .await
                        .context("Generator failed")?;
                    transcript.push(Message::assistant(reply));
                }
                Step::Reflect => {
                    let history = SwapRoles::new().transform(transcript.messages().to_vec());
                    let reply = self
                        .call(&self.critic, session, history)
                        .await
                        .context("Critic failed")?;
                    transcript.push(Message::human(reply));
                }
                Step::Done => return Ok(transcript),
            }

            step = next_step(step, &transcript, &self.config);
            debug!(%session, %step, messages = transcript.len(), "Refinement step");
        }
    }

    async fn call(
        &self,
        capability: &impl Capability,
        session: &SessionId,
        history: Vec<Message>,
    ) -> anyhow::Result<String> {
        let invocation = capability.invoke(session, history);
        match self.config.call_timeout {
            Some(limit) => tokio::time::timeout(limit, invocation)
                .await
                .map_err(|_| Error::Timeout(limit))?,
            None => invocation.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use finqa_domain::Role;
    use pretty_assertions::assert_eq;

    use super::*;

    /// Replies from a script and records every history it was shown.
    struct Scripted {
        replies: Mutex<Vec<String>>,
        seen: Mutex<Vec<Vec<Message>>>,
        fallback: String,
    }

    impl Scripted {
        fn new(replies: &[&str], fallback: &str) -> Self {
            Self {
                replies: Mutex::new(replies.iter().rev().map(ToString::to_string).collect()),
                seen: Mutex::new(Vec::new()),
                fallback: fallback.to_string(),
            }
        }

        fn always(reply: &str) -> Self {
            Self::new(&[], reply)
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl Capability for Scripted {
        async fn invoke(&self, _: &SessionId, history: Vec<Message>) -> anyhow::Result<String> {
            self.seen.lock().unwrap().push(history);
            let next = self.replies.lock().unwrap().pop();
            Ok(next.unwrap_or_else(|| self.fallback.clone()))
        }
    }

    struct Failing;

    #[async_trait::async_trait]
    impl Capability for Failing {
        async fn invoke(&self, _: &SessionId, _: Vec<Message>) -> anyhow::Result<String> {
            Err(anyhow::anyhow!("service unavailable"))
        }
    }

    struct Slow;

    #[async_trait::async_trait]
    impl Capability for Slow {
        async fn invoke(&self, _: &SessionId, _: Vec<Message>) -> anyhow::Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("late".to_string())
        }
    }

    fn transcript(messages: Vec<Message>) -> Transcript {
        Transcript::try_from(messages).unwrap()
    }

    #[test]
    fn test_next_step_transitions() {
        let config = RefinementConfig::default();
        let fixture = transcript(vec![Message::human("Q"), Message::assistant("A1")]);

        assert_eq!(next_step(Step::Generate, &fixture, &config), Step::Reflect);
        assert_eq!(next_step(Step::Reflect, &fixture, &config), Step::Generate);
        assert_eq!(next_step(Step::Done, &fixture, &config), Step::Done);
    }

    #[test]
    fn test_should_continue_stops_on_sentinel_verdict() {
        let config = RefinementConfig::default();
        let fixture = transcript(vec![
            Message::human("Q"),
            Message::assistant("A1"),
            Message::human("Looks right. ALL_OK"),
            Message::assistant("A2"),
        ]);

        assert!(!should_continue(&fixture, &config));
    }

    #[test]
    fn test_should_continue_stops_on_sentinel_in_question() {
        let config = RefinementConfig::default();
        let fixture = transcript(vec![Message::human("Reply ALL_OK?"), Message::assistant("A1")]);

        assert!(!should_continue(&fixture, &config));
    }

    #[test]
    fn test_should_continue_stops_past_max_messages() {
        let config = RefinementConfig::default().max_messages(2usize);
        let within = transcript(vec![Message::human("Q"), Message::assistant("A1")]);
        let beyond = transcript(vec![
            Message::human("Q"),
            Message::assistant("A1"),
            Message::human("C1"),
        ]);

        assert!(should_continue(&within, &config));
        assert!(!should_continue(&beyond, &config));
    }

    #[tokio::test]
    async fn test_run_without_sentinel_hits_the_cap() {
        let generator = Scripted::always("answer");
        let critic = Scripted::always("try again");
        let fixture = RefinementLoop::new(generator, critic, RefinementConfig::default());

        let actual = fixture.run(&SessionId::generate(), Message::human("Q")).await.unwrap();

        let roles: Vec<Role> = actual.messages().iter().map(|m| m.role).collect();
        let expected = vec![
            Role::Human,
            Role::Assistant,
            Role::Human,
            Role::Assistant,
            Role::Human,
            Role::Assistant,
            Role::Human,
            Role::Assistant,
        ];
        assert_eq!(roles, expected);
        assert_eq!(fixture.generator.calls(), 4);
        assert_eq!(fixture.critic.calls(), 3);
    }

    #[tokio::test]
    async fn test_run_stops_after_sentinel() {
        let generator = Scripted::new(&["A1", "A2"], "unused");
        let critic = Scripted::new(&["ALL_OK"], "unused");
        let fixture = RefinementLoop::new(generator, critic, RefinementConfig::default());

        let actual = fixture.run(&SessionId::generate(), Message::human("Q")).await.unwrap();

        let expected = vec![
            Message::human("Q"),
            Message::assistant("A1"),
            Message::human("ALL_OK"),
            Message::assistant("A2"),
        ];
        assert_eq!(actual.into_messages(), expected);
    }

    #[tokio::test]
    async fn test_critic_sees_role_swapped_transcript() {
        let generator = Scripted::new(&["A1", "A2"], "unused");
        let critic = Scripted::new(&["ALL_OK"], "unused");
        let fixture = RefinementLoop::new(generator, critic, RefinementConfig::default());

        fixture.run(&SessionId::generate(), Message::human("Q")).await.unwrap();

        let actual = fixture.critic.seen.lock().unwrap().clone();
        let expected = vec![vec![Message::human("Q"), Message::human("A1")]];
        assert_eq!(actual, expected);

        let generator_seen = fixture.generator.seen.lock().unwrap().clone();
        assert_eq!(
            generator_seen[1],
            vec![Message::human("Q"), Message::assistant("A1"), Message::human("ALL_OK")]
        );
    }

    #[tokio::test]
    async fn test_run_stops_when_question_carries_sentinel() {
        let generator = Scripted::always("A1");
        let critic = Scripted::always("unused");
        let fixture = RefinementLoop::new(generator, critic, RefinementConfig::default());

        let actual = fixture
            .run(&SessionId::generate(), Message::human("Answer, then say ALL_OK"))
            .await
            .unwrap();

        assert_eq!(actual.len(), 2);
        assert_eq!(fixture.critic.calls(), 0);
    }

    #[tokio::test]
    async fn test_custom_sentinel() {
        let generator = Scripted::new(&["A1", "A2"], "unused");
        let critic = Scripted::new(&["ALL_OK", "LGTM"], "unused");
        let config = RefinementConfig::default().sentinel("LGTM");
        let fixture = RefinementLoop::new(generator, critic, config);

        let actual = fixture.run(&SessionId::generate(), Message::human("Q")).await.unwrap();

        assert_eq!(actual.len(), 6);
        assert_eq!(actual.last(), Some(&Message::assistant("unused")));
    }

    #[tokio::test]
    async fn test_failure_aborts_run() {
        let fixture = RefinementLoop::new(Failing, Scripted::always("ok"), RefinementConfig::default());

        let actual = fixture.run(&SessionId::generate(), Message::human("Q")).await;

        assert!(actual.is_err());
        assert_eq!(fixture.critic.calls(), 0);
    }

    #[tokio::test]
    async fn test_critic_failure_aborts_run() {
        let fixture = RefinementLoop::new(Scripted::always("A"), Failing, RefinementConfig::default());

        let actual = fixture.run(&SessionId::generate(), Message::human("Q")).await;

        assert!(actual.is_err());
        assert_eq!(fixture.generator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_timeout_aborts_run() {
        let config = RefinementConfig::default().call_timeout(Duration::from_secs(5));
        let fixture = RefinementLoop::new(Slow, Scripted::always("ok"), config);

        let actual = fixture.run(&SessionId::generate(), Message::human("Q")).await.unwrap_err();

        let timeout = actual.downcast_ref::<Error>();
        assert!(matches!(timeout, Some(Error::Timeout(limit)) if *limit == Duration::from_secs(5)));
    }
}
