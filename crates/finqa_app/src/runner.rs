use std::sync::Arc;
use std::time::Instant;

use derive_setters::Setters;
use finqa_domain::{
    Message, QaPair, QaRecord, SessionId, StructuredAnswer, Transcript, markdown_table, paragraph,
};
use finqa_template::TemplateEngine;
use finqa_verify::Matcher;
use futures::StreamExt;
use futures::stream;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    AnswerParser, Capability, EvaluationReport, Outcome, Prompt, QuestionFailure, QuestionResult,
    RefinementLoop, ResponseExtractor,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Setters)]
#[setters(into)]
pub struct RunnerConfig {
    /// Records evaluated at the same time. Questions of one record always run
    /// in order.
    pub concurrency: usize,
    /// Evaluate only the first `limit` records.
    #[setters(strip_option)]
    pub limit: Option<usize>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { concurrency: 1, limit: None }
    }
}

/// The grounding text shared by every question of a record.
#[derive(Debug, Serialize)]
struct Document {
    pre_text: String,
    table: String,
    post_text: String,
}

#[derive(Serialize)]
struct UserPrompt<'a> {
    question: &'a str,
    #[serde(flatten)]
    document: &'a Document,
}

pub struct EvaluationRunner<G, C, P> {
    refinement: RefinementLoop<G, C>,
    extractor: ResponseExtractor<P>,
    matcher: Matcher,
    templates: Arc<TemplateEngine>,
    config: RunnerConfig,
}

impl<G: Capability, C: Capability, P: AnswerParser> EvaluationRunner<G, C, P> {
    pub fn new(
        refinement: RefinementLoop<G, C>,
        extractor: ResponseExtractor<P>,
        matcher: Matcher,
        templates: Arc<TemplateEngine>,
        config: RunnerConfig,
    ) -> Self {
        Self { refinement, extractor, matcher, templates, config }
    }

    /// Evaluates every question of `records`. Failed questions are recorded
    /// in the report and never stop the run.
    pub async fn run(&self, records: &[QaRecord]) -> EvaluationReport {
        let limit = self.config.limit.unwrap_or(records.len());
        let outcomes: Vec<Vec<Outcome>> = stream::iter(records.iter().take(limit))
            .map(|record| self.evaluate_record(record))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let report = EvaluationReport::new(outcomes.into_iter().flatten().collect());
        info!(
            total = report.summary.total,
            scored = report.summary.scored,
            failed = report.summary.failed,
            "Evaluation finished"
        );
        report
    }

    async fn evaluate_record(&self, record: &QaRecord) -> Vec<Outcome> {
        let pairs = record.qa_pairs();
        info!(record = %record.id, questions = pairs.len(), "Evaluating record");

        let document = markdown_table(&record.table).map(|table| Document {
            pre_text: paragraph(&record.pre_text),
            table,
            post_text: paragraph(&record.post_text),
        });

        let mut outcomes = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let started = Instant::now();
            let evaluated = match &document {
                Ok(document) => self.evaluate_question(document, pair).await,
                Err(error) => Err(anyhow::anyhow!("{error}")),
            };
            let latency_secs = started.elapsed().as_secs_f64();

            let outcome = match evaluated {
                Ok((answer, transcript)) => {
                    let scorecard = self.matcher.score(&pair.answer, &answer.answer);
                    Outcome::Scored(QuestionResult {
                        id: record.id.clone(),
                        question: pair.question.clone(),
                        ground_truth: pair.answer.clone(),
                        prediction: answer.answer,
                        steps: answer.steps,
                        scorecard,
                        latency_secs,
                        transcript,
                    })
                }
                Err(error) => {
                    warn!(
                        record = %record.id,
                        question = %pair.question,
                        error = %error,
                        "Question failed"
                    );
                    Outcome::Failed(QuestionFailure {
                        id: record.id.clone(),
                        question: pair.question.clone(),
                        reason: format!("{error:#}"),
                        latency_secs,
                    })
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn evaluate_question(
        &self,
        document: &Document,
        pair: &QaPair,
    ) -> anyhow::Result<(StructuredAnswer, Transcript)> {
        let prompt = self.templates.render(
            &Prompt::UserProxy.name(),
            &UserPrompt { question: &pair.question, document },
        )?;

        let session = SessionId::generate();
        let transcript = self.refinement.run(&session, Message::human(prompt)).await?;
        let answer = self.extractor.extract(&transcript).await?;
        info!(%session, answer = %answer.answer, messages = transcript.len(), "Question answered");
        Ok((answer, transcript))
    }
}
