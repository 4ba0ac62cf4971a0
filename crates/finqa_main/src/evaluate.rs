use std::sync::Arc;

use anyhow::Context as _;
use finqa_app::{
    Agent, EvaluationReport, EvaluationRunner, RefinementLoop, RepairingAnswerParser,
    ResponseExtractor, load_records,
};
use finqa_domain::{ChatService, RetryConfig};
use finqa_provider::OpenAiProvider;
use finqa_template::TemplateEngine;
use finqa_verify::Matcher;
use tracing::info;

use crate::Cli;

/// Runs the whole evaluation described by `cli` and persists the report when
/// an output path is given.
pub async fn evaluate(cli: &Cli) -> anyhow::Result<EvaluationReport> {
    let templates = Arc::new(match &cli.templates_dir {
        Some(dir) => TemplateEngine::with_overrides(dir)?,
        None => TemplateEngine::new()?,
    });

    let retry_config = RetryConfig::default();
    let provider_config = cli.provider_config()?;
    info!(provider = %provider_config.kind, model = %provider_config.model, "Using provider");
    let service: Arc<dyn ChatService> =
        Arc::new(OpenAiProvider::new(provider_config, retry_config.clone())?);

    let refinement_config = cli.refinement_config();
    let generator = Agent::financial_analyst(&templates, service.clone())?
        .retry_config(retry_config.clone());
    let critic = Agent::critic(&templates, &refinement_config.sentinel, service.clone())?
        .retry_config(retry_config.clone());
    let repairer = Agent::new("answer_repair", service).retry_config(retry_config);

    let runner = EvaluationRunner::new(
        RefinementLoop::new(generator, critic, refinement_config),
        ResponseExtractor::new(RepairingAnswerParser::new(repairer, templates.clone())),
        Matcher::new(cli.match_config()),
        templates,
        cli.runner_config(),
    );

    let records = load_records(&cli.data_path).await?;
    let report = runner.run(&records).await;

    if let Some(path) = &cli.output {
        let json = serde_json::to_string_pretty(&report)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "Report written");
    }

    Ok(report)
}
