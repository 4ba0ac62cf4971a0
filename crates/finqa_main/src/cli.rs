use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use finqa_app::{DEFAULT_MAX_MESSAGES, DEFAULT_SENTINEL, RefinementConfig, RunnerConfig};
use finqa_provider::{Error as ProviderError, OPENAI_BASE_URL, ProviderConfig, ProviderKind};
use finqa_verify::{DEFAULT_RELATIVE_TOLERANCE, MatchConfig};
use url::Url;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    Openai,
    Azure,
}

impl From<Provider> for ProviderKind {
    fn from(value: Provider) -> Self {
        match value {
            Provider::Openai => ProviderKind::OpenAi,
            Provider::Azure => ProviderKind::Azure,
        }
    }
}

/// Evaluate a generator/critic refinement loop on FinQA.
#[derive(Parser, Debug)]
#[command(name = "finqa", version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Model name, or deployment name for Azure.
    #[arg(long)]
    pub model: String,

    /// Sampling temperature between 0.0 and 1.0.
    #[arg(long, value_parser = parse_temperature)]
    pub temperature: f32,

    /// Path to the FinQA JSON dataset.
    #[arg(long)]
    pub data_path: PathBuf,

    /// Print every question with its prediction and steps.
    #[arg(long, default_value_t = false)]
    pub verbose: bool,

    /// Evaluate only the first N records.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Records evaluated concurrently.
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Write the full JSON report to this file.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Directory of `.hbs` files overriding the bundled prompts.
    #[arg(long)]
    pub templates_dir: Option<PathBuf>,

    /// Stop refining once the transcript grows past this many messages.
    #[arg(long, default_value_t = DEFAULT_MAX_MESSAGES)]
    pub max_messages: usize,

    /// Critic reply that accepts the latest answer.
    #[arg(long, default_value = DEFAULT_SENTINEL)]
    pub sentinel: String,

    /// Abort a model call after this many seconds.
    #[arg(long)]
    pub call_timeout_secs: Option<u64>,

    /// Relative tolerance of the unit-aware numerical match.
    #[arg(long, default_value_t = DEFAULT_RELATIVE_TOLERANCE)]
    pub relative_tolerance: f64,

    #[arg(long, value_enum, default_value_t = Provider::Openai)]
    pub provider: Provider,

    /// Provider base URL; for Azure, the resource endpoint. Azure falls back
    /// to AZURE_OPENAI_ENDPOINT.
    #[arg(long)]
    pub base_url: Option<Url>,

    /// API key; falls back to OPENAI_API_KEY or AZURE_OPENAI_API_KEY.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Azure OpenAI API version; falls back to OPENAI_API_VERSION.
    #[arg(long)]
    pub api_version: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, default_value_t = false)]
    pub log_json: bool,
}

fn parse_temperature(value: &str) -> Result<f32, String> {
    let temperature: f32 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if !(0.0..=1.0).contains(&temperature) {
        return Err(format!("temperature must be between 0.0 and 1.0, got {temperature}"));
    }
    Ok(temperature)
}

impl Cli {
    pub fn provider_config(&self) -> anyhow::Result<ProviderConfig> {
        self.provider_config_with(|name| std::env::var(name).ok())
    }

    /// Same as [`Cli::provider_config`], reading environment variables
    /// through `env`.
    pub fn provider_config_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<ProviderConfig> {
        let kind = ProviderKind::from(self.provider);
        let (base_url, key_variable) = match kind {
            ProviderKind::OpenAi => {
                let base_url = match &self.base_url {
                    Some(url) => url.clone(),
                    None => Url::parse(OPENAI_BASE_URL).context("Invalid default base URL")?,
                };
                (base_url, "OPENAI_API_KEY")
            }
            ProviderKind::Azure => {
                let base_url = match &self.base_url {
                    Some(url) => url.clone(),
                    None => {
                        let endpoint =
                            env("AZURE_OPENAI_ENDPOINT").ok_or(ProviderError::MissingEndpoint)?;
                        Url::parse(&endpoint)
                            .with_context(|| format!("Invalid Azure endpoint: {endpoint}"))?
                    }
                };
                (base_url, "AZURE_OPENAI_API_KEY")
            }
        };

        let api_key = self
            .api_key
            .clone()
            .or_else(|| env(key_variable))
            .with_context(|| format!("No API key given; pass --api-key or set {key_variable}"))?;

        let mut config = ProviderConfig::new(kind, base_url, &self.model)
            .api_key(api_key)
            .temperature(self.temperature);
        if let Some(version) = self.api_version.clone().or_else(|| env("OPENAI_API_VERSION")) {
            config = config.api_version(version);
        }
        Ok(config)
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig::default().relative_tolerance(self.relative_tolerance)
    }

    pub fn refinement_config(&self) -> RefinementConfig {
        let config = RefinementConfig::default()
            .max_messages(self.max_messages)
            .sentinel(&self.sentinel);
        match self.call_timeout_secs {
            Some(secs) => config.call_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }

    pub fn runner_config(&self) -> RunnerConfig {
        let config = RunnerConfig::default().concurrency(self.concurrency);
        match self.limit {
            Some(limit) => config.limit(limit),
            None => config,
        }
    }
}
