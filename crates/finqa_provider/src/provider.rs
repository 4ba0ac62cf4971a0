use anyhow::{Context as _, Result};
use finqa_domain::{ChatContext, ChatService, Error as DomainError, RetryConfig};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::debug;
use url::Url;

use crate::request::{Request, RequestMessage};
use crate::response::Response;
use crate::{Error, ProviderConfig, ProviderKind, into_retry};

/// Chat-completions client for OpenAI and Azure OpenAI deployments.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    config: ProviderConfig,
    retry_config: RetryConfig,
}

impl OpenAiProvider {
    pub fn new(config: ProviderConfig, retry_config: RetryConfig) -> Result<Self> {
        if config.kind == ProviderKind::Azure && config.api_version.is_none() {
            return Err(Error::MissingApiVersion.into());
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config, retry_config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn url(&self) -> Result<Url> {
        let mut base = self.config.base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        let path = match self.config.kind {
            ProviderKind::OpenAi => "chat/completions".to_string(),
            ProviderKind::Azure => {
                format!("openai/deployments/{}/chat/completions", self.config.model)
            }
        };

        let mut url = base
            .join(&path)
            .with_context(|| format!("Failed to append {path} to base URL: {base}"))?;
        if let (ProviderKind::Azure, Some(version)) = (self.config.kind, &self.config.api_version) {
            url.query_pairs_mut().append_pair("api-version", version);
        }
        Ok(url)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if !self.config.api_key.is_empty() {
            match self.config.kind {
                ProviderKind::OpenAi => {
                    let value = HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
                        .context("API key is not a valid header value")?;
                    headers.insert(AUTHORIZATION, value);
                }
                ProviderKind::Azure => {
                    let value = HeaderValue::from_str(&self.config.api_key)
                        .context("API key is not a valid header value")?;
                    headers.insert("api-key", value);
                }
            }
        }
        Ok(headers)
    }

    fn request(&self, context: ChatContext) -> Request {
        let messages = context
            .system
            .map(RequestMessage::system)
            .into_iter()
            .chain(context.messages.into_iter().map(RequestMessage::from))
            .collect();
        Request {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
        }
    }

    async fn complete(&self, context: ChatContext) -> Result<String> {
        let url = self.url()?;
        let session = context.session;
        let request = self.request(context);
        debug!(%session, %url, messages = request.messages.len(), "Sending chat completion");

        let response = self
            .client
            .post(url.clone())
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::InvalidStatusCode { status: status.as_u16(), body }.into());
        }

        let response: Response = response
            .json()
            .await
            .with_context(|| format!("Failed to decode chat completion from {url}"))?;
        response
            .into_content()
            .ok_or_else(|| DomainError::EmptyResponse.into())
    }
}

#[async_trait::async_trait]
impl ChatService for OpenAiProvider {
    async fn chat(&self, context: ChatContext) -> Result<String> {
        self.complete(context)
            .await
            .map_err(|error| into_retry(error, &self.retry_config))
    }
}
