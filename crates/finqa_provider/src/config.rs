use std::time::Duration;

use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use url::Url;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1/";

#[derive(Clone, Copy, Debug, Default, Display, EnumString, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    #[strum(serialize = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
    Azure,
}

/// Connection settings for a chat-completions endpoint.
///
/// For Azure the `base_url` is the resource endpoint and `model` is the
/// deployment name.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Setters)]
#[setters(into)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub base_url: Url,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    #[setters(strip_option)]
    pub api_version: Option<String>,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind, base_url: Url, model: impl Into<String>) -> Self {
        Self {
            kind,
            base_url,
            api_key: String::new(),
            model: model.into(),
            temperature: 0.0,
            api_version: None,
            timeout: Duration::from_secs(120),
        }
    }
}
