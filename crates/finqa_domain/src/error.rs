use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A transient failure (rate limit, timeout, dropped connection) that is
    /// worth another attempt.
    #[error("{0}")]
    Retryable(anyhow::Error),

    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Invalid transcript: {0}")]
    InvalidTranscript(String),

    #[error("No structured answer was produced")]
    NoStructuredAnswer,

    #[error("Structured answer could not be parsed: {0}")]
    MalformedAnswer(anyhow::Error),

    #[error("Cannot render an empty table")]
    EmptyTable,
}

impl Error {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Retryable(_))
    }
}
