use derive_setters::Setters;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Setters, PartialEq)]
#[setters(into)]
pub struct RetryConfig {
    /// Minimum delay in milliseconds between retry attempts
    pub min_delay_ms: u64,

    /// Backoff multiplication factor for each retry attempt
    pub backoff_factor: u64,

    /// Maximum number of calls, the first one included
    pub max_attempts: usize,

    /// HTTP status codes that should trigger retries
    pub retry_status_codes: Vec<u16>,

    /// Maximum delay between retries in seconds
    pub max_delay: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 1000,
            backoff_factor: 2,
            max_attempts: 3,
            retry_status_codes: vec![429, 500, 502, 503, 504, 408],
            max_delay: Some(60),
        }
    }
}
