use finqa_domain::{Error as DomainError, RetryConfig};

use crate::Error;

/// Marks transient provider failures as [`DomainError::Retryable`] so the
/// retry layer picks them up; everything else is returned untouched.
pub fn into_retry(error: anyhow::Error, retry_config: &RetryConfig) -> anyhow::Error {
    if let Some(code) = get_api_status_code(&error).or(get_req_status_code(&error))
        && retry_config.retry_status_codes.contains(&code)
    {
        return DomainError::Retryable(error).into();
    }

    if is_req_transport_error(&error) || is_empty_error(&error) {
        return DomainError::Retryable(error).into();
    }

    error
}

fn get_api_status_code(error: &anyhow::Error) -> Option<u16> {
    error.downcast_ref::<Error>().and_then(|error| match error {
        Error::InvalidStatusCode { status, .. } => Some(*status),
        _ => None,
    })
}

fn get_req_status_code(error: &anyhow::Error) -> Option<u16> {
    error
        .downcast_ref::<reqwest::Error>()
        .and_then(|error| error.status())
        .map(|status| status.as_u16())
}

fn is_req_transport_error(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<reqwest::Error>()
        .is_some_and(|error| error.is_timeout() || error.is_connect())
}

fn is_empty_error(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<DomainError>()
        .is_some_and(|error| matches!(error, DomainError::EmptyResponse))
}
