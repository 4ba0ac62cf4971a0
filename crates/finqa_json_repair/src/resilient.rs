use serde::Deserialize;

use crate::{JsonRepairError, json_repair};

/// Reads model output as `T`.
///
/// Clean JSON is taken as is; anything else (prose around the object, fenced
/// blocks, JSON5 syntax, truncation) goes through [`json_repair`].
pub fn from_str<T>(text: &str) -> Result<T, JsonRepairError>
where
    T: for<'de> Deserialize<'de>,
{
    let strict_error = match serde_json::from_str::<T>(text) {
        Ok(value) => return Ok(value),
        Err(error) => error,
    };

    tracing::debug!(error = %strict_error, chars = text.len(), "Output is not plain JSON, repairing");
    json_repair::<T>(text).inspect_err(|error| {
        tracing::warn!(error = %error, "Could not repair model output");
    })
}
