#[derive(Debug, thiserror::Error)]
pub enum JsonRepairError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON could not be repaired: {0}")]
    Unrepairable(String),

    #[error("No JSON value found in text")]
    NotFound,
}

pub type Result<T, E = JsonRepairError> = std::result::Result<T, E>;
