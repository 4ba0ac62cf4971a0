use std::path::Path;

use anyhow::Context as _;
use finqa_domain::QaRecord;
use tracing::info;

/// Reads a FinQA JSON array from disk.
pub async fn load_records(path: impl AsRef<Path>) -> anyhow::Result<Vec<QaRecord>> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;
    let records: Vec<QaRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse dataset {}", path.display()))?;
    info!(path = %path.display(), records = records.len(), "Loaded dataset");
    Ok(records)
}
