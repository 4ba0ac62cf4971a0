use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Final structured output of the financial analyst.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct StructuredAnswer {
    /// Calculation steps for the analysis
    pub steps: Vec<String>,
    /// Final numerical answer
    pub answer: String,
}

impl StructuredAnswer {
    pub fn new(steps: Vec<String>, answer: impl ToString) -> Self {
        Self { steps, answer: answer.to_string() }
    }

    /// Pretty printed JSON schema, used to tell a model which shape to emit.
    pub fn schema() -> String {
        let schema = schemars::schema_for!(StructuredAnswer);
        serde_json::to_string_pretty(&schema).unwrap_or_default()
    }
}
