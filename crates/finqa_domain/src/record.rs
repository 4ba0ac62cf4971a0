use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A scalar cell of a financial table.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TableCell {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for TableCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableCell::Bool(value) => write!(f, "{value}"),
            TableCell::Number(value) => write!(f, "{value}"),
            TableCell::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for TableCell {
    fn from(value: &str) -> Self {
        TableCell::Text(value.to_string())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QaPair {
    pub question: String,
    #[serde(deserialize_with = "string_or_number")]
    pub answer: String,
}

impl QaPair {
    pub fn new(question: impl ToString, answer: impl ToString) -> Self {
        Self { question: question.to_string(), answer: answer.to_string() }
    }
}

/// One document of the FinQA dataset with its questions.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QaRecord {
    pub id: String,
    #[serde(default)]
    pub pre_text: Vec<String>,
    #[serde(default)]
    pub post_text: Vec<String>,
    #[serde(default)]
    pub table: Vec<Vec<TableCell>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qa: Option<QaPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qa_0: Option<QaPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qa_1: Option<QaPair>,
}

impl QaRecord {
    /// Question/answer pairs in evaluation order: `qa_0`, `qa_1`, then `qa`.
    pub fn qa_pairs(&self) -> Vec<&QaPair> {
        [&self.qa_0, &self.qa_1, &self.qa]
            .into_iter()
            .filter_map(Option::as_ref)
            .collect()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_deserializes_finqa_record() {
        let fixture = r#"{
            "id": "ADI/2009/page_49.pdf-1",
            "pre_text": ["interest rate to a variable interest rate ."],
            "post_text": ["fair value ."],
            "table": [["", "2009", "2008"], ["net income", 1000, 12.5], ["audited", true, false]],
            "qa": {"question": "what is the change?", "answer": "380", "program": "subtract(1, 2)"}
        }"#;

        let actual: QaRecord = serde_json::from_str(fixture).unwrap();

        assert_eq!(actual.id, "ADI/2009/page_49.pdf-1");
        assert_eq!(actual.table[1][1].to_string(), "1000");
        assert_eq!(actual.table[1][2].to_string(), "12.5");
        assert_eq!(actual.table[2][1], TableCell::Bool(true));
        assert_eq!(actual.qa_pairs(), vec![&QaPair::new("what is the change?", "380")]);
    }

    #[test]
    fn test_numeric_answers_become_strings() {
        let fixture = r#"{"question": "q", "answer": 14.1}"#;
        let actual: QaPair = serde_json::from_str(fixture).unwrap();
        assert_eq!(actual.answer, "14.1");
    }

    #[test]
    fn test_qa_pairs_order() {
        let fixture = QaRecord {
            id: "1".to_string(),
            pre_text: vec![],
            post_text: vec![],
            table: vec![],
            qa: Some(QaPair::new("third", "3")),
            qa_0: Some(QaPair::new("first", "1")),
            qa_1: Some(QaPair::new("second", "2")),
        };

        let actual: Vec<&str> = fixture
            .qa_pairs()
            .into_iter()
            .map(|pair| pair.question.as_str())
            .collect();

        assert_eq!(actual, vec!["first", "second", "third"]);
    }
}
