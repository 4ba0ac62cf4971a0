use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Optional minus, optional dollar sign, digits with optional thousands
    /// separators and an optional fractional part.
    static ref NUMBER_PATTERN: Regex =
        Regex::new(r"-?\$?\d[\d,]*(?:\.\d+)?").expect("number pattern is valid");
}

/// A number pulled out of free-form text.
///
/// Integers and decimals are kept apart because the number of decimal places
/// in a ground truth decides how a prediction is rounded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    Float { value: f64, decimals: usize },
}

impl Number {
    pub fn float(value: f64, decimals: usize) -> Self {
        Number::Float { value, decimals }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(value) => *value as f64,
            Number::Float { value, .. } => *value,
        }
    }

    /// Digits written after the decimal point; zero for integers.
    pub fn decimals(&self) -> usize {
        match self {
            Number::Integer(_) => 0,
            Number::Float { decimals, .. } => *decimals,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(value) => write!(f, "{value}"),
            Number::Float { value, decimals } => write!(f, "{value:.decimals$}"),
        }
    }
}

/// Extracts the first number in `text`, ignoring currency signs and thousands
/// separators. Returns `None` when the text holds no number at all.
pub fn extract_number(text: &str) -> Option<Number> {
    let found = NUMBER_PATTERN.find(text)?;
    let cleaned: String = found
        .as_str()
        .chars()
        .filter(|c| !matches!(c, '$' | ','))
        .collect();

    match cleaned.split_once('.') {
        Some((_, fraction)) => cleaned
            .parse::<f64>()
            .ok()
            .map(|value| Number::float(value, fraction.len())),
        // Integers beyond i64 still carry a usable magnitude.
        None => cleaned
            .parse::<i64>()
            .map(Number::Integer)
            .or_else(|_| cleaned.parse::<f64>().map(|value| Number::float(value, 0)))
            .ok(),
    }
}
