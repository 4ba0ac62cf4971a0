use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use tracing::debug;

use crate::{MatchConfig, extract_number, similarity_ratio};

/// The ways a prediction can be compared with its ground truth.
#[derive(Clone, Copy, Debug, Display, Serialize, Deserialize, PartialEq, Eq, Hash, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchPolicy {
    Exact,
    Numerical,
    NumericalWithUnits,
    Approximate,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct MatchResult {
    pub policy: MatchPolicy,
    pub matched: bool,
}

/// Outcome of every policy for one prediction.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scorecard {
    pub exact_match: bool,
    pub numerical_match: bool,
    pub numerical_match_with_units: bool,
    pub approx_match: bool,
}

impl Scorecard {
    pub fn get(&self, policy: MatchPolicy) -> bool {
        match policy {
            MatchPolicy::Exact => self.exact_match,
            MatchPolicy::Numerical => self.numerical_match,
            MatchPolicy::NumericalWithUnits => self.numerical_match_with_units,
            MatchPolicy::Approximate => self.approx_match,
        }
    }
}

/// Plain string equality.
pub fn exact_match(ground_truth: &str, prediction: &str) -> bool {
    ground_truth == prediction
}

/// Compares the first number of each side within an absolute tolerance.
/// A side without a number counts as zero, so two empty strings match.
pub fn numerical_match(ground_truth: &str, prediction: &str, config: &MatchConfig) -> bool {
    let expected = extract_number(ground_truth.trim())
        .map(|number| number.as_f64())
        .unwrap_or_default();
    let actual = extract_number(prediction.trim())
        .map(|number| number.as_f64())
        .unwrap_or_default();
    (expected - actual).abs() <= config.absolute_tolerance
}

/// Whatever surrounds the number in a ground truth, such as `%` or `$`.
pub fn unit_of(value: &str) -> &str {
    value
        .trim_matches(|c: char| c.is_ascii_digit() || matches!(c, '-' | ',' | '.'))
        .trim()
}

/// Compares numbers only when the prediction carries the ground truth's
/// unit, after rounding the prediction to the ground truth's precision.
pub fn numerical_match_with_units(
    ground_truth: &str,
    prediction: &str,
    config: &MatchConfig,
) -> bool {
    let ground_truth = ground_truth.trim();
    let prediction = prediction.trim();

    if ground_truth.is_empty() && prediction.is_empty() {
        return true;
    }

    let unit = unit_of(ground_truth);
    if !unit.is_empty() && !prediction.contains(unit) {
        debug!(unit, prediction, "Unit missing from prediction");
        return false;
    }

    let (Some(expected), Some(actual)) = (extract_number(ground_truth), extract_number(prediction))
    else {
        return false;
    };

    let rounded = config.rounding.apply(actual.as_f64(), expected.decimals());
    is_close(expected.as_f64(), rounded, config.relative_tolerance)
}

/// Fuzzy match on the character similarity ratio.
pub fn approx_string_match(ground_truth: &str, prediction: &str, threshold: f64) -> bool {
    similarity_ratio(ground_truth, prediction) >= threshold
}

fn is_close(left: f64, right: f64, relative_tolerance: f64) -> bool {
    if left == right {
        return true;
    }
    (left - right).abs() <= relative_tolerance * left.abs().max(right.abs())
}

/// Applies the match policies with a shared configuration.
#[derive(Clone, Debug, Default)]
pub struct Matcher {
    config: MatchConfig,
}

impl Matcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn check(&self, policy: MatchPolicy, ground_truth: &str, prediction: &str) -> MatchResult {
        let matched = match policy {
            MatchPolicy::Exact => exact_match(ground_truth, prediction),
            MatchPolicy::Numerical => numerical_match(ground_truth, prediction, &self.config),
            MatchPolicy::NumericalWithUnits => {
                numerical_match_with_units(ground_truth, prediction, &self.config)
            }
            MatchPolicy::Approximate => {
                approx_string_match(ground_truth, prediction, self.config.similarity_threshold)
            }
        };
        MatchResult { policy, matched }
    }

    pub fn score(&self, ground_truth: &str, prediction: &str) -> Scorecard {
        let scorecard = Scorecard {
            exact_match: exact_match(ground_truth, prediction),
            numerical_match: numerical_match(ground_truth, prediction, &self.config),
            numerical_match_with_units: numerical_match_with_units(
                ground_truth,
                prediction,
                &self.config,
            ),
            approx_match: approx_string_match(
                ground_truth,
                prediction,
                self.config.similarity_threshold,
            ),
        };
        debug!(ground_truth, prediction, ?scorecard, "Scored prediction");
        scorecard
    }
}
