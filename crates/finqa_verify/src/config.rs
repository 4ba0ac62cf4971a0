use derive_setters::Setters;
use serde::{Deserialize, Serialize};

/// Relative tolerance of the numeric-with-units policy.
///
/// Loose on purpose so that model output which drifts in formatting or
/// rounding still scores; earlier harness versions used 0.01.
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 0.1;

/// Absolute tolerance of the plain numeric policy.
pub const DEFAULT_ABSOLUTE_TOLERANCE: f64 = 0.5;

/// Minimum similarity ratio accepted by the fuzzy string policy.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.9;

/// How a prediction is brought to whole units when the ground truth has no
/// decimal places. Predictions compared against decimal ground truths are
/// always rounded to the nearest value at that precision.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    #[default]
    Nearest,
    Truncate,
}

impl Rounding {
    pub fn apply(self, value: f64, decimals: usize) -> f64 {
        if decimals == 0 {
            return match self {
                Rounding::Nearest => value.round(),
                Rounding::Truncate => value.trunc(),
            };
        }
        let factor = 10f64.powi(decimals as i32);
        (value * factor).round() / factor
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Setters)]
#[setters(into)]
pub struct MatchConfig {
    pub relative_tolerance: f64,
    pub absolute_tolerance: f64,
    pub similarity_threshold: f64,
    pub rounding: Rounding,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            relative_tolerance: DEFAULT_RELATIVE_TOLERANCE,
            absolute_tolerance: DEFAULT_ABSOLUTE_TOLERANCE,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            rounding: Rounding::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_rounding_to_whole_units() {
        assert_eq!(Rounding::Nearest.apply(41.6, 0), 42.0);
        assert_eq!(Rounding::Truncate.apply(41.6, 0), 41.0);
        assert_eq!(Rounding::Nearest.apply(-10.6, 0), -11.0);
        assert_eq!(Rounding::Truncate.apply(-10.6, 0), -10.0);
    }

    #[test]
    fn test_rounding_to_decimal_places() {
        assert_eq!(Rounding::Nearest.apply(1.234, 2), 1.23);
        assert_eq!(Rounding::Truncate.apply(1.236, 2), 1.24);
    }

    #[test]
    fn test_match_config_setters() {
        let actual = MatchConfig::default()
            .relative_tolerance(0.01)
            .rounding(Rounding::Truncate);

        assert_eq!(actual.relative_tolerance, 0.01);
        assert_eq!(actual.absolute_tolerance, DEFAULT_ABSOLUTE_TOLERANCE);
        assert_eq!(actual.similarity_threshold, DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(actual.rounding, Rounding::Truncate);
    }
}
