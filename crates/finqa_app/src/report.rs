use finqa_domain::Transcript;
use finqa_verify::{MatchPolicy, Scorecard};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// A question that produced an answer and was scored.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct QuestionResult {
    pub id: String,
    pub question: String,
    pub ground_truth: String,
    pub prediction: String,
    pub steps: Vec<String>,
    #[serde(flatten)]
    pub scorecard: Scorecard,
    pub latency_secs: f64,
    pub transcript: Transcript,
}

/// A question that could not be scored, and why.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct QuestionFailure {
    pub id: String,
    pub question: String,
    pub reason: String,
    pub latency_secs: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Scored(QuestionResult),
    Failed(QuestionFailure),
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LatencyPercentiles {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
    pub p99: f64,
}

impl LatencyPercentiles {
    pub fn from_samples(samples: &[f64]) -> Self {
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self {
            p25: percentile(&sorted, 25.0),
            p50: percentile(&sorted, 50.0),
            p75: percentile(&sorted, 75.0),
            p95: percentile(&sorted, 95.0),
            p99: percentile(&sorted, 99.0),
        }
    }
}

/// Linear interpolation between closest ranks over sorted samples.
pub fn percentile(sorted: &[f64], percent: f64) -> f64 {
    match sorted {
        [] => 0.0,
        [only] => *only,
        _ => {
            let rank = percent / 100.0 * (sorted.len() - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
        }
    }
}

/// Accuracy of one policy as a percentage of scored questions.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct PolicyAccuracy {
    pub policy: MatchPolicy,
    pub matched: usize,
    pub percentage: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub scored: usize,
    pub failed: usize,
    pub accuracy: Vec<PolicyAccuracy>,
    pub latency: LatencyPercentiles,
}

impl Summary {
    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        let results: Vec<&QuestionResult> = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                Outcome::Scored(result) => Some(result),
                Outcome::Failed(_) => None,
            })
            .collect();
        let scored = results.len();

        let accuracy = MatchPolicy::iter()
            .map(|policy| {
                let matched = results
                    .iter()
                    .filter(|result| result.scorecard.get(policy))
                    .count();
                let percentage = if scored == 0 {
                    0.0
                } else {
                    matched as f64 / scored as f64 * 100.0
                };
                PolicyAccuracy { policy, matched, percentage }
            })
            .collect();

        // Failed questions are left out of the latency figures too.
        let latencies: Vec<f64> = results.iter().map(|result| result.latency_secs).collect();

        Self {
            total: outcomes.len(),
            scored,
            failed: outcomes.len() - scored,
            accuracy,
            latency: LatencyPercentiles::from_samples(&latencies),
        }
    }

    pub fn accuracy_of(&self, policy: MatchPolicy) -> Option<&PolicyAccuracy> {
        self.accuracy.iter().find(|accuracy| accuracy.policy == policy)
    }
}

/// Everything an evaluation run produced, ready to be written as JSON.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct EvaluationReport {
    pub summary: Summary,
    pub outcomes: Vec<Outcome>,
}

impl EvaluationReport {
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Self { summary: Summary::from_outcomes(&outcomes), outcomes }
    }

    pub fn results(&self) -> impl Iterator<Item = &QuestionResult> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            Outcome::Scored(result) => Some(result),
            Outcome::Failed(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &QuestionFailure> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            Outcome::Failed(failure) => Some(failure),
            Outcome::Scored(_) => None,
        })
    }
}
