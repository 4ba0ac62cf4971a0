use colored::Colorize;
use finqa_app::{QuestionFailure, QuestionResult, Summary};

pub fn print_result(result: &QuestionResult) {
    let verdict = if result.scorecard.numerical_match_with_units {
        "PASS".green().bold()
    } else {
        "FAIL".red().bold()
    };
    println!("{} {} {}", verdict, result.id.dimmed(), result.question);
    for step in &result.steps {
        println!("    {}", step.dimmed());
    }
    println!(
        "    expected {} got {} ({:.1}s)",
        result.ground_truth.bold(),
        result.prediction.bold(),
        result.latency_secs
    );
}

pub fn print_failures<'a>(failures: impl Iterator<Item = &'a QuestionFailure>) {
    for failure in failures {
        println!(
            "{} {} {}: {}",
            "ERROR".yellow().bold(),
            failure.id.dimmed(),
            failure.question,
            failure.reason
        );
    }
}

pub fn print_summary(summary: &Summary) {
    println!();
    println!(
        "{} {} questions, {} scored, {} failed",
        "Summary".bold(),
        summary.total,
        summary.scored,
        summary.failed
    );
    for accuracy in &summary.accuracy {
        println!(
            "  {:<22} {:>7.2}% ({}/{})",
            accuracy.policy.to_string(),
            accuracy.percentage,
            accuracy.matched,
            summary.scored
        );
    }
    let latency = &summary.latency;
    println!(
        "  {:<22} p25 {:.2}s  p50 {:.2}s  p75 {:.2}s  p95 {:.2}s  p99 {:.2}s",
        "latency", latency.p25, latency.p50, latency.p75, latency.p95, latency.p99
    );
}
