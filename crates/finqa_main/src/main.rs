use anyhow::Result;
use clap::Parser;
use finqa_main::{Cli, evaluate, init_tracing, print_failures, print_result, print_summary};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let report = evaluate(&cli).await?;

    if cli.verbose {
        report.results().for_each(print_result);
        print_failures(report.failures());
    }
    print_summary(&report.summary);

    Ok(())
}
