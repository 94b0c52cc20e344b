use anyhow::Context;
use clap::Parser;
use colored::*;
use gitagent::{analyze_repository_with_config, logging, AnalysisOutcome, Config};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(author, version, about = "Review a GitHub repository with a language model", long_about = None)]
struct Cli {
    /// GitHub repository URL, e.g. https://github.com/owner/repository
    url: String,

    /// GitHub token; falls back to GITHUB_TOKEN
    #[arg(short, long)]
    token: Option<String>,

    /// Configuration file (TOML); defaults to the user config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level: error, warn, info, debug or trace
    #[arg(short, long, env = "GITAGENT_LOG", default_value = "info")]
    log_level: String,

    /// Also write the report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::load()?,
    }
    .with_env_overrides();

    println!("{} {}", "Analyzing repository:".bright_green(), cli.url.bright_white());

    let outcome = match analyze_repository_with_config(&cli.url, cli.token.clone(), &config).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".bright_red(), e.to_string().bright_red());
            process::exit(1);
        }
    };

    println!("\n{}", "===== REPOSITORY ANALYSIS =====".bright_yellow().bold());
    println!("{}", outcome);

    if let AnalysisOutcome::Report(report) = &outcome {
        if let Some(path) = &cli.output {
            tokio::fs::write(path, report)
                .await
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("\n{} {}", "[SAVED]".bright_blue(), path.display().to_string().bright_white());
        }
    }

    Ok(())
}
