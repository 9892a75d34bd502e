mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::baseline::{BaselineArgs, PercentileArgs};
use commands::confidence::ConfidenceArgs;
use commands::credits::{CreditsArgs, PoolArgs, RecommendArgs};
use commands::emissions::{EmissionsArgs, EstimateFeaturesArgs};
use commands::pipeline::PipelineArgs;
use commands::scoring::ScoreArgs;

/// Deterministic GreenScore and carbon-credit calculations
#[derive(Parser)]
#[command(
    name = "gsc",
    version,
    about = "Deterministic GreenScore and carbon-credit calculations",
    long_about = "A CLI for the GreenScore engine: CO2 emission calculation from \
                  evidence features, pillar-weighted GreenScore computation, carbon \
                  credit eligibility and pooling, and confidence/review assessment. \
                  All arithmetic uses decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate CO2 emissions from evidence features
    Emissions(EmissionsArgs),
    /// Estimate emission features from a purchase amount
    EstimateFeatures(EstimateFeaturesArgs),
    /// Compute a GreenScore from an emission result and user metrics
    Score(ScoreArgs),
    /// Calculate carbon credit eligibility across standards
    Credits(CreditsArgs),
    /// Aggregate pooled credits by standard
    Pool(PoolArgs),
    /// Recommend a carbon credit strategy
    Recommend(RecommendArgs),
    /// Evaluate confidence and review triggers for a pipeline outcome
    Confidence(ConfidenceArgs),
    /// Run the full evidence pipeline end to end
    Pipeline(PipelineArgs),
    /// Show sector baseline statistics
    Baseline(BaselineArgs),
    /// Percentile of a value within a sector distribution
    Percentile(PercentileArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Emissions(args) => commands::emissions::run_emissions(args),
        Commands::EstimateFeatures(args) => commands::emissions::run_estimate_features(args),
        Commands::Score(args) => commands::scoring::run_score(args),
        Commands::Credits(args) => commands::credits::run_credits(args),
        Commands::Pool(args) => commands::credits::run_pool(args),
        Commands::Recommend(args) => commands::credits::run_recommend(args),
        Commands::Confidence(args) => commands::confidence::run_confidence(args),
        Commands::Pipeline(args) => commands::pipeline::run_pipeline(args),
        Commands::Baseline(args) => commands::baseline::run_baseline(args),
        Commands::Percentile(args) => commands::baseline::run_percentile(args),
        Commands::Version => {
            println!("gsc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
