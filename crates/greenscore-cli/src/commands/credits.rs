use clap::Args;
use serde_json::Value;

use greenscore_core::credits::{self, CarbonCredit, CreditInput};

use crate::input;

/// Arguments for carbon credit calculation
#[derive(Args)]
pub struct CreditsArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for pool aggregation
#[derive(Args)]
pub struct PoolArgs {
    /// Path to a JSON/YAML file holding a credit list
    #[arg(long)]
    pub input: Option<String>,
    /// Name for the aggregated pool
    #[arg(long, default_value = "Kenya_SME_Pool")]
    pub pool_name: String,
}

/// Arguments for credit strategy recommendation
#[derive(Args)]
pub struct RecommendArgs {
    /// Path to a JSON/YAML file holding a credit list
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_credits(args: CreditsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let credit_input: CreditInput = input::read_typed(args.input.as_deref(), "a credit input")?;
    let credits = credits::calculate_carbon_credits(&credit_input);
    Ok(serde_json::to_value(credits)?)
}

pub fn run_pool(args: PoolArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let credits: Vec<CarbonCredit> =
        input::read_typed(args.input.as_deref(), "a carbon credit list")?;
    let aggregation = credits::aggregate_pool_credits(&credits, &args.pool_name);
    Ok(serde_json::to_value(aggregation)?)
}

pub fn run_recommend(args: RecommendArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let credits: Vec<CarbonCredit> =
        input::read_typed(args.input.as_deref(), "a carbon credit list")?;
    let recommendation = credits::credit_recommendations(&credits);
    Ok(serde_json::to_value(recommendation)?)
}
