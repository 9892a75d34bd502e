use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use greenscore_core::emissions::{self, EmissionCalculator, EmissionInput};

use crate::input;

/// Arguments for emission calculation
#[derive(Args)]
pub struct EmissionsArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for feature estimation from a purchase amount
#[derive(Args)]
pub struct EstimateFeaturesArgs {
    /// Purchase amount in KES
    #[arg(long)]
    pub amount: Decimal,
    /// Business sector (salon, farmer, welding, ...)
    #[arg(long)]
    pub sector: String,
    /// Action descriptor, e.g. "solar pump" or "led lighting"
    #[arg(long)]
    pub action: String,
}

pub fn run_emissions(args: EmissionsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let emission_input: EmissionInput =
        input::read_typed(args.input.as_deref(), "an emission input")?;
    let calculator = EmissionCalculator::from_env();
    let result = calculator.calculate(&emission_input);
    Ok(serde_json::to_value(result)?)
}

pub fn run_estimate_features(
    args: EstimateFeaturesArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let features = emissions::estimate_features(args.amount, &args.sector, &args.action);
    Ok(serde_json::to_value(features)?)
}
