use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use greenscore_core::baseline;

/// Arguments for sector baseline lookup
#[derive(Args)]
pub struct BaselineArgs {
    /// Business sector (salon, farmer, welding, ...)
    #[arg(long)]
    pub sector: String,
    /// Region
    #[arg(long, default_value = "Kenya")]
    pub region: String,
}

/// Arguments for percentile calculation
#[derive(Args)]
pub struct PercentileArgs {
    /// Observed value
    #[arg(long)]
    pub value: Decimal,
    /// Distribution mean
    #[arg(long)]
    pub mean: Decimal,
    /// Distribution standard deviation
    #[arg(long)]
    pub std: Decimal,
}

pub fn run_baseline(args: BaselineArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let baseline = baseline::get_baseline(&args.sector, &args.region);
    let weights = baseline::sector_weights(&args.sector);
    Ok(json!({
        "baseline": baseline,
        "weights": weights,
    }))
}

pub fn run_percentile(args: PercentileArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let percentile = baseline::percentile(args.value, args.mean, args.std);
    Ok(json!({ "percentile": percentile }))
}
