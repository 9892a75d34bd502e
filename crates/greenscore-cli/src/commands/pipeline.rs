use clap::Args;
use serde_json::Value;

use greenscore_core::emissions::EmissionCalculator;
use greenscore_core::pipeline::{self, PipelineRequest};

use crate::input;

/// Arguments for a full pipeline run
#[derive(Args)]
pub struct PipelineArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_pipeline(args: PipelineArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: PipelineRequest =
        input::read_typed(args.input.as_deref(), "a pipeline request")?;
    let calculator = EmissionCalculator::from_env();
    let result = pipeline::run_pipeline(&calculator, &request);
    Ok(serde_json::to_value(result)?)
}
