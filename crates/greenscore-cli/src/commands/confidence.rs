use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use greenscore_core::confidence::{self, SectorContext, UserHistory};
use greenscore_core::pipeline::PipelineOutcome;

use crate::input;

/// Arguments for confidence evaluation
#[derive(Args)]
pub struct ConfidenceArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

/// A pipeline outcome plus the caller-supplied context it is judged
/// against.
#[derive(Deserialize)]
struct ConfidenceRequest {
    outcome: PipelineOutcome,
    #[serde(default)]
    user_history: UserHistory,
    #[serde(default)]
    sector_context: SectorContext,
}

pub fn run_confidence(args: ConfidenceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: ConfidenceRequest =
        input::read_typed(args.input.as_deref(), "a confidence request")?;
    let assessment = confidence::evaluate_confidence(
        &request.outcome,
        &request.user_history,
        &request.sector_context,
    );
    Ok(serde_json::to_value(assessment)?)
}
