use clap::Args;
use serde_json::Value;

use greenscore_core::scoring::{self, ScoreInput};

use crate::input;

/// Arguments for GreenScore computation
#[derive(Args)]
pub struct ScoreArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_score(args: ScoreArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let score_input: ScoreInput = input::read_typed(args.input.as_deref(), "a score input")?;
    let result = scoring::compute_score(&score_input);
    Ok(serde_json::to_value(result)?)
}
