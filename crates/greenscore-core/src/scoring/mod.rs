//! GreenScore computation: pillar subscores, sector weighting, and the
//! explanation/action trail.

pub mod computer;
pub mod metrics;

pub use computer::{compute_score, GreenScoreResult, ScoreInput};
pub use metrics::{estimate_user_metrics, UserMetrics};
