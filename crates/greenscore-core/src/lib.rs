pub mod baseline;
pub mod confidence;
pub mod credits;
pub mod emissions;
pub mod error;
pub mod evidence;
pub mod pipeline;
pub mod scoring;
pub mod types;

pub use error::EngineError;
pub use types::*;

/// Standard result type for all engine operations
pub type EngineResult<T> = Result<T, EngineError>;
