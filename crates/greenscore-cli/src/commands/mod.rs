pub mod baseline;
pub mod confidence;
pub mod credits;
pub mod emissions;
pub mod pipeline;
pub mod scoring;
