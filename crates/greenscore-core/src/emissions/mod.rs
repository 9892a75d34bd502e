//! CO2 emission calculation from evidence-derived physical quantities.

pub mod calculator;
pub mod climatiq;
pub mod estimate;
pub mod factors;

pub use calculator::{EmissionCalculator, EmissionFeatures, EmissionInput, EmissionResult};
pub use estimate::estimate_features;
pub use factors::{EmissionFactors, FactorSource};
