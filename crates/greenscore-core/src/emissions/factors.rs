//! Emission factor tables with region fallback.
//!
//! Precedence when resolving factors for a region:
//! 1. Climatiq API (only when a key is configured and the region is Kenya).
//! 2. Kenya-local fallback table.
//! 3. Global fallback table.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Where a factor set came from. Drives the confidence bonus in the
/// emission calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorSource {
    Climatiq,
    LocalKenya,
    GlobalFallback,
    ErrorFallback,
}

impl FactorSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactorSource::Climatiq => "climatiq",
            FactorSource::LocalKenya => "local_kenya",
            FactorSource::GlobalFallback => "global_fallback",
            FactorSource::ErrorFallback => "error_fallback",
        }
    }
}

/// One resolved set of emission factors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionFactors {
    /// Grid electricity factor (kg CO2 per kWh).
    pub grid_ef_kg_co2_kwh: Decimal,
    /// Diesel combustion factor (kg CO2 per litre), IPCC standard.
    pub diesel_kg_co2_liter: Decimal,
    /// Avoided emissions per kg of plastic recycled.
    pub plastic_kg_co2_kg: Decimal,
    /// Pumping energy per m3 of water.
    pub water_pump_kwh_m3: Decimal,
    pub source: FactorSource,
}

/// Kenya-specific fallback factors.
pub fn kenya_factors() -> EmissionFactors {
    EmissionFactors {
        grid_ef_kg_co2_kwh: dec!(0.45),
        diesel_kg_co2_liter: dec!(2.68),
        plastic_kg_co2_kg: dec!(6.0),
        water_pump_kwh_m3: dec!(0.5),
        source: FactorSource::LocalKenya,
    }
}

/// Global-average fallback factors.
pub fn global_factors() -> EmissionFactors {
    EmissionFactors {
        grid_ef_kg_co2_kwh: dec!(0.52),
        diesel_kg_co2_liter: dec!(2.68),
        plastic_kg_co2_kg: dec!(6.0),
        water_pump_kwh_m3: dec!(0.4),
        source: FactorSource::GlobalFallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kenya_grid_factor() {
        assert_eq!(kenya_factors().grid_ef_kg_co2_kwh, dec!(0.45));
    }

    #[test]
    fn test_global_grid_factor() {
        assert_eq!(global_factors().grid_ef_kg_co2_kwh, dec!(0.52));
    }

    #[test]
    fn test_diesel_factor_shared() {
        // IPCC diesel factor is region-independent
        assert_eq!(
            kenya_factors().diesel_kg_co2_liter,
            global_factors().diesel_kg_co2_liter
        );
    }
}
