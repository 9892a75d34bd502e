//! Deterministic CO2 emission calculator.
//!
//! Converts evidence-derived physical quantities into kg CO2 equivalent,
//! one contribution per channel, using region-resolved emission factors.
//! The public entry point never fails: internal errors produce a
//! zero-valued result with `method = "error_fallback"`.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::emissions::climatiq::ClimatiqClient;
use crate::emissions::factors::{self, EmissionFactors, FactorSource};
use crate::error::EngineError;
use crate::types::Confidence;
use crate::EngineResult;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Physical quantities extracted from evidence. Absence of a field means
/// "no evidence for this channel", not zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmissionFeatures {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kwh_saved: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diesel_liters_avoided: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plastic_kg_recycled: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_m3_saved: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solar_kwh_generated: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appliance_efficiency_gain: Option<Decimal>,
}

impl EmissionFeatures {
    fn fields(&self) -> [Option<Decimal>; 6] {
        [
            self.kwh_saved,
            self.diesel_liters_avoided,
            self.plastic_kg_recycled,
            self.water_m3_saved,
            self.solar_kwh_generated,
            self.appliance_efficiency_gain,
        ]
    }

    /// Number of usable signals. A negative quantity is malformed evidence
    /// and counts as absent.
    pub fn populated_count(&self) -> u32 {
        self.fields()
            .into_iter()
            .filter(|f| matches!(f, Some(v) if *v >= Decimal::ZERO))
            .count() as u32
    }

    /// Sum of all usable signal magnitudes, for outlier detection.
    pub fn aggregate_magnitude(&self) -> Decimal {
        self.fields()
            .into_iter()
            .filter_map(|f| f.filter(|v| *v >= Decimal::ZERO))
            .sum()
    }
}

/// Input for an emission calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionInput {
    pub evidence_id: String,
    pub sector: String,
    pub region: String,
    #[serde(default)]
    pub features: EmissionFeatures,
}

/// Result of an emission calculation. Immutable once created;
/// `co2_kg_total` always equals the sum of `co2_kg_components`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionResult {
    pub evidence_id: String,
    pub co2_kg_components: BTreeMap<String, Decimal>,
    pub co2_kg_total: Decimal,
    pub method: String,
    pub provenance: Map<String, Value>,
    pub confidence: Confidence,
}

impl EmissionResult {
    /// Zero-valued result returned when the calculation itself fails.
    pub fn error_fallback(evidence_id: &str) -> Self {
        EmissionResult {
            evidence_id: evidence_id.to_string(),
            co2_kg_components: BTreeMap::new(),
            co2_kg_total: Decimal::ZERO,
            method: "error_fallback".to_string(),
            provenance: Map::new(),
            confidence: Confidence::new(dec!(0.1)),
        }
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Deterministic CO2 emission calculator with optional Climatiq API lookup.
#[derive(Default)]
pub struct EmissionCalculator {
    climatiq: Option<ClimatiqClient>,
}

impl EmissionCalculator {
    /// Calculator using only the local factor tables.
    pub fn new() -> Self {
        EmissionCalculator { climatiq: None }
    }

    /// Calculator that tries the Climatiq API first for Kenyan regions.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        EmissionCalculator {
            climatiq: Some(ClimatiqClient::new(api_key)),
        }
    }

    /// Read the API key from `CLIMATIQ_API_KEY`; local-only when unset.
    pub fn from_env() -> Self {
        match std::env::var("CLIMATIQ_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Self::with_api_key(key),
            _ => Self::new(),
        }
    }

    /// Calculate CO2 savings from evidence features. Never fails.
    pub fn calculate(&self, input: &EmissionInput) -> EmissionResult {
        match self.try_calculate(input) {
            Ok(result) => result,
            Err(e) => {
                warn!(evidence_id = %input.evidence_id, error = %e, "emission calculation failed");
                EmissionResult::error_fallback(&input.evidence_id)
            }
        }
    }

    fn try_calculate(&self, input: &EmissionInput) -> EngineResult<EmissionResult> {
        let factors = self.resolve_factors(&input.region);
        let components = channel_contributions(&input.features, &factors)?;

        let mut total = Decimal::ZERO;
        for contribution in components.values() {
            total = total
                .checked_add(*contribution)
                .ok_or_else(|| EngineError::NumericOverflow {
                    context: "co2_kg_total".into(),
                })?;
        }

        let confidence = emission_confidence(&input.features, factors.source);

        let mut provenance = Map::new();
        provenance.insert("ef_source".into(), json!(factors.source.as_str()));
        provenance.insert(
            "ef_value".into(),
            json!(factors.grid_ef_kg_co2_kwh.to_string()),
        );
        provenance.insert("region".into(), json!(input.region));
        provenance.insert("sector".into(), json!(input.sector));
        provenance.insert("calculation_date".into(), json!(Utc::now().to_rfc3339()));

        Ok(EmissionResult {
            evidence_id: input.evidence_id.clone(),
            co2_kg_components: components,
            co2_kg_total: total,
            method: format!(
                "grid EF {} kgCO2/kWh + IPCC fuel factors ({})",
                factors.grid_ef_kg_co2_kwh,
                factors.source.as_str()
            ),
            provenance,
            confidence,
        })
    }

    /// Resolve factors with API -> local -> global precedence.
    fn resolve_factors(&self, region: &str) -> EmissionFactors {
        let is_kenya = region.eq_ignore_ascii_case("kenya");

        if is_kenya {
            if let Some(client) = &self.climatiq {
                if let Some(grid) = client.grid_factor("KE") {
                    let mut resolved = factors::kenya_factors();
                    resolved.grid_ef_kg_co2_kwh = grid.grid_ef_kg_co2_kwh;
                    resolved.source = FactorSource::Climatiq;
                    return resolved;
                }
            }
            return factors::kenya_factors();
        }

        factors::global_factors()
    }
}

// ---------------------------------------------------------------------------
// Channel contributions
// ---------------------------------------------------------------------------

fn channel_contributions(
    features: &EmissionFeatures,
    factors: &EmissionFactors,
) -> EngineResult<BTreeMap<String, Decimal>> {
    let mut components = BTreeMap::new();

    if let Some(kwh) = usable(features.kwh_saved) {
        components.insert(
            "energy_grid_kwh".to_string(),
            mul(kwh, factors.grid_ef_kg_co2_kwh, "energy_grid_kwh")?,
        );
    }

    if let Some(kwh) = usable(features.solar_kwh_generated) {
        components.insert(
            "solar_generation".to_string(),
            mul(kwh, factors.grid_ef_kg_co2_kwh, "solar_generation")?,
        );
    }

    if let Some(liters) = usable(features.diesel_liters_avoided) {
        components.insert(
            "diesel".to_string(),
            mul(liters, factors.diesel_kg_co2_liter, "diesel")?,
        );
    }

    if let Some(kg) = usable(features.plastic_kg_recycled) {
        components.insert(
            "plastic".to_string(),
            mul(kg, factors.plastic_kg_co2_kg, "plastic")?,
        );
    }

    // Water savings count through their pumping-energy equivalent.
    if let Some(m3) = usable(features.water_m3_saved) {
        let pump_kwh = mul(m3, factors.water_pump_kwh_m3, "water")?;
        components.insert(
            "water".to_string(),
            mul(pump_kwh, factors.grid_ef_kg_co2_kwh, "water")?,
        );
    }

    if let Some(kwh) = usable(features.appliance_efficiency_gain) {
        components.insert(
            "appliance_efficiency".to_string(),
            mul(kwh, factors.grid_ef_kg_co2_kwh, "appliance_efficiency")?,
        );
    }

    Ok(components)
}

/// Negative physical quantities are malformed evidence: no signal.
fn usable(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v >= Decimal::ZERO)
}

fn mul(a: Decimal, b: Decimal, context: &str) -> EngineResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| EngineError::NumericOverflow {
        context: context.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

const OUTLIER_MAGNITUDE: Decimal = dec!(10000);
const MINIMUM_MAGNITUDE: Decimal = dec!(1);

fn emission_confidence(features: &EmissionFeatures, source: FactorSource) -> Confidence {
    let mut confidence = dec!(0.5);

    // +0.1 per populated feature, capped at +0.3
    let feature_bonus = Decimal::from(features.populated_count()) * dec!(0.1);
    confidence += feature_bonus.min(dec!(0.3));

    confidence += match source {
        FactorSource::Climatiq => dec!(0.2),
        FactorSource::LocalKenya => dec!(0.1),
        FactorSource::GlobalFallback | FactorSource::ErrorFallback => Decimal::ZERO,
    };

    let magnitude = features.aggregate_magnitude();
    if magnitude > OUTLIER_MAGNITUDE {
        confidence -= dec!(0.2);
    } else if magnitude < MINIMUM_MAGNITUDE {
        confidence -= dec!(0.1);
    }

    Confidence::new(confidence.clamp(dec!(0.1), Decimal::ONE))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn input_with(features: EmissionFeatures) -> EmissionInput {
        EmissionInput {
            evidence_id: "ev-001".into(),
            sector: "salon".into(),
            region: "Kenya".into(),
            features,
        }
    }

    #[test]
    fn test_kenya_grid_channel() {
        // 100 kWh * 0.45 = 45.0 kg
        let calc = EmissionCalculator::new();
        let result = calc.calculate(&input_with(EmissionFeatures {
            kwh_saved: Some(dec!(100)),
            ..Default::default()
        }));
        assert_eq!(
            result.co2_kg_components.get("energy_grid_kwh"),
            Some(&dec!(45.00))
        );
        assert_eq!(result.co2_kg_total, dec!(45.00));
    }

    #[test]
    fn test_water_converts_through_pump_energy() {
        // 200 m3 * 0.5 kWh/m3 * 0.45 kg/kWh = 45.0 kg
        let calc = EmissionCalculator::new();
        let result = calc.calculate(&input_with(EmissionFeatures {
            water_m3_saved: Some(dec!(200)),
            ..Default::default()
        }));
        assert_eq!(result.co2_kg_components.get("water"), Some(&dec!(45.000)));
    }

    #[test]
    fn test_diesel_channel_ipcc_factor() {
        let calc = EmissionCalculator::new();
        let result = calc.calculate(&input_with(EmissionFeatures {
            diesel_liters_avoided: Some(dec!(10)),
            ..Default::default()
        }));
        assert_eq!(result.co2_kg_components.get("diesel"), Some(&dec!(26.80)));
    }

    #[test]
    fn test_total_equals_component_sum() {
        let calc = EmissionCalculator::new();
        let result = calc.calculate(&input_with(EmissionFeatures {
            kwh_saved: Some(dec!(100)),
            diesel_liters_avoided: Some(dec!(5)),
            plastic_kg_recycled: Some(dec!(20)),
            ..Default::default()
        }));
        let sum: Decimal = result.co2_kg_components.values().copied().sum();
        assert_eq!(result.co2_kg_total, sum);
    }

    #[test]
    fn test_no_features_zero_total() {
        let calc = EmissionCalculator::new();
        let result = calc.calculate(&input_with(EmissionFeatures::default()));
        assert!(result.co2_kg_components.is_empty());
        assert_eq!(result.co2_kg_total, Decimal::ZERO);
    }

    #[test]
    fn test_no_features_confidence() {
        // 0.5 base + 0.1 local Kenya - 0.1 below-minimum magnitude = 0.5
        let calc = EmissionCalculator::new();
        let result = calc.calculate(&input_with(EmissionFeatures::default()));
        assert_eq!(result.confidence.value(), dec!(0.5));
    }

    #[test]
    fn test_negative_feature_is_skipped() {
        let calc = EmissionCalculator::new();
        let result = calc.calculate(&input_with(EmissionFeatures {
            kwh_saved: Some(dec!(-50)),
            diesel_liters_avoided: Some(dec!(10)),
            ..Default::default()
        }));
        assert!(!result.co2_kg_components.contains_key("energy_grid_kwh"));
        assert!(result.co2_kg_total > Decimal::ZERO);
    }

    #[test]
    fn test_unknown_region_uses_global_factors() {
        // 100 kWh * 0.52 global factor = 52.0 kg
        let calc = EmissionCalculator::new();
        let result = calc.calculate(&EmissionInput {
            evidence_id: "ev-002".into(),
            sector: "salon".into(),
            region: "Atlantis".into(),
            features: EmissionFeatures {
                kwh_saved: Some(dec!(100)),
                ..Default::default()
            },
        });
        assert_eq!(result.co2_kg_total, dec!(52.00));
        assert_eq!(
            result.provenance.get("ef_source").unwrap(),
            &json!("global_fallback")
        );
    }

    #[test]
    fn test_outlier_magnitude_lowers_confidence() {
        // 0.5 + 0.1 (one feature) + 0.1 (local kenya) - 0.2 (outlier) = 0.5
        let calc = EmissionCalculator::new();
        let result = calc.calculate(&input_with(EmissionFeatures {
            kwh_saved: Some(dec!(50000)),
            ..Default::default()
        }));
        assert_eq!(result.confidence.value(), dec!(0.5));
    }

    #[test]
    fn test_feature_bonus_caps_at_three() {
        // 4 features: 0.5 + min(0.4, 0.3) + 0.1 = 0.9
        let calc = EmissionCalculator::new();
        let result = calc.calculate(&input_with(EmissionFeatures {
            kwh_saved: Some(dec!(100)),
            diesel_liters_avoided: Some(dec!(10)),
            plastic_kg_recycled: Some(dec!(5)),
            water_m3_saved: Some(dec!(50)),
            ..Default::default()
        }));
        assert_eq!(result.confidence.value(), dec!(0.9));
    }

    #[test]
    fn test_error_fallback_shape() {
        let result = EmissionResult::error_fallback("ev-404");
        assert_eq!(result.co2_kg_total, Decimal::ZERO);
        assert_eq!(result.method, "error_fallback");
        assert_eq!(result.confidence.value(), dec!(0.1));
    }
}
