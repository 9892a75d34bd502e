//! User sustainability metrics and their estimation from evidence signals.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::emissions::EmissionResult;
use crate::evidence::EvidenceSignals;

/// Sustainability metrics for one business, annualized. Absent fields
/// contribute nothing to the score; they are not errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetrics {
    /// Share of energy from renewables, 0-1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewable_pct: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kwh_saved_ann: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_m3_saved_ann: Option<Decimal>,
    /// Share of waste recycled, 0-1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waste_recycled_pct: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waste_kg_recycled_ann: Option<Decimal>,
    /// Share of inputs sourced locally, 0-1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_sourcing_pct: Option<Decimal>,
    #[serde(default)]
    pub nema_certified: bool,
    #[serde(default)]
    pub community_training: bool,
}

impl UserMetrics {
    /// Number of metrics carrying a positive signal, for the score
    /// confidence ladder.
    pub fn populated_positive_count(&self) -> u32 {
        let quantities = [
            self.renewable_pct,
            self.kwh_saved_ann,
            self.water_m3_saved_ann,
            self.waste_recycled_pct,
            self.waste_kg_recycled_ann,
            self.local_sourcing_pct,
        ];
        let quantity_count = quantities
            .iter()
            .filter(|m| matches!(m, Some(v) if *v > Decimal::ZERO))
            .count() as u32;
        quantity_count + self.nema_certified as u32 + self.community_training as u32
    }
}

/// Estimate user metrics from emission results and evidence signals.
/// Rule-based; anything the evidence does not support stays absent.
pub fn estimate_user_metrics(
    emission: &EmissionResult,
    sector: &str,
    signals: &EvidenceSignals,
) -> UserMetrics {
    let mut metrics = UserMetrics::default();

    // Solar evidence implies a renewable share typical for the sector
    if signals.labels_contain("solar") {
        metrics.renewable_pct = match sector.to_lowercase().as_str() {
            "salon" => Some(dec!(0.6)),
            "farmer" => Some(dec!(0.8)),
            "welding" => Some(dec!(0.4)),
            _ => None,
        };
    }

    // Annualize energy savings back out of the CO2 total (monthly evidence,
    // Kenya grid factor)
    if emission.co2_kg_total > Decimal::ZERO {
        metrics.kwh_saved_ann = Some(emission.co2_kg_total / dec!(0.45) * dec!(12));
    }

    if signals.labels_contain("led") {
        metrics.waste_recycled_pct = Some(dec!(0.3));
    }

    if sector.eq_ignore_ascii_case("farmer")
        && (signals.items_contain("drip") || signals.items_contain("irrigation"))
    {
        metrics.water_m3_saved_ann = Some(dec!(800.0));
    }

    if signals.vendor_contains_any(&["certified", "approved", "licensed"]) {
        metrics.nema_certified = true;
    }

    metrics
}
