//! Sector baseline statistics for relative scoring.
//!
//! Covers:
//! 1. **Baselines** -- per-sector Kenya survey statistics (energy, CO2,
//!    water, adoption rates), with an "other" bucket for unknown sectors.
//! 2. **Sector weights** -- pillar weights per sector, summing to 1.0.
//! 3. **Percentile** -- closed-form normal-CDF approximation over a
//!    sector mean/std pair.
//! 4. **Comparison & suggestions** -- user metrics vs baseline percentiles
//!    and the sector-specific improvement actions they drive.
//!
//! Pure lookups and arithmetic; none of these operations can fail.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Pillar;

// ---------------------------------------------------------------------------
// Baseline data
// ---------------------------------------------------------------------------

/// Baseline statistics for one (sector, region) pair. Read-only reference
/// data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorBaseline {
    pub sector: String,
    pub region: String,
    pub baseline: BTreeMap<String, Decimal>,
    pub data_source: String,
    pub last_updated: NaiveDate,
}

fn stats(entries: &[(&str, Decimal)]) -> BTreeMap<String, Decimal> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
}

/// Baseline statistics for a sector. Unknown sectors fall back to the
/// "other" bucket; this never fails.
pub fn get_baseline(sector: &str, region: &str) -> SectorBaseline {
    let (baseline, data_source, last_updated) = match sector.to_lowercase().as_str() {
        "salon" => (
            stats(&[
                ("avg_kwh_month", dec!(150.0)),
                ("std_kwh_month", dec!(45.0)),
                ("avg_co2_ann_kg", dec!(810.0)),
                ("std_co2_ann_kg", dec!(243.0)),
                ("avg_water_m3_month", dec!(5.0)),
                ("avg_waste_kg_month", dec!(15.0)),
                ("renewable_adoption_pct", dec!(0.12)),
                ("led_adoption_pct", dec!(0.35)),
                ("sample_size", dec!(1200)),
            ]),
            "Kenya Bureau of Statistics 2024 + Industry Survey",
            NaiveDate::from_ymd_opt(2024, 8, 1).expect("valid date"),
        ),
        "farmer" => (
            stats(&[
                ("avg_kwh_month", dec!(80.0)),
                ("std_kwh_month", dec!(35.0)),
                ("avg_co2_ann_kg", dec!(1200.0)),
                ("std_co2_ann_kg", dec!(400.0)),
                ("avg_water_m3_season", dec!(2000.0)),
                ("avg_diesel_liters_month", dec!(25.0)),
                ("drip_adoption_pct", dec!(0.08)),
                ("solar_pump_adoption_pct", dec!(0.15)),
                ("sample_size", dec!(2800)),
            ]),
            "Ministry of Agriculture 2024 + KALRO Survey",
            NaiveDate::from_ymd_opt(2024, 7, 15).expect("valid date"),
        ),
        "welding" => (
            stats(&[
                ("avg_kwh_month", dec!(800.0)),
                ("std_kwh_month", dec!(250.0)),
                ("avg_co2_ann_kg", dec!(4320.0)),
                ("std_co2_ann_kg", dec!(1350.0)),
                ("avg_diesel_liters_month", dec!(40.0)),
                ("efficient_equipment_pct", dec!(0.25)),
                ("solar_adoption_pct", dec!(0.18)),
                ("sample_size", dec!(450)),
            ]),
            "Kenya Association of Manufacturers 2024",
            NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid date"),
        ),
        _ => (
            stats(&[
                ("avg_kwh_month", dec!(200.0)),
                ("std_kwh_month", dec!(80.0)),
                ("avg_co2_ann_kg", dec!(1080.0)),
                ("std_co2_ann_kg", dec!(432.0)),
                ("renewable_adoption_pct", dec!(0.15)),
                ("sample_size", dec!(800)),
            ]),
            "General SME Survey 2024",
            NaiveDate::from_ymd_opt(2024, 8, 1).expect("valid date"),
        ),
    };

    SectorBaseline {
        sector: sector.to_string(),
        region: region.to_string(),
        baseline,
        data_source: data_source.to_string(),
        last_updated,
    }
}

// ---------------------------------------------------------------------------
// Sector weights
// ---------------------------------------------------------------------------

/// Pillar weights per sector. Always sum to 1.0; unknown sectors use the
/// "other" weights.
pub fn sector_weights(sector: &str) -> BTreeMap<Pillar, Decimal> {
    let weights: [(Pillar, Decimal); 5] = match sector.to_lowercase().as_str() {
        "salon" => [
            (Pillar::Energy, dec!(0.35)),
            (Pillar::Water, dec!(0.15)),
            (Pillar::Waste, dec!(0.25)),
            (Pillar::Carbon, dec!(0.20)),
            (Pillar::Community, dec!(0.05)),
        ],
        "farmer" => [
            (Pillar::Energy, dec!(0.25)),
            (Pillar::Water, dec!(0.40)),
            (Pillar::Waste, dec!(0.10)),
            (Pillar::Carbon, dec!(0.20)),
            (Pillar::Community, dec!(0.05)),
        ],
        "welding" => [
            (Pillar::Energy, dec!(0.45)),
            (Pillar::Water, dec!(0.05)),
            (Pillar::Waste, dec!(0.15)),
            (Pillar::Carbon, dec!(0.30)),
            (Pillar::Community, dec!(0.05)),
        ],
        _ => [
            (Pillar::Energy, dec!(0.30)),
            (Pillar::Water, dec!(0.20)),
            (Pillar::Waste, dec!(0.20)),
            (Pillar::Carbon, dec!(0.25)),
            (Pillar::Community, dec!(0.05)),
        ],
    };
    weights.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Percentile
// ---------------------------------------------------------------------------

/// Percentile of `value` within a normal distribution, via a rational
/// CDF approximation. The z-score is clamped to [-3, 3] before evaluation
/// and the result to [0.01, 0.99]. A non-positive std yields the median.
pub fn percentile(value: Decimal, mean: Decimal, std: Decimal) -> Decimal {
    if std <= Decimal::ZERO {
        return dec!(0.5);
    }

    let z = ((value - mean) / std).clamp(dec!(-3.0), dec!(3.0));
    let abs_z = z.abs();

    // Rational approximation of the standard normal CDF tail
    let z2 = abs_z * abs_z;
    let z3 = z2 * abs_z;
    let z4 = z3 * abs_z;
    let denom = Decimal::ONE
        + dec!(0.196854) * abs_z
        + dec!(0.115194) * z2
        + dec!(0.000344) * z3
        + dec!(0.019527) * z4;
    let tail = Decimal::ONE - Decimal::ONE / denom;

    let p = if z >= Decimal::ZERO {
        dec!(0.5) + dec!(0.5) * tail
    } else {
        dec!(0.5) - dec!(0.5) * tail
    };

    p.clamp(dec!(0.01), dec!(0.99))
}

// ---------------------------------------------------------------------------
// Comparison & suggestions
// ---------------------------------------------------------------------------

/// Compare user metrics against the sector baseline. Returns a
/// `<metric>_percentile` entry for every metric that has baseline
/// coverage; the std defaults to 30% of the mean when the survey did not
/// record one.
pub fn sector_comparison(
    sector: &str,
    user_metrics: &BTreeMap<String, Decimal>,
    region: &str,
) -> BTreeMap<String, Decimal> {
    let baseline = get_baseline(sector, region);
    let mappings = [
        ("kwh_month", "avg_kwh_month", "std_kwh_month"),
        ("co2_ann_kg", "avg_co2_ann_kg", "std_co2_ann_kg"),
        ("water_m3", "avg_water_m3_season", "std_water_m3_season"),
        (
            "diesel_liters",
            "avg_diesel_liters_month",
            "std_diesel_liters_month",
        ),
    ];

    let mut comparisons = BTreeMap::new();
    for (metric, mean_key, std_key) in mappings {
        let (Some(value), Some(mean)) = (user_metrics.get(metric), baseline.baseline.get(mean_key))
        else {
            continue;
        };
        let std = baseline
            .baseline
            .get(std_key)
            .copied()
            .unwrap_or(*mean * dec!(0.3));
        comparisons.insert(
            format!("{}_percentile", metric),
            percentile(*value, *mean, std),
        );
    }
    comparisons
}

/// Sector-specific improvement actions, driven by where the business sits
/// against its baseline percentiles.
pub fn improvement_suggestions(
    sector: &str,
    percentiles: &BTreeMap<String, Decimal>,
) -> Vec<String> {
    let pct = |key: &str| percentiles.get(key).copied().unwrap_or(dec!(0.5));
    let mut suggestions = Vec::new();

    match sector.to_lowercase().as_str() {
        "salon" => {
            if pct("kwh_month_percentile") < dec!(0.3) {
                suggestions
                    .push("Consider LED lighting upgrade to reduce energy consumption".to_string());
            }
            if pct("water_m3_percentile") < dec!(0.4) {
                suggestions
                    .push("Install water-efficient fixtures and recycling systems".to_string());
            }
            suggestions.push("Switch to eco-friendly hair products and packaging".to_string());
        }
        "farmer" => {
            if pct("water_m3_percentile") < dec!(0.3) {
                suggestions
                    .push("Implement drip irrigation to reduce water usage by 30-50%".to_string());
            }
            if pct("diesel_liters_percentile") < dec!(0.4) {
                suggestions
                    .push("Install solar water pump to eliminate diesel dependency".to_string());
            }
            suggestions.push("Use organic fertilizers and integrated pest management".to_string());
        }
        "welding" => {
            if pct("kwh_month_percentile") < dec!(0.3) {
                suggestions
                    .push("Upgrade to inverter welding machines for 30% energy savings".to_string());
            }
            suggestions.push("Install solar panels to offset high energy consumption".to_string());
            suggestions
                .push("Implement metal recycling and waste reduction practices".to_string());
        }
        _ => {
            suggestions.push("Consider renewable energy solutions for your business".to_string());
            suggestions.push("Implement energy-efficient equipment and practices".to_string());
            suggestions.push("Explore waste reduction and recycling opportunities".to_string());
        }
    }

    suggestions
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sector_baseline() {
        let baseline = get_baseline("salon", "Kenya");
        assert_eq!(
            baseline.baseline.get("avg_kwh_month"),
            Some(&dec!(150.0))
        );
        assert_eq!(baseline.sector, "salon");
    }

    #[test]
    fn test_unknown_sector_falls_back_to_other() {
        let baseline = get_baseline("fishing", "Kenya");
        assert_eq!(baseline.data_source, "General SME Survey 2024");
        assert_eq!(baseline.baseline.get("avg_kwh_month"), Some(&dec!(200.0)));
    }

    #[test]
    fn test_sector_lookup_case_insensitive() {
        let baseline = get_baseline("FARMER", "Kenya");
        assert_eq!(baseline.baseline.get("avg_co2_ann_kg"), Some(&dec!(1200.0)));
    }

    #[test]
    fn test_weights_sum_to_one() {
        for sector in ["salon", "farmer", "welding", "other", "unknown"] {
            let sum: Decimal = sector_weights(sector).values().copied().sum();
            assert_eq!(sum, Decimal::ONE, "weights for {} must sum to 1", sector);
        }
    }

    #[test]
    fn test_weights_cover_all_pillars() {
        let weights = sector_weights("salon");
        for pillar in Pillar::ALL {
            assert!(weights.contains_key(&pillar));
        }
    }

    #[test]
    fn test_percentile_at_mean_is_median() {
        assert_eq!(percentile(dec!(100), dec!(100), dec!(20)), dec!(0.5));
    }

    #[test]
    fn test_percentile_zero_std_is_median() {
        assert_eq!(percentile(dec!(500), dec!(100), Decimal::ZERO), dec!(0.5));
    }

    #[test]
    fn test_percentile_above_mean() {
        let p = percentile(dec!(140), dec!(100), dec!(20));
        assert!(p > dec!(0.5) && p <= dec!(0.99));
    }

    #[test]
    fn test_percentile_below_mean() {
        let p = percentile(dec!(60), dec!(100), dec!(20));
        assert!(p < dec!(0.5) && p >= dec!(0.01));
    }

    #[test]
    fn test_percentile_symmetry() {
        // +2 sigma and -2 sigma are mirror images around the median
        let hi = percentile(dec!(140), dec!(100), dec!(20));
        let lo = percentile(dec!(60), dec!(100), dec!(20));
        assert_eq!(hi - dec!(0.5), dec!(0.5) - lo);
    }

    #[test]
    fn test_percentile_extreme_z_clamped() {
        // z = 50 clamps to 3 before evaluation, then output clamps apply
        let p = percentile(dec!(1100), dec!(100), dec!(20));
        assert!(p <= dec!(0.99));
        assert_eq!(p, percentile(dec!(160), dec!(100), dec!(20)));
    }

    #[test]
    fn test_sector_comparison_uses_std_default() {
        // water_m3 has a mean but no std in the farmer baseline: std = 30% of mean
        let mut metrics = BTreeMap::new();
        metrics.insert("water_m3".to_string(), dec!(2000));
        let comparisons = sector_comparison("farmer", &metrics, "Kenya");
        assert_eq!(comparisons.get("water_m3_percentile"), Some(&dec!(0.5)));
    }

    #[test]
    fn test_sector_comparison_skips_uncovered_metrics() {
        let mut metrics = BTreeMap::new();
        metrics.insert("diesel_liters".to_string(), dec!(30));
        // salon baseline has no diesel statistics
        let comparisons = sector_comparison("salon", &metrics, "Kenya");
        assert!(comparisons.is_empty());
    }

    #[test]
    fn test_suggestions_salon_default_percentiles() {
        let suggestions = improvement_suggestions("salon", &BTreeMap::new());
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].contains("eco-friendly"));
    }

    #[test]
    fn test_suggestions_salon_low_energy_percentile() {
        let mut percentiles = BTreeMap::new();
        percentiles.insert("kwh_month_percentile".to_string(), dec!(0.1));
        let suggestions = improvement_suggestions("salon", &percentiles);
        assert_eq!(suggestions.len(), 2);
        assert!(suggestions[0].contains("LED"));
    }

    #[test]
    fn test_suggestions_unknown_sector() {
        let suggestions = improvement_suggestions("bakery", &BTreeMap::new());
        assert_eq!(suggestions.len(), 3);
    }
}
