//! Deterministic GreenScore computation.
//!
//! Pipeline: sector baseline + weights -> five capped pillar subscores ->
//! weight normalization against a 0.2 baseline -> round-then-clamp 0-100
//! integer score -> explainers, action recommendations, and a confidence
//! value. The entry point never fails: internal errors produce a
//! zero-score result with confidence 0.1.
//!
//! The weight normalization divides by a fixed 0.2 regardless of pillar
//! count, so an overweighted pillar can exceed its nominal cap before the
//! final clamp. That overshoot is intended behavior; the outer clamp
//! defends the 0-100 invariant.

use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::baseline;
use crate::emissions::EmissionResult;
use crate::error::EngineError;
use crate::scoring::metrics::UserMetrics;
use crate::types::{Confidence, Pillar};
use crate::EngineResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Nominal point cap per pillar.
pub fn pillar_max(pillar: Pillar) -> Decimal {
    match pillar {
        Pillar::Energy => dec!(30),
        Pillar::Water => dec!(15),
        Pillar::Waste => dec!(20),
        Pillar::Carbon => dec!(25),
        Pillar::Community => dec!(10),
    }
}

/// Annual impact levels that earn a pillar's full points.
const CO2_TONNES_ANN_CAP: Decimal = dec!(5.0);
const KWH_SAVED_ANN_CAP: Decimal = dec!(3000.0);
const WATER_M3_ANN_CAP: Decimal = dec!(2000.0);
const WASTE_KG_ANN_CAP: Decimal = dec!(500.0);

/// Unit weight the sector weights are normalized against.
const BASELINE_WEIGHT: Decimal = dec!(0.2);

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Input for a GreenScore computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreInput {
    pub user_id: String,
    pub evidence_id: String,
    pub sector: String,
    pub region: String,
    pub emission: EmissionResult,
    #[serde(default)]
    pub metrics: UserMetrics,
}

/// A computed GreenScore. Append-only: each computation creates a new
/// result, never mutating a previous one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreenScoreResult {
    pub user_id: String,
    pub evidence_id: String,
    /// 0-100, rounded then clamped.
    pub greenscore: u8,
    /// Weighted pillar subscores.
    pub subscores: BTreeMap<Pillar, Decimal>,
    pub co2_saved_tonnes: Decimal,
    pub confidence: Confidence,
    pub explainers: Vec<String>,
    pub actions: Vec<String>,
    pub provenance: Map<String, Value>,
}

impl GreenScoreResult {
    /// Zero-score result returned when the computation itself fails.
    pub fn error_fallback(user_id: &str, evidence_id: &str) -> Self {
        GreenScoreResult {
            user_id: user_id.to_string(),
            evidence_id: evidence_id.to_string(),
            greenscore: 0,
            subscores: BTreeMap::new(),
            co2_saved_tonnes: Decimal::ZERO,
            confidence: Confidence::new(dec!(0.1)),
            explainers: vec!["Error in score calculation".to_string()],
            actions: vec!["Please re-upload evidence".to_string()],
            provenance: Map::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute a GreenScore from an emission result and user metrics.
/// Never fails.
pub fn compute_score(input: &ScoreInput) -> GreenScoreResult {
    match try_compute(input) {
        Ok(result) => result,
        Err(e) => {
            warn!(evidence_id = %input.evidence_id, error = %e, "score computation failed");
            GreenScoreResult::error_fallback(&input.user_id, &input.evidence_id)
        }
    }
}

fn try_compute(input: &ScoreInput) -> EngineResult<GreenScoreResult> {
    let sector_baseline = baseline::get_baseline(&input.sector, &input.region);
    let weights = baseline::sector_weights(&input.sector);

    let raw = raw_subscores(&input.emission, &input.metrics)?;
    let weighted = apply_sector_weights(&raw, &weights);

    let total: Decimal = weighted.values().copied().sum();
    let greenscore = total
        .round()
        .to_i64()
        .unwrap_or(0)
        .clamp(0, 100) as u8;

    let explainers = generate_explainers(&weighted, &input.emission);
    let actions = generate_actions(greenscore, &weighted, &input.sector);
    let confidence = score_confidence(&input.emission, &input.metrics, &weighted);

    let mut provenance = Map::new();
    provenance.insert("sector".into(), json!(input.sector));
    provenance.insert("region".into(), json!(input.region));
    provenance.insert("baseline_source".into(), json!(sector_baseline.data_source));
    provenance.insert("calculation_method".into(), json!("weighted_pillars_v1"));
    provenance.insert("emission_method".into(), json!(input.emission.method));
    provenance.insert("timestamp".into(), json!(Utc::now().to_rfc3339()));

    Ok(GreenScoreResult {
        user_id: input.user_id.clone(),
        evidence_id: input.evidence_id.clone(),
        greenscore,
        subscores: weighted,
        co2_saved_tonnes: input.emission.co2_kg_total / dec!(1000),
        confidence,
        explainers,
        actions,
        provenance,
    })
}

// ---------------------------------------------------------------------------
// Pillar subscores
// ---------------------------------------------------------------------------

fn raw_subscores(
    emission: &EmissionResult,
    metrics: &UserMetrics,
) -> EngineResult<BTreeMap<Pillar, Decimal>> {
    let mut subscores = BTreeMap::new();

    // Carbon: CO2 saved relative to the annual cap
    let carbon_max = pillar_max(Pillar::Carbon);
    let co2_tonnes = emission.co2_kg_total / dec!(1000);
    let carbon = (co2_tonnes / CO2_TONNES_ANN_CAP * carbon_max).min(carbon_max);
    subscores.insert(Pillar::Carbon, carbon);

    // Energy: 70% renewable share, 30% efficiency savings
    let energy_max = pillar_max(Pillar::Energy);
    let mut energy = Decimal::ZERO;
    if let Some(renewable_pct) = metrics.renewable_pct {
        energy += mul(renewable_pct, energy_max * dec!(0.7), "energy.renewable")?;
    }
    if let Some(kwh_ann) = metrics.kwh_saved_ann {
        let efficiency_cap = energy_max * dec!(0.3);
        let efficiency = mul(kwh_ann / KWH_SAVED_ANN_CAP, efficiency_cap, "energy.efficiency")?;
        energy += efficiency.min(efficiency_cap);
    }
    subscores.insert(Pillar::Energy, energy.min(energy_max));

    // Water: savings relative to the annual cap
    let water_max = pillar_max(Pillar::Water);
    let water = match metrics.water_m3_saved_ann {
        Some(m3_ann) => mul(m3_ann / WATER_M3_ANN_CAP, water_max, "water")?.min(water_max),
        None => Decimal::ZERO,
    };
    subscores.insert(Pillar::Water, water);

    // Waste: 60% recycling share, 40% recycled mass
    let waste_max = pillar_max(Pillar::Waste);
    let mut waste = Decimal::ZERO;
    if let Some(recycled_pct) = metrics.waste_recycled_pct {
        waste += mul(recycled_pct, waste_max * dec!(0.6), "waste.share")?;
    }
    if let Some(kg_ann) = metrics.waste_kg_recycled_ann {
        let mass_cap = waste_max * dec!(0.4);
        let mass = mul(kg_ann / WASTE_KG_ANN_CAP, mass_cap, "waste.mass")?;
        waste += mass.min(mass_cap);
    }
    subscores.insert(Pillar::Waste, waste.min(waste_max));

    // Community: certifications plus local sourcing
    let community_max = pillar_max(Pillar::Community);
    let mut community = Decimal::ZERO;
    if metrics.nema_certified {
        community += dec!(3.0);
    }
    if metrics.community_training {
        community += dec!(2.0);
    }
    if let Some(local_pct) = metrics.local_sourcing_pct {
        community += mul(local_pct, dec!(5.0), "community.sourcing")?;
    }
    subscores.insert(Pillar::Community, community.min(community_max));

    Ok(subscores)
}

/// Normalize each pillar against the 0.2 unit weight. A pillar weighted
/// exactly 0.2 is unchanged; heavier pillars scale up proportionally.
fn apply_sector_weights(
    subscores: &BTreeMap<Pillar, Decimal>,
    weights: &BTreeMap<Pillar, Decimal>,
) -> BTreeMap<Pillar, Decimal> {
    subscores
        .iter()
        .map(|(pillar, score)| {
            let weight = weights.get(pillar).copied().unwrap_or(BASELINE_WEIGHT);
            (*pillar, *score * weight / BASELINE_WEIGHT)
        })
        .collect()
}

fn mul(a: Decimal, b: Decimal, context: &str) -> EngineResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| EngineError::NumericOverflow {
        context: context.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Explainers
// ---------------------------------------------------------------------------

fn generate_explainers(
    weighted: &BTreeMap<Pillar, Decimal>,
    emission: &EmissionResult,
) -> Vec<String> {
    let mut explainers = Vec::new();

    let mut ranked: Vec<(Pillar, Decimal)> =
        weighted.iter().map(|(p, s)| (*p, *s)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    for (pillar, score) in ranked.into_iter().take(3) {
        let max = pillar_max(pillar);
        let percentage = (score / max * dec!(100)).round();
        let points = score.round();
        let line = match pillar {
            Pillar::Carbon => {
                let co2_tonnes = (emission.co2_kg_total / dec!(1000)).round_dp(2);
                format!(
                    "Carbon: {} tonnes CO2 saved -> +{}/{} points ({}%)",
                    co2_tonnes, points, max, percentage
                )
            }
            Pillar::Energy => format!(
                "Energy: Renewable adoption and efficiency -> +{}/{} points ({}%)",
                points, max, percentage
            ),
            Pillar::Water => format!(
                "Water: Conservation and efficiency measures -> +{}/{} points ({}%)",
                points, max, percentage
            ),
            Pillar::Waste => format!(
                "Waste: Recycling and waste reduction -> +{}/{} points ({}%)",
                points, max, percentage
            ),
            Pillar::Community => format!(
                "Community: Certifications and local impact -> +{}/{} points ({}%)",
                points, max, percentage
            ),
        };
        explainers.push(line);
    }

    // Name the single largest emission contributor
    if let Some((channel, kg)) = emission
        .co2_kg_components
        .iter()
        .max_by(|a, b| a.1.cmp(b.1))
    {
        explainers.push(format!(
            "Largest impact: {} kg CO2 from {}",
            kg.round(),
            channel.replace('_', " ")
        ));
    }

    explainers
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

fn generate_actions(
    greenscore: u8,
    weighted: &BTreeMap<Pillar, Decimal>,
    sector: &str,
) -> Vec<String> {
    let mut actions = Vec::new();

    if greenscore >= 80 {
        actions.push("Excellent! Approved for premium green loan rates".to_string());
        actions.push("Consider carbon credit monetization opportunities".to_string());
    } else if greenscore >= 60 {
        actions.push("Good progress! Approved for standard green loan discount".to_string());
        actions.push("Continue implementing sustainable practices".to_string());
    } else if greenscore >= 40 {
        actions.push("Approved with basic green discount".to_string());
        actions.push("Focus on high-impact improvements for better rates".to_string());
    } else {
        actions.push("Additional evidence needed for green loan qualification".to_string());
        actions.push("Implement foundational sustainability measures".to_string());
    }

    // Nudge the weakest pillar when it sits under 30% of its cap
    if let Some((pillar, score)) = weighted.iter().min_by(|a, b| a.1.cmp(b.1)) {
        if *score < pillar_max(*pillar) * dec!(0.3) {
            let nudge = match pillar {
                Pillar::Energy => "Priority: Invest in renewable energy or energy efficiency",
                Pillar::Water => "Priority: Implement water conservation measures",
                Pillar::Waste => "Priority: Set up recycling and waste reduction systems",
                Pillar::Carbon => "Priority: Focus on high-impact carbon reduction activities",
                Pillar::Community => "Priority: Obtain environmental certifications",
            };
            actions.push(nudge.to_string());
        }
    }

    let suggestions = baseline::improvement_suggestions(sector, &BTreeMap::new());
    actions.extend(suggestions.into_iter().take(2));

    actions
}

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

fn score_confidence(
    emission: &EmissionResult,
    metrics: &UserMetrics,
    weighted: &BTreeMap<Pillar, Decimal>,
) -> Confidence {
    let mut confidence = dec!(0.5);

    confidence += emission.confidence.value() * dec!(0.3);

    let metrics_bonus = Decimal::from(metrics.populated_positive_count()) * dec!(0.05);
    confidence += metrics_bonus.min(dec!(0.2));

    // Balanced evidence across pillars is worth more than one strong pillar
    let non_zero_pillars = weighted.values().filter(|s| **s > Decimal::ZERO).count();
    if non_zero_pillars >= 3 {
        confidence += dec!(0.1);
    } else if non_zero_pillars >= 2 {
        confidence += dec!(0.05);
    }

    // Extreme totals look like outliers
    let total: Decimal = weighted.values().copied().sum();
    if total > dec!(90) || total < dec!(10) {
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
    use crate::emissions::{EmissionCalculator, EmissionFeatures, EmissionInput};

    fn emission_for(kwh_saved: Decimal) -> EmissionResult {
        EmissionCalculator::new().calculate(&EmissionInput {
            evidence_id: "ev-200".into(),
            sector: "salon".into(),
            region: "Kenya".into(),
            features: EmissionFeatures {
                kwh_saved: Some(kwh_saved),
                ..Default::default()
            },
        })
    }

    fn base_input() -> ScoreInput {
        ScoreInput {
            user_id: "user-1".into(),
            evidence_id: "ev-200".into(),
            sector: "salon".into(),
            region: "Kenya".into(),
            emission: emission_for(dec!(100)),
            metrics: UserMetrics {
                renewable_pct: Some(dec!(0.5)),
                kwh_saved_ann: Some(dec!(1200)),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_score_within_bounds() {
        let result = compute_score(&base_input());
        assert!(result.greenscore <= 100);
    }

    #[test]
    fn test_carbon_subscore_proportional() {
        // 45 kg = 0.045 t; 0.045/5 * 25 = 0.225 raw; salon carbon weight 0.20
        // keeps it unchanged (0.20/0.2 = 1)
        let result = compute_score(&base_input());
        assert_eq!(result.subscores.get(&Pillar::Carbon), Some(&dec!(0.225)));
    }

    #[test]
    fn test_energy_subscore_with_weight_boost() {
        // raw energy = 0.5*30*0.7 + min(9, 1200/3000*9) = 10.5 + 3.6 = 14.1
        // salon energy weight 0.35 -> 14.1 * 0.35/0.2 = 24.675
        let result = compute_score(&base_input());
        assert_eq!(result.subscores.get(&Pillar::Energy), Some(&dec!(24.675)));
    }

    #[test]
    fn test_weight_normalization_can_exceed_pillar_cap() {
        // Full raw energy (30) under salon weight 0.35 becomes 52.5,
        // above the nominal 30-point cap; only the final clamp applies.
        let mut input = base_input();
        input.metrics.renewable_pct = Some(dec!(1.0));
        input.metrics.kwh_saved_ann = Some(dec!(10000));
        let result = compute_score(&input);
        assert_eq!(result.subscores.get(&Pillar::Energy), Some(&dec!(52.5)));
    }

    #[test]
    fn test_missing_metrics_contribute_zero() {
        let mut input = base_input();
        input.metrics = UserMetrics::default();
        let result = compute_score(&input);
        assert_eq!(result.subscores.get(&Pillar::Water), Some(&Decimal::ZERO));
        assert_eq!(result.subscores.get(&Pillar::Waste), Some(&Decimal::ZERO));
    }

    #[test]
    fn test_idempotent_for_identical_inputs() {
        let input = base_input();
        let first = compute_score(&input);
        let second = compute_score(&input);
        assert_eq!(first.greenscore, second.greenscore);
        assert_eq!(first.subscores, second.subscores);
        assert_eq!(first.confidence, second.confidence);
    }

    #[test]
    fn test_explainers_top_three_plus_component() {
        let result = compute_score(&base_input());
        // 3 pillar lines + the largest-component line
        assert_eq!(result.explainers.len(), 4);
        assert!(result.explainers[0].starts_with("Energy:"));
        assert!(result
            .explainers
            .last()
            .unwrap()
            .contains("energy grid kwh"));
    }

    #[test]
    fn test_actions_low_score_tier() {
        let mut input = base_input();
        input.metrics = UserMetrics::default();
        input.emission = emission_for(dec!(10));
        let result = compute_score(&input);
        assert!(result.actions[0].contains("Additional evidence needed"));
    }

    #[test]
    fn test_actions_include_priority_nudge_for_weak_pillar() {
        let result = compute_score(&base_input());
        assert!(result
            .actions
            .iter()
            .any(|a| a.starts_with("Priority:")));
    }

    #[test]
    fn test_actions_include_sector_suggestions() {
        let result = compute_score(&base_input());
        assert!(result
            .actions
            .iter()
            .any(|a| a.contains("eco-friendly hair products")));
    }

    #[test]
    fn test_community_pillar_certification_points() {
        let mut input = base_input();
        input.metrics.nema_certified = true;
        input.metrics.community_training = true;
        input.metrics.local_sourcing_pct = Some(dec!(0.4));
        let result = compute_score(&input);
        // raw = 3 + 2 + 0.4*5 = 7; salon community weight 0.05 -> 7*0.25 = 1.75
        assert_eq!(result.subscores.get(&Pillar::Community), Some(&dec!(1.75)));
    }

    #[test]
    fn test_confidence_within_bounds() {
        let result = compute_score(&base_input());
        assert!(result.confidence.value() >= dec!(0.1));
        assert!(result.confidence.value() <= Decimal::ONE);
    }

    #[test]
    fn test_error_fallback_shape() {
        let fallback = GreenScoreResult::error_fallback("user-1", "ev-404");
        assert_eq!(fallback.greenscore, 0);
        assert_eq!(fallback.confidence.value(), dec!(0.1));
        assert_eq!(fallback.explainers.len(), 1);
    }

    #[test]
    fn test_co2_saved_tonnes_derived_from_total() {
        let result = compute_score(&base_input());
        assert_eq!(result.co2_saved_tonnes, dec!(0.045));
    }
}
