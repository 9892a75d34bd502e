//! Deterministic evidence-processing pipeline.
//!
//! Sequences emission calculation -> metric estimation -> GreenScore ->
//! carbon credits -> confidence assessment, a strict forward dependency
//! chain with no shared mutable state. Every invocation takes immutable
//! inputs and returns fresh values, so independent evidence items can be
//! processed in parallel without coordination.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::confidence::{self, ConfidenceAssessment, SectorContext, UserHistory};
use crate::credits::{self, CarbonCredit, CreditInput};
use crate::emissions::{estimate_features, EmissionCalculator, EmissionFeatures, EmissionInput, EmissionResult};
use crate::evidence::EvidenceSignals;
use crate::scoring::{self, GreenScoreResult, ScoreInput};
use crate::types::Confidence;

/// One evidence submission, with the caller-supplied history and sector
/// context needed for the confidence assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRequest {
    pub user_id: String,
    pub evidence_id: String,
    pub sector: String,
    pub region: String,
    #[serde(default)]
    pub signals: EvidenceSignals,
    #[serde(default)]
    pub user_history: UserHistory,
    #[serde(default)]
    pub sector_context: SectorContext,
}

/// The intermediate view the confidence manager evaluates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub user_id: String,
    pub evidence_id: String,
    pub greenscore: Option<GreenScoreResult>,
    pub carbon_credits: Vec<CarbonCredit>,
    pub confidence: Confidence,
    pub processing_time_ms: u64,
}

/// Full result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub emission: EmissionResult,
    pub greenscore: GreenScoreResult,
    pub carbon_credits: Vec<CarbonCredit>,
    pub assessment: ConfidenceAssessment,
    pub processing_time_ms: u64,
}

/// Run the full deterministic pipeline for one evidence submission.
/// Never fails; degraded stages surface as low-confidence results.
pub fn run_pipeline(calculator: &EmissionCalculator, request: &PipelineRequest) -> PipelineResult {
    let start = Instant::now();

    // Evidence signals -> physical quantities
    let features = match request.signals.amount_ksh {
        Some(amount) => estimate_features(amount, &request.sector, &request.signals.action_descriptor()),
        None => EmissionFeatures::default(),
    };

    let emission = calculator.calculate(&EmissionInput {
        evidence_id: request.evidence_id.clone(),
        sector: request.sector.clone(),
        region: request.region.clone(),
        features,
    });
    debug!(evidence_id = %request.evidence_id, co2_kg = %emission.co2_kg_total, "emissions calculated");

    let metrics = scoring::estimate_user_metrics(&emission, &request.sector, &request.signals);

    let greenscore = scoring::compute_score(&ScoreInput {
        user_id: request.user_id.clone(),
        evidence_id: request.evidence_id.clone(),
        sector: request.sector.clone(),
        region: request.region.clone(),
        emission: emission.clone(),
        metrics,
    });
    debug!(evidence_id = %request.evidence_id, greenscore = greenscore.greenscore, "score computed");

    let carbon_credits = credits::calculate_carbon_credits(&CreditInput {
        user_id: request.user_id.clone(),
        evidence_id: request.evidence_id.clone(),
        sector: request.sector.clone(),
        emission: emission.clone(),
        greenscore: greenscore.clone(),
        project_lifetime_years: 5,
    });

    let processing_time_ms = start.elapsed().as_millis() as u64;
    let outcome = PipelineOutcome {
        user_id: request.user_id.clone(),
        evidence_id: request.evidence_id.clone(),
        greenscore: Some(greenscore.clone()),
        carbon_credits: carbon_credits.clone(),
        confidence: greenscore.confidence,
        processing_time_ms,
    };

    let assessment =
        confidence::evaluate_confidence(&outcome, &request.user_history, &request.sector_context);

    PipelineResult {
        emission,
        greenscore,
        carbon_credits,
        assessment,
        processing_time_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn solar_pump_request() -> PipelineRequest {
        PipelineRequest {
            user_id: "user-9".into(),
            evidence_id: "ev-900".into(),
            sector: "farmer".into(),
            region: "Kenya".into(),
            signals: EvidenceSignals {
                vendor: Some("Certified Solar Ltd".into()),
                amount_ksh: Some(dec!(160000)),
                items: vec!["solar pump 2kW".into()],
                labels: vec!["solar panel".into()],
                geo: None,
            },
            user_history: UserHistory {
                account_age_days: 200,
                previous_submissions: 5,
                ..Default::default()
            },
            sector_context: SectorContext::default(),
        }
    }

    #[test]
    fn test_pipeline_produces_all_stages() {
        let calculator = EmissionCalculator::new();
        let result = run_pipeline(&calculator, &solar_pump_request());

        assert!(result.emission.co2_kg_total > Decimal::ZERO);
        assert!(result.greenscore.greenscore > 0);
        assert!(!result.assessment.component_confidences.is_empty());
    }

    #[test]
    fn test_pipeline_without_amount_yields_zero_emissions() {
        let calculator = EmissionCalculator::new();
        let mut request = solar_pump_request();
        request.signals.amount_ksh = None;
        let result = run_pipeline(&calculator, &request);

        assert_eq!(result.emission.co2_kg_total, Decimal::ZERO);
        assert!(result.carbon_credits.is_empty());
    }

    #[test]
    fn test_pipeline_scores_are_stable_across_runs() {
        let calculator = EmissionCalculator::new();
        let request = solar_pump_request();
        let first = run_pipeline(&calculator, &request);
        let second = run_pipeline(&calculator, &request);

        assert_eq!(first.greenscore.greenscore, second.greenscore.greenscore);
        assert_eq!(first.greenscore.subscores, second.greenscore.subscores);
        assert_eq!(first.emission.co2_kg_total, second.emission.co2_kg_total);
    }

    #[test]
    fn test_pipeline_outcome_confidence_tracks_score() {
        let calculator = EmissionCalculator::new();
        let result = run_pipeline(&calculator, &solar_pump_request());
        // ai_processing component equals the score confidence
        assert_eq!(
            result
                .assessment
                .component_confidences
                .get(&crate::confidence::ConfidenceComponent::AiProcessing),
            Some(&result.greenscore.confidence.value())
        );
    }
}
