//! Multi-factor confidence evaluation and human-review triggers.
//!
//! Five weighted components gate automation: the pipeline's own
//! confidence (0.40), data quality (0.25), user credibility (0.15),
//! sector consistency (0.10), and inverted fraud risk (0.10). Review
//! reasons escalate the priority monotonically; a later medium-severity
//! trigger never downgrades an earlier high.
//!
//! `auto_approve` and `auto_reject` are pure threshold flags on the final
//! confidence. An auto-rejected assessment can still carry review
//! reasons; the two are computed independently.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::EngineError;
use crate::pipeline::PipelineOutcome;
use crate::types::Confidence;
use crate::EngineResult;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

const AUTO_APPROVE_THRESHOLD: Decimal = dec!(0.85);
const HUMAN_REVIEW_THRESHOLD: Decimal = dec!(0.60);
const AUTO_REJECT_THRESHOLD: Decimal = dec!(0.30);
/// Stricter bar applied when real money is on the table.
const HIGH_VALUE_REVIEW_THRESHOLD: Decimal = dec!(0.70);

/// Carbon credit value (USD) above which a claim always gets eyes on it.
const CREDIT_VALUE_REVIEW_THRESHOLD: Decimal = dec!(100.0);

/// Fraud pattern thresholds.
const MAX_SUBMISSIONS_24H: u32 = 5;
const MAX_SIMILAR_EVIDENCE: u32 = 3;
const SUSPICIOUS_CREDIT_VALUE: Decimal = dec!(100000);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewReason {
    LowConfidence,
    HighValueClaim,
    FraudRisk,
    NewUser,
    SectorOutlier,
    ManualRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceComponent {
    AiProcessing,
    DataQuality,
    UserCredibility,
    SectorConsistency,
    FraudRisk,
}

impl ConfidenceComponent {
    pub fn weight(&self) -> Decimal {
        match self {
            ConfidenceComponent::AiProcessing => dec!(0.40),
            ConfidenceComponent::DataQuality => dec!(0.25),
            ConfidenceComponent::UserCredibility => dec!(0.15),
            ConfidenceComponent::SectorConsistency => dec!(0.10),
            ConfidenceComponent::FraudRisk => dec!(0.10),
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            ConfidenceComponent::AiProcessing => "AI Processing",
            ConfidenceComponent::DataQuality => "Data Quality",
            ConfidenceComponent::UserCredibility => "User Credibility",
            ConfidenceComponent::SectorConsistency => "Sector Consistency",
            ConfidenceComponent::FraudRisk => "Fraud Risk",
        }
    }
}

/// Account history supplied by the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserHistory {
    pub account_age_days: i64,
    pub previous_submissions: u32,
    pub approval_rate: Decimal,
    pub fraud_flags: u32,
    pub phone_verified: bool,
    pub business_registered: bool,
    pub submissions_last_24h: u32,
    pub similar_evidence_count: u32,
    pub location_inconsistency: bool,
}

impl Default for UserHistory {
    fn default() -> Self {
        UserHistory {
            account_age_days: 0,
            previous_submissions: 0,
            approval_rate: dec!(0.5),
            fraud_flags: 0,
            phone_verified: false,
            business_registered: false,
            submissions_last_24h: 0,
            similar_evidence_count: 0,
            location_inconsistency: false,
        }
    }
}

/// Sector norms supplied by the analytics layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorContext {
    pub average_greenscore: Decimal,
    pub std_greenscore: Decimal,
    pub average_credit_value: Decimal,
}

impl Default for SectorContext {
    fn default() -> Self {
        SectorContext {
            average_greenscore: dec!(50),
            std_greenscore: dec!(20),
            average_credit_value: dec!(50),
        }
    }
}

/// Outcome of the confidence evaluation. Transient: fully reproducible
/// from its inputs, never persisted on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceAssessment {
    pub final_confidence: Confidence,
    pub component_confidences: BTreeMap<ConfidenceComponent, Decimal>,
    pub review_required: bool,
    pub review_reasons: Vec<ReviewReason>,
    pub review_priority: ReviewPriority,
    pub auto_approve: bool,
    pub auto_reject: bool,
    pub confidence_factors: Vec<String>,
}

impl ConfidenceAssessment {
    /// Fixed degraded result when the evaluation itself fails.
    pub fn degraded_fallback() -> Self {
        ConfidenceAssessment {
            final_confidence: Confidence::new(dec!(0.3)),
            component_confidences: BTreeMap::new(),
            review_required: true,
            review_reasons: vec![ReviewReason::ManualRequest],
            review_priority: ReviewPriority::Medium,
            auto_approve: false,
            auto_reject: false,
            confidence_factors: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Evaluate multi-factor confidence over a pipeline outcome and decide
/// whether human review is required. Never fails.
pub fn evaluate_confidence(
    outcome: &PipelineOutcome,
    history: &UserHistory,
    context: &SectorContext,
) -> ConfidenceAssessment {
    match try_evaluate(outcome, history, context) {
        Ok(assessment) => assessment,
        Err(e) => {
            warn!(evidence_id = %outcome.evidence_id, error = %e, "confidence evaluation failed");
            ConfidenceAssessment::degraded_fallback()
        }
    }
}

fn try_evaluate(
    outcome: &PipelineOutcome,
    history: &UserHistory,
    context: &SectorContext,
) -> EngineResult<ConfidenceAssessment> {
    let total_credit_value = total_credit_value(outcome)?;

    let mut components = BTreeMap::new();
    components.insert(
        ConfidenceComponent::AiProcessing,
        outcome.confidence.value(),
    );
    components.insert(ConfidenceComponent::DataQuality, data_quality(outcome));
    components.insert(
        ConfidenceComponent::UserCredibility,
        user_credibility(history),
    );
    components.insert(
        ConfidenceComponent::SectorConsistency,
        sector_consistency(outcome, context, total_credit_value),
    );
    // Stored inverted: lower risk means higher confidence
    let fraud_risk = fraud_risk(outcome, history);
    components.insert(ConfidenceComponent::FraudRisk, Decimal::ONE - fraud_risk);

    let final_confidence: Decimal = components
        .iter()
        .map(|(component, value)| *value * component.weight())
        .sum();

    let decision = review_decision(final_confidence, total_credit_value, &components);
    let confidence_factors = explain_components(&components);

    Ok(ConfidenceAssessment {
        final_confidence: Confidence::new(final_confidence.round_dp(3)),
        component_confidences: components,
        review_required: !decision.reasons.is_empty(),
        review_reasons: decision.reasons,
        review_priority: decision.priority,
        auto_approve: final_confidence >= AUTO_APPROVE_THRESHOLD,
        auto_reject: final_confidence <= AUTO_REJECT_THRESHOLD,
        confidence_factors,
    })
}

fn total_credit_value(outcome: &PipelineOutcome) -> EngineResult<Decimal> {
    let mut total = Decimal::ZERO;
    for credit in &outcome.carbon_credits {
        total = total
            .checked_add(credit.net_value_usd)
            .ok_or_else(|| EngineError::NumericOverflow {
                context: "total_credit_value".into(),
            })?;
    }
    Ok(total)
}

// ---------------------------------------------------------------------------
// Component ladders
// ---------------------------------------------------------------------------

fn data_quality(outcome: &PipelineOutcome) -> Decimal {
    let mut quality = dec!(0.5);

    if let Some(greenscore) = &outcome.greenscore {
        if greenscore.subscores.len() >= 3 {
            quality += dec!(0.2);
        }
        if greenscore.explainers.len() >= 2 {
            quality += dec!(0.1);
        }
        if greenscore.provenance.len() >= 5 {
            quality += dec!(0.1);
        }
        // Extreme scores look like outliers
        if greenscore.greenscore > 95 || greenscore.greenscore < 5 {
            quality -= dec!(0.2);
        }
    }

    // Suspiciously fast processing hints at cached or fabricated data
    if outcome.processing_time_ms < 100 {
        quality -= dec!(0.1);
    } else if outcome.processing_time_ms > 30000 {
        quality -= dec!(0.05);
    }

    quality.clamp(Decimal::ZERO, Decimal::ONE)
}

fn user_credibility(history: &UserHistory) -> Decimal {
    let mut credibility = dec!(0.5);

    if history.account_age_days > 365 {
        credibility += dec!(0.2);
    } else if history.account_age_days > 90 {
        credibility += dec!(0.1);
    } else if history.account_age_days < 7 {
        credibility -= dec!(0.2);
    }

    if history.previous_submissions > 10 {
        credibility += dec!(0.15);
    } else if history.previous_submissions > 3 {
        credibility += dec!(0.1);
    }

    credibility += (history.approval_rate - dec!(0.5)) * dec!(0.4);
    credibility -= Decimal::from(history.fraud_flags) * dec!(0.2);

    if history.phone_verified {
        credibility += dec!(0.05);
    }
    if history.business_registered {
        credibility += dec!(0.1);
    }

    credibility.clamp(Decimal::ZERO, Decimal::ONE)
}

fn sector_consistency(
    outcome: &PipelineOutcome,
    context: &SectorContext,
    total_credit_value: Decimal,
) -> Decimal {
    let mut consistency = dec!(0.7);

    let Some(greenscore) = &outcome.greenscore else {
        return consistency;
    };

    let z_score = if context.std_greenscore > Decimal::ZERO {
        (Decimal::from(greenscore.greenscore) - context.average_greenscore).abs()
            / context.std_greenscore
    } else {
        Decimal::ZERO
    };

    if z_score > dec!(3) {
        consistency -= dec!(0.3);
    } else if z_score > dec!(2) {
        consistency -= dec!(0.1);
    }

    if !outcome.carbon_credits.is_empty()
        && total_credit_value > context.average_credit_value * dec!(5)
    {
        consistency -= dec!(0.2);
    }

    consistency.clamp(Decimal::ZERO, Decimal::ONE)
}

/// Fraud risk score: 0 = no risk, 1 = high risk.
fn fraud_risk(outcome: &PipelineOutcome, history: &UserHistory) -> Decimal {
    let mut risk = Decimal::ZERO;

    if history.submissions_last_24h > MAX_SUBMISSIONS_24H {
        risk += dec!(0.3);
    }

    if history.similar_evidence_count > MAX_SIMILAR_EVIDENCE {
        risk += dec!(0.4);
    }

    let max_credit_value = outcome
        .carbon_credits
        .iter()
        .map(|c| c.net_value_usd)
        .max()
        .unwrap_or(Decimal::ZERO);
    if max_credit_value > SUSPICIOUS_CREDIT_VALUE {
        risk += dec!(0.3);
    }

    if history.location_inconsistency {
        risk += dec!(0.2);
    }

    // Perfect scores are suspicious
    if let Some(greenscore) = &outcome.greenscore {
        if greenscore.greenscore >= 98 {
            risk += dec!(0.1);
        }
    }

    risk.min(Decimal::ONE)
}

// ---------------------------------------------------------------------------
// Review decision
// ---------------------------------------------------------------------------

struct ReviewDecision {
    reasons: Vec<ReviewReason>,
    priority: ReviewPriority,
}

fn review_decision(
    final_confidence: Decimal,
    total_credit_value: Decimal,
    components: &BTreeMap<ConfidenceComponent, Decimal>,
) -> ReviewDecision {
    let mut reasons = Vec::new();
    let mut priority = ReviewPriority::Low;

    if final_confidence < HUMAN_REVIEW_THRESHOLD {
        reasons.push(ReviewReason::LowConfidence);
        priority = priority.max(ReviewPriority::Medium);
    }

    if total_credit_value > CREDIT_VALUE_REVIEW_THRESHOLD {
        reasons.push(ReviewReason::HighValueClaim);
        if final_confidence < HIGH_VALUE_REVIEW_THRESHOLD {
            priority = priority.max(ReviewPriority::High);
        }
    }

    let component = |c: ConfidenceComponent| components.get(&c).copied().unwrap_or(Decimal::ONE);

    if component(ConfidenceComponent::FraudRisk) < dec!(0.7) {
        reasons.push(ReviewReason::FraudRisk);
        priority = priority.max(ReviewPriority::High);
    }

    if component(ConfidenceComponent::SectorConsistency) < dec!(0.5) {
        reasons.push(ReviewReason::SectorOutlier);
        priority = priority.max(ReviewPriority::Medium);
    }

    if component(ConfidenceComponent::UserCredibility) < dec!(0.4) {
        reasons.push(ReviewReason::NewUser);
    }

    ReviewDecision { reasons, priority }
}

fn explain_components(components: &BTreeMap<ConfidenceComponent, Decimal>) -> Vec<String> {
    components
        .iter()
        .map(|(component, score)| {
            let level = if *score >= dec!(0.8) {
                "High"
            } else if *score >= dec!(0.6) {
                "Medium"
            } else {
                "Low"
            };
            format!(
                "{}: {} ({})",
                component.display_name(),
                level,
                score.round_dp(2)
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
