//! Carbon credit strategy recommendations.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::credits::aggregator::{CarbonCredit, CreditApproach, CreditStatus};
use crate::types::CreditStandard;

/// Recommended next move for a business, given its calculated credits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "recommendation", rename_all = "snake_case")]
pub enum CreditRecommendation {
    /// No credits at all: the impact is below the additionality floor.
    IncreaseImpact {
        message: String,
        min_annual_co2_kg: Decimal,
    },
    /// Credits exist but none is actionable yet.
    ImproveVerification {
        message: String,
        pending_credits: usize,
    },
    /// Pursue the standard with the best value per tonne.
    PursueStandard {
        recommended_standard: CreditStandard,
        approach: CreditApproach,
        estimated_annual_value: Decimal,
        total_project_value: Decimal,
        timeline_months: i64,
        next_steps: Vec<String>,
    },
}

/// Recommend a credit strategy, with timelines measured from today.
pub fn credit_recommendations(credits: &[CarbonCredit]) -> CreditRecommendation {
    credit_recommendations_as_of(credits, Utc::now().date_naive())
}

/// Same as [`credit_recommendations`] with an explicit reference date.
pub fn credit_recommendations_as_of(
    credits: &[CarbonCredit],
    as_of: NaiveDate,
) -> CreditRecommendation {
    if credits.is_empty() {
        return CreditRecommendation::IncreaseImpact {
            message: "Increase environmental impact to qualify for carbon credits".to_string(),
            min_annual_co2_kg: dec!(100),
        };
    }

    let actionable: Vec<&CarbonCredit> = credits
        .iter()
        .filter(|c| matches!(c.status, CreditStatus::Eligible | CreditStatus::PoolingEligible))
        .collect();

    if actionable.is_empty() {
        return CreditRecommendation::ImproveVerification {
            message: "Improve evidence quality for carbon credit eligibility".to_string(),
            pending_credits: credits.len(),
        };
    }

    // Best value per tonne wins
    let best = actionable
        .iter()
        .max_by_key(|c| value_per_tonne(c))
        .copied()
        .unwrap_or(actionable[0]);

    let lifetime = Decimal::from(best.project_lifetime_years.max(1));
    let next_steps = match best.approach {
        CreditApproach::Pooled => vec![
            "Join SME carbon credit pool for faster issuance".to_string(),
            "Maintain evidence quality for verification".to_string(),
            "Continue sustainable practices for ongoing credits".to_string(),
        ],
        CreditApproach::Individual => vec![
            "Prepare for individual project verification".to_string(),
            "Gather additional supporting documentation".to_string(),
            "Consider expanding project scope for higher value".to_string(),
        ],
    };

    CreditRecommendation::PursueStandard {
        recommended_standard: best.standard,
        approach: best.approach,
        estimated_annual_value: (best.net_value_usd / lifetime).round_dp(2),
        total_project_value: best.net_value_usd,
        timeline_months: (best.estimated_issuance - as_of).num_days() / 30,
        next_steps,
    }
}

fn value_per_tonne(credit: &CarbonCredit) -> Decimal {
    if credit.tonnes_co2 > Decimal::ZERO {
        credit.net_value_usd / credit.tonnes_co2
    } else {
        Decimal::ZERO
    }
}
