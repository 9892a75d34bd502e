//! Carbon credit eligibility and valuation.
//!
//! One credit at most per standard. The additionality gate is shared: if
//! the score confidence is under 0.5 or the annual reduction is at or
//! below 100 kg, no standard is evaluated at all. Per standard, the net
//! tonnage after the permanence buffer selects the registration approach
//! (individual, pooled, or none), drives the valuation, and combines with
//! confidence to set the status.

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::credits::standards::{self, StandardTerms};
use crate::emissions::EmissionResult;
use crate::scoring::GreenScoreResult;
use crate::types::CreditStandard;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

const fn default_lifetime() -> u32 {
    5
}

/// Input for carbon credit calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditInput {
    pub user_id: String,
    pub evidence_id: String,
    pub sector: String,
    pub emission: EmissionResult,
    pub greenscore: GreenScoreResult,
    #[serde(default = "default_lifetime")]
    pub project_lifetime_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditApproach {
    Individual,
    Pooled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditStatus {
    Eligible,
    PoolingEligible,
    PendingVerification,
}

/// An eligible carbon credit under one standard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonCredit {
    pub user_id: String,
    pub evidence_id: String,
    pub standard: CreditStandard,
    /// Net lifetime tonnage after the permanence buffer.
    pub tonnes_co2: Decimal,
    pub annual_tonnes: Decimal,
    pub project_lifetime_years: u32,
    pub buffer_percentage: Decimal,
    pub gross_value_usd: Decimal,
    pub net_value_usd: Decimal,
    pub verification_cost_usd: Decimal,
    pub pooling_fee_usd: Decimal,
    pub status: CreditStatus,
    pub approach: CreditApproach,
    pub estimated_issuance: NaiveDate,
    pub sector: String,
    pub additionality_verified: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Additionality floor: annual CO2 reduction must exceed this many kg.
const ADDITIONALITY_CO2_FLOOR_KG: Decimal = dec!(100);
/// Minimum score confidence for any credit claim.
const ADDITIONALITY_CONFIDENCE_FLOOR: Decimal = dec!(0.5);

const INDIVIDUAL_ISSUANCE_DAYS: i64 = 180;
const POOLED_ISSUANCE_DAYS: i64 = 90;

/// Calculate eligible credits across all standards, with issuance dates
/// stamped from today. Below-threshold standards are absent, not errors.
pub fn calculate_carbon_credits(input: &CreditInput) -> Vec<CarbonCredit> {
    calculate_carbon_credits_as_of(input, Utc::now().date_naive())
}

/// Same as [`calculate_carbon_credits`] with an explicit reference date.
pub fn calculate_carbon_credits_as_of(input: &CreditInput, as_of: NaiveDate) -> Vec<CarbonCredit> {
    if !passes_additionality(input) {
        debug!(evidence_id = %input.evidence_id, "additionality criteria not met");
        return Vec::new();
    }

    let annual_tonnes = input.emission.co2_kg_total / dec!(1000);

    CreditStandard::ALL
        .iter()
        .filter_map(|standard| {
            credit_for_standard(input, *standard, &standards::terms(*standard), annual_tonnes, as_of)
        })
        .collect()
}

fn passes_additionality(input: &CreditInput) -> bool {
    input.greenscore.confidence.value() >= ADDITIONALITY_CONFIDENCE_FLOOR
        && input.emission.co2_kg_total > ADDITIONALITY_CO2_FLOOR_KG
}

// ---------------------------------------------------------------------------
// Per-standard calculation
// ---------------------------------------------------------------------------

fn credit_for_standard(
    input: &CreditInput,
    standard: CreditStandard,
    terms: &StandardTerms,
    annual_tonnes: Decimal,
    as_of: NaiveDate,
) -> Option<CarbonCredit> {
    let lifetime = Decimal::from(input.project_lifetime_years);
    let total_tonnes = annual_tonnes * lifetime;
    let net_tonnes = total_tonnes * (Decimal::ONE - terms.buffer_percentage);

    let approach = if net_tonnes >= terms.min_tonnes_individual {
        CreditApproach::Individual
    } else if net_tonnes >= terms.min_tonnes_pooled {
        CreditApproach::Pooled
    } else {
        // Below even the pooled minimum for this standard
        return None;
    };

    let gross_value = net_tonnes * terms.price_usd_per_tonne;
    let (net_value, pooling_fee, verification_cost) = match approach {
        CreditApproach::Pooled => {
            let pooling_fee = gross_value * terms.pooling_fee_percentage;
            // Verification cost is shared across the pool
            let shared_verification = terms.verification_cost_usd / dec!(10);
            (
                gross_value - pooling_fee - shared_verification,
                pooling_fee,
                shared_verification,
            )
        }
        CreditApproach::Individual => (
            gross_value - terms.verification_cost_usd,
            Decimal::ZERO,
            terms.verification_cost_usd,
        ),
    };

    let confidence = input.greenscore.confidence.value();
    let status = if confidence >= dec!(0.8) && net_tonnes >= terms.min_tonnes_individual {
        CreditStatus::Eligible
    } else if confidence >= dec!(0.6) && net_tonnes >= terms.min_tonnes_pooled {
        CreditStatus::PoolingEligible
    } else {
        CreditStatus::PendingVerification
    };

    let estimated_issuance = match approach {
        CreditApproach::Individual => as_of + Duration::days(INDIVIDUAL_ISSUANCE_DAYS),
        CreditApproach::Pooled => as_of + Duration::days(POOLED_ISSUANCE_DAYS),
    };

    Some(CarbonCredit {
        user_id: input.user_id.clone(),
        evidence_id: input.evidence_id.clone(),
        standard,
        tonnes_co2: net_tonnes.round_dp(3),
        annual_tonnes: annual_tonnes.round_dp(3),
        project_lifetime_years: input.project_lifetime_years,
        buffer_percentage: terms.buffer_percentage,
        gross_value_usd: gross_value.round_dp(2),
        net_value_usd: net_value.round_dp(2),
        verification_cost_usd: verification_cost.round_dp(2),
        pooling_fee_usd: pooling_fee.round_dp(2),
        status,
        approach,
        estimated_issuance,
        sector: input.sector.clone(),
        additionality_verified: true,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
