//! Aggregation of small pooled credits into registrable units.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::credits::aggregator::{CarbonCredit, CreditApproach, CreditStatus};
use crate::types::CreditStandard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolStatus {
    Pooled,
    NoEligibleCredits,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolParticipant {
    pub user_id: String,
    pub tonnes: Decimal,
    pub value_usd: Decimal,
    pub sector: String,
}

/// One standard's pool of aggregated credits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardPool {
    pub pool_name: String,
    pub participant_count: usize,
    pub total_tonnes_co2: Decimal,
    pub total_gross_value_usd: Decimal,
    pub total_net_value_usd: Decimal,
    pub average_tonnes_per_participant: Decimal,
    pub participants: Vec<PoolParticipant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolAggregation {
    pub status: PoolStatus,
    pub pools: BTreeMap<CreditStandard, StandardPool>,
    pub total_participants: usize,
    pub total_tonnes: Decimal,
    pub total_value: Decimal,
}

/// Group pooled-approach credits by standard and total them up.
/// Only credits with a pooling-eligible or eligible status participate.
pub fn aggregate_pool_credits(credits: &[CarbonCredit], pool_name: &str) -> PoolAggregation {
    let pooled: Vec<&CarbonCredit> = credits
        .iter()
        .filter(|c| {
            c.approach == CreditApproach::Pooled
                && matches!(c.status, CreditStatus::PoolingEligible | CreditStatus::Eligible)
        })
        .collect();

    if pooled.is_empty() {
        return PoolAggregation {
            status: PoolStatus::NoEligibleCredits,
            pools: BTreeMap::new(),
            total_participants: 0,
            total_tonnes: Decimal::ZERO,
            total_value: Decimal::ZERO,
        };
    }

    let mut by_standard: BTreeMap<CreditStandard, Vec<&CarbonCredit>> = BTreeMap::new();
    for credit in &pooled {
        by_standard.entry(credit.standard).or_default().push(credit);
    }

    let mut pools = BTreeMap::new();
    for (standard, members) in by_standard {
        let total_tonnes: Decimal = members.iter().map(|c| c.tonnes_co2).sum();
        let total_gross: Decimal = members.iter().map(|c| c.gross_value_usd).sum();
        let total_net: Decimal = members.iter().map(|c| c.net_value_usd).sum();
        let count = members.len();

        pools.insert(
            standard,
            StandardPool {
                pool_name: format!("{}_{}", pool_name, standard),
                participant_count: count,
                total_tonnes_co2: total_tonnes.round_dp(3),
                total_gross_value_usd: total_gross.round_dp(2),
                total_net_value_usd: total_net.round_dp(2),
                average_tonnes_per_participant: (total_tonnes / Decimal::from(count as u64))
                    .round_dp(3),
                participants: members
                    .iter()
                    .map(|c| PoolParticipant {
                        user_id: c.user_id.clone(),
                        tonnes: c.tonnes_co2,
                        value_usd: c.net_value_usd,
                        sector: c.sector.clone(),
                    })
                    .collect(),
            },
        );
    }

    PoolAggregation {
        status: PoolStatus::Pooled,
        total_participants: pooled.len(),
        total_tonnes: pooled.iter().map(|c| c.tonnes_co2).sum(),
        total_value: pooled.iter().map(|c| c.net_value_usd).sum(),
        pools,
    }
}
