//! Carbon credit standard parameters.
//!
//! Configuration data, not derived values: minimum tonnage per approach,
//! permanence buffer, reference price, verification cost, and pooling fee
//! per standard.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::CreditStandard;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardTerms {
    /// Minimum net tonnage for an individual project registration.
    pub min_tonnes_individual: Decimal,
    /// Minimum net tonnage to join a pooled project.
    pub min_tonnes_pooled: Decimal,
    /// Fraction withheld for permanence and leakage risk.
    pub buffer_percentage: Decimal,
    pub price_usd_per_tonne: Decimal,
    pub verification_cost_usd: Decimal,
    pub pooling_fee_percentage: Decimal,
}

pub fn terms(standard: CreditStandard) -> StandardTerms {
    match standard {
        CreditStandard::Vcs => StandardTerms {
            min_tonnes_individual: dec!(1.0),
            min_tonnes_pooled: dec!(0.1),
            buffer_percentage: dec!(0.15),
            price_usd_per_tonne: dec!(12.0),
            verification_cost_usd: dec!(50.0),
            pooling_fee_percentage: dec!(0.08),
        },
        CreditStandard::GoldStandard => StandardTerms {
            min_tonnes_individual: dec!(2.0),
            min_tonnes_pooled: dec!(0.2),
            buffer_percentage: dec!(0.20),
            price_usd_per_tonne: dec!(18.0),
            verification_cost_usd: dec!(75.0),
            pooling_fee_percentage: dec!(0.10),
        },
        CreditStandard::Cdm => StandardTerms {
            min_tonnes_individual: dec!(5.0),
            min_tonnes_pooled: dec!(0.5),
            buffer_percentage: dec!(0.10),
            price_usd_per_tonne: dec!(8.0),
            verification_cost_usd: dec!(100.0),
            pooling_fee_percentage: dec!(0.12),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pooled_minimum_is_tenth_of_individual() {
        for standard in CreditStandard::ALL {
            let t = terms(standard);
            assert_eq!(t.min_tonnes_pooled * dec!(10), t.min_tonnes_individual);
        }
    }

    #[test]
    fn test_gold_standard_carries_largest_buffer() {
        let gs = terms(CreditStandard::GoldStandard).buffer_percentage;
        assert!(gs > terms(CreditStandard::Vcs).buffer_percentage);
        assert!(gs > terms(CreditStandard::Cdm).buffer_percentage);
    }
}
