//! Carbon credit eligibility, valuation, pooling, and strategy
//! recommendations across the VCS, Gold Standard, and CDM standards.

pub mod aggregator;
pub mod pooling;
pub mod recommend;
pub mod standards;

pub use aggregator::{
    calculate_carbon_credits, calculate_carbon_credits_as_of, CarbonCredit, CreditApproach,
    CreditInput, CreditStatus,
};
pub use pooling::{aggregate_pool_credits, PoolAggregation};
pub use recommend::{credit_recommendations, CreditRecommendation};
pub use standards::StandardTerms;
