//! Climatiq emission-factor API client.
//!
//! The only I/O in the engine. A single attempt with a fixed 10 second
//! timeout; no retries. Every failure mode (transport, non-2xx status,
//! unparseable body, empty result set) degrades to `None` so the caller
//! falls back to the local factor tables.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use crate::error::EngineError;
use crate::EngineResult;

const BASE_URL: &str = "https://api.climatiq.io/data/v1";
const TIMEOUT_SECS: u64 = 10;

/// A grid electricity factor fetched from the API.
#[derive(Debug, Clone)]
pub struct GridFactor {
    pub grid_ef_kg_co2_kwh: Decimal,
    pub factor_id: Option<String>,
    pub valid_from: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FactorResponse {
    #[serde(default)]
    results: Vec<FactorRecord>,
}

#[derive(Debug, Deserialize)]
struct FactorRecord {
    factor: Option<Decimal>,
    factor_id: Option<String>,
    valid_from: Option<String>,
}

pub struct ClimatiqClient {
    agent: ureq::Agent,
    api_key: String,
    base_url: String,
}

impl ClimatiqClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build();
        ClimatiqClient {
            agent,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Override the endpoint, for tests against a local server.
    #[doc(hidden)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch the most recent grid electricity factor for a country.
    /// Returns `None` on any failure; the caller falls back to local data.
    pub fn grid_factor(&self, country_code: &str) -> Option<GridFactor> {
        match self.fetch_grid_factor(country_code) {
            Ok(factor) => factor,
            Err(e) => {
                warn!(country_code, error = %e, "falling back to local emission factors");
                None
            }
        }
    }

    fn fetch_grid_factor(&self, country_code: &str) -> EngineResult<Option<GridFactor>> {
        let url = format!("{}/emission-factors", self.base_url);
        let response = self
            .agent
            .get(&url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Accept", "application/json")
            .query("category", "electricity")
            .query("region", country_code)
            .query("unit_type", "energy")
            .query("data_version", "latest")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => {
                    EngineError::FactorApi(format!("status {}", code))
                }
                ureq::Error::Transport(t) => EngineError::FactorApi(t.to_string()),
            })?;

        let parsed: FactorResponse = serde_json::from_reader(response.into_reader())
            .map_err(|e| EngineError::FactorApi(format!("unparseable response: {}", e)))?;

        let Some(record) = parsed.results.into_iter().next() else {
            return Ok(None);
        };
        let Some(factor) = record.factor else {
            return Ok(None);
        };

        Ok(Some(GridFactor {
            grid_ef_kg_co2_kwh: factor,
            factor_id: record.factor_id,
            valid_from: record.valid_from,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_results_yields_none_record() {
        let parsed: FactorResponse = serde_json::from_str("{\"results\": []}").unwrap();
        assert!(parsed.results.is_empty());
    }

    #[test]
    fn test_factor_record_parses_numeric_factor() {
        let parsed: FactorResponse = serde_json::from_str(
            "{\"results\": [{\"factor\": 0.43, \"factor_id\": \"ke-grid\", \"valid_from\": \"2024-01-01\"}]}",
        )
        .unwrap();
        let record = &parsed.results[0];
        assert_eq!(record.factor, Some(rust_decimal_macros::dec!(0.43)));
        assert_eq!(record.factor_id.as_deref(), Some("ke-grid"));
    }

    #[test]
    fn test_missing_results_field_defaults_empty() {
        let parsed: FactorResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.results.is_empty());
    }

    #[test]
    fn test_unreachable_endpoint_degrades_to_none() {
        let client =
            ClimatiqClient::new("test-key").with_base_url("http://127.0.0.1:1/data/v1");
        assert!(client.grid_factor("KE").is_none());
    }
}
