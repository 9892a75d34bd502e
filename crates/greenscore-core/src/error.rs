use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Numeric overflow in {context}")]
    NumericOverflow { context: String },

    #[error("Emission factor API failure: {0}")]
    FactorApi(String),
}
