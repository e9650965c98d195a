//! Error types for strategy evaluation

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Non-finite price {price} for {instrument}")]
    NonFinitePrice { instrument: String, price: f64 },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Evaluation error: {message}")]
    Evaluation { message: String },
}

impl StrategyError {
    pub fn evaluation(message: impl Into<String>) -> Self {
        StrategyError::Evaluation {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StrategyError>;
