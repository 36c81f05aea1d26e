pub mod jupiter;

pub use jupiter::JupiterQuoteClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{Quote, SimulationError};

/// Parameters for one quote fetch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteRequest {
    pub input_mint: String,
    pub output_mint: String,
    /// Human-readable input amount (e.g. 1.5 USDC)
    pub amount_in: f64,
    pub input_decimals: u8,
    /// Slippage tolerance in basis points (50 = 0.5%)
    pub slippage_bps: u16,
}

// Object-safe trait for dynamic dispatch; mocked in tests
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote, SimulationError>;
}

/// Convert a human-readable amount into integer base units.
///
/// Truncates (never rounds up) so we never request more than the user
/// specified.
pub fn to_base_units(amount_in: f64, decimals: u8) -> Result<u64, SimulationError> {
    if !amount_in.is_finite() || amount_in < 0.0 {
        return Err(SimulationError::InvalidInput(format!(
            "amount must be a non-negative number, got {amount_in}"
        )));
    }

    let scaled = amount_in * 10f64.powi(decimals as i32);
    if scaled >= u64::MAX as f64 {
        return Err(SimulationError::InvalidInput(format!(
            "amount {amount_in} with {decimals} decimals overflows base units"
        )));
    }

    Ok(scaled.floor() as u64)
}
