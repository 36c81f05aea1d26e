//! Canned implementations of the engine seams, for offline runs and tests.

use async_trait::async_trait;
use chrono::Utc;

use crate::fees::fallback_distribution;
use crate::quote::{QuoteProvider, QuoteRequest};
use crate::types::{ExecutionOutcome, FeeDistribution, Quote, RouteHop, SimulationError};

/// Scripted quote responses
#[derive(Clone)]
pub enum QuoteScript {
    /// Return a quote built from the given shape
    Ok {
        raw_amount_out: u64,
        price_impact_pct: f64,
        route: Vec<String>,
    },
    /// Upstream answered with an error status
    Rejected { status: u16, body: String },
    /// Upstream answered 200 but the payload was unusable
    Malformed,
    /// Transport-level failure
    Unavailable,
}

pub struct MockQuoteProvider {
    script: QuoteScript,
}

impl MockQuoteProvider {
    pub fn new(script: QuoteScript) -> Self {
        Self { script }
    }

    pub fn simple(raw_amount_out: u64, price_impact_pct: f64, hops: &[&str]) -> Self {
        Self::new(QuoteScript::Ok {
            raw_amount_out,
            price_impact_pct,
            route: hops.iter().map(|s| s.to_string()).collect(),
        })
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote, SimulationError> {
        match &self.script {
            QuoteScript::Ok {
                raw_amount_out,
                price_impact_pct,
                route,
            } => {
                let raw_amount_in =
                    crate::quote::to_base_units(request.amount_in, request.input_decimals)?;
                Ok(Quote {
                    input_mint: request.input_mint.clone(),
                    output_mint: request.output_mint.clone(),
                    raw_amount_in,
                    raw_amount_out: *raw_amount_out,
                    reported_price_impact_pct: *price_impact_pct,
                    route: route
                        .iter()
                        .map(|label| RouteHop {
                            dex_label: label.clone(),
                        })
                        .collect(),
                    raw_response: serde_json::json!({
                        "outAmount": raw_amount_out.to_string(),
                        "priceImpactPct": price_impact_pct.to_string(),
                    }),
                    fetched_at: Utc::now(),
                })
            }
            QuoteScript::Rejected { status, body } => Err(SimulationError::UpstreamRejected {
                status: *status,
                body: body.clone(),
            }),
            QuoteScript::Malformed => Err(SimulationError::MalformedResponse(
                "missing outAmount".to_string(),
            )),
            QuoteScript::Unavailable => Err(SimulationError::UpstreamUnavailable(
                "connection refused".to_string(),
            )),
        }
    }
}

/// Fixed fee distribution, defaulting to the documented fallback
pub struct MockFeeSampler {
    distribution: FeeDistribution,
}

impl MockFeeSampler {
    pub fn new(distribution: FeeDistribution) -> Self {
        Self { distribution }
    }

    pub fn flat(recommended: u64) -> Self {
        let mut distribution = fallback_distribution(&crate::config::Config::default().fees);
        distribution.recommended = recommended;
        Self::new(distribution)
    }
}

#[async_trait]
impl crate::fees::FeeSampler for MockFeeSampler {
    async fn sample_fees(&self) -> FeeDistribution {
        self.distribution.clone()
    }
}

/// Scripted execution probe
#[derive(Clone)]
pub enum ProbeScript {
    Outcome(ExecutionOutcome),
    Unavailable,
}

pub struct MockEstimator {
    script: ProbeScript,
}

impl MockEstimator {
    pub fn new(script: ProbeScript) -> Self {
        Self { script }
    }

    pub fn succeeding(compute_units: u64, accounts: usize) -> Self {
        Self::new(ProbeScript::Outcome(ExecutionOutcome {
            succeeded: true,
            compute_units_used: compute_units,
            logs: vec!["Program log: mock".to_string()],
            accounts_touched: accounts,
            failure_cause: None,
        }))
    }

    pub fn failing_probe() -> Self {
        Self::new(ProbeScript::Unavailable)
    }
}

#[async_trait]
impl crate::probe::ExecutionEstimator for MockEstimator {
    async fn estimate(
        &self,
        _quote: &Quote,
        _wallet: Option<&str>,
    ) -> Result<ExecutionOutcome, SimulationError> {
        match &self.script {
            ProbeScript::Outcome(outcome) => Ok(outcome.clone()),
            ProbeScript::Unavailable => Err(SimulationError::ProbeUnavailable(
                "mock probe offline".to_string(),
            )),
        }
    }
}
