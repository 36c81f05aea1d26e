use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};

use crate::config::Config;
use crate::cost::CostEstimator;
use crate::fees::{FeeSampler, RpcFeeSampler};
use crate::probe::{ExecutionEstimator, HeuristicEstimator, LiveProbe};
use crate::quote::jupiter::JupiterQuoteClient;
use crate::quote::{QuoteProvider, QuoteRequest};
use crate::risk::RiskScorer;
use crate::types::{ExecutionOutcome, Quote, SimulationError, SimulationResult};

/// 단일 시뮬레이션 요청
#[derive(Debug, Clone)]
pub struct SimulationRequest {
    pub input_mint: String,
    pub output_mint: String,
    /// Face-value input amount (e.g. 1.5 SOL)
    pub amount_in: f64,
    pub input_decimals: u8,
    pub output_decimals: u8,
    /// Wallet for the live dry-run; without it only the heuristic path runs
    pub wallet: Option<String>,
    pub slippage_bps: u16,
}

/// 시뮬레이션 오케스트레이터.
///
/// 견적과 수수료 샘플링은 동시에, 프로브는 견적 확보 후에 실행된다.
/// 프로브 실패는 비치명적이며 휴리스틱 추정으로 대체된다.
pub struct SimulationEngine {
    quotes: Arc<dyn QuoteProvider>,
    fees: Arc<dyn FeeSampler>,
    probe: Arc<dyn ExecutionEstimator>,
    heuristic: HeuristicEstimator,
    scorer: RiskScorer,
    cost: CostEstimator,
}

impl SimulationEngine {
    pub fn new(
        quotes: Arc<dyn QuoteProvider>,
        fees: Arc<dyn FeeSampler>,
        probe: Arc<dyn ExecutionEstimator>,
        config: &Config,
    ) -> Self {
        Self {
            quotes,
            fees,
            probe,
            heuristic: HeuristicEstimator::new(config.probe.clone()),
            scorer: RiskScorer::new(config.risk.clone()),
            cost: CostEstimator::new(config.cost.clone()),
        }
    }

    /// Wire up the live clients from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        let rpc = Arc::new(RpcClient::new_with_timeout(
            config.endpoints.rpc_url.clone(),
            config.request_timeout(),
        ));

        let quotes = Arc::new(JupiterQuoteClient::new(
            http.clone(),
            config.endpoints.quote_url.clone(),
        ));
        let fees = Arc::new(RpcFeeSampler::new(rpc.clone(), config.fees.clone()));
        let probe = Arc::new(LiveProbe::new(
            http,
            config.endpoints.swap_build_url.clone(),
            rpc,
        ));

        Ok(Self::new(quotes, fees, probe, config))
    }

    pub async fn simulate(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationResult, SimulationError> {
        // 1단계: 입력 검증 (네트워크 호출 전에 거부)
        validate_request(request)?;

        info!(
            "🔄 Simulating swap: {} {} -> {}",
            request.amount_in, request.input_mint, request.output_mint
        );

        let quote_request = QuoteRequest {
            input_mint: request.input_mint.clone(),
            output_mint: request.output_mint.clone(),
            amount_in: request.amount_in,
            input_decimals: request.input_decimals,
            slippage_bps: request.slippage_bps,
        };

        // 2단계: 견적과 수수료 시장 샘플링을 동시에 실행
        let (quote_result, fee_distribution) =
            tokio::join!(self.quotes.get_quote(&quote_request), self.fees.sample_fees());
        let quote = quote_result?;

        info!(
            "✅ Quote received: {} -> {} via {} hop(s)",
            quote.raw_amount_in,
            quote.raw_amount_out,
            quote.hop_count()
        );

        // 3단계: MEV 위험도 채점 (순수 계산)
        let risk = self.scorer.assess(
            quote.reported_price_impact_pct,
            request.amount_in,
            quote.hop_count(),
        );

        // 4단계: 실행 프로브 (견적 확보 후에만). 실패 시 휴리스틱으로 대체.
        let execution = self.run_probe(&quote, request).await?;

        // 5단계: 착지 비용 산정 (p75 권장 수수료 기준)
        let cost = self
            .cost
            .estimate(fee_distribution.recommended, execution.compute_units_used);

        // f64 scaling: 10^d overflows u64 for d >= 20, and SPL allows any u8
        let expected_out = quote.raw_amount_out as f64 / 10f64.powi(request.output_decimals as i32);

        Ok(SimulationResult {
            token_in: request.input_mint.clone(),
            token_out: request.output_mint.clone(),
            amount_in: request.amount_in,
            expected_out,
            price_impact_pct: quote.reported_price_impact_pct,
            route: quote.route_labels(),
            quote,
            execution,
            risk,
            fees: fee_distribution,
            cost,
            simulated_at: chrono::Utc::now(),
        })
    }

    async fn run_probe(
        &self,
        quote: &Quote,
        request: &SimulationRequest,
    ) -> Result<ExecutionOutcome, SimulationError> {
        let wallet = match request.wallet.as_deref() {
            Some(w) => w,
            None => return Ok(self.heuristic.estimate_from_route(quote.hop_count())),
        };

        match self.probe.estimate(quote, Some(wallet)).await {
            Ok(outcome) => Ok(outcome),
            Err(SimulationError::ProbeUnavailable(reason)) => {
                warn!("⚠️ Live probe unavailable ({reason}), using heuristic estimate");
                Ok(self.heuristic.estimate_from_route(quote.hop_count()))
            }
            Err(other) => Err(other),
        }
    }
}

fn validate_request(request: &SimulationRequest) -> Result<(), SimulationError> {
    if request.input_mint.trim().is_empty() || request.output_mint.trim().is_empty() {
        return Err(SimulationError::InvalidInput(
            "input and output mints are required".to_string(),
        ));
    }
    Pubkey::from_str(&request.input_mint).map_err(|_| {
        SimulationError::InvalidInput(format!("invalid input mint: {}", request.input_mint))
    })?;
    Pubkey::from_str(&request.output_mint).map_err(|_| {
        SimulationError::InvalidInput(format!("invalid output mint: {}", request.output_mint))
    })?;
    if !request.amount_in.is_finite() || request.amount_in <= 0.0 {
        return Err(SimulationError::InvalidInput(format!(
            "amount must be a positive number, got {}",
            request.amount_in
        )));
    }
    if let Some(wallet) = &request.wallet {
        Pubkey::from_str(wallet).map_err(|_| {
            SimulationError::InvalidInput(format!("invalid wallet address: {wallet}"))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SOL_MINT, USDC_MINT};
    use crate::mocks::{MockEstimator, MockFeeSampler, MockQuoteProvider, QuoteScript};

    const WALLET: &str = "11111111111111111111111111111111";

    fn request(wallet: Option<&str>) -> SimulationRequest {
        SimulationRequest {
            input_mint: SOL_MINT.to_string(),
            output_mint: USDC_MINT.to_string(),
            amount_in: 1.5,
            input_decimals: 9,
            output_decimals: 6,
            wallet: wallet.map(|w| w.to_string()),
            slippage_bps: 50,
        }
    }

    fn engine_with(
        quotes: MockQuoteProvider,
        probe: MockEstimator,
    ) -> SimulationEngine {
        let config = Config::default();
        SimulationEngine::new(
            Arc::new(quotes),
            Arc::new(MockFeeSampler::flat(10_000)),
            Arc::new(probe),
            &config,
        )
    }

    #[tokio::test]
    async fn test_happy_path_uses_live_probe() {
        let engine = engine_with(
            MockQuoteProvider::simple(225_000_000, 0.12, &["Orca", "Raydium"]),
            MockEstimator::succeeding(120_000, 14),
        );

        let result = engine.simulate(&request(Some(WALLET))).await.unwrap();
        assert_eq!(result.route, vec!["Orca", "Raydium"]);
        assert!((result.expected_out - 225.0).abs() < 1e-9);
        assert!(result.execution.succeeded);
        assert_eq!(result.execution.compute_units_used, 120_000);
        assert_eq!(result.execution.accounts_touched, 14);
        assert_eq!(result.fees.recommended, 10_000);
        // priority budget 10_000 over 120_000 CU, ceil -> 1 lamport/CU
        assert_eq!(result.cost.compute_unit_price, 1);
    }

    #[tokio::test]
    async fn test_probe_failure_falls_back_to_heuristic() {
        let engine = engine_with(
            MockQuoteProvider::simple(100, 0.1, &["Orca", "Raydium"]),
            MockEstimator::failing_probe(),
        );

        let result = engine.simulate(&request(Some(WALLET))).await.unwrap();
        // 50_000 + 2 * 30_000
        assert_eq!(result.execution.compute_units_used, 110_000);
        assert_eq!(result.execution.accounts_touched, 6);
        assert!(result.execution.succeeded);
    }

    #[tokio::test]
    async fn test_no_wallet_skips_live_probe() {
        let engine = engine_with(
            MockQuoteProvider::simple(100, 0.1, &["Orca"]),
            // Would panic the assertion below if it were consulted
            MockEstimator::succeeding(999_999, 99),
        );

        let result = engine.simulate(&request(None)).await.unwrap();
        assert_eq!(result.execution.compute_units_used, 80_000);
        assert_eq!(result.execution.accounts_touched, 3);
    }

    #[tokio::test]
    async fn test_upstream_rejection_is_distinguishable() {
        let engine = engine_with(
            MockQuoteProvider::new(QuoteScript::Rejected {
                status: 500,
                body: "internal error".to_string(),
            }),
            MockEstimator::succeeding(1, 1),
        );

        let err = engine.simulate(&request(None)).await.unwrap_err();
        match err {
            SimulationError::UpstreamRejected { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "internal error");
            }
            other => panic!("expected UpstreamRejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_quote_surfaces_as_no_route() {
        let engine = engine_with(
            MockQuoteProvider::new(QuoteScript::Malformed),
            MockEstimator::succeeding(1, 1),
        );

        let err = engine.simulate(&request(None)).await.unwrap_err();
        assert!(matches!(err, SimulationError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_invalid_mint_rejected_before_network() {
        let mut req = request(None);
        req.input_mint = "not-a-mint".to_string();

        let engine = engine_with(
            MockQuoteProvider::new(QuoteScript::Unavailable),
            MockEstimator::succeeding(1, 1),
        );
        let err = engine.simulate(&req).await.unwrap_err();
        assert!(matches!(err, SimulationError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        for amount in [0.0, -1.0, f64::NAN] {
            let mut req = request(None);
            req.amount_in = amount;
            let engine = engine_with(
                MockQuoteProvider::simple(1, 0.0, &["Orca"]),
                MockEstimator::succeeding(1, 1),
            );
            let err = engine.simulate(&req).await.unwrap_err();
            assert!(matches!(err, SimulationError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn test_invalid_wallet_rejected() {
        let err = engine_with(
            MockQuoteProvider::simple(1, 0.0, &["Orca"]),
            MockEstimator::succeeding(1, 1),
        )
        .simulate(&request(Some("bad wallet")))
        .await
        .unwrap_err();
        assert!(matches!(err, SimulationError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_large_output_decimals_do_not_overflow() {
        let mut req = request(None);
        req.output_decimals = 20;

        let engine = engine_with(
            MockQuoteProvider::simple(u64::MAX, 0.0, &["Orca"]),
            MockEstimator::succeeding(1, 1),
        );
        let result = engine.simulate(&req).await.unwrap();
        assert!((result.expected_out - u64::MAX as f64 / 1e20).abs() < 1e-9);

        req.output_decimals = u8::MAX;
        let result = engine.simulate(&req).await.unwrap();
        assert!(result.expected_out.is_finite());
    }

    #[tokio::test]
    async fn test_risk_flows_from_quote_shape() {
        // impact 1.5% with 2 hops and face value 1.5 -> 20 + 10 + 0 = 30
        let engine = engine_with(
            MockQuoteProvider::simple(100, 1.5, &["Orca", "Raydium"]),
            MockEstimator::succeeding(1, 1),
        );
        let result = engine.simulate(&request(None)).await.unwrap();
        assert_eq!(result.risk.score, 30);
        assert!(result.risk.sandwich_risk);
        assert!(!result.risk.frontrun_risk);
    }
}
