use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSimulateTransactionConfig;
use solana_sdk::transaction::VersionedTransaction;
use tracing::{debug, warn};

use crate::config::ProbeConfig;
use crate::types::{ExecutionOutcome, Quote, SimulationError};

/// Execution estimation seam. Implementations either dry-run the real
/// transaction against the network or estimate from route shape; callers
/// see the same outcome shape either way.
#[async_trait]
pub trait ExecutionEstimator: Send + Sync {
    async fn estimate(
        &self,
        quote: &Quote,
        wallet: Option<&str>,
    ) -> Result<ExecutionOutcome, SimulationError>;
}

/// Builds the swap transaction through the aggregator and dry-runs it via
/// RPC without submitting. Every failure along the chain is reported as
/// `ProbeUnavailable` so the caller can fall back to the heuristic path.
pub struct LiveProbe {
    client: reqwest::Client,
    swap_build_url: String,
    rpc: Arc<RpcClient>,
}

impl LiveProbe {
    pub fn new(client: reqwest::Client, swap_build_url: String, rpc: Arc<RpcClient>) -> Self {
        Self {
            client,
            swap_build_url,
            rpc,
        }
    }

    /// 스왑 빌드 엔드포인트 호출: 견적 JSON을 그대로 되돌려 보낸다.
    async fn build_transaction(
        &self,
        quote: &Quote,
        wallet: &str,
    ) -> Result<VersionedTransaction, SimulationError> {
        let body = json!({
            "quoteResponse": quote.raw_response,
            "userPublicKey": wallet,
            "wrapAndUnwrapSol": true,
            "dynamicComputeUnitLimit": true,
            "prioritizationFeeLamports": "auto",
        });

        let response = self
            .client
            .post(&self.swap_build_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SimulationError::ProbeUnavailable(format!("swap build request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SimulationError::ProbeUnavailable(format!(
                "swap build rejected: status {status}"
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SimulationError::ProbeUnavailable(format!("swap build body: {e}")))?;

        let encoded = payload
            .get("swapTransaction")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                SimulationError::ProbeUnavailable("swap build response missing swapTransaction".to_string())
            })?;

        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| SimulationError::ProbeUnavailable(format!("transaction base64: {e}")))?;

        bincode::deserialize::<VersionedTransaction>(&bytes)
            .map_err(|e| SimulationError::ProbeUnavailable(format!("transaction decode: {e}")))
    }
}

#[async_trait]
impl ExecutionEstimator for LiveProbe {
    async fn estimate(
        &self,
        quote: &Quote,
        wallet: Option<&str>,
    ) -> Result<ExecutionOutcome, SimulationError> {
        let wallet = wallet.ok_or_else(|| {
            SimulationError::ProbeUnavailable("no wallet provided for live probe".to_string())
        })?;

        let tx = self.build_transaction(quote, wallet).await?;
        // Static message keys only. Accounts resolved through v0 address
        // lookup tables are not counted, so this understates the true
        // footprint for versioned transactions.
        let accounts_touched = tx.message.static_account_keys().len();

        // Dry run only: skip signature checks and pin a fresh blockhash so an
        // unsigned, possibly stale transaction still evaluates.
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            ..Default::default()
        };

        let response = self
            .rpc
            .simulate_transaction_with_config(&tx, config)
            .await
            .map_err(|e| SimulationError::ProbeUnavailable(format!("rpc simulate: {e}")))?;

        let value = response.value;
        let outcome = ExecutionOutcome {
            succeeded: value.err.is_none(),
            compute_units_used: value.units_consumed.unwrap_or(0),
            logs: value.logs.unwrap_or_default(),
            accounts_touched,
            failure_cause: value.err.map(|e| e.to_string()),
        };
        debug!(
            "🔬 Probe finished: succeeded={} units={}",
            outcome.succeeded, outcome.compute_units_used
        );
        Ok(outcome)
    }
}

/// Route-shape estimate used when no wallet is supplied or the live probe
/// fails: base cost plus a fixed per-hop surcharge.
pub struct HeuristicEstimator {
    cfg: ProbeConfig,
}

impl HeuristicEstimator {
    pub fn new(cfg: ProbeConfig) -> Self {
        Self { cfg }
    }

    pub fn estimate_from_route(&self, hops: usize) -> ExecutionOutcome {
        ExecutionOutcome {
            succeeded: true,
            compute_units_used: self.cfg.base_units + self.cfg.per_hop_units * hops as u64,
            logs: Vec::new(),
            accounts_touched: hops * self.cfg.accounts_per_hop,
            failure_cause: None,
        }
    }
}

#[async_trait]
impl ExecutionEstimator for HeuristicEstimator {
    async fn estimate(
        &self,
        quote: &Quote,
        _wallet: Option<&str>,
    ) -> Result<ExecutionOutcome, SimulationError> {
        let outcome = self.estimate_from_route(quote.hop_count());
        if outcome.compute_units_used > crate::constants::MAX_COMPUTE_UNITS {
            warn!(
                "⚠️ Heuristic estimate {} CU exceeds the per-transaction cap",
                outcome.compute_units_used
            );
        }
        Ok(outcome)
    }
}
