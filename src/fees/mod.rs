use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use tracing::{debug, warn};

use crate::config::FeeConfig;
use crate::types::{CongestionLevel, FeeDistribution, LandingTier};

/// Fee market sampling seam. Infallible by contract: a fee recommendation
/// must always be available, so RPC failures degrade to the fixed fallback.
#[async_trait]
pub trait FeeSampler: Send + Sync {
    async fn sample_fees(&self) -> FeeDistribution;
}

/// Samples recent per-transaction prioritization fees from the network RPC
/// and derives a distribution. Derived fresh per call, never cached.
pub struct RpcFeeSampler {
    rpc: Arc<RpcClient>,
    cfg: FeeConfig,
}

impl RpcFeeSampler {
    pub fn new(rpc: Arc<RpcClient>, cfg: FeeConfig) -> Self {
        Self { rpc, cfg }
    }
}

#[async_trait]
impl FeeSampler for RpcFeeSampler {
    async fn sample_fees(&self) -> FeeDistribution {
        match self.rpc.get_recent_prioritization_fees(&[]).await {
            Ok(fees) => {
                let samples: Vec<u64> = fees
                    .iter()
                    .map(|f| f.prioritization_fee)
                    .filter(|fee| *fee > 0)
                    .collect();
                debug!("📊 Sampled {} positive prioritization fees", samples.len());
                distribution_from_samples(&self.cfg, samples)
            }
            Err(e) => {
                warn!("❌ Prioritization fee fetch failed, using fallback distribution: {e}");
                fallback_distribution(&self.cfg)
            }
        }
    }
}

/// Derive the fee distribution from a raw sample window.
/// Empty windows yield the documented fallback rather than an error.
pub fn distribution_from_samples(cfg: &FeeConfig, mut samples: Vec<u64>) -> FeeDistribution {
    if samples.is_empty() {
        return fallback_distribution(cfg);
    }

    samples.sort_unstable();
    let n = samples.len();

    // sample[floor(p * n)], index clamped to the valid range
    let percentile = |p: f64| -> u64 {
        let idx = ((p * n as f64).floor() as usize).min(n - 1);
        samples[idx]
    };

    let p25 = percentile(0.25);
    let median = percentile(0.5);
    let p75 = percentile(0.75);
    let p95 = percentile(0.95);

    FeeDistribution {
        min: samples[0],
        p25,
        median,
        p75,
        p95,
        max: samples[n - 1],
        recommended: p75,
        congestion: classify_congestion(cfg, median),
        landing_tiers: landing_tiers(p25, median, p75, p95),
    }
}

/// Fixed distribution used when no samples exist. Tiers mirror the
/// congestion band edges.
pub fn fallback_distribution(cfg: &FeeConfig) -> FeeDistribution {
    FeeDistribution {
        min: cfg.fallback_economy,
        p25: cfg.fallback_economy,
        median: cfg.fallback_standard,
        p75: cfg.fallback_fast,
        p95: cfg.fallback_turbo,
        max: cfg.fallback_turbo,
        recommended: cfg.fallback_fast,
        congestion: classify_congestion(cfg, cfg.fallback_standard),
        landing_tiers: landing_tiers(
            cfg.fallback_economy,
            cfg.fallback_standard,
            cfg.fallback_fast,
            cfg.fallback_turbo,
        ),
    }
}

fn classify_congestion(cfg: &FeeConfig, median: u64) -> CongestionLevel {
    if median > cfg.congestion_high {
        CongestionLevel::High
    } else if median > cfg.congestion_medium {
        CongestionLevel::Medium
    } else {
        CongestionLevel::Low
    }
}

// Presentation hints, not measured latencies
fn landing_tiers(p25: u64, median: u64, p75: u64, p95: u64) -> Vec<LandingTier> {
    vec![
        tier("Economy", p25, 0.25, "15-30s"),
        tier("Standard", median, 0.5, "8-15s"),
        tier("Fast", p75, 0.75, "2-8s"),
        tier("Turbo", p95, 0.95, "1-2s"),
    ]
}

fn tier(label: &str, fee: u64, probability: f64, latency: &str) -> LandingTier {
    LandingTier {
        label: label.to_string(),
        fee_lamports: fee,
        landing_probability: probability,
        estimated_latency: latency.to_string(),
    }
}
