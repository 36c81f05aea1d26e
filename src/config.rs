use anyhow::Result;
use serde::{Deserialize, Serialize};

/// 업스트림 엔드포인트 및 타임아웃 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Aggregator quote endpoint (GET)
    pub quote_url: String,
    /// Swap transaction build endpoint (POST)
    pub swap_build_url: String,
    /// Solana JSON-RPC endpoint
    pub rpc_url: String,
    /// Bounded timeout applied to every external call (ms)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// 우선순위 수수료 샘플러 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    /// median 초과 시 HIGH (micro-lamports per CU)
    pub congestion_high: u64,
    /// median 초과 시 MEDIUM
    pub congestion_medium: u64,
    /// 샘플이 없을 때 쓰는 고정 폴백 티어
    pub fallback_economy: u64,
    pub fallback_standard: u64,
    pub fallback_fast: u64,
    pub fallback_turbo: u64,
}

/// Risk scoring thresholds.
///
/// Trade-size tiers compare input-token face value, not fiat - a known
/// approximation carried over from the product, do not normalize here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    // Price impact tiers (%)
    pub impact_minor: f64,
    pub impact_moderate: f64,
    pub impact_heavy: f64,
    pub impact_severe: f64,
    // Trade size tiers (input-token units)
    pub size_small: f64,
    pub size_medium: f64,
    pub size_large: f64,
    // Level thresholds (score strictly above)
    pub critical_over: u8,
    pub high_over: u8,
    pub medium_over: u8,
    /// Fraction of impact-scaled size assumed extractable by MEV
    pub loss_capture_ratio: f64,
}

/// 비용 추정 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostConfig {
    /// Fixed network fee per signature (lamports)
    pub base_fee_lamports: u64,
    /// Fixed SOL/USD conversion - a documented approximation, never fetched live
    pub sol_price_usd: f64,
}

/// 휴리스틱 실행 추정 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub base_units: u64,
    pub per_hop_units: u64,
    pub accounts_per_hop: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub endpoints: EndpointConfig,
    pub fees: FeeConfig,
    pub risk: RiskConfig,
    pub cost: CostConfig,
    pub probe: ProbeConfig,
    /// Default slippage tolerance in basis points
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u16,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_slippage_bps() -> u16 {
    50
}

impl Config {
    pub async fn load(path: &str) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.endpoints.request_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: EndpointConfig {
                quote_url: "https://lite-api.jup.ag/swap/v1/quote".to_string(),
                swap_build_url: "https://lite-api.jup.ag/swap/v1/swap".to_string(),
                rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
                request_timeout_ms: 10_000,
            },
            fees: FeeConfig {
                congestion_high: 50_000,
                congestion_medium: 10_000,
                fallback_economy: 1_000,
                fallback_standard: 10_000,
                fallback_fast: 50_000,
                fallback_turbo: 100_000,
            },
            risk: RiskConfig {
                impact_minor: 0.5,
                impact_moderate: 1.0,
                impact_heavy: 3.0,
                impact_severe: 5.0,
                size_small: 10_000.0,
                size_medium: 50_000.0,
                size_large: 100_000.0,
                critical_over: 70,
                high_over: 45,
                medium_over: 20,
                loss_capture_ratio: 0.3,
            },
            cost: CostConfig {
                base_fee_lamports: 5_000,
                sol_price_usd: 150.0,
            },
            probe: ProbeConfig {
                base_units: 50_000,
                per_hop_units: 30_000,
                accounts_per_hop: 3,
            },
            slippage_bps: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_documented_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.cost.base_fee_lamports, 5_000);
        assert_eq!(cfg.probe.base_units, 50_000);
        assert_eq!(cfg.probe.per_hop_units, 30_000);
        assert_eq!(cfg.fees.congestion_high, 50_000);
        assert_eq!(cfg.fees.congestion_medium, 10_000);
        assert_eq!(cfg.slippage_bps, 50);
    }

    #[test]
    fn test_request_timeout_follows_configured_millis() {
        let mut cfg = Config::default();
        assert_eq!(cfg.request_timeout(), std::time::Duration::from_millis(10_000));

        cfg.endpoints.request_timeout_ms = 2_500;
        assert_eq!(cfg.request_timeout(), std::time::Duration::from_millis(2_500));
    }

    #[test]
    fn test_config_roundtrip_toml() {
        let cfg = Config::default();
        let serialized = toml::to_string(&cfg).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.risk.size_large, cfg.risk.size_large);
        assert_eq!(parsed.endpoints.quote_url, cfg.endpoints.quote_url);
    }

    #[test]
    fn test_partial_toml_uses_serde_defaults() {
        let toml_src = r#"
            slippage_bps = 100

            [endpoints]
            quote_url = "http://localhost:1234/quote"
            swap_build_url = "http://localhost:1234/swap"
            rpc_url = "http://localhost:8899"

            [fees]
            congestion_high = 50000
            congestion_medium = 10000
            fallback_economy = 1000
            fallback_standard = 10000
            fallback_fast = 50000
            fallback_turbo = 100000

            [risk]
            impact_minor = 0.5
            impact_moderate = 1.0
            impact_heavy = 3.0
            impact_severe = 5.0
            size_small = 10000.0
            size_medium = 50000.0
            size_large = 100000.0
            critical_over = 70
            high_over = 45
            medium_over = 20
            loss_capture_ratio = 0.3

            [cost]
            base_fee_lamports = 5000
            sol_price_usd = 150.0

            [probe]
            base_units = 50000
            per_hop_units = 30000
            accounts_per_hop = 3
        "#;

        let cfg: Config = toml::from_str(toml_src).unwrap();
        assert_eq!(cfg.slippage_bps, 100);
        // request_timeout_ms omitted -> serde default
        assert_eq!(cfg.endpoints.request_timeout_ms, 10_000);
    }
}
