use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 시뮬레이션 오류 분류
///
/// quote 경로의 오류는 시뮬레이션 전체를 중단시킨다.
/// `ProbeUnavailable`은 항상 내부에서 휴리스틱 폴백으로 복구되며
/// 오케스트레이터 경계를 넘지 않는다.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// 네트워크 호출 전에 거부되는 입력 (민트 누락, 0 이하 수량 등)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 업스트림 도달 실패 (네트워크 오류, 타임아웃)
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// 업스트림이 비정상 상태 코드로 응답
    #[error("upstream rejected request: status {status}: {body}")]
    UpstreamRejected { status: u16, body: String },

    /// 필수 필드가 빠진 응답 — "경로 없음"으로 취급
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    /// 트랜잭션 프로브 실패 (비치명적, 휴리스틱 폴백 트리거)
    #[error("transaction probe unavailable: {0}")]
    ProbeUnavailable(String),
}

impl SimulationError {
    /// Network-class failures deserve a "check your connection" hint downstream.
    pub fn is_network(&self) -> bool {
        matches!(self, SimulationError::UpstreamUnavailable(_))
    }
}

/// One hop of an aggregator route
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteHop {
    pub dex_label: String,
}

/// Aggregator quote, immutable once fetched.
///
/// `raw_response` keeps the untouched upstream JSON: the swap-build endpoint
/// takes the quote back verbatim, so we never reconstruct it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub input_mint: String,
    pub output_mint: String,
    pub raw_amount_in: u64,
    pub raw_amount_out: u64,
    pub reported_price_impact_pct: f64,
    pub route: Vec<RouteHop>,
    pub raw_response: serde_json::Value,
    pub fetched_at: DateTime<Utc>,
}

impl Quote {
    pub fn hop_count(&self) -> usize {
        self.route.len()
    }

    pub fn route_labels(&self) -> Vec<String> {
        self.route.iter().map(|h| h.dex_label.clone()).collect()
    }
}

/// 네트워크 혼잡도
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CongestionLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CongestionLevel::Low => write!(f, "LOW"),
            CongestionLevel::Medium => write!(f, "MEDIUM"),
            CongestionLevel::High => write!(f, "HIGH"),
        }
    }
}

/// One presented fee tier (Economy/Standard/Fast/Turbo)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LandingTier {
    pub label: String,
    pub fee_lamports: u64,
    /// Illustrative landing probability, not a measured one
    pub landing_probability: f64,
    pub estimated_latency: String,
}

/// Priority-fee distribution derived fresh per call, never cached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeeDistribution {
    pub min: u64,
    pub p25: u64,
    pub median: u64,
    pub p75: u64,
    pub p95: u64,
    pub max: u64,
    /// Always the p75 sample (or the fixed fallback when no samples exist)
    pub recommended: u64,
    pub congestion: CongestionLevel,
    pub landing_tiers: Vec<LandingTier>,
}

/// MEV 위험 수준
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Per-factor score components. Caps: price impact 40, liquidity 30, size 30.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskBreakdown {
    pub price_impact: u8,
    pub liquidity: u8,
    pub trade_size: u8,
}

/// MEV exposure assessment. Pure function of
/// (price impact, trade size, route hop count).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    /// 0..=100, sum of breakdown components
    pub score: u8,
    pub level: RiskLevel,
    pub sandwich_risk: bool,
    pub frontrun_risk: bool,
    /// Coarse heuristic loss estimate in input-token face value
    pub estimated_loss: f64,
    pub recommendations: Vec<String>,
    pub breakdown: RiskBreakdown,
}

/// Dry-run outcome, either measured against the network or estimated.
/// The shape is identical regardless of which path produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionOutcome {
    pub succeeded: bool,
    pub compute_units_used: u64,
    pub logs: Vec<String>,
    pub accounts_touched: usize,
    pub failure_cause: Option<String>,
}

/// Pre-formatted line items for downstream rendering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostDisplay {
    pub network_fee: String,
    pub priority_fee: String,
    pub total: String,
}

/// 수수료 분해 내역
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostBreakdown {
    pub base_fee_lamports: u64,
    pub priority_fee_lamports: u64,
    pub total_fee_lamports: u64,
    pub total_fee_usd: f64,
    /// Lamports per compute unit, ceil-rounded; 0 CU guarded via max(units, 1)
    pub compute_unit_price: u64,
    pub display: CostDisplay,
}

/// Composite simulation record. Created once per invocation, never mutated
/// after return; downstream consumers must not recompute derived fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: f64,
    pub expected_out: f64,
    pub price_impact_pct: f64,
    pub route: Vec<String>,
    pub quote: Quote,
    pub execution: ExecutionOutcome,
    pub risk: RiskAssessment,
    pub fees: FeeDistribution,
    pub cost: CostBreakdown,
    pub simulated_at: DateTime<Utc>,
}
