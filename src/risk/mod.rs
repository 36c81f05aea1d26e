use crate::config::RiskConfig;
use crate::types::{RiskAssessment, RiskBreakdown, RiskLevel};

/// MEV 위험도 채점기. 순수 함수: (가격 영향, 거래 규모, 경로 홉 수)만 본다.
///
/// Component caps: price impact 40, liquidity (hop count) 30, trade size 30.
/// The composite score is their sum, so it never exceeds 100.
pub struct RiskScorer {
    cfg: RiskConfig,
}

impl RiskScorer {
    pub fn new(cfg: RiskConfig) -> Self {
        Self { cfg }
    }

    pub fn assess(&self, price_impact_pct: f64, trade_size: f64, hop_count: usize) -> RiskAssessment {
        let breakdown = RiskBreakdown {
            price_impact: self.impact_component(price_impact_pct),
            liquidity: self.liquidity_component(hop_count),
            trade_size: self.size_component(trade_size),
        };
        let score = breakdown.price_impact + breakdown.liquidity + breakdown.trade_size;
        let level = self.classify(score);

        // Coarse loss heuristic: the assumed share of slippage an attacker captures
        let estimated_loss = (price_impact_pct / 100.0) * trade_size * self.cfg.loss_capture_ratio;

        RiskAssessment {
            score,
            level,
            sandwich_risk: price_impact_pct > 1.0,
            frontrun_risk: trade_size > self.cfg.size_small,
            estimated_loss,
            recommendations: self.recommend(score, price_impact_pct, hop_count),
            breakdown,
        }
    }

    fn impact_component(&self, impact: f64) -> u8 {
        if impact > self.cfg.impact_severe {
            40
        } else if impact > self.cfg.impact_heavy {
            30
        } else if impact > self.cfg.impact_moderate {
            20
        } else if impact > self.cfg.impact_minor {
            10
        } else {
            0
        }
    }

    // More hops means thinner pools along the way
    fn liquidity_component(&self, hops: usize) -> u8 {
        if hops > 3 {
            30
        } else if hops > 2 {
            20
        } else if hops > 1 {
            10
        } else {
            0
        }
    }

    // Face-value thresholds, deliberately not USD-normalized
    fn size_component(&self, size: f64) -> u8 {
        if size > self.cfg.size_large {
            30
        } else if size > self.cfg.size_medium {
            20
        } else if size > self.cfg.size_small {
            10
        } else {
            0
        }
    }

    fn classify(&self, score: u8) -> RiskLevel {
        if score > self.cfg.critical_over {
            RiskLevel::Critical
        } else if score > self.cfg.high_over {
            RiskLevel::High
        } else if score > self.cfg.medium_over {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Ordered advice list; the safe-trade message appears only when
    /// nothing else applied.
    fn recommend(&self, score: u8, impact: f64, hops: usize) -> Vec<String> {
        let mut out = Vec::new();
        if score > self.cfg.high_over {
            out.push("Consider submitting through a private relay to avoid the public mempool".to_string());
        }
        if impact > 2.0 {
            out.push("Split the trade into smaller chunks to reduce price impact".to_string());
        }
        if hops > 2 {
            out.push("Prefer a more direct route with fewer hops".to_string());
        }
        if score > self.cfg.medium_over {
            out.push("Raise slippage tolerance by 0.5% to reduce revert risk".to_string());
        }
        if out.is_empty() {
            out.push("Trade looks safe to execute".to_string());
        }
        out
    }
}
