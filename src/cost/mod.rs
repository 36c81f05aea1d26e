use crate::config::CostConfig;
use crate::constants::format_sol_amount;
use crate::types::{CostBreakdown, CostDisplay};

/// Landed-cost estimator. Pure arithmetic over the fee recommendation and
/// the measured (or estimated) compute unit consumption.
pub struct CostEstimator {
    cfg: CostConfig,
}

impl CostEstimator {
    pub fn new(cfg: CostConfig) -> Self {
        Self { cfg }
    }

    /// `priority_fee_lamports` is the total priority budget for the
    /// transaction; the per-unit price is its ceil division by the unit
    /// count, with zero-unit estimates guarded via max(units, 1).
    pub fn estimate(&self, priority_fee_lamports: u64, compute_units: u64) -> CostBreakdown {
        let units_eff = compute_units.max(1);
        let compute_unit_price = (priority_fee_lamports + units_eff - 1) / units_eff;
        // Re-derive the total from the rounded unit price so the breakdown
        // reflects what a fee payer would actually be charged.
        let priority_total = compute_unit_price * units_eff;
        let total_fee_lamports = self.cfg.base_fee_lamports + priority_total;
        let total_fee_usd = lamports_to_sol(total_fee_lamports) * self.cfg.sol_price_usd;

        CostBreakdown {
            base_fee_lamports: self.cfg.base_fee_lamports,
            priority_fee_lamports: priority_total,
            total_fee_lamports,
            total_fee_usd,
            compute_unit_price,
            display: CostDisplay {
                network_fee: format_sol_amount(self.cfg.base_fee_lamports),
                priority_fee: format_sol_amount(priority_total),
                total: format!(
                    "{} (${:.4})",
                    format_sol_amount(total_fee_lamports),
                    total_fee_usd
                ),
            },
        }
    }
}

fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / crate::constants::LAMPORTS_PER_SOL as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> CostEstimator {
        CostEstimator::new(crate::config::Config::default().cost)
    }

    #[test]
    fn test_even_division() {
        // 200_000 lamports over 100_000 CU -> 2 lamports/CU
        let cost = estimator().estimate(200_000, 100_000);
        assert_eq!(cost.compute_unit_price, 2);
        assert_eq!(cost.priority_fee_lamports, 200_000);
        assert_eq!(cost.base_fee_lamports, 5_000);
        assert_eq!(cost.total_fee_lamports, 205_000);
    }

    #[test]
    fn test_ceil_rounding_raises_total() {
        // 100 lamports over 33 CU -> ceil(3.03) = 4; total 4 * 33 = 132
        let cost = estimator().estimate(100, 33);
        assert_eq!(cost.compute_unit_price, 4);
        assert_eq!(cost.priority_fee_lamports, 132);
        assert_eq!(cost.total_fee_lamports, 5_132);
    }

    #[test]
    fn test_zero_compute_units_guarded() {
        let cost = estimator().estimate(10_000, 0);
        assert_eq!(cost.compute_unit_price, 10_000);
        assert_eq!(cost.priority_fee_lamports, 10_000);
        assert_eq!(cost.total_fee_lamports, 15_000);
    }

    #[test]
    fn test_zero_priority_fee() {
        let cost = estimator().estimate(0, 200_000);
        assert_eq!(cost.compute_unit_price, 0);
        assert_eq!(cost.priority_fee_lamports, 0);
        assert_eq!(cost.total_fee_lamports, 5_000);
    }

    #[test]
    fn test_usd_uses_fixed_reference_price() {
        // 1_000_000 lamports = 0.001 SOL at $150 -> $0.15
        let cost = estimator().estimate(995_000, 1);
        assert_eq!(cost.total_fee_lamports, 1_000_000);
        assert!((cost.total_fee_usd - 0.15).abs() < 1e-9);
        assert!(cost.display.total.contains("$0.1500"));
    }

    #[test]
    fn test_display_strings_render_sol() {
        let cost = estimator().estimate(0, 1);
        assert_eq!(cost.display.network_fee, "0.000005 SOL");
        assert_eq!(cost.display.priority_fee, "0.000000 SOL");
    }
}
