use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::types::SimulationResult;

/// Aggregate usage counters across simulations
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UsageStats {
    pub total_simulations: u64,
    /// Sum of input amounts in face value
    pub total_volume: f64,
    /// 0..=1 fraction of probes (or estimates) that reported success
    pub success_rate: f64,
    pub avg_compute_units: f64,
    pub avg_priority_fee: f64,
}

/// Recording seam so callers can swap in persistence later
pub trait StatsRecorder: Send + Sync {
    fn record_outcome(&self, result: &SimulationResult);
    fn read_stats(&self) -> UsageStats;
}

/// 메모리 내 통계 집계. 프로세스 수명 동안만 유지된다.
#[derive(Default)]
pub struct MemoryStatsRecorder {
    inner: Mutex<Counters>,
}

#[derive(Default)]
struct Counters {
    simulations: u64,
    volume: f64,
    successes: u64,
    total_compute_units: u64,
    total_priority_fee: u64,
}

impl MemoryStatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsRecorder for MemoryStatsRecorder {
    fn record_outcome(&self, result: &SimulationResult) {
        if let Ok(mut c) = self.inner.lock() {
            c.simulations += 1;
            c.volume += result.amount_in;
            if result.execution.succeeded {
                c.successes += 1;
            }
            c.total_compute_units += result.execution.compute_units_used;
            c.total_priority_fee += result.fees.recommended;
        }
    }

    fn read_stats(&self) -> UsageStats {
        let c = match self.inner.lock() {
            Ok(guard) => guard,
            Err(_) => return UsageStats::default(),
        };
        if c.simulations == 0 {
            return UsageStats::default();
        }
        let n = c.simulations as f64;
        UsageStats {
            total_simulations: c.simulations,
            total_volume: c.volume,
            success_rate: c.successes as f64 / n,
            avg_compute_units: c.total_compute_units as f64 / n,
            avg_priority_fee: c.total_priority_fee as f64 / n,
        }
    }
}
