// swapscope - Solana swap simulation & MEV risk analysis engine

#![allow(dead_code)]

pub mod config;
pub mod quote;
pub mod fees;
pub mod risk;
pub mod probe;
pub mod cost;
pub mod engine;
pub mod stats;
pub mod mocks;

// Core types
pub mod types;
pub mod constants;

// Re-exports for convenience
pub use config::Config;
pub use engine::{SimulationEngine, SimulationRequest};
pub use quote::{JupiterQuoteClient, QuoteProvider};
pub use fees::{FeeSampler, RpcFeeSampler};
pub use risk::RiskScorer;
pub use probe::{ExecutionEstimator, HeuristicEstimator, LiveProbe};
pub use cost::CostEstimator;
pub use stats::{MemoryStatsRecorder, StatsRecorder, UsageStats};
pub use types::{
    CongestionLevel, CostBreakdown, ExecutionOutcome, FeeDistribution, Quote, RiskAssessment,
    RiskLevel, SimulationError, SimulationResult,
};
