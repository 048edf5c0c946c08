use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a timestamp drift beyond tolerance is treated.
///
/// Testnets run `Permissive` (drift is an advisory note); `Strict` turns the
/// same drift into a verification failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriftPolicy {
    Permissive,
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Max tolerated offset between a rollup block and its L1 anchor.
    pub timestamp_tolerance: Duration,
    pub drift_policy: DriftPolicy,
    /// Confirmations required before a block counts as finalized.
    pub finality_depth: u64,
    /// Per-request timeout on every provider call.
    pub request_timeout: Duration,
    /// Fixed delay between sequential per-block verifications. Static
    /// backpressure against the provider, not adaptive.
    pub block_delay: Duration,
    /// Consecutive failures that trigger `failure_pause` in the monitor.
    pub max_consecutive_failures: u32,
    pub failure_pause: Duration,
    /// How often the monitor polls the provider head when caught up.
    pub head_poll_interval: Duration,
    pub receipt_poll_interval: Duration,
    pub receipt_max_attempts: u32,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            timestamp_tolerance: Duration::from_secs(300),
            drift_policy: DriftPolicy::Permissive,
            finality_depth: 50,
            request_timeout: Duration::from_secs(30),
            block_delay: Duration::from_millis(100),
            max_consecutive_failures: 3,
            failure_pause: Duration::from_secs(10),
            head_poll_interval: Duration::from_secs(5),
            receipt_poll_interval: Duration::from_secs(2),
            receipt_max_attempts: 30,
        }
    }
}
