use std::sync::Arc;
use std::time::{Duration, Instant};

use ethereum_types::H256;
use rollwatch_common::types::{ChainBlock, TransactionReceipt};
use rollwatch_storage::StateStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::ChainClient;
use crate::config::{DriftPolicy, VerifierConfig};
use crate::errors::{ChainClientError, VerifierError};

/// Outcome of verifying a single rollup block.
///
/// Provider failures never escape `verify_block`; they land here as
/// `is_valid = false` with the error recorded, so one bad block cannot
/// terminate a monitoring loop. Policy warnings under a permissive
/// configuration land in `notes` on an otherwise valid result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub block_number: u64,
    pub l1_block_number: Option<u64>,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub notes: Vec<String>,
    pub verification_time_ms: u64,
    pub state_root_valid: bool,
    pub transactions_count: usize,
    /// Rollup timestamp minus L1 anchor timestamp, in seconds.
    pub timestamp_offset: Option<i64>,
}

impl VerificationResult {
    fn new(block_number: u64) -> Self {
        Self {
            block_number,
            l1_block_number: None,
            is_valid: false,
            errors: Vec::new(),
            notes: Vec::new(),
            verification_time_ms: 0,
            state_root_valid: true,
            transactions_count: 0,
            timestamp_offset: None,
        }
    }

    fn finish(&mut self, started: Instant) {
        self.is_valid = self.errors.is_empty();
        self.verification_time_ms = started.elapsed().as_millis() as u64;
    }
}

/// Verifies rollup blocks against locally tracked state roots and their L1
/// anchors.
///
/// Holds one client per chain and exclusive ownership of the [`StateStore`].
/// All provider calls are bounded by `config.request_timeout`.
pub struct BlockVerifier {
    l2_client: Arc<dyn ChainClient>,
    l1_client: Arc<dyn ChainClient>,
    store: StateStore,
    config: VerifierConfig,
}

impl BlockVerifier {
    pub fn new(
        l2_client: Arc<dyn ChainClient>,
        l1_client: Arc<dyn ChainClient>,
        store: StateStore,
        config: VerifierConfig,
    ) -> Self {
        Self {
            l2_client,
            l1_client,
            store,
            config,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    async fn fetch_block(
        client: &dyn ChainClient,
        timeout: Duration,
        number: u64,
    ) -> Result<Option<ChainBlock>, ChainClientError> {
        tokio::time::timeout(timeout, client.get_block_by_number(number))
            .await
            .map_err(|_| ChainClientError::Timeout)?
    }

    /// Verifies a single rollup block. Never fails: provider errors become
    /// an invalid result with the cause recorded.
    ///
    /// The state-root check is an economic heuristic, not replay: the
    /// declared root must differ from the stored root of the previous block
    /// whenever the block carries transactions. It cannot detect a wrong
    /// root, only a stale one.
    pub async fn verify_block(&mut self, number: u64) -> VerificationResult {
        let started = Instant::now();
        let mut result = VerificationResult::new(number);
        debug!(block_number = number, "verifying rollup block");

        let block =
            match Self::fetch_block(&*self.l2_client, self.config.request_timeout, number).await {
                Ok(Some(block)) => block,
                Ok(None) => {
                    result.errors.push(format!("Rollup block {number} not found"));
                    result.finish(started);
                    return result;
                }
                Err(err) => {
                    result
                        .errors
                        .push(format!("Failed to fetch rollup block {number}: {err}"));
                    result.finish(started);
                    return result;
                }
            };

        result.l1_block_number = block.l1_block_number;
        result.transactions_count = block.transactions.len();

        let prior_root = self.store.root_at(number.saturating_sub(1));
        if let Some(prior_root) = prior_root {
            if !block.transactions.is_empty() && block.state_root == prior_root {
                result.state_root_valid = false;
                result.errors.push(format!(
                    "State root unchanged from block {} despite {} transactions",
                    number.saturating_sub(1),
                    result.transactions_count
                ));
            }
        }
        // Declared root goes into history either way; range verification
        // stops at the first invalid block so later checks never build on a
        // bad root.
        self.store.record_root(number, block.state_root);

        self.check_l1_anchor(&block, &mut result).await;

        result.finish(started);
        if result.is_valid {
            info!(
                block_number = number,
                transactions = result.transactions_count,
                "block verified"
            );
        } else {
            warn!(
                block_number = number,
                errors = ?result.errors,
                "block failed verification"
            );
        }
        result
    }

    async fn check_l1_anchor(&self, block: &ChainBlock, result: &mut VerificationResult) {
        let Some(anchor_number) = block.l1_block_number else {
            result
                .notes
                .push("Block does not reference an L1 anchor".to_owned());
            return;
        };

        let anchor =
            Self::fetch_block(&*self.l1_client, self.config.request_timeout, anchor_number).await;
        match anchor {
            Ok(Some(anchor)) => {
                let offset = block.timestamp as i64 - anchor.timestamp as i64;
                result.timestamp_offset = Some(offset);
                if offset.unsigned_abs() > self.config.timestamp_tolerance.as_secs() {
                    let message = format!(
                        "Timestamp drifts {offset}s from L1 anchor block {anchor_number}"
                    );
                    match self.config.drift_policy {
                        DriftPolicy::Permissive => result.notes.push(message),
                        DriftPolicy::Strict => result.errors.push(message),
                    }
                }
            }
            // A missing anchor is advisory, never fatal.
            Ok(None) => result
                .notes
                .push(format!("L1 anchor block {anchor_number} not found")),
            Err(err) => result
                .errors
                .push(format!("Failed to fetch L1 anchor block {anchor_number}: {err}")),
        }
    }

    /// Verifies `start..=end` sequentially with `block_delay` between
    /// blocks. Fail-stop: returns the results obtained up to and including
    /// the first invalid block, never verifying past it.
    pub async fn verify_block_range(&mut self, start: u64, end: u64) -> Vec<VerificationResult> {
        let mut results = Vec::new();
        for number in start..=end {
            if number > start {
                tokio::time::sleep(self.config.block_delay).await;
            }
            let result = self.verify_block(number).await;
            let is_valid = result.is_valid;
            results.push(result);
            if !is_valid {
                warn!(
                    block_number = number,
                    "stopping range verification at first invalid block"
                );
                break;
            }
        }
        results
    }

    pub async fn latest_block_number(&self) -> Result<u64, VerifierError> {
        let latest = tokio::time::timeout(
            self.config.request_timeout,
            self.l2_client.get_block_number(),
        )
        .await
        .map_err(|_| ChainClientError::Timeout)??;
        Ok(latest)
    }

    /// Confirmation-depth heuristic: finalized once more than
    /// `finality_depth` confirmations have elapsed. Not a cryptographic
    /// finality proof.
    pub async fn is_finalized(&self, block_number: u64) -> Result<bool, VerifierError> {
        let latest = self.latest_block_number().await?;
        Ok(latest.saturating_sub(block_number) > self.config.finality_depth)
    }

    /// Polls for a transaction receipt at a fixed interval, up to
    /// `receipt_max_attempts` times. Exhausting the attempts is a timeout,
    /// not an escalation.
    pub async fn wait_for_receipt(
        &self,
        tx_hash: H256,
    ) -> Result<TransactionReceipt, VerifierError> {
        for attempt in 0..self.config.receipt_max_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.config.receipt_poll_interval).await;
            }
            let receipt = tokio::time::timeout(
                self.config.request_timeout,
                self.l2_client.get_transaction_receipt(tx_hash),
            )
            .await
            .map_err(|_| ChainClientError::Timeout)??;
            if let Some(receipt) = receipt {
                return Ok(receipt);
            }
            debug!(tx_hash = %format!("{tx_hash:#x}"), attempt, "receipt not yet available");
        }
        Err(VerifierError::ReceiptTimeout(tx_hash))
    }
}
