use async_trait::async_trait;
use ethereum_types::H256;
use rollwatch_common::types::{ChainBlock, TransactionReceipt};

use crate::errors::ChainClientError;

/// Read access to a chain-data provider.
///
/// One trait serves both chains: the verifier is handed one client per chain
/// it watches. Implementations must not retry internally; the verifier owns
/// the retry and timeout policy.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Latest block number known to the provider.
    async fn get_block_number(&self) -> Result<u64, ChainClientError>;

    /// Block at `number`, or `None` past the provider's head.
    async fn get_block_by_number(
        &self,
        number: u64,
    ) -> Result<Option<ChainBlock>, ChainClientError>;

    /// Receipt for an included transaction, `None` while still pending.
    async fn get_transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> Result<Option<TransactionReceipt>, ChainClientError>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;
    use rollwatch_common::utils::keccak;

    /// In-memory provider for tests. Blocks and receipts are seeded up
    /// front; `fail_requests` makes every call report a connection error.
    #[derive(Default)]
    pub struct MockChainClient {
        blocks: Mutex<HashMap<u64, ChainBlock>>,
        receipts: Mutex<HashMap<H256, TransactionReceipt>>,
        head: Mutex<u64>,
        block_requests: AtomicU64,
        pub fail_requests: bool,
    }

    impl MockChainClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_block(&self, block: ChainBlock) {
            let mut head = self.head.lock().unwrap();
            if block.number > *head {
                *head = block.number;
            }
            self.blocks.lock().unwrap().insert(block.number, block);
        }

        /// Advances the reported head without seeding block bodies.
        pub fn set_head(&self, head: u64) {
            *self.head.lock().unwrap() = head;
        }

        /// How many `get_block_by_number` calls this provider has served.
        pub fn block_request_count(&self) -> u64 {
            self.block_requests.load(Ordering::SeqCst)
        }

        pub fn add_receipt(&self, receipt: TransactionReceipt) {
            self.receipts
                .lock()
                .unwrap()
                .insert(receipt.transaction_hash, receipt);
        }

        fn check_available(&self) -> Result<(), ChainClientError> {
            if self.fail_requests {
                return Err(ChainClientError::Connection(
                    "provider unreachable".to_owned(),
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ChainClient for MockChainClient {
        async fn get_block_number(&self) -> Result<u64, ChainClientError> {
            self.check_available()?;
            Ok(*self.head.lock().unwrap())
        }

        async fn get_block_by_number(
            &self,
            number: u64,
        ) -> Result<Option<ChainBlock>, ChainClientError> {
            self.block_requests.fetch_add(1, Ordering::SeqCst);
            self.check_available()?;
            Ok(self.blocks.lock().unwrap().get(&number).cloned())
        }

        async fn get_transaction_receipt(
            &self,
            tx_hash: H256,
        ) -> Result<Option<TransactionReceipt>, ChainClientError> {
            self.check_available()?;
            Ok(self.receipts.lock().unwrap().get(&tx_hash).cloned())
        }
    }

    /// A rollup block whose state root and anchor are derived from the
    /// parameters, so distinct `state_tag`s yield distinct roots.
    pub fn rollup_block(
        number: u64,
        state_tag: &str,
        tx_count: usize,
        timestamp: u64,
        l1_block_number: Option<u64>,
    ) -> ChainBlock {
        let transactions = (0..tx_count)
            .map(|i| keccak(format!("tx-{number}-{i}")))
            .collect();
        ChainBlock {
            number,
            hash: keccak(format!("block-{number}")),
            parent_hash: keccak(format!("block-{}", number.wrapping_sub(1))),
            timestamp,
            state_root: keccak(state_tag),
            transactions_root: keccak(format!("txroot-{number}")),
            receipts_root: keccak(format!("rcroot-{number}")),
            l1_block_number,
            transactions,
        }
    }

    /// A base-chain block carrying only what anchor checks look at.
    pub fn anchor_block(number: u64, timestamp: u64) -> ChainBlock {
        ChainBlock {
            number,
            hash: keccak(format!("l1-block-{number}")),
            parent_hash: keccak(format!("l1-block-{}", number.wrapping_sub(1))),
            timestamp,
            state_root: keccak(format!("l1-state-{number}")),
            transactions_root: keccak(format!("l1-txroot-{number}")),
            receipts_root: keccak(format!("l1-rcroot-{number}")),
            l1_block_number: None,
            transactions: vec![],
        }
    }
}
