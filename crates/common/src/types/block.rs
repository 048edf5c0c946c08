use ethereum_types::H256;
use serde::{Deserialize, Serialize};

/// A block header as reported by a chain-data provider.
///
/// Both chains share this shape; `l1_block_number` is the rollup's anchor
/// reference and is always `None` for base-chain (L1) blocks. Timestamps are
/// seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainBlock {
    pub number: u64,
    pub hash: H256,
    pub parent_hash: H256,
    pub timestamp: u64,
    pub state_root: H256,
    pub transactions_root: H256,
    pub receipts_root: H256,
    /// L1 block this rollup block anchors to, if any.
    pub l1_block_number: Option<u64>,
    /// Hashes of the block's transactions.
    pub transactions: Vec<H256>,
}

/// Receipt of an included transaction, as returned by the provider's
/// receipt lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: H256,
    pub block_number: u64,
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::keccak;

    #[test]
    fn block_serializes_with_optional_anchor() {
        let block = ChainBlock {
            number: 42,
            hash: keccak(b"block"),
            parent_hash: keccak(b"parent"),
            timestamp: 1_700_000_000,
            state_root: keccak(b"state"),
            transactions_root: keccak(b"txs"),
            receipts_root: keccak(b"receipts"),
            l1_block_number: None,
            transactions: vec![keccak(b"tx")],
        };
        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains("\"l1_block_number\":null"));
        assert_eq!(serde_json::from_str::<ChainBlock>(&json).unwrap(), block);
    }
}
