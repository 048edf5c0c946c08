use rollwatch_rlp::error::RLPDecodeError;
use rollwatch_trie::TrieError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Trie(#[from] TrieError),
    #[error("Error decoding stored account: {0}")]
    AccountDecode(#[from] RLPDecodeError),
}
