use rollwatch_rlp::error::RLPDecodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrieError {
    #[error(transparent)]
    RLPDecode(#[from] RLPDecodeError),
    #[error("Invalid node reference: expected empty or 32-byte hash")]
    InvalidNodeRef,
}
