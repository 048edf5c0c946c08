use ethereum_types::H256;
use sha3::{Digest, Keccak256};

/// Hash primitive used for node commitments.
///
/// Injected at [`Trie`](crate::Trie) construction so the commitment scheme
/// can be swapped without touching the tree logic. Swapping it changes every
/// root hash, so the choice is a compatibility decision.
pub trait TrieHasher: Send + Sync {
    fn hash(&self, data: &[u8]) -> H256;
}

/// Keccak-256, the default hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeccakHasher;

impl TrieHasher for KeccakHasher {
    fn hash(&self, data: &[u8]) -> H256 {
        H256::from_slice(&Keccak256::digest(data))
    }
}
