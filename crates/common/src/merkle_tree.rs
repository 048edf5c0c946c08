//! Binary Merkle tree over a flat list of leaf hashes, used for coarse batch
//! and transaction inclusion proofs (independent of the state trie's own
//! proof mechanism).
//!
//! An odd leaf at any level is paired with itself. This duplicate-last-node
//! padding is a known weakness for attacker-controlled leaf sets, since
//! `[.., x]` and `[.., x, x]` commit to the same root; a hardened design
//! would domain-separate left/right hashing instead. Kept as is for
//! compatibility with the proofs this verifier consumes.

use ethereum_types::H256;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// Inclusion proof for the leaf at `index`: one sibling hash per level, leaf
/// to root. Left/right order is recovered from the index's parity at each
/// level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub leaf: H256,
    pub index: usize,
    pub siblings: Vec<H256>,
    pub root: H256,
}

/// Root committing to `leaves`. Empty input commits to the zero hash; a
/// single leaf is its own root.
pub fn compute_merkle_root(leaves: &[H256]) -> H256 {
    match leaves {
        [] => H256::zero(),
        [single] => *single,
        _ => {
            let mut level = leaves.to_vec();
            while level.len() > 1 {
                level = next_level(&level);
            }
            level[0]
        }
    }
}

/// Builds the inclusion proof for `leaves[index]`, or `None` when the index
/// is out of range.
pub fn compute_merkle_proof(leaves: &[H256], index: usize) -> Option<MerkleProof> {
    if index >= leaves.len() {
        return None;
    }
    let mut level = leaves.to_vec();
    let mut idx = index;
    let mut siblings = Vec::new();
    while level.len() > 1 {
        let sibling = if idx % 2 == 0 {
            // even position: right sibling, or self when the level is odd
            *level.get(idx + 1).unwrap_or(&level[idx])
        } else {
            level[idx - 1]
        };
        siblings.push(sibling);
        level = next_level(&level);
        idx /= 2;
    }
    Some(MerkleProof {
        leaf: leaves[index],
        index,
        siblings,
        root: level[0],
    })
}

/// Recomputes the root from the proof's leaf and siblings and compares it
/// against the recorded root.
pub fn verify_merkle_proof(proof: &MerkleProof) -> bool {
    let mut acc = proof.leaf;
    let mut idx = proof.index;
    for sibling in &proof.siblings {
        acc = if idx % 2 == 0 {
            hash_pair(&acc, sibling)
        } else {
            hash_pair(sibling, &acc)
        };
        idx /= 2;
    }
    acc == proof.root
}

fn next_level(level: &[H256]) -> Vec<H256> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => hash_pair(left, right),
            [odd] => hash_pair(odd, odd),
            _ => unreachable!("chunks(2) yields one or two elements"),
        })
        .collect()
}

fn hash_pair(left: &H256, right: &H256) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    H256::from_slice(&hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::keccak;

    fn leaves(n: usize) -> Vec<H256> {
        (0..n).map(|i| keccak(format!("leaf-{i}"))).collect()
    }

    #[test]
    fn empty_and_single_leaf_roots() {
        assert_eq!(compute_merkle_root(&[]), H256::zero());
        let leaf = keccak(b"only");
        assert_eq!(compute_merkle_root(&[leaf]), leaf);
    }

    #[test]
    fn odd_levels_duplicate_the_last_node() {
        let l = leaves(3);
        let expected = hash_pair(&hash_pair(&l[0], &l[1]), &hash_pair(&l[2], &l[2]));
        assert_eq!(compute_merkle_root(&l), expected);
    }

    #[test]
    fn proofs_verify_for_every_index() {
        for n in 1..=9 {
            let l = leaves(n);
            let root = compute_merkle_root(&l);
            for i in 0..n {
                let proof = compute_merkle_proof(&l, i).unwrap();
                assert_eq!(proof.root, root, "root mismatch at n={n} i={i}");
                assert!(verify_merkle_proof(&proof), "proof failed at n={n} i={i}");
            }
        }
    }

    #[test]
    fn out_of_range_index_yields_no_proof() {
        assert!(compute_merkle_proof(&leaves(4), 4).is_none());
        assert!(compute_merkle_proof(&[], 0).is_none());
    }

    #[test]
    fn any_flipped_byte_invalidates_the_proof() {
        let l = leaves(5);
        let proof = compute_merkle_proof(&l, 2).unwrap();
        assert!(verify_merkle_proof(&proof));

        let mut bad = proof.clone();
        bad.leaf.0[7] ^= 0x01;
        assert!(!verify_merkle_proof(&bad));

        for level in 0..proof.siblings.len() {
            let mut bad = proof.clone();
            bad.siblings[level].0[0] ^= 0x01;
            assert!(!verify_merkle_proof(&bad), "flip at level {level} accepted");
        }

        let mut bad = proof.clone();
        bad.root.0[31] ^= 0x01;
        assert!(!verify_merkle_proof(&bad));
    }

    #[test]
    fn sibling_order_depends_on_index_parity() {
        let l = leaves(2);
        let left = compute_merkle_proof(&l, 0).unwrap();
        let right = compute_merkle_proof(&l, 1).unwrap();
        assert_eq!(left.root, right.root);
        assert_eq!(left.siblings, vec![l[1]]);
        assert_eq!(right.siblings, vec![l[0]]);
    }
}
