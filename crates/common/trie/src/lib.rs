//! In-memory Merkle Patricia Trie with structural sharing.
//!
//! Keys are expanded to nibble sequences before traversal; values are raw
//! byte strings. Every mutation rebuilds only the root-to-target path and
//! shares untouched subtrees, so a cloned [`Trie`] is a cheap snapshot whose
//! root stays readable after further updates to the original.
//!
//! The hash primitive is injected through [`TrieHasher`]; [`KeccakHasher`]
//! is the shipped default.

mod error;
mod hasher;
mod nibbles;
mod node;
mod proof;

use std::sync::Arc;

use ethereum_types::H256;
use rollwatch_rlp::constants::RLP_NULL;

pub use self::error::TrieError;
pub use self::hasher::{KeccakHasher, TrieHasher};
pub use self::nibbles::Nibbles;
pub use self::node::{BranchNode, ExtensionNode, LeafNode, Node};
pub use self::proof::verify_proof;

use self::node::LeafNode as Leaf;

/// Encoded trie value.
pub type ValueRLP = Vec<u8>;
/// Encoded trie node, as carried in proofs.
pub type NodeRLP = Vec<u8>;

#[derive(Clone)]
pub struct Trie {
    root: Option<Arc<Node>>,
    hasher: Arc<dyn TrieHasher>,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    /// Creates an empty trie committed under Keccak-256.
    pub fn new() -> Self {
        Self::with_hasher(Arc::new(KeccakHasher))
    }

    /// Creates an empty trie committed under a caller-chosen hash primitive.
    pub fn with_hasher(hasher: Arc<dyn TrieHasher>) -> Self {
        Self { root: None, hasher }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Retrieves the value stored under `path`, or `None` on any structural
    /// mismatch along the way.
    pub fn get(&self, path: &[u8]) -> Option<ValueRLP> {
        self.root
            .as_ref()
            .and_then(|root| root.get(Nibbles::from_bytes(path)))
    }

    /// Inserts a value, replacing any previous value under the same path.
    ///
    /// An empty value is the wire encoding of absence (branch nodes encode a
    /// missing value as the empty string), so inserting one removes the path
    /// instead of storing an unobservable entry.
    pub fn insert(&mut self, path: &[u8], value: ValueRLP) {
        if value.is_empty() {
            self.remove(path);
            return;
        }
        let path = Nibbles::from_bytes(path);
        let new_root = match &self.root {
            Some(root) => root.insert(path, value),
            None => Leaf::new(path, value).into(),
        };
        self.root = Some(Arc::new(new_root));
    }

    /// Removes the value under `path`, returning it if it was present.
    pub fn remove(&mut self, path: &[u8]) -> Option<ValueRLP> {
        let root = self.root.take()?;
        let (new_root, removed) = root.remove(Nibbles::from_bytes(path));
        self.root = new_root.map(Arc::new);
        removed
    }

    /// Root hash committing to the trie's full contents.
    ///
    /// The empty trie commits to `hash(rlp(""))`, a computed value rather
    /// than a zero placeholder.
    pub fn hash(&self) -> H256 {
        match &self.root {
            Some(root) => root.compute_hash(self.hasher.as_ref()),
            None => self.hasher.hash(&[RLP_NULL]),
        }
    }

    /// Ordered list of encoded nodes from the root towards `path`, usable as
    /// an inclusion proof. Stops at the deepest existing node, so an absent
    /// path yields a proof of its longest existing prefix.
    pub fn get_proof(&self, path: &[u8]) -> Vec<NodeRLP> {
        let mut node_path = Vec::new();
        if let Some(root) = &self.root {
            root.get_path(Nibbles::from_bytes(path), &mut node_path, self.hasher.as_ref());
        }
        node_path
    }

    /// Verifies a caller-supplied proof against `root` under this trie's
    /// hasher. See [`verify_proof`].
    pub fn verify_proof(
        &self,
        root: H256,
        path: &[u8],
        value: &[u8],
        proof: &[NodeRLP],
    ) -> Result<bool, TrieError> {
        proof::verify_proof(self.hasher.as_ref(), root, path, value, proof)
    }
}

impl std::fmt::Debug for Trie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trie").field("root", &self.hash()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn kv(trie: &mut Trie, key: &[u8], value: &[u8]) {
        trie.insert(key, value.to_vec());
    }

    #[test]
    fn empty_trie_root_is_hash_of_empty_string() {
        // keccak256(rlp("")) = keccak256(0x80)
        assert_eq!(
            Trie::new().hash(),
            H256(hex!(
                "56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421"
            ))
        );
    }

    #[test]
    fn get_returns_inserted_values() {
        let mut trie = Trie::new();
        kv(&mut trie, &hex!("aabb"), b"X");
        kv(&mut trie, &hex!("aacc"), b"Y");

        assert_eq!(trie.get(&hex!("aabb")), Some(b"X".to_vec()));
        assert_eq!(trie.get(&hex!("aacc")), Some(b"Y".to_vec()));
        assert_eq!(trie.get(&hex!("aadd")), None);
    }

    #[test]
    fn root_changes_when_content_changes() {
        let mut trie = Trie::new();
        kv(&mut trie, &hex!("aabb"), b"X");
        let root_one = trie.hash();
        kv(&mut trie, &hex!("aacc"), b"Y");
        assert_ne!(trie.hash(), root_one);
    }

    #[test]
    fn insert_is_idempotent() {
        let mut trie = Trie::new();
        kv(&mut trie, &hex!("0102"), b"value");
        let root = trie.hash();
        kv(&mut trie, &hex!("0102"), b"value");
        assert_eq!(trie.hash(), root);
    }

    #[test]
    fn root_is_independent_of_insertion_order() {
        let pairs: Vec<(&[u8], &[u8])> = vec![
            (&hex!("aabb"), b"1"),
            (&hex!("aabbcc"), b"2"),
            (&hex!("aacc"), b"3"),
            (&hex!("00"), b"4"),
            (&hex!("aa"), b"5"),
        ];

        let mut forward = Trie::new();
        for (k, v) in &pairs {
            forward.insert(k, v.to_vec());
        }
        let mut backward = Trie::new();
        for (k, v) in pairs.iter().rev() {
            backward.insert(k, v.to_vec());
        }
        assert_eq!(forward.hash(), backward.hash());
    }

    #[test]
    fn keys_that_prefix_each_other() {
        let mut trie = Trie::new();
        kv(&mut trie, &hex!("aabb"), b"short");
        kv(&mut trie, &hex!("aabbcc"), b"long");

        assert_eq!(trie.get(&hex!("aabb")), Some(b"short".to_vec()));
        assert_eq!(trie.get(&hex!("aabbcc")), Some(b"long".to_vec()));
    }

    #[test]
    fn remove_leaves_siblings_untouched() {
        let mut trie = Trie::new();
        kv(&mut trie, &hex!("aabb"), b"X");
        kv(&mut trie, &hex!("aacc"), b"Y");
        kv(&mut trie, &hex!("bb"), b"Z");

        assert_eq!(trie.remove(&hex!("aacc")), Some(b"Y".to_vec()));
        assert_eq!(trie.get(&hex!("aacc")), None);
        assert_eq!(trie.get(&hex!("aabb")), Some(b"X".to_vec()));
        assert_eq!(trie.get(&hex!("bb")), Some(b"Z".to_vec()));

        assert_eq!(trie.remove(&hex!("aacc")), None);
    }

    #[test]
    fn remove_collapses_single_child_branches() {
        // After removing one of two diverging keys, the structure must be
        // identical to a trie that only ever saw the remaining key.
        let mut trie = Trie::new();
        kv(&mut trie, &hex!("aabb"), b"X");
        kv(&mut trie, &hex!("aacc"), b"Y");
        trie.remove(&hex!("aacc"));

        let mut reference = Trie::new();
        kv(&mut reference, &hex!("aabb"), b"X");
        assert_eq!(trie.hash(), reference.hash());
    }

    #[test]
    fn remove_collapse_chains_through_extensions() {
        // Branch under an extension: removing all but one key must merge
        // extension+extension / extension+leaf into single nodes.
        let mut trie = Trie::new();
        kv(&mut trie, &hex!("aabbcc01"), b"1");
        kv(&mut trie, &hex!("aabbcc02"), b"2");
        kv(&mut trie, &hex!("aabbdd"), b"3");

        trie.remove(&hex!("aabbdd"));
        trie.remove(&hex!("aabbcc02"));

        let mut reference = Trie::new();
        kv(&mut reference, &hex!("aabbcc01"), b"1");
        assert_eq!(trie.hash(), reference.hash());
        assert_eq!(trie.get(&hex!("aabbcc01")), Some(b"1".to_vec()));
    }

    #[test]
    fn remove_key_ending_at_branch() {
        let mut trie = Trie::new();
        kv(&mut trie, &hex!("aa"), b"at-branch");
        kv(&mut trie, &hex!("aabb"), b"below-1");
        kv(&mut trie, &hex!("aacc"), b"below-2");

        assert_eq!(trie.remove(&hex!("aa")), Some(b"at-branch".to_vec()));
        assert_eq!(trie.get(&hex!("aa")), None);
        assert_eq!(trie.get(&hex!("aabb")), Some(b"below-1".to_vec()));
        assert_eq!(trie.get(&hex!("aacc")), Some(b"below-2".to_vec()));
    }

    #[test]
    fn removing_everything_restores_the_empty_root() {
        let mut trie = Trie::new();
        kv(&mut trie, &hex!("01"), b"a");
        kv(&mut trie, &hex!("02"), b"b");
        trie.remove(&hex!("01"));
        trie.remove(&hex!("02"));

        assert!(trie.is_empty());
        assert_eq!(trie.hash(), Trie::new().hash());
    }

    #[test]
    fn empty_values_read_as_absence_everywhere() {
        let mut trie = Trie::new();
        kv(&mut trie, &hex!("aabb"), b"X");
        kv(&mut trie, &hex!("aacc"), b"");
        assert_eq!(trie.get(&hex!("aacc")), None);

        // overwriting with an empty value deletes the entry
        kv(&mut trie, &hex!("aabb"), b"");
        assert_eq!(trie.get(&hex!("aabb")), None);
        assert!(trie.is_empty());
        assert_eq!(trie.hash(), Trie::new().hash());
    }

    #[test]
    fn snapshots_stay_readable_after_updates() {
        let mut trie = Trie::new();
        kv(&mut trie, &hex!("aabb"), b"old");
        let snapshot = trie.clone();
        let old_root = snapshot.hash();

        kv(&mut trie, &hex!("aabb"), b"new");
        kv(&mut trie, &hex!("ff"), b"more");

        assert_eq!(snapshot.hash(), old_root);
        assert_eq!(snapshot.get(&hex!("aabb")), Some(b"old".to_vec()));
        assert_eq!(snapshot.get(&hex!("ff")), None);
        assert_eq!(trie.get(&hex!("aabb")), Some(b"new".to_vec()));
    }

    #[test]
    fn proof_roundtrip() {
        let mut trie = Trie::new();
        kv(&mut trie, &hex!("aabb"), b"X");
        kv(&mut trie, &hex!("aacc"), b"Y");
        kv(&mut trie, &hex!("aabbcc"), b"Z");
        let root = trie.hash();

        for (key, value) in [
            (&hex!("aabb")[..], &b"X"[..]),
            (&hex!("aacc")[..], b"Y"),
            (&hex!("aabbcc")[..], b"Z"),
        ] {
            let proof = trie.get_proof(key);
            assert!(!proof.is_empty());
            assert!(trie.verify_proof(root, key, value, &proof).unwrap());
        }
    }

    #[test]
    fn proof_rejects_wrong_value() {
        let mut trie = Trie::new();
        kv(&mut trie, &hex!("aabb"), b"X");
        kv(&mut trie, &hex!("aacc"), b"Y");
        let root = trie.hash();

        let proof = trie.get_proof(&hex!("aabb"));
        assert!(!trie.verify_proof(root, &hex!("aabb"), b"forged", &proof).unwrap());
    }

    #[test]
    fn proof_rejects_any_corrupted_node() {
        let mut trie = Trie::new();
        kv(&mut trie, &hex!("aabb"), b"X");
        kv(&mut trie, &hex!("aacc"), b"Y");
        kv(&mut trie, &hex!("aabbcc"), b"Z");
        let root = trie.hash();
        let proof = trie.get_proof(&hex!("aabbcc"));
        assert!(trie.verify_proof(root, &hex!("aabbcc"), b"Z", &proof).unwrap());

        // Flipping any single byte anywhere in the proof breaks the chain.
        for i in 0..proof.len() {
            for j in 0..proof[i].len() {
                let mut tampered = proof.clone();
                tampered[i][j] ^= 0x01;
                let accepted = trie
                    .verify_proof(root, &hex!("aabbcc"), b"Z", &tampered)
                    .unwrap_or(false);
                assert!(!accepted, "tampered proof accepted at node {i} byte {j}");
            }
        }
    }

    #[test]
    fn proof_rejects_wrong_root() {
        let mut trie = Trie::new();
        kv(&mut trie, &hex!("aabb"), b"X");
        let proof = trie.get_proof(&hex!("aabb"));
        assert!(!trie
            .verify_proof(H256::zero(), &hex!("aabb"), b"X", &proof)
            .unwrap());
    }

    #[test]
    fn proof_rejects_truncated_chain() {
        let mut trie = Trie::new();
        kv(&mut trie, &hex!("aabb"), b"X");
        kv(&mut trie, &hex!("aacc"), b"Y");
        let root = trie.hash();
        let mut proof = trie.get_proof(&hex!("aabb"));
        proof.pop();
        assert!(!trie.verify_proof(root, &hex!("aabb"), b"X", &proof).unwrap());
    }

    #[test]
    fn large_trie_survives_mixed_workload() {
        let mut trie = Trie::new();
        for i in 0u16..256 {
            trie.insert(&i.to_be_bytes(), format!("value-{i}").into_bytes());
        }
        for i in (0u16..256).step_by(2) {
            assert!(trie.remove(&i.to_be_bytes()).is_some());
        }
        for i in 0u16..256 {
            let got = trie.get(&i.to_be_bytes());
            if i % 2 == 0 {
                assert_eq!(got, None);
            } else {
                assert_eq!(got, Some(format!("value-{i}").into_bytes()));
            }
        }

        let mut reference = Trie::new();
        for i in (1u16..256).step_by(2) {
            reference.insert(&i.to_be_bytes(), format!("value-{i}").into_bytes());
        }
        assert_eq!(trie.hash(), reference.hash());
    }
}
