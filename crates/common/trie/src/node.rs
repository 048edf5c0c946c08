mod branch;
mod extension;
mod leaf;

use std::sync::Arc;

pub use branch::BranchNode;
use ethereum_types::H256;
pub use extension::ExtensionNode;
pub use leaf::LeafNode;

use crate::{hasher::TrieHasher, nibbles::Nibbles};

/// A node in the Merkle Patricia Trie.
///
/// Nodes are immutable: mutating operations return fresh nodes for the
/// root-to-target path and share every untouched subtree through [`Arc`], so
/// previously published roots stay readable.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Branch(Box<BranchNode>),
    Extension(ExtensionNode),
    Leaf(LeafNode),
}

impl From<BranchNode> for Node {
    fn from(node: BranchNode) -> Self {
        Node::Branch(Box::new(node))
    }
}

impl From<ExtensionNode> for Node {
    fn from(node: ExtensionNode) -> Self {
        Node::Extension(node)
    }
}

impl From<LeafNode> for Node {
    fn from(node: LeafNode) -> Self {
        Node::Leaf(node)
    }
}

impl Node {
    /// Retrieves the value stored under `path` in this subtrie.
    pub fn get(&self, path: Nibbles) -> Option<Vec<u8>> {
        match self {
            Node::Branch(n) => n.get(path),
            Node::Extension(n) => n.get(path),
            Node::Leaf(n) => n.get(path),
        }
    }

    /// Inserts a value into this subtrie, returning its new root.
    pub fn insert(&self, path: Nibbles, value: Vec<u8>) -> Node {
        match self {
            Node::Branch(n) => n.insert(path, value),
            Node::Extension(n) => n.insert(path, value),
            Node::Leaf(n) => n.insert(path, value),
        }
    }

    /// Removes the value under `path` from this subtrie.
    /// Returns the new subtrie root (if anything remains) and the removed
    /// value. Single-child branches left behind by the removal are collapsed
    /// bottom-up on the way out.
    pub fn remove(&self, path: Nibbles) -> (Option<Node>, Option<Vec<u8>>) {
        match self {
            Node::Branch(n) => n.remove(path),
            Node::Extension(n) => n.remove(path),
            Node::Leaf(n) => n.remove(path),
        }
    }

    /// RLP encoding of the node's logical content. Child references are the
    /// 32-byte hashes of the children's encodings.
    pub fn encode_raw(&self, hasher: &dyn TrieHasher) -> Vec<u8> {
        match self {
            Node::Branch(n) => n.encode_raw(hasher),
            Node::Extension(n) => n.encode_raw(hasher),
            Node::Leaf(n) => n.encode_raw(),
        }
    }

    /// Hash of the node's encoding under the injected hasher.
    pub fn compute_hash(&self, hasher: &dyn TrieHasher) -> H256 {
        hasher.hash(&self.encode_raw(hasher))
    }

    /// Walks towards `path`, appending the encoding of every node traversed
    /// (self included). Stops silently on a structural mismatch, leaving a
    /// proof of the longest existing path.
    pub fn get_path(
        &self,
        mut path: Nibbles,
        node_path: &mut Vec<Vec<u8>>,
        hasher: &dyn TrieHasher,
    ) {
        node_path.push(self.encode_raw(hasher));
        match self {
            Node::Branch(n) => {
                if let Some(choice) = path.next_choice() {
                    if let Some(child) = &n.choices[choice] {
                        child.get_path(path, node_path, hasher);
                    }
                }
            }
            Node::Extension(n) => {
                if path.skip_prefix(&n.prefix) {
                    n.child.get_path(path, node_path, hasher);
                }
            }
            Node::Leaf(_) => {}
        }
    }
}

/// The children table of a branch node.
pub type Choices = [Option<Arc<Node>>; 16];

pub(crate) fn empty_choices() -> Choices {
    std::array::from_fn(|_| None)
}
