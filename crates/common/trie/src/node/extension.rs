use std::sync::Arc;

use rollwatch_rlp::structs::Encoder;

use super::{BranchNode, LeafNode, Node, empty_choices};
use crate::{hasher::TrieHasher, nibbles::Nibbles};

/// Path compression for a single-child chain: a non-empty run of shared
/// nibbles followed by exactly one child.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionNode {
    pub prefix: Nibbles,
    pub child: Arc<Node>,
}

impl ExtensionNode {
    pub fn new(prefix: Nibbles, child: Arc<Node>) -> Self {
        debug_assert!(!prefix.is_empty(), "extension prefix must be non-empty");
        Self { prefix, child }
    }

    pub fn get(&self, mut path: Nibbles) -> Option<Vec<u8>> {
        if path.skip_prefix(&self.prefix) {
            self.child.get(path)
        } else {
            None
        }
    }

    pub fn insert(&self, mut path: Nibbles, value: Vec<u8>) -> Node {
        if path.skip_prefix(&self.prefix) {
            // Full prefix match: the change happens somewhere below.
            let child = self.child.insert(path, value);
            return Self::new(self.prefix.clone(), Arc::new(child)).into();
        }

        // Partial match: split into (optional shorter extension +) branch.
        let match_len = path.count_prefix(&self.prefix);
        let branch_choice = self.prefix.at(match_len) as usize;
        let own_suffix = self.prefix.offset(match_len + 1);
        let own_side: Arc<Node> = if own_suffix.is_empty() {
            self.child.clone()
        } else {
            Arc::new(Self::new(own_suffix, self.child.clone()).into())
        };

        let mut branch = BranchNode::new(empty_choices());
        branch.choices[branch_choice] = Some(own_side);
        let mut path_suffix = path.offset(match_len);
        match path_suffix.next_choice() {
            Some(choice) => {
                branch.choices[choice] = Some(Arc::new(LeafNode::new(path_suffix, value).into()));
            }
            None => branch.value = value,
        }

        let branch: Node = branch.into();
        if match_len == 0 {
            branch
        } else {
            Self::new(self.prefix.slice(0, match_len), Arc::new(branch)).into()
        }
    }

    pub fn remove(&self, mut path: Nibbles) -> (Option<Node>, Option<Vec<u8>>) {
        if !path.skip_prefix(&self.prefix) {
            return (Some(self.clone().into()), None);
        }
        let (new_child, removed) = self.child.remove(path);
        if removed.is_none() {
            return (Some(self.clone().into()), None);
        }
        // A collapsed child absorbs this extension's prefix, keeping the
        // "no extension over extension, no extension over leaf" shape.
        let node = match new_child {
            None => None,
            Some(Node::Leaf(leaf)) => {
                Some(LeafNode::new(self.prefix.concat(&leaf.partial), leaf.value).into())
            }
            Some(Node::Extension(ext)) => {
                Some(ExtensionNode::new(self.prefix.concat(&ext.prefix), ext.child).into())
            }
            Some(branch @ Node::Branch(_)) => {
                Some(Self::new(self.prefix.clone(), Arc::new(branch)).into())
            }
        };
        (node, removed)
    }

    /// 2-item list: compact-encoded prefix and the child's hash.
    pub fn encode_raw(&self, hasher: &dyn TrieHasher) -> Vec<u8> {
        let mut buf = Vec::new();
        Encoder::new(&mut buf)
            .encode_field(&self.prefix.encode_compact().as_slice())
            .encode_field(&self.child.compute_hash(hasher))
            .finish();
        buf
    }
}
