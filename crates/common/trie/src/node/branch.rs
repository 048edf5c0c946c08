use std::sync::Arc;

use rollwatch_rlp::structs::Encoder;

use super::{Choices, ExtensionNode, LeafNode, Node};
use crate::{
    hasher::TrieHasher,
    nibbles::{LEAF_FLAG, Nibbles},
};

/// A 16-way fork, one slot per nibble, plus a value for paths that end here.
///
/// Invariant: a branch always has either at least two children, or a value
/// and at least one child. [`collapse`](BranchNode::collapse) restores the
/// invariant after removals.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchNode {
    pub choices: Choices,
    /// Value for the path ending exactly at this branch; empty when absent.
    pub value: Vec<u8>,
}

impl BranchNode {
    pub fn new(choices: Choices) -> Self {
        Self {
            choices,
            value: Vec::new(),
        }
    }

    pub fn get(&self, mut path: Nibbles) -> Option<Vec<u8>> {
        match path.next_choice() {
            Some(choice) => self.choices[choice].as_ref().and_then(|c| c.get(path)),
            None => (!self.value.is_empty()).then(|| self.value.clone()),
        }
    }

    pub fn insert(&self, mut path: Nibbles, value: Vec<u8>) -> Node {
        let mut new = self.clone();
        match path.next_choice() {
            Some(choice) => {
                let child = match &self.choices[choice] {
                    Some(child) => child.insert(path, value),
                    None => LeafNode::new(path, value).into(),
                };
                new.choices[choice] = Some(Arc::new(child));
            }
            None => new.value = value,
        }
        new.into()
    }

    pub fn remove(&self, mut path: Nibbles) -> (Option<Node>, Option<Vec<u8>>) {
        let mut new = self.clone();
        let removed = match path.next_choice() {
            Some(choice) => {
                let Some(child) = &self.choices[choice] else {
                    return (Some(self.clone().into()), None);
                };
                let (new_child, removed) = child.remove(path);
                if removed.is_none() {
                    return (Some(self.clone().into()), None);
                }
                new.choices[choice] = new_child.map(Arc::new);
                removed
            }
            None => {
                if self.value.is_empty() {
                    return (Some(self.clone().into()), None);
                }
                new.value = Vec::new();
                Some(self.value.clone())
            }
        };
        (new.collapse(), removed)
    }

    /// Restores the branch invariant after a removal: an empty branch
    /// vanishes, a value-only branch becomes a leaf, and a single-child
    /// branch merges into that child with the branch index prefixed onto the
    /// child's path.
    fn collapse(self) -> Option<Node> {
        let child_count = self.choices.iter().flatten().count();
        match (child_count, self.value.is_empty()) {
            (0, true) => None,
            (0, false) => Some(LeafNode::new(Nibbles::from_hex(vec![LEAF_FLAG]), self.value).into()),
            (1, true) => {
                let (choice, child) = self
                    .choices
                    .iter()
                    .enumerate()
                    .find_map(|(i, c)| c.as_ref().map(|c| (i as u8, c)))?;
                let merged = match child.as_ref() {
                    Node::Leaf(leaf) => {
                        LeafNode::new(leaf.partial.prepend(choice), leaf.value.clone()).into()
                    }
                    Node::Extension(ext) => {
                        ExtensionNode::new(ext.prefix.prepend(choice), ext.child.clone()).into()
                    }
                    Node::Branch(_) => {
                        ExtensionNode::new(Nibbles::from_hex(vec![choice]), child.clone()).into()
                    }
                };
                Some(merged)
            }
            _ => Some(self.into()),
        }
    }

    /// 17-item list: sixteen child hashes (empty string for absent children)
    /// followed by the value.
    pub fn encode_raw(&self, hasher: &dyn TrieHasher) -> Vec<u8> {
        const EMPTY: &[u8] = &[];
        let mut buf = Vec::new();
        let mut encoder = Encoder::new(&mut buf);
        for child in &self.choices {
            encoder = match child {
                Some(child) => encoder.encode_field(&child.compute_hash(hasher)),
                None => encoder.encode_field(&EMPTY),
            };
        }
        encoder.encode_field(&self.value.as_slice()).finish();
        buf
    }
}
