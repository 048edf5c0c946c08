use std::sync::Arc;

use rollwatch_rlp::structs::Encoder;

use super::{BranchNode, ExtensionNode, Node, empty_choices};
use crate::nibbles::Nibbles;

/// Terminal node: the remaining path nibbles and the stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafNode {
    pub partial: Nibbles,
    pub value: Vec<u8>,
}

impl LeafNode {
    pub fn new(partial: Nibbles, value: Vec<u8>) -> Self {
        Self { partial, value }
    }

    pub fn get(&self, path: Nibbles) -> Option<Vec<u8>> {
        (path == self.partial).then(|| self.value.clone())
    }

    pub fn insert(&self, path: Nibbles, value: Vec<u8>) -> Node {
        if path == self.partial {
            return LeafNode::new(path, value).into();
        }

        // Diverging paths: branch at the first differing nibble, with the
        // shared prefix (if any) compressed into an extension above it.
        let match_len = path.count_prefix(&self.partial);
        let mut branch = BranchNode::new(empty_choices());

        let mut own_suffix = self.partial.offset(match_len);
        match own_suffix.next_choice() {
            Some(choice) => {
                branch.choices[choice] =
                    Some(Arc::new(LeafNode::new(own_suffix, self.value.clone()).into()));
            }
            None => branch.value = self.value.clone(),
        }

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
            ExtensionNode::new(path.slice(0, match_len), Arc::new(branch)).into()
        }
    }

    pub fn remove(&self, path: Nibbles) -> (Option<Node>, Option<Vec<u8>>) {
        if path == self.partial {
            (None, Some(self.value.clone()))
        } else {
            (Some(self.clone().into()), None)
        }
    }

    /// 2-item list: compact-encoded remaining path and the value.
    pub fn encode_raw(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        Encoder::new(&mut buf)
            .encode_field(&self.partial.encode_compact().as_slice())
            .encode_field(&self.value.as_slice())
            .finish();
        buf
    }
}
