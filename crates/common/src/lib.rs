//! Shared types for the state core: account records, chain block shapes and
//! the flat-list Merkle tree used for batch inclusion proofs.

pub mod merkle_tree;
pub mod types;
pub mod utils;

pub use ethereum_types::{Address, H256, U256};
