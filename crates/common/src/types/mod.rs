mod account;
mod block;

pub use account::{AccountState, EMPTY_CODE_HASH, EMPTY_TRIE_HASH};
pub use block::{ChainBlock, TransactionReceipt};
