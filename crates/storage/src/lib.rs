//! In-memory account state backed by the Merkle Patricia Trie.
//!
//! [`StateStore`] owns one trie instance holding every account commitment,
//! an address-indexed cache over it, and the per-block history of state
//! roots produced by verification. Single writer; cloned tries published
//! through the root history stay readable concurrently.

mod error;

use std::collections::{BTreeMap, HashMap};

use ethereum_types::{Address, H256};
use rollwatch_common::{types::AccountState, utils::keccak};
use rollwatch_rlp::{decode::RLPDecode, encode::RLPEncode};
use rollwatch_trie::Trie;
use tracing::debug;

pub use error::StoreError;

/// Account state plus root-hash history for a single chain.
///
/// The cache is an optimization over the trie, never a second source of
/// truth: every entry mirrors exactly what decoding the trie value would
/// yield. The root history is append-only; verification adds one entry per
/// verified block.
#[derive(Debug, Default)]
pub struct StateStore {
    trie: Trie,
    accounts: HashMap<Address, AccountState>,
    root_history: BTreeMap<u64, H256>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trie key for an account: the hash of its raw address bytes.
    fn account_key(address: Address) -> Vec<u8> {
        keccak(address.as_bytes()).as_bytes().to_vec()
    }

    /// Replaces the stored state of `address` wholesale.
    pub fn update_account(&mut self, address: Address, account: AccountState) {
        self.trie
            .insert(&Self::account_key(address), account.encode_to_vec());
        self.accounts.insert(address, account);
        debug!(address = %rollwatch_common::utils::format_address(address), "account updated");
    }

    /// Looks up an account, from the cache when possible, decoding the trie
    /// value otherwise.
    pub fn get_account(&self, address: Address) -> Result<Option<AccountState>, StoreError> {
        if let Some(account) = self.accounts.get(&address) {
            return Ok(Some(account.clone()));
        }
        match self.trie.get(&Self::account_key(address)) {
            Some(rlp) => Ok(Some(AccountState::decode(&rlp)?)),
            None => Ok(None),
        }
    }

    /// Removes an account from the trie and cache, returning its last state.
    pub fn remove_account(&mut self, address: Address) -> Result<Option<AccountState>, StoreError> {
        self.accounts.remove(&address);
        match self.trie.remove(&Self::account_key(address)) {
            Some(rlp) => Ok(Some(AccountState::decode(&rlp)?)),
            None => Ok(None),
        }
    }

    /// Root hash committing to all current account states.
    pub fn state_root(&self) -> H256 {
        self.trie.hash()
    }

    /// Inclusion proof for an account's trie entry under the current root.
    pub fn account_proof(&self, address: Address) -> Vec<Vec<u8>> {
        self.trie.get_proof(&Self::account_key(address))
    }

    /// Verifies an account proof against a (possibly historical) root.
    pub fn verify_account_proof(
        &self,
        root: H256,
        address: Address,
        account: &AccountState,
        proof: &[Vec<u8>],
    ) -> Result<bool, StoreError> {
        let verified = self.trie.verify_proof(
            root,
            &Self::account_key(address),
            &account.encode_to_vec(),
            proof,
        )?;
        Ok(verified)
    }

    /// Records the state root a block committed to. Block numbers advance
    /// monotonically in practice, but ordering is not enforced here.
    pub fn record_root(&mut self, block_number: u64, root: H256) {
        debug!(block_number, root = %rollwatch_common::utils::format_hash(root), "state root recorded");
        self.root_history.insert(block_number, root);
    }

    pub fn root_at(&self, block_number: u64) -> Option<H256> {
        self.root_history.get(&block_number).copied()
    }

    /// Highest recorded block number and its root.
    pub fn latest_root(&self) -> Option<(u64, H256)> {
        self.root_history
            .last_key_value()
            .map(|(number, root)| (*number, *root))
    }

    pub fn history_len(&self) -> usize {
        self.root_history.len()
    }
}
