use std::sync::LazyLock;

use ethereum_types::{H256, U256};
use rollwatch_rlp::{
    constants::RLP_NULL,
    decode::RLPDecode,
    encode::RLPEncode,
    error::RLPDecodeError,
    structs::{Decoder, Encoder},
};
use serde::{Deserialize, Serialize};

use crate::utils::keccak;

/// Storage root of an account with no storage: the empty trie root.
pub static EMPTY_TRIE_HASH: LazyLock<H256> = LazyLock::new(|| keccak([RLP_NULL]));

/// Code hash of an account with no code: keccak of the empty byte string.
pub static EMPTY_CODE_HASH: LazyLock<H256> = LazyLock::new(|| keccak([]));

/// The state of an account as committed into the state trie.
///
/// Immutable value: updates replace the whole record, never a single field.
/// Serialized as an RLP list of exactly four items in this field order;
/// decoding any other item count is a malformed-record error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub nonce: u64,
    pub balance: U256,
    pub storage_root: H256,
    pub code_hash: H256,
}

impl Default for AccountState {
    fn default() -> Self {
        Self {
            nonce: 0,
            balance: U256::zero(),
            storage_root: *EMPTY_TRIE_HASH,
            code_hash: *EMPTY_CODE_HASH,
        }
    }
}

impl RLPEncode for AccountState {
    fn encode(&self, buf: &mut dyn bytes::BufMut) {
        Encoder::new(buf)
            .encode_field(&self.nonce)
            .encode_field(&self.balance)
            .encode_field(&self.storage_root)
            .encode_field(&self.code_hash)
            .finish();
    }

    fn length(&self) -> usize {
        let payload = self.nonce.length()
            + self.balance.length()
            + self.storage_root.length()
            + self.code_hash.length();
        rollwatch_rlp::encode::list_length(payload)
    }
}

impl RLPDecode for AccountState {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let decoder = Decoder::new(rlp)?;
        let (nonce, decoder) = decoder.decode_field("nonce")?;
        let (balance, decoder) = decoder.decode_field("balance")?;
        let (storage_root, decoder) = decoder.decode_field("storage_root")?;
        let (code_hash, decoder) = decoder.decode_field("code_hash")?;
        let state = AccountState {
            nonce,
            balance,
            storage_root,
            code_hash,
        };
        Ok((state, decoder.finish()?))
    }
}
