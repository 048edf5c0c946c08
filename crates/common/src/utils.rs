use ethereum_types::{Address, H256};
use sha3::{Digest, Keccak256};
use thiserror::Error;

pub fn keccak<T: AsRef<[u8]>>(data: T) -> H256 {
    H256::from_slice(&Keccak256::digest(data.as_ref()))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexParseError {
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),
    #[error("Invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },
}

/// Parses a `0x`-prefixed 40-hex-digit address, normalizing case.
/// Mixed-case (checksummed) input is accepted and lowercased before use, so
/// the same account always derives the same trie key.
pub fn parse_address(s: &str) -> Result<Address, HexParseError> {
    let hex_str = s.strip_prefix("0x").unwrap_or(s).to_lowercase();
    let bytes =
        hex::decode(&hex_str).map_err(|_| HexParseError::InvalidHex(s.to_string()))?;
    if bytes.len() != Address::len_bytes() {
        return Err(HexParseError::InvalidLength {
            expected: Address::len_bytes(),
            got: bytes.len(),
        });
    }
    Ok(Address::from_slice(&bytes))
}

/// Parses a `0x`-prefixed 64-hex-digit hash.
pub fn parse_hash(s: &str) -> Result<H256, HexParseError> {
    let hex_str = s.strip_prefix("0x").unwrap_or(s).to_lowercase();
    let bytes =
        hex::decode(&hex_str).map_err(|_| HexParseError::InvalidHex(s.to_string()))?;
    if bytes.len() != H256::len_bytes() {
        return Err(HexParseError::InvalidLength {
            expected: H256::len_bytes(),
            got: bytes.len(),
        });
    }
    Ok(H256::from_slice(&bytes))
}

/// Formats a hash as a `0x`-prefixed 64-hex-digit string.
pub fn format_hash(hash: H256) -> String {
    format!("0x{}", hex::encode(hash.as_bytes()))
}

/// Formats an address as a `0x`-prefixed 40-hex-digit string, lowercase.
pub fn format_address(address: Address) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}
