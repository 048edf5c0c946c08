use ethereum_types::H256;
use rollwatch_storage::StoreError;
use thiserror::Error;

/// Failures talking to a chain-data provider. Recoverable: the verifier
/// absorbs these at the per-block boundary instead of propagating them.
#[derive(Debug, Error)]
pub enum ChainClientError {
    #[error("Request timed out")]
    Timeout,
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("Chain client error: {0}")]
    Client(#[from] ChainClientError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Timed out waiting for receipt of transaction {0:#x}")]
    ReceiptTimeout(H256),
}
