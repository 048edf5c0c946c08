//! Rollup block verification against locally tracked state roots.
//!
//! The verifier consumes two [`ChainClient`]s, one per chain, checks each
//! rollup block's declared state root and L1 anchor, and records roots into
//! a [`rollwatch_storage::StateStore`]. [`Monitor`] wraps the verifier in a
//! cancellable follow-the-head loop.

pub mod client;
pub mod config;
pub mod errors;
pub mod monitor;
pub mod verifier;

pub use client::ChainClient;
pub use config::{DriftPolicy, VerifierConfig};
pub use errors::{ChainClientError, VerifierError};
pub use monitor::Monitor;
pub use verifier::{BlockVerifier, VerificationResult};
