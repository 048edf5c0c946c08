//! Canonical RLP (Recursive Length Prefix) encoding and decoding.
//!
//! Used for trie node serialization and account records. Decoding is strict:
//! truncated payloads, non-minimal length prefixes and trailing bytes are
//! rejected as errors, never silently truncated.

pub mod constants;
pub mod decode;
pub mod encode;
pub mod error;
pub mod structs;
