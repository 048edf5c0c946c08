use bytes::{BufMut, Bytes};
use ethereum_types::{Address, H256, U256};

use super::constants::{RLP_EMPTY_LIST, RLP_NULL};

/// Encode a value to a fresh RLP buffer.
/// To encode into an existing buffer use [`RLPEncode::encode`] directly.
pub fn encode<T: RLPEncode>(value: T) -> Vec<u8> {
    let mut buf = Vec::new();
    value.encode(&mut buf);
    buf
}

pub trait RLPEncode {
    fn encode(&self, buf: &mut dyn BufMut);

    /// Number of bytes `encode` will produce, used to size list prefixes.
    fn length(&self) -> usize;

    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

/// Writes the RLP string prefix for a payload of `len` bytes.
/// Callers are responsible for the single-byte (< 0x80) fast path.
fn encode_bytes_prefix(len: usize, buf: &mut dyn BufMut) {
    if len < 56 {
        buf.put_u8(RLP_NULL + len as u8);
    } else {
        let be = len.to_be_bytes();
        let skip = be.iter().take_while(|b| **b == 0).count();
        buf.put_u8(0xb7 + (be.len() - skip) as u8);
        buf.put_slice(&be[skip..]);
    }
}

/// Writes the RLP list prefix for a payload of `total_len` bytes.
pub fn encode_length(total_len: usize, buf: &mut dyn BufMut) {
    if total_len < 56 {
        buf.put_u8(RLP_EMPTY_LIST + total_len as u8);
    } else {
        let be = total_len.to_be_bytes();
        let skip = be.iter().take_while(|b| **b == 0).count();
        buf.put_u8(0xf7 + (be.len() - skip) as u8);
        buf.put_slice(&be[skip..]);
    }
}

/// Encoded size of a byte string of `len` bytes whose first byte is `first`.
pub const fn bytes_length(len: usize, first: u8) -> usize {
    if len == 1 && first < RLP_NULL {
        return 1;
    }
    prefixed_length(len)
}

/// Encoded size of a list with a payload of `payload_len` bytes.
pub const fn list_length(payload_len: usize) -> usize {
    prefixed_length(payload_len)
}

const fn prefixed_length(payload_len: usize) -> usize {
    if payload_len < 56 {
        1 + payload_len
    } else {
        let be_len = payload_len.ilog2() as usize / 8 + 1;
        1 + be_len + payload_len
    }
}

// Unsigned integers encode as their minimal big-endian form,
// with zero mapping to the empty string (0x80).
macro_rules! impl_rlp_encode_uint {
    ($($t:ty),*) => {
        $(impl RLPEncode for $t {
            fn encode(&self, buf: &mut dyn BufMut) {
                let be = self.to_be_bytes();
                let skip = be.iter().take_while(|b| **b == 0).count();
                match be.len() - skip {
                    0 => buf.put_u8(RLP_NULL),
                    1 if be[skip] < RLP_NULL => buf.put_u8(be[skip]),
                    len => {
                        buf.put_u8(RLP_NULL + len as u8);
                        buf.put_slice(&be[skip..]);
                    }
                }
            }

            fn length(&self) -> usize {
                let be = self.to_be_bytes();
                let skip = be.iter().take_while(|b| **b == 0).count();
                match be.len() - skip {
                    0 => 1,
                    len => bytes_length(len, be[skip]),
                }
            }
        })*
    };
}

impl_rlp_encode_uint!(u8, u16, u32, u64, u128, usize);

impl RLPEncode for U256 {
    fn encode(&self, buf: &mut dyn BufMut) {
        let leading_zero_bytes = (self.leading_zeros() / 8) as usize;
        let be = self.to_big_endian();
        be[leading_zero_bytes..].encode(buf);
    }

    fn length(&self) -> usize {
        let leading_zero_bytes = (self.leading_zeros() / 8) as usize;
        let be = self.to_big_endian();
        RLPEncode::length(&be[leading_zero_bytes..])
    }
}

impl RLPEncode for [u8] {
    fn encode(&self, buf: &mut dyn BufMut) {
        if self.len() == 1 && self[0] < RLP_NULL {
            buf.put_u8(self[0]);
        } else {
            encode_bytes_prefix(self.len(), buf);
            buf.put_slice(self);
        }
    }

    fn length(&self) -> usize {
        if self.is_empty() {
            return 1;
        }
        bytes_length(self.len(), self[0])
    }
}

impl<const N: usize> RLPEncode for [u8; N] {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_ref().encode(buf)
    }

    fn length(&self) -> usize {
        RLPEncode::length(self.as_ref())
    }
}

impl RLPEncode for str {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_bytes().encode(buf)
    }

    fn length(&self) -> usize {
        RLPEncode::length(self.as_bytes())
    }
}

impl RLPEncode for String {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_bytes().encode(buf)
    }

    fn length(&self) -> usize {
        RLPEncode::length(self.as_bytes())
    }
}

impl RLPEncode for Bytes {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_ref().encode(buf)
    }

    fn length(&self) -> usize {
        self.as_ref().length()
    }
}

impl<T: RLPEncode + ?Sized> RLPEncode for &T {
    fn encode(&self, buf: &mut dyn BufMut) {
        (*self).encode(buf)
    }

    fn length(&self) -> usize {
        (*self).length()
    }
}

impl<T: RLPEncode> RLPEncode for Vec<T> {
    fn encode(&self, buf: &mut dyn BufMut) {
        let payload_len: usize = self.iter().map(|item| item.length()).sum();
        encode_length(payload_len, buf);
        for item in self {
            item.encode(buf);
        }
    }

    fn length(&self) -> usize {
        let payload_len: usize = self.iter().map(|item| item.length()).sum();
        list_length(payload_len)
    }
}

impl<S: RLPEncode, T: RLPEncode> RLPEncode for (S, T) {
    fn encode(&self, buf: &mut dyn BufMut) {
        encode_length(self.0.length() + self.1.length(), buf);
        self.0.encode(buf);
        self.1.encode(buf);
    }

    fn length(&self) -> usize {
        list_length(self.0.length() + self.1.length())
    }
}

impl<S: RLPEncode, T: RLPEncode, U: RLPEncode> RLPEncode for (S, T, U) {
    fn encode(&self, buf: &mut dyn BufMut) {
        encode_length(self.0.length() + self.1.length() + self.2.length(), buf);
        self.0.encode(buf);
        self.1.encode(buf);
        self.2.encode(buf);
    }

    fn length(&self) -> usize {
        list_length(self.0.length() + self.1.length() + self.2.length())
    }
}

impl RLPEncode for H256 {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_bytes().encode(buf)
    }

    fn length(&self) -> usize {
        RLPEncode::length(self.as_bytes())
    }
}

impl RLPEncode for Address {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_bytes().encode(buf)
    }

    fn length(&self) -> usize {
        RLPEncode::length(self.as_bytes())
    }
}
