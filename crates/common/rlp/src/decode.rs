use bytes::Bytes;
use ethereum_types::{Address, H160, H256, U256};

use super::{
    constants::{RLP_EMPTY_LIST, RLP_NULL},
    error::RLPDecodeError,
};

/// Max payload size accepted when decoding.
/// Any size is technically RLP spec-compliant, but no well-formed message in
/// this system carries payloads this big, so larger ones are bugs or malice.
const MAX_RLP_BYTES: usize = 1024 * 1024 * 1024;

/// Trait for decoding RLP encoded slices of data.
///
/// Implementors provide [`decode_unfinished`](RLPDecode::decode_unfinished),
/// which returns the decoded value along with the remaining bytes; consumers
/// normally call [`decode`](RLPDecode::decode), which additionally rejects
/// trailing bytes.
pub trait RLPDecode: Sized {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError>;

    fn decode(rlp: &[u8]) -> Result<Self, RLPDecodeError> {
        let (decoded, remaining) = Self::decode_unfinished(rlp)?;
        if !remaining.is_empty() {
            return Err(RLPDecodeError::InvalidLength);
        }
        Ok(decoded)
    }
}

// Unsigned integers decode from their minimal big-endian form.
macro_rules! impl_rlp_decode_uint {
    ($($t:ty),*) => {
        $(impl RLPDecode for $t {
            fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
                let (bytes, rest) = decode_bytes(rlp)?;
                let padded = static_left_pad(bytes)?;
                Ok((<$t>::from_be_bytes(padded), rest))
            }
        })*
    };
}

impl_rlp_decode_uint!(u8, u16, u32, u64, u128, usize);

impl RLPDecode for U256 {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (bytes, rest) = decode_bytes(rlp)?;
        let padded: [u8; 32] = static_left_pad(bytes)?;
        Ok((U256::from_big_endian(&padded), rest))
    }
}

impl<const N: usize> RLPDecode for [u8; N] {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (bytes, rest) = decode_bytes(rlp)?;
        let value = bytes.try_into().map_err(|_| RLPDecodeError::InvalidLength)?;
        Ok((value, rest))
    }
}

impl RLPDecode for Bytes {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (bytes, rest) = decode_bytes(rlp)?;
        Ok((Bytes::copy_from_slice(bytes), rest))
    }
}

impl RLPDecode for String {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (bytes, rest) = decode_bytes(rlp)?;
        let value =
            String::from_utf8(bytes.to_vec()).map_err(|_| RLPDecodeError::MalformedData)?;
        Ok((value, rest))
    }
}

impl RLPDecode for H256 {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (value, rest) = RLPDecode::decode_unfinished(rlp)?;
        Ok((H256(value), rest))
    }
}

impl RLPDecode for Address {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (value, rest) = RLPDecode::decode_unfinished(rlp)?;
        Ok((H160(value), rest))
    }
}

// A Vec<T> is interpreted as an RLP list of elements of the same type.
// To decode a byte string, use the Bytes or [u8; N] impls, or `decode_bytes`.
impl<T: RLPDecode> RLPDecode for Vec<T> {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        if rlp.is_empty() {
            return Err(RLPDecodeError::InvalidLength);
        }
        if rlp[0] == RLP_EMPTY_LIST {
            return Ok((Vec::new(), &rlp[1..]));
        }
        let (is_list, payload, input_rest) = decode_rlp_item(rlp)?;
        if !is_list {
            return Err(RLPDecodeError::UnexpectedString);
        }

        let mut result = Vec::new();
        let mut current = payload;
        while !current.is_empty() {
            let (item, rest) = T::decode_unfinished(current)?;
            result.push(item);
            current = rest;
        }
        Ok((result, input_rest))
    }
}

impl<T1: RLPDecode, T2: RLPDecode> RLPDecode for (T1, T2) {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (is_list, payload, input_rest) = decode_rlp_item(rlp)?;
        if !is_list {
            return Err(RLPDecodeError::UnexpectedString);
        }
        let (first, payload) = T1::decode_unfinished(payload)?;
        let (second, payload) = T2::decode_unfinished(payload)?;
        if !payload.is_empty() {
            return Err(RLPDecodeError::MalformedData);
        }
        Ok(((first, second), input_rest))
    }
}

impl<T1: RLPDecode, T2: RLPDecode, T3: RLPDecode> RLPDecode for (T1, T2, T3) {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (is_list, payload, input_rest) = decode_rlp_item(rlp)?;
        if !is_list {
            return Err(RLPDecodeError::UnexpectedString);
        }
        let (first, payload) = T1::decode_unfinished(payload)?;
        let (second, payload) = T2::decode_unfinished(payload)?;
        let (third, payload) = T3::decode_unfinished(payload)?;
        if !payload.is_empty() {
            return Err(RLPDecodeError::MalformedData);
        }
        Ok(((first, second, third), input_rest))
    }
}

/// Decodes a single RLP item from the front of `data`.
///
/// Returns whether the item is a list, the item's payload without its prefix,
/// and the remaining bytes after the item. Truncated inputs and non-minimal
/// length prefixes are errors.
pub fn decode_rlp_item(data: &[u8]) -> Result<(bool, &[u8], &[u8]), RLPDecodeError> {
    let first = *data.first().ok_or(RLPDecodeError::InvalidLength)?;
    match first {
        0..=0x7f => Ok((false, &data[..1], &data[1..])),
        0x80..=0xb7 => {
            let length = (first - 0x80) as usize;
            if data.len() < length + 1 {
                return Err(RLPDecodeError::InvalidLength);
            }
            // A single byte below 0x80 must encode as itself.
            if length == 1 && data[1] < RLP_NULL {
                return Err(RLPDecodeError::MalformedData);
            }
            Ok((false, &data[1..length + 1], &data[length + 1..]))
        }
        0xb8..=0xbf => {
            let (length, consumed) = decode_long_length(data, 0xb7)?;
            Ok((
                false,
                &data[consumed..consumed + length],
                &data[consumed + length..],
            ))
        }
        0xc0..=0xf7 => {
            let length = (first - 0xc0) as usize;
            if data.len() < length + 1 {
                return Err(RLPDecodeError::InvalidLength);
            }
            Ok((true, &data[1..length + 1], &data[length + 1..]))
        }
        0xf8..=0xff => {
            let (length, consumed) = decode_long_length(data, 0xf7)?;
            Ok((
                true,
                &data[consumed..consumed + length],
                &data[consumed + length..],
            ))
        }
    }
}

/// Parses the big-endian length of a long-form item (prefix base 0xb7 or
/// 0xf7), returning the payload length and the number of bytes consumed by
/// the prefix.
fn decode_long_length(data: &[u8], base: u8) -> Result<(usize, usize), RLPDecodeError> {
    let length_of_length = (data[0] - base) as usize;
    let length_bytes = data
        .get(1..length_of_length + 1)
        .ok_or(RLPDecodeError::InvalidLength)?;
    // Canonical form: no leading zero in the length, and the long form is
    // only valid for payloads the short form cannot express.
    if length_bytes[0] == 0 {
        return Err(RLPDecodeError::MalformedData);
    }
    let length = usize::from_be_bytes(static_left_pad(length_bytes)?);
    if length < 56 {
        return Err(RLPDecodeError::MalformedData);
    }
    if length > MAX_RLP_BYTES || data.len() < length_of_length + length + 1 {
        return Err(RLPDecodeError::InvalidLength);
    }
    Ok((length, length_of_length + 1))
}

/// Decodes an RLP string item, rejecting lists.
pub fn decode_bytes(data: &[u8]) -> Result<(&[u8], &[u8]), RLPDecodeError> {
    let (is_list, payload, rest) = decode_rlp_item(data)?;
    if is_list {
        return Err(RLPDecodeError::UnexpectedList);
    }
    Ok((payload, rest))
}

/// Returns the next complete RLP item including its prefix, plus the bytes
/// after it. Used to walk list payloads without decoding the items.
pub fn get_item_with_prefix(data: &[u8]) -> Result<(&[u8], &[u8]), RLPDecodeError> {
    let (_, payload, rest) = decode_rlp_item(data)?;
    let item_len = data.len() - rest.len();
    debug_assert!(payload.len() <= item_len);
    Ok((&data[..item_len], rest))
}

/// Left-pads a big-endian byte slice into a fixed-size array, rejecting
/// oversized inputs and non-minimal (leading zero) encodings.
pub fn static_left_pad<const N: usize>(data: &[u8]) -> Result<[u8; N], RLPDecodeError> {
    let mut padded = [0; N];
    if data.is_empty() {
        return Ok(padded);
    }
    if data[0] == 0 {
        return Err(RLPDecodeError::MalformedData);
    }
    if data.len() > N {
        return Err(RLPDecodeError::InvalidLength);
    }
    padded[N - data.len()..].copy_from_slice(data);
    Ok(padded)
}
