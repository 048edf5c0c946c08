use bytes::BufMut;

use super::{
    decode::{RLPDecode, decode_rlp_item, get_item_with_prefix},
    encode::{RLPEncode, encode_length},
    error::RLPDecodeError,
};

/// Helper for decoding a struct encoded as an RLP list.
///
/// Fields are decoded in the order they were encoded; [`Decoder::finish`]
/// fails if the list payload was not fully consumed, which is what makes
/// wrong field counts a hard error instead of a partial decode.
#[derive(Debug)]
#[must_use = "`Decoder` must be consumed with `finish` to perform decoding checks"]
pub struct Decoder<'a> {
    payload: &'a [u8],
    remaining: &'a [u8],
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Result<Self, RLPDecodeError> {
        match decode_rlp_item(buf)? {
            (true, payload, remaining) => Ok(Self { payload, remaining }),
            (false, _, _) => Err(RLPDecodeError::UnexpectedString),
        }
    }

    pub fn decode_field<T: RLPDecode>(self, name: &str) -> Result<(T, Self), RLPDecodeError> {
        let (field, rest) = T::decode_unfinished(self.payload)
            .map_err(|err| RLPDecodeError::Custom(format!("error decoding field '{name}': {err}")))?;
        Ok((
            field,
            Self {
                payload: rest,
                ..self
            },
        ))
    }

    /// Returns the next field without decoding it, prefix included.
    pub fn get_encoded_item(self) -> Result<(&'a [u8], Self), RLPDecodeError> {
        let (item, rest) = get_item_with_prefix(self.payload)?;
        Ok((
            item,
            Self {
                payload: rest,
                ..self
            },
        ))
    }

    /// Returns true once the whole list payload has been consumed.
    pub const fn is_done(&self) -> bool {
        self.payload.is_empty()
    }

    /// Finishes decoding and returns the bytes after the list.
    /// Fails if any list payload is left over.
    pub const fn finish(self) -> Result<&'a [u8], RLPDecodeError> {
        if self.payload.is_empty() {
            Ok(self.remaining)
        } else {
            Err(RLPDecodeError::MalformedData)
        }
    }
}

/// Helper for encoding a struct as an RLP list, field by field.
///
/// Buffers the payload so the list prefix can be written first on
/// [`Encoder::finish`].
#[must_use = "`Encoder` must be consumed with `finish` to write the list prefix"]
pub struct Encoder<'a> {
    buf: &'a mut dyn BufMut,
    payload: Vec<u8>,
}

impl<'a> Encoder<'a> {
    pub fn new(buf: &'a mut dyn BufMut) -> Self {
        Self {
            buf,
            payload: Vec::new(),
        }
    }

    pub fn encode_field<T: RLPEncode>(mut self, value: &T) -> Self {
        value.encode(&mut self.payload);
        self
    }

    pub fn finish(self) {
        encode_length(self.payload.len(), self.buf);
        self.buf.put_slice(&self.payload);
    }
}

#[cfg(test)]
mod tests {
    use super::{Decoder, Encoder};
    use crate::decode::RLPDecode;
    use crate::error::RLPDecodeError;

    #[derive(Debug, PartialEq, Eq)]
    struct Simple {
        a: u8,
        b: u16,
    }

    impl RLPDecode for Simple {
        fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
            let decoder = Decoder::new(buf)?;
            let (a, decoder) = decoder.decode_field("a")?;
            let (b, decoder) = decoder.decode_field("b")?;
            let rest = decoder.finish()?;
            Ok((Simple { a, b }, rest))
        }
    }

    #[test]
    fn encode_decode_struct_roundtrip() {
        let expected = Simple { a: 61, b: 75 };
        let mut buf = Vec::new();
        Encoder::new(&mut buf)
            .encode_field(&expected.a)
            .encode_field(&expected.b)
            .finish();
        assert_eq!(buf, [0xc2, 61, 75]);
        assert_eq!(Simple::decode(&buf).unwrap(), expected);
    }

    #[test]
    fn extra_fields_are_a_decode_error() {
        // three items where Simple expects two
        let buf = [0xc3, 61, 75, 0x01];
        assert!(Simple::decode(&buf).is_err());
    }
}
