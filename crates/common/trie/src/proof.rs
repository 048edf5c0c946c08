use ethereum_types::H256;
use rollwatch_rlp::{decode::decode_bytes, error::RLPDecodeError, structs::Decoder};

use crate::{error::TrieError, hasher::TrieHasher, nibbles::Nibbles};

/// A node decoded out of a caller-supplied proof. Child references are kept
/// as hashes; nothing else in the proof is trusted.
enum ProofNode {
    Branch {
        children: [Option<H256>; 16],
        value: Vec<u8>,
    },
    Extension {
        prefix: Nibbles,
        child: H256,
    },
    Leaf {
        partial: Nibbles,
        value: Vec<u8>,
    },
}

impl ProofNode {
    fn decode(rlp: &[u8]) -> Result<Self, TrieError> {
        let items = decode_items(rlp)?;
        match items.len() {
            2 => {
                let (compact, _) = decode_bytes(items[0])?;
                let path = Nibbles::decode_compact(compact);
                if path.is_leaf() {
                    let (value, _) = decode_bytes(items[1])?;
                    Ok(ProofNode::Leaf {
                        partial: path,
                        value: value.to_vec(),
                    })
                } else {
                    let child =
                        decode_child(items[1])?.ok_or(TrieError::InvalidNodeRef)?;
                    Ok(ProofNode::Extension {
                        prefix: path,
                        child,
                    })
                }
            }
            17 => {
                let mut children = [None; 16];
                for (slot, item) in children.iter_mut().zip(items[..16].iter().copied()) {
                    *slot = decode_child(item)?;
                }
                let (value, _) = decode_bytes(items[16])?;
                Ok(ProofNode::Branch {
                    children,
                    value: value.to_vec(),
                })
            }
            got => Err(RLPDecodeError::InvalidItemCount { expected: 17, got }.into()),
        }
    }
}

fn decode_items(rlp: &[u8]) -> Result<Vec<&[u8]>, TrieError> {
    let mut decoder = Decoder::new(rlp)?;
    let mut items = Vec::new();
    while !decoder.is_done() {
        let (item, rest) = decoder.get_encoded_item()?;
        items.push(item);
        decoder = rest;
        if items.len() > 17 {
            break;
        }
    }
    Ok(items)
}

/// A child reference is either the empty string (no child) or a 32-byte hash.
fn decode_child(rlp: &[u8]) -> Result<Option<H256>, TrieError> {
    let (bytes, _) = decode_bytes(rlp)?;
    match bytes.len() {
        0 => Ok(None),
        32 => Ok(Some(H256::from_slice(bytes))),
        _ => Err(TrieError::InvalidNodeRef),
    }
}

/// Replays an ordered root-to-leaf list of node encodings against `root`.
///
/// At every step the hash of the supplied encoding must match the reference
/// produced by the previous step (`root` for the first); the walk then
/// follows the key's nibbles to the next reference. The proof is accepted
/// only if the final node yields exactly `expected_value` for the key. Any
/// failed hash link or structural mismatch rejects the whole proof.
///
/// Undecodable node encodings are reported as errors rather than a plain
/// rejection, since they indicate a malformed proof, not a wrong one.
pub fn verify_proof(
    hasher: &dyn TrieHasher,
    root: H256,
    key: &[u8],
    expected_value: &[u8],
    proof: &[Vec<u8>],
) -> Result<bool, TrieError> {
    let mut path = Nibbles::from_bytes(key);
    let mut expected_hash = root;
    for encoded in proof {
        if hasher.hash(encoded) != expected_hash {
            return Ok(false);
        }
        match ProofNode::decode(encoded)? {
            ProofNode::Branch { children, value } => match path.next_choice() {
                Some(choice) => match children[choice] {
                    Some(hash) => expected_hash = hash,
                    None => return Ok(false),
                },
                None => return Ok(value == expected_value),
            },
            ProofNode::Extension { prefix, child } => {
                if !path.skip_prefix(&prefix) {
                    return Ok(false);
                }
                expected_hash = child;
            }
            ProofNode::Leaf { partial, value } => {
                return Ok(partial == path && value == expected_value);
            }
        }
    }
    // The chain ended before reaching the value.
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::KeccakHasher;
    use rollwatch_rlp::structs::Encoder;

    #[test]
    fn malformed_node_is_an_error_not_a_rejection() {
        // a 3-item list is not a valid trie node shape
        let mut node = Vec::new();
        Encoder::new(&mut node)
            .encode_field(&1u8)
            .encode_field(&2u8)
            .encode_field(&3u8)
            .finish();
        let hasher = KeccakHasher;
        let root = hasher.hash(&node);

        let err = verify_proof(&hasher, root, &[0xaa], b"value", &[node]).unwrap_err();
        assert!(matches!(
            err,
            TrieError::RLPDecode(RLPDecodeError::InvalidItemCount { got: 3, .. })
        ));
    }
}
