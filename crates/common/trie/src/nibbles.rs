/// A sequence of nibbles (4-bit values), the traversal unit of the trie.
///
/// Paths derived from keys carry a terminator marker (16) after the last
/// nibble, distinguishing a path that ends at a node from one that continues
/// through it. Branch prefixes and extension prefixes never contain the
/// terminator.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nibbles {
    data: Vec<u8>,
}

/// Terminator marker for paths that end at a value-bearing node.
pub const LEAF_FLAG: u8 = 16;

impl Nibbles {
    /// Expands each byte into two nibbles (high nibble first) and appends the
    /// terminator.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut data = Vec::with_capacity(bytes.len() * 2 + 1);
        for byte in bytes {
            data.push(byte >> 4);
            data.push(byte & 0x0f);
        }
        data.push(LEAF_FLAG);
        Self { data }
    }

    /// Builds a path from raw nibble values, terminator included if present.
    pub fn from_hex(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether this path ends with the terminator marker.
    pub fn is_leaf(&self) -> bool {
        self.data.last() == Some(&LEAF_FLAG)
    }

    pub fn at(&self, i: usize) -> u8 {
        self.data[i]
    }

    /// Consumes the next nibble. Returns its branch index, or `None` if the
    /// path is exhausted or ends here (terminator).
    pub fn next_choice(&mut self) -> Option<usize> {
        if self.data.is_empty() || self.data[0] == LEAF_FLAG {
            return None;
        }
        let nibble = self.data.remove(0);
        Some(nibble as usize)
    }

    /// Length of the longest common prefix with `other`.
    pub fn count_prefix(&self, other: &Nibbles) -> usize {
        self.data
            .iter()
            .zip(other.data.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// If `self` starts with `prefix`, consumes it and returns true.
    pub fn skip_prefix(&mut self, prefix: &Nibbles) -> bool {
        if self.data.len() >= prefix.len() && self.data[..prefix.len()] == prefix.data {
            self.data.drain(..prefix.len());
            true
        } else {
            false
        }
    }

    /// The sub-path starting at `offset`.
    pub fn offset(&self, offset: usize) -> Nibbles {
        self.slice(offset, self.data.len())
    }

    pub fn slice(&self, start: usize, end: usize) -> Nibbles {
        Self {
            data: self.data[start..end].to_vec(),
        }
    }

    /// A copy with `nibble` prefixed, used when collapsing a branch into its
    /// remaining child.
    pub fn prepend(&self, nibble: u8) -> Nibbles {
        let mut data = Vec::with_capacity(self.data.len() + 1);
        data.push(nibble);
        data.extend_from_slice(&self.data);
        Self { data }
    }

    pub fn concat(&self, other: &Nibbles) -> Nibbles {
        let mut data = self.data.clone();
        data.extend_from_slice(&other.data);
        Self { data }
    }

    /// Hex-prefix (compact) encoding: packs the nibbles into bytes with a
    /// flag nibble carrying parity and leaf-ness. The terminator itself is
    /// not stored.
    pub fn encode_compact(&self) -> Vec<u8> {
        let is_leaf = self.is_leaf();
        let nibbles = if is_leaf {
            &self.data[..self.data.len() - 1]
        } else {
            &self.data[..]
        };
        let mut flag = if is_leaf { 0x20 } else { 0x00 };
        let mut out = Vec::with_capacity(nibbles.len() / 2 + 1);
        let rest = if nibbles.len() % 2 == 1 {
            flag |= 0x10 | nibbles[0];
            out.push(flag);
            &nibbles[1..]
        } else {
            out.push(flag);
            nibbles
        };
        for pair in rest.chunks_exact(2) {
            out.push(pair[0] << 4 | pair[1]);
        }
        out
    }

    /// Inverse of [`encode_compact`](Self::encode_compact); restores the
    /// terminator for leaf paths.
    pub fn decode_compact(compact: &[u8]) -> Nibbles {
        let Some(&flag) = compact.first() else {
            return Self::default();
        };
        let is_leaf = flag & 0x20 != 0;
        let is_odd = flag & 0x10 != 0;
        let mut data = Vec::with_capacity(compact.len() * 2);
        if is_odd {
            data.push(flag & 0x0f);
        }
        for byte in &compact[1..] {
            data.push(byte >> 4);
            data.push(byte & 0x0f);
        }
        if is_leaf {
            data.push(LEAF_FLAG);
        }
        Self { data }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}
