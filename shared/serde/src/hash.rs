use std::fmt;

use crate::BinarySerializer;

pub const STATE_HASH_BYTES: usize = 32;

/// BLAKE3 digest of a canonical state stream.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateHash([u8; STATE_HASH_BYTES]);

impl StateHash {
    pub fn from_hash_bytes(bytes: [u8; STATE_HASH_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; STATE_HASH_BYTES] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for StateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateHash({})", self.to_hex())
    }
}

impl fmt::Display for StateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Serializer that feeds the canonical byte stream into a BLAKE3 hasher
/// instead of storing it.
pub type HashSerializer = BinarySerializer<blake3::Hasher>;

impl BinarySerializer<blake3::Hasher> {
    pub fn new() -> Self {
        Self::with_sink(blake3::Hasher::new())
    }

    pub fn compute_hash(self) -> StateHash {
        StateHash(*self.into_sink().finalize().as_bytes())
    }
}

impl Default for BinarySerializer<blake3::Hasher> {
    fn default() -> Self {
        Self::new()
    }
}
