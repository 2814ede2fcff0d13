use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};
use crate::kind::LatticeType;

/// A last-writer-wins register: a payload tagged with its write timestamp.
///
/// The KVS keeps whichever pair carries the greatest timestamp. An empty
/// value with a fresh timestamp acts as a tombstone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LwwPairLattice {
    timestamp: u64,
    value: Vec<u8>,
}

impl LwwPairLattice {
    pub fn new(timestamp: u64, value: Vec<u8>) -> Self {
        Self { timestamp, value }
    }

    /// A tombstone: empty value at the given timestamp.
    pub fn tombstone(timestamp: u64) -> Self {
        Self::new(timestamp, Vec::new())
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    /// Returns `true` if this pair carries no payload.
    pub fn is_tombstone(&self) -> bool {
        self.value.is_empty()
    }

    /// Encode into a KVS payload.
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| CodecError::Encode {
            kind: LatticeType::Lww,
            reason: e.to_string(),
        })
    }

    /// Decode from a KVS payload.
    pub fn decode(payload: &[u8]) -> CodecResult<Self> {
        bincode::deserialize(payload).map_err(|e| CodecError::Decode {
            kind: LatticeType::Lww,
            reason: e.to_string(),
        })
    }
}
