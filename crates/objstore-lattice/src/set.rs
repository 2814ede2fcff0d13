use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};
use crate::kind::LatticeType;

/// A set-of-strings lattice value.
///
/// Members are kept sorted so that encoding is deterministic. An empty
/// payload decodes to the empty set: the KVS hands back zero bytes for a key
/// that was overwritten with an empty value, and that must read as "no
/// members" rather than as corruption.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetLattice {
    members: BTreeSet<String>,
}

impl SetLattice {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a member. Returns `true` if it was not already present.
    pub fn insert(&mut self, member: impl Into<String>) -> bool {
        self.members.insert(member.into())
    }

    /// Remove a member. Returns `true` if it was present.
    pub fn remove(&mut self, member: &str) -> bool {
        self.members.remove(member)
    }

    pub fn contains(&self, member: &str) -> bool {
        self.members.contains(member)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate members in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    /// The revealed member set.
    pub fn reveal(&self) -> &BTreeSet<String> {
        &self.members
    }

    /// Encode into a KVS payload.
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| CodecError::Encode {
            kind: LatticeType::Set,
            reason: e.to_string(),
        })
    }

    /// Decode from a KVS payload.
    pub fn decode(payload: &[u8]) -> CodecResult<Self> {
        if payload.is_empty() {
            return Ok(Self::new());
        }
        bincode::deserialize(payload).map_err(|e| CodecError::Decode {
            kind: LatticeType::Set,
            reason: e.to_string(),
        })
    }
}

impl<S: Into<String>> FromIterator<S> for SetLattice {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().map(Into::into).collect(),
        }
    }
}
