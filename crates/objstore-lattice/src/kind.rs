use serde::{Deserialize, Serialize};

/// The lattice kind attached to every KVS write.
///
/// The KVS rejects a write whose kind differs from the kind already stored
/// under the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LatticeType {
    /// Last-writer-wins `(timestamp, value)` register.
    Lww,
    /// Grow-by-union set of strings.
    Set,
}

impl std::fmt::Display for LatticeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lww => write!(f, "lww"),
            Self::Set => write!(f, "set"),
        }
    }
}
