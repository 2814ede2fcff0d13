use std::fmt;

use objstore_lattice::LatticeType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An opaque KVS key.
pub type Key = String;

/// Identifier attached to an asynchronous request and echoed by its response.
///
/// UUID v7, unique per request.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a fresh request id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestId({})", self.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error code reported by the store for one key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KvsErrorCode {
    /// The request succeeded.
    None,
    /// The key has never been written.
    KeyDoesNotExist,
    /// The request reached a node thread that does not own the key.
    WrongThread,
    /// The store gave up waiting on its replicas.
    Timeout,
    /// The request's lattice kind differs from the stored one.
    Lattice,
    /// No storage node is available for the key.
    NoServers,
    /// The store could not decode the request payload.
    Serialize,
    /// A code this client does not know about.
    Other(i32),
}

impl KvsErrorCode {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for KvsErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "NO_ERROR"),
            Self::KeyDoesNotExist => write!(f, "KEY_DNE"),
            Self::WrongThread => write!(f, "WRONG_THREAD"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Lattice => write!(f, "LATTICE"),
            Self::NoServers => write!(f, "NO_SERVERS"),
            Self::Serialize => write!(f, "SERIALIZE"),
            Self::Other(code) => write!(f, "UNKNOWN({code})"),
        }
    }
}

/// Which call produced a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    Get,
    Put,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// Per-key result inside a response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTuple {
    pub key: Key,
    /// Lattice kind of the stored value, when the store reports one.
    pub lattice_type: Option<LatticeType>,
    pub error: KvsErrorCode,
    /// Stored payload for successful reads; empty otherwise.
    pub payload: Vec<u8>,
}

/// A completed request, as drained from [`KvsClient::receive`].
///
/// [`KvsClient::receive`]: crate::client::KvsClient::receive
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyResponse {
    pub response_id: RequestId,
    pub kind: RequestKind,
    pub tuples: Vec<KeyTuple>,
}
