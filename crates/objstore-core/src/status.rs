//! Translation of KVS error codes into API outcomes.
//!
//! Every correlator round-trip passes its response tuple through [`check`];
//! no other code looks at a [`KvsErrorCode`] directly.

use std::fmt;

use objstore_kvs::{KeyTuple, KvsErrorCode};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// API-level outcome of an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    Ok,
    NotFound,
    InvalidArgument,
    Unavailable,
    Internal,
    PermissionDenied,
    Unknown,
}

impl StatusCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotFound => "not_found",
            Self::InvalidArgument => "invalid_argument",
            Self::Unavailable => "unavailable",
            Self::Internal => "internal",
            Self::PermissionDenied => "permission_denied",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a KVS error code to its outcome. Total over all codes.
pub fn map_error_code(code: KvsErrorCode) -> StatusCode {
    match code {
        KvsErrorCode::None => StatusCode::Ok,
        KvsErrorCode::KeyDoesNotExist => StatusCode::NotFound,
        KvsErrorCode::WrongThread => StatusCode::Internal,
        KvsErrorCode::NoServers | KvsErrorCode::Timeout => StatusCode::Unavailable,
        KvsErrorCode::Lattice => StatusCode::InvalidArgument,
        KvsErrorCode::Serialize | KvsErrorCode::Other(_) => StatusCode::Unknown,
    }
}

/// Pass a successful tuple through; turn a failed one into its error.
pub fn check(tuple: KeyTuple) -> StoreResult<KeyTuple> {
    let key = &tuple.key;
    let err = match tuple.error {
        KvsErrorCode::None => return Ok(tuple),
        KvsErrorCode::KeyDoesNotExist => {
            StoreError::NotFound(format!("key {key:?} does not exist"))
        }
        KvsErrorCode::WrongThread => {
            StoreError::Internal(format!("request for {key:?} reached the wrong thread"))
        }
        KvsErrorCode::NoServers | KvsErrorCode::Timeout => {
            StoreError::Unavailable(format!("{} while accessing {key:?}", tuple.error))
        }
        KvsErrorCode::Lattice => StoreError::InvalidArgument(format!(
            "lattice kind mismatch for {key:?} (stored: {})",
            tuple
                .lattice_type
                .map(|kind| kind.to_string())
                .unwrap_or_else(|| "unknown".into())
        )),
        KvsErrorCode::Serialize | KvsErrorCode::Other(_) => {
            StoreError::Unknown(format!("{} while accessing {key:?}", tuple.error))
        }
    };
    debug_assert_eq!(err.code(), map_error_code(tuple.error));
    Err(err)
}
