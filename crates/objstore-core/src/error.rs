use objstore_kvs::KvsError;
use objstore_lattice::CodecError;

use crate::status::StatusCode;

/// Errors from object store operations.
///
/// Each variant corresponds to one API-level outcome; see [`StoreError::code`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The bucket, object, or key does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request conflicts with the stored lattice kind, or a name is invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The store could not be reached or did not answer in time.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// A fault on this side of the KVS client: misrouted request, malformed
    /// response, or a rejected correlation anomaly.
    #[error("internal error: {0}")]
    Internal(String),

    /// The operation is refused in the current state (non-empty bucket delete).
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The store reported an error this layer does not recognize.
    #[error("unknown failure: {0}")]
    Unknown(String),

    /// A stored payload did not decode as the expected lattice.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The KVS client failed before a response was obtained.
    #[error("KVS client error: {0}")]
    Client(#[from] KvsError),
}

impl StoreError {
    /// The API outcome this error maps to.
    pub fn code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NotFound,
            Self::InvalidArgument(_) => StatusCode::InvalidArgument,
            Self::Unavailable(_) | Self::Client(_) => StatusCode::Unavailable,
            Self::Internal(_) | Self::Codec(_) => StatusCode::Internal,
            Self::PermissionDenied(_) => StatusCode::PermissionDenied,
            Self::Unknown(_) => StatusCode::Unknown,
        }
    }
}

/// Result alias for object store operations.
pub type StoreResult<T> = Result<T, StoreError>;
