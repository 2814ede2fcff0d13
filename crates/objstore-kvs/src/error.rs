/// Client-level failures: the request never reached the store, or its
/// response can no longer be delivered.
///
/// Errors reported *by* the store travel inside [`KeyTuple`]s as a
/// [`KvsErrorCode`] instead.
///
/// [`KeyTuple`]: crate::types::KeyTuple
/// [`KvsErrorCode`]: crate::types::KvsErrorCode
#[derive(Debug, thiserror::Error)]
pub enum KvsError {
    /// No routing node accepted the request.
    #[error("KVS unreachable: {0}")]
    Unreachable(String),

    /// The response channel was closed.
    #[error("KVS response channel closed")]
    Closed,
}

/// Result alias for client operations.
pub type KvsResult<T> = Result<T, KvsError>;
