use crate::kind::LatticeType;

/// Errors from encoding or decoding lattice payloads.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The value could not be serialized.
    #[error("cannot encode {kind} lattice: {reason}")]
    Encode { kind: LatticeType, reason: String },

    /// The payload bytes do not decode as the expected lattice kind.
    #[error("cannot decode {kind} lattice: {reason}")]
    Decode { kind: LatticeType, reason: String },
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
