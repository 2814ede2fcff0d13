use objstore_kvs::Key;

use crate::error::{StoreError, StoreResult};

/// Reserved member present in every existing bucket's set.
///
/// Its presence is what distinguishes an existing empty bucket from one that
/// was never created or has been deleted.
pub const SENTINEL: &str = "";

/// Separator between bucket and object name in an object key.
pub const SEPARATOR: char = '/';

/// The KVS key holding a bucket's membership set.
pub fn bucket_key(bucket: &str) -> Key {
    bucket.to_string()
}

/// The KVS key holding an object's payload: `bucket/object`.
pub fn object_key(bucket: &str, object: &str) -> Key {
    format!("{bucket}{SEPARATOR}{object}")
}

/// Recover the object name from a member of `bucket`'s set.
///
/// Returns `None` for the sentinel and for members outside `bucket`.
pub fn object_name<'a>(bucket: &str, member: &'a str) -> Option<&'a str> {
    member
        .strip_prefix(bucket)
        .and_then(|rest| rest.strip_prefix(SEPARATOR))
}

pub fn validate_bucket_name(bucket: &str) -> StoreResult<()> {
    if bucket.is_empty() {
        return Err(StoreError::InvalidArgument("bucket name must not be empty".into()));
    }
    Ok(())
}

pub fn validate_object_name(object: &str) -> StoreResult<()> {
    if object.is_empty() {
        return Err(StoreError::InvalidArgument("object name must not be empty".into()));
    }
    Ok(())
}
