use std::sync::Arc;

use objstore_kvs::KvsClient;
use objstore_lattice::{LatticeType, SetLattice};
use tracing::{debug, info};

use crate::correlator::Correlator;
use crate::error::{StoreError, StoreResult};
use crate::key::{bucket_key, SENTINEL};

/// Bucket membership, stored as a set lattice under the bucket key.
///
/// An existing bucket's set always holds [`SENTINEL`]. A set without it
/// (including the empty value a bucket deletion writes) reads as not-found,
/// exactly like a key the store has never seen.
///
/// Every mutation is an unconditional read-modify-write. Two callers
/// mutating the same bucket concurrently can lose one another's update.
pub struct BucketMembership<C> {
    correlator: Arc<Correlator<C>>,
}

impl<C: KvsClient> BucketMembership<C> {
    pub fn new(correlator: Arc<Correlator<C>>) -> Self {
        Self { correlator }
    }

    /// Write a set holding only the sentinel, replacing whatever was there.
    ///
    /// Re-creating an existing bucket therefore forgets its members. The
    /// objects' payloads stay in the store, unreachable through the bucket.
    pub async fn create(&self, bucket: &str) -> StoreResult<()> {
        let set: SetLattice = [SENTINEL].into_iter().collect();
        self.write(bucket, &set).await?;
        info!(bucket, "bucket created");
        Ok(())
    }

    /// Read and decode the bucket's set, sentinel included.
    pub async fn list(&self, bucket: &str) -> StoreResult<SetLattice> {
        let tuple = self.correlator.submit_read(&bucket_key(bucket)).await?;
        let set = SetLattice::decode(&tuple.payload)?;
        if !set.contains(SENTINEL) {
            return Err(StoreError::NotFound(format!("bucket {bucket:?} does not exist")));
        }
        Ok(set)
    }

    /// Delete the bucket if it holds nothing but the sentinel.
    ///
    /// Deletion overwrites the bucket key with an empty value; the key itself
    /// stays in the store.
    pub async fn delete(&self, bucket: &str) -> StoreResult<()> {
        let set = self.list(bucket).await?;
        if set.len() > 1 {
            return Err(StoreError::PermissionDenied(format!(
                "bucket {bucket:?} is not empty ({} objects)",
                set.len() - 1
            )));
        }
        self.correlator
            .submit_write(&bucket_key(bucket), &[], LatticeType::Set)
            .await?;
        info!(bucket, "bucket deleted");
        Ok(())
    }

    /// Returns `true` if `object_key` is a member of the bucket.
    pub async fn contains(&self, bucket: &str, object_key: &str) -> StoreResult<bool> {
        Ok(self.list(bucket).await?.contains(object_key))
    }

    /// Add `object_key` to the bucket's set.
    pub async fn add_member(&self, bucket: &str, object_key: &str) -> StoreResult<()> {
        let mut set = self.list(bucket).await?;
        set.insert(object_key);
        self.write(bucket, &set).await?;
        debug!(bucket, object_key, members = set.len(), "member added");
        Ok(())
    }

    /// Remove `object_key` from the bucket's set.
    ///
    /// Writes an empty set first and the pruned set second. Between the two
    /// writes the bucket reads as not-found to other callers.
    pub async fn remove_member(&self, bucket: &str, object_key: &str) -> StoreResult<()> {
        let mut set = self.list(bucket).await?;
        if !set.remove(object_key) {
            return Err(StoreError::NotFound(format!(
                "object {object_key:?} is not in bucket {bucket:?}"
            )));
        }
        self.write(bucket, &SetLattice::new()).await?;
        self.write(bucket, &set).await?;
        debug!(bucket, object_key, members = set.len(), "member removed");
        Ok(())
    }

    async fn write(&self, bucket: &str, set: &SetLattice) -> StoreResult<()> {
        self.correlator
            .submit_write(&bucket_key(bucket), &set.encode()?, LatticeType::Set)
            .await?;
        Ok(())
    }
}
