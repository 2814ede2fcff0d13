use async_trait::async_trait;

use crate::error::StoreResult;

/// The bucket/object API served to clients.
///
/// Object names returned by [`list_bucket`](Self::list_bucket) are relative
/// to the bucket and exclude any reserved entries.
#[async_trait]
pub trait ObjectStoreApi: Send + Sync {
    async fn create_bucket(&self, bucket: &str) -> StoreResult<()>;

    async fn list_bucket(&self, bucket: &str) -> StoreResult<Vec<String>>;

    /// Fails with permission-denied while the bucket holds objects.
    async fn delete_bucket(&self, bucket: &str) -> StoreResult<()>;

    async fn get(&self, bucket: &str, object: &str) -> StoreResult<Vec<u8>>;

    /// Fails with not-found if the bucket does not exist.
    async fn put(&self, bucket: &str, object: &str, data: Vec<u8>) -> StoreResult<()>;

    async fn delete_object(&self, bucket: &str, object: &str) -> StoreResult<()>;
}
