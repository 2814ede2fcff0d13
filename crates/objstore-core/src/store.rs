use std::sync::Arc;

use async_trait::async_trait;
use objstore_kvs::KvsClient;
use objstore_lattice::TimestampClock;
use tracing::debug;

use crate::api::ObjectStoreApi;
use crate::bucket::BucketMembership;
use crate::config::StoreConfig;
use crate::correlator::Correlator;
use crate::error::{StoreError, StoreResult};
use crate::key::{object_key, object_name, validate_bucket_name, validate_object_name};
use crate::register::ObjectRegister;

/// Object store backed by set and LWW lattices in the KVS.
///
/// Each operation is a fixed sequence of KVS round-trips, run strictly one
/// after another:
///
/// | Operation | Round-trips |
/// |---|---|
/// | `create_bucket` | write set `{""}` |
/// | `list_bucket` | read set |
/// | `delete_bucket` | read set, write empty value |
/// | `get` | read set, read register |
/// | `put` | read set, write set, write register |
/// | `delete_object` | read set, write empty set, write pruned set, write tombstone |
///
/// Nothing is rolled back when a later step fails. In particular `put` can
/// leave a listed object whose payload was never written, which then reads
/// as not-found.
pub struct LatticeObjectStore<C> {
    buckets: BucketMembership<C>,
    objects: ObjectRegister<C>,
}

impl<C: KvsClient> LatticeObjectStore<C> {
    pub fn new(client: C, config: StoreConfig) -> Self {
        let correlator = Arc::new(Correlator::new(client, config.correlator));
        Self {
            buckets: BucketMembership::new(Arc::clone(&correlator)),
            objects: ObjectRegister::new(correlator, TimestampClock::new(config.node_id)),
        }
    }

    pub fn buckets(&self) -> &BucketMembership<C> {
        &self.buckets
    }

    pub fn objects(&self) -> &ObjectRegister<C> {
        &self.objects
    }
}

#[async_trait]
impl<C: KvsClient + 'static> ObjectStoreApi for LatticeObjectStore<C> {
    async fn create_bucket(&self, bucket: &str) -> StoreResult<()> {
        validate_bucket_name(bucket)?;
        self.buckets.create(bucket).await
    }

    async fn list_bucket(&self, bucket: &str) -> StoreResult<Vec<String>> {
        validate_bucket_name(bucket)?;
        let set = self.buckets.list(bucket).await?;
        Ok(set
            .iter()
            .filter_map(|member| object_name(bucket, member))
            .map(str::to_string)
            .collect())
    }

    async fn delete_bucket(&self, bucket: &str) -> StoreResult<()> {
        validate_bucket_name(bucket)?;
        self.buckets.delete(bucket).await
    }

    async fn get(&self, bucket: &str, object: &str) -> StoreResult<Vec<u8>> {
        validate_bucket_name(bucket)?;
        validate_object_name(object)?;
        let key = object_key(bucket, object);
        if !self.buckets.contains(bucket, &key).await? {
            return Err(StoreError::NotFound(format!(
                "object {object:?} does not exist in bucket {bucket:?}"
            )));
        }
        self.objects.get(&key).await
    }

    async fn put(&self, bucket: &str, object: &str, data: Vec<u8>) -> StoreResult<()> {
        validate_bucket_name(bucket)?;
        validate_object_name(object)?;
        let key = object_key(bucket, object);
        let bytes = data.len();
        self.buckets.add_member(bucket, &key).await?;
        self.objects.put(&key, data).await?;
        debug!(bucket, object, bytes, "object stored");
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, object: &str) -> StoreResult<()> {
        validate_bucket_name(bucket)?;
        validate_object_name(object)?;
        let key = object_key(bucket, object);
        self.buckets.remove_member(bucket, &key).await?;
        self.objects.delete(&key).await?;
        debug!(bucket, object, "object deleted");
        Ok(())
    }
}

impl<C> std::fmt::Debug for LatticeObjectStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatticeObjectStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CorrelatorConfig;
    use crate::status::StatusCode;
    use objstore_kvs::{InMemoryKvs, InMemoryKvsClient, KvsErrorCode};
    use objstore_lattice::{LatticeType, LwwPairLattice};
    use proptest::prelude::*;

    fn store(kvs: &InMemoryKvs) -> LatticeObjectStore<InMemoryKvsClient> {
        LatticeObjectStore::new(kvs.client(), StoreConfig::default())
    }

    fn code<T: std::fmt::Debug>(result: StoreResult<T>) -> StatusCode {
        result.unwrap_err().code()
    }

    // -----------------------------------------------------------------------
    // Buckets
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn new_bucket_lists_empty() {
        let kvs = InMemoryKvs::new();
        let s = store(&kvs);
        s.create_bucket("b").await.unwrap();
        assert!(s.list_bucket("b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recreating_a_bucket_resets_its_listing() {
        let kvs = InMemoryKvs::new();
        let s = store(&kvs);
        s.create_bucket("b").await.unwrap();
        s.put("b", "o", b"data".to_vec()).await.unwrap();
        s.create_bucket("b").await.unwrap();

        assert!(s.list_bucket("b").await.unwrap().is_empty());
        assert_eq!(code(s.get("b", "o").await), StatusCode::NotFound);
        // The payload itself is still in the store.
        assert!(kvs.raw("b/o").is_some());
    }

    #[tokio::test]
    async fn never_created_bucket_is_not_found_everywhere() {
        let kvs = InMemoryKvs::new();
        let s = store(&kvs);
        assert_eq!(code(s.list_bucket("b").await), StatusCode::NotFound);
        assert_eq!(code(s.get("b", "o").await), StatusCode::NotFound);
        assert_eq!(code(s.put("b", "o", b"x".to_vec()).await), StatusCode::NotFound);
        assert_eq!(code(s.delete_object("b", "o").await), StatusCode::NotFound);
        assert_eq!(code(s.delete_bucket("b").await), StatusCode::NotFound);
        assert!(kvs.is_empty());
    }

    #[tokio::test]
    async fn delete_bucket_only_when_empty() {
        let kvs = InMemoryKvs::new();
        let s = store(&kvs);
        s.create_bucket("b").await.unwrap();
        s.put("b", "o", b"x".to_vec()).await.unwrap();
        assert_eq!(code(s.delete_bucket("b").await), StatusCode::PermissionDenied);

        s.delete_object("b", "o").await.unwrap();
        s.delete_bucket("b").await.unwrap();
        assert_eq!(code(s.list_bucket("b").await), StatusCode::NotFound);
        assert_eq!(code(s.put("b", "o", b"x".to_vec()).await), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn deleted_bucket_can_be_recreated() {
        let kvs = InMemoryKvs::new();
        let s = store(&kvs);
        s.create_bucket("b").await.unwrap();
        s.delete_bucket("b").await.unwrap();
        s.create_bucket("b").await.unwrap();
        assert!(s.list_bucket("b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bucket_shadowing_an_object_key_is_invalid_argument() {
        let kvs = InMemoryKvs::new();
        let s = store(&kvs);
        s.create_bucket("a").await.unwrap();
        s.put("a", "b", b"x".to_vec()).await.unwrap();
        // "a/b" already holds an LWW register.
        assert_eq!(code(s.create_bucket("a/b").await), StatusCode::InvalidArgument);
    }

    #[tokio::test]
    async fn empty_names_are_rejected_without_touching_the_store() {
        let kvs = InMemoryKvs::new();
        let s = store(&kvs);
        assert_eq!(code(s.create_bucket("").await), StatusCode::InvalidArgument);
        s.create_bucket("b").await.unwrap();
        assert_eq!(code(s.put("b", "", b"x".to_vec()).await), StatusCode::InvalidArgument);
        assert_eq!(kvs.history().len(), 1);
    }

    // -----------------------------------------------------------------------
    // Objects
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn put_get_and_list() {
        let kvs = InMemoryKvs::new();
        let s = store(&kvs);
        s.create_bucket("b").await.unwrap();
        s.put("b", "x", b"1".to_vec()).await.unwrap();
        s.put("b", "dir/y", b"2".to_vec()).await.unwrap();

        assert_eq!(s.get("b", "x").await.unwrap(), b"1".to_vec());
        assert_eq!(s.get("b", "dir/y").await.unwrap(), b"2".to_vec());
        assert_eq!(s.list_bucket("b").await.unwrap(), vec!["dir/y", "x"]);
    }

    #[tokio::test]
    async fn put_overwrites() {
        let kvs = InMemoryKvs::new();
        let s = store(&kvs);
        s.create_bucket("b").await.unwrap();
        s.put("b", "o", b"old".to_vec()).await.unwrap();
        s.put("b", "o", b"new".to_vec()).await.unwrap();
        assert_eq!(s.get("b", "o").await.unwrap(), b"new".to_vec());
        assert_eq!(s.list_bucket("b").await.unwrap(), vec!["o"]);
    }

    #[tokio::test]
    async fn put_orders_membership_before_payload() {
        let kvs = InMemoryKvs::new();
        let s = store(&kvs);
        s.create_bucket("b").await.unwrap();
        s.put("b", "o", b"x".to_vec()).await.unwrap();

        let keys: Vec<String> = kvs.history().into_iter().map(|w| w.key).collect();
        assert_eq!(keys, vec!["b", "b", "b/o"]);
    }

    #[tokio::test]
    async fn failed_payload_write_leaves_listed_object_unreadable() {
        let kvs = InMemoryKvs::new();
        let s = store(&kvs);
        s.create_bucket("b").await.unwrap();
        kvs.inject_error("b/o", KvsErrorCode::NoServers);

        assert_eq!(code(s.put("b", "o", b"x".to_vec()).await), StatusCode::Unavailable);
        kvs.clear_error("b/o");
        assert_eq!(s.list_bucket("b").await.unwrap(), vec!["o"]);
        assert_eq!(code(s.get("b", "o").await), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn get_absent_object_is_not_found() {
        let kvs = InMemoryKvs::new();
        let s = store(&kvs);
        s.create_bucket("b").await.unwrap();
        assert_eq!(code(s.get("b", "missing").await), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn delete_object_tombstones_and_unlists() {
        let kvs = InMemoryKvs::new();
        let s = store(&kvs);
        s.create_bucket("b").await.unwrap();
        s.put("b", "o", b"x".to_vec()).await.unwrap();
        s.delete_object("b", "o").await.unwrap();

        assert_eq!(code(s.get("b", "o").await), StatusCode::NotFound);
        assert!(s.list_bucket("b").await.unwrap().is_empty());

        let (kind, payload) = kvs.raw("b/o").unwrap();
        assert_eq!(kind, LatticeType::Lww);
        assert!(LwwPairLattice::decode(&payload).unwrap().is_tombstone());
    }

    #[tokio::test]
    async fn delete_object_twice_is_not_found() {
        let kvs = InMemoryKvs::new();
        let s = store(&kvs);
        s.create_bucket("b").await.unwrap();
        s.put("b", "o", b"x".to_vec()).await.unwrap();
        s.delete_object("b", "o").await.unwrap();
        assert_eq!(code(s.delete_object("b", "o").await), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn delete_object_keeps_siblings() {
        let kvs = InMemoryKvs::new();
        let s = store(&kvs);
        s.create_bucket("b").await.unwrap();
        s.put("b", "x", b"1".to_vec()).await.unwrap();
        s.put("b", "y", b"2".to_vec()).await.unwrap();
        s.delete_object("b", "x").await.unwrap();

        assert_eq!(s.list_bucket("b").await.unwrap(), vec!["y"]);
        assert_eq!(s.get("b", "y").await.unwrap(), b"2".to_vec());
    }

    #[tokio::test]
    async fn delete_object_write_sequence() {
        let kvs = InMemoryKvs::new();
        let s = store(&kvs);
        s.create_bucket("b").await.unwrap();
        s.put("b", "o", b"x".to_vec()).await.unwrap();
        let before = kvs.history().len();
        s.delete_object("b", "o").await.unwrap();

        let keys: Vec<String> = kvs.history()[before..].iter().map(|w| w.key.clone()).collect();
        assert_eq!(keys, vec!["b", "b", "b/o"]);
    }

    // -----------------------------------------------------------------------
    // End-to-end scenario
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn photos_scenario() {
        let kvs = InMemoryKvs::new();
        let s = store(&kvs);
        s.create_bucket("photos").await.unwrap();
        s.put("photos", "a.png", b"xyz".to_vec()).await.unwrap();
        assert_eq!(s.get("photos", "a.png").await.unwrap(), b"xyz".to_vec());
        s.delete_object("photos", "a.png").await.unwrap();
        assert_eq!(code(s.get("photos", "a.png").await), StatusCode::NotFound);
        s.delete_bucket("photos").await.unwrap();

        assert_eq!(code(s.delete_bucket("nope").await), StatusCode::NotFound);
        assert_eq!(code(s.put("b2", "f", b"data".to_vec()).await), StatusCode::NotFound);
    }

    // -----------------------------------------------------------------------
    // Failure propagation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn timeouts_surface_as_unavailable() {
        let kvs = InMemoryKvs::new();
        let s = LatticeObjectStore::new(
            kvs.client(),
            StoreConfig {
                correlator: CorrelatorConfig {
                    request_timeout_ms: 20,
                    ..Default::default()
                },
                node_id: 0,
            },
        );
        kvs.set_drop_responses(true);
        assert_eq!(code(s.create_bucket("b").await), StatusCode::Unavailable);
    }

    #[tokio::test]
    async fn concurrent_puts_to_distinct_buckets() {
        let kvs = InMemoryKvs::new();
        let s = Arc::new(store(&kvs));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let s = Arc::clone(&s);
                tokio::spawn(async move {
                    let bucket = format!("bucket-{i}");
                    s.create_bucket(&bucket).await.unwrap();
                    s.put(&bucket, "o", vec![i as u8 + 1]).await.unwrap();
                    assert_eq!(s.get(&bucket, "o").await.unwrap(), vec![i as u8 + 1]);
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn get_returns_what_put_stored(
            object in "[a-z0-9./_-]{1,24}",
            data in proptest::collection::vec(any::<u8>(), 1..512),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let kvs = InMemoryKvs::new();
                let s = store(&kvs);
                s.create_bucket("b").await.unwrap();
                s.put("b", &object, data.clone()).await.unwrap();
                assert_eq!(s.get("b", &object).await.unwrap(), data);
                assert_eq!(s.list_bucket("b").await.unwrap(), vec![object.clone()]);
            });
        }
    }
}
