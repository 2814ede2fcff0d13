use async_trait::async_trait;
use objstore_lattice::LatticeType;

use crate::error::KvsResult;
use crate::types::{Key, KeyResponse, RequestId};

/// Asynchronous client for the lattice KVS.
///
/// Requests are fire-and-forget: `put_async` and `get_async` return as soon
/// as the request is routed, yielding the id its response will carry.
/// Completed responses are collected with [`receive`](KvsClient::receive).
///
/// A client is a single session. Methods take `&mut self`; callers sharing
/// one client must serialize access so that a drained response is only ever
/// seen by the caller that issued it.
#[async_trait]
pub trait KvsClient: Send {
    /// Issue a write of `payload` under `key` with the given lattice kind.
    async fn put_async(
        &mut self,
        key: &Key,
        payload: Vec<u8>,
        lattice: LatticeType,
    ) -> KvsResult<RequestId>;

    /// Issue a read of `key`.
    async fn get_async(&mut self, key: &Key) -> KvsResult<RequestId>;

    /// Drain completed responses.
    ///
    /// Suspends until at least one response is ready, then returns every
    /// response available at that point. Implementations may return an empty
    /// batch spuriously; callers keep waiting in that case.
    async fn receive(&mut self) -> KvsResult<Vec<KeyResponse>>;
}
