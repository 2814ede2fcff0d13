use std::collections::HashSet;

use objstore_kvs::{Key, KeyResponse, KeyTuple, KvsClient, RequestId};
use objstore_lattice::LatticeType;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::{CorrelatorConfig, MismatchPolicy};
use crate::error::{StoreError, StoreResult};
use crate::status;

/// A request waiting to be issued.
#[derive(Clone, Copy, Debug)]
enum Request<'a> {
    Write {
        key: &'a Key,
        payload: &'a [u8],
        lattice: LatticeType,
    },
    Read {
        key: &'a Key,
    },
}

impl Request<'_> {
    fn key(&self) -> &Key {
        match self {
            Self::Write { key, .. } | Self::Read { key } => key,
        }
    }
}

/// The client plus the ids of requests whose round-trip gave up waiting.
struct Session<C> {
    client: C,
    abandoned: HashSet<RequestId>,
}

impl<C> Session<C> {
    /// Remove responses to abandoned requests from `batch`.
    fn discard_abandoned(&mut self, batch: Vec<KeyResponse>) -> Vec<KeyResponse> {
        if self.abandoned.is_empty() {
            return batch;
        }
        let (late, live): (Vec<_>, Vec<_>) = batch
            .into_iter()
            .partition(|response| self.abandoned.contains(&response.response_id));
        for response in &late {
            self.abandoned.remove(&response.response_id);
            debug!(id = %response.response_id, "discarding late response");
        }
        live
    }
}

/// Drives one KVS client through synchronous-looking round-trips.
///
/// Each round-trip issues one request, waits for the next response batch,
/// picks the response out of it, and maps its error code. The client is held
/// exclusively from issue until the batch arrives, so a response drained
/// here always belongs to a request issued by the same caller. A round-trip
/// that gives up after issuing records its request id, and a response that
/// later arrives for it is discarded unseen.
///
/// Anomalies are handled as follows:
/// - a batch with more than one response: warn, use the first;
/// - a response id that differs from the request id: warn and use it, or
///   fail with [`StoreError::Internal`] under [`MismatchPolicy::Reject`];
/// - no batch before the deadline: [`StoreError::Unavailable`].
pub struct Correlator<C> {
    session: Mutex<Session<C>>,
    config: CorrelatorConfig,
}

impl<C: KvsClient> Correlator<C> {
    pub fn new(client: C, config: CorrelatorConfig) -> Self {
        Self {
            session: Mutex::new(Session {
                client,
                abandoned: HashSet::new(),
            }),
            config,
        }
    }

    pub fn config(&self) -> &CorrelatorConfig {
        &self.config
    }

    /// Write `payload` under `key` and return the response tuple.
    pub async fn submit_write(
        &self,
        key: &Key,
        payload: &[u8],
        lattice: LatticeType,
    ) -> StoreResult<KeyTuple> {
        self.submit(Request::Write {
            key,
            payload,
            lattice,
        })
        .await
    }

    /// Read `key` and return the response tuple, payload included.
    pub async fn submit_read(&self, key: &Key) -> StoreResult<KeyTuple> {
        self.submit(Request::Read { key }).await
    }

    async fn submit(&self, request: Request<'_>) -> StoreResult<KeyTuple> {
        let mut attempt = 0;
        loop {
            match self.round_trip(request).await {
                Err(err @ StoreError::Unavailable(_))
                    if attempt < self.config.unavailable_retries =>
                {
                    attempt += 1;
                    warn!(key = %request.key(), attempt, error = %err, "retrying unavailable request");
                }
                result => return result,
            }
        }
    }

    async fn round_trip(&self, request: Request<'_>) -> StoreResult<KeyTuple> {
        let mut session = self.session.lock().await;
        let id = match request {
            Request::Write {
                key,
                payload,
                lattice,
            } => {
                let id = session.client.put_async(key, payload.to_vec(), lattice).await?;
                debug!(%id, key = %key, %lattice, "put issued");
                id
            }
            Request::Read { key } => {
                let id = session.client.get_async(key).await?;
                debug!(%id, key = %key, "get issued");
                id
            }
        };
        let batch = match self.await_batch(&mut session, request.key()).await {
            Ok(batch) => batch,
            Err(err) => {
                session.abandoned.insert(id);
                return Err(err);
            }
        };
        drop(session);

        let response = self.select(batch, id, request.key())?;
        let tuple = response.tuples.into_iter().next().ok_or_else(|| {
            StoreError::Internal(format!("response for {:?} carried no tuples", request.key()))
        })?;
        status::check(tuple)
    }

    /// Wait for a batch holding at least one live response, bounded by the
    /// configured deadline.
    async fn await_batch(
        &self,
        session: &mut Session<C>,
        key: &Key,
    ) -> StoreResult<Vec<KeyResponse>> {
        let wait = async {
            loop {
                let batch = session.client.receive().await?;
                let batch = session.discard_abandoned(batch);
                if !batch.is_empty() {
                    return Ok::<_, StoreError>(batch);
                }
            }
        };
        match self.config.request_timeout() {
            Some(deadline) => tokio::time::timeout(deadline, wait).await.map_err(|_| {
                StoreError::Unavailable(format!(
                    "no response for {key:?} within {}ms",
                    deadline.as_millis()
                ))
            })?,
            None => wait.await,
        }
    }

    fn select(
        &self,
        batch: Vec<KeyResponse>,
        expected: RequestId,
        key: &Key,
    ) -> StoreResult<KeyResponse> {
        let count = batch.len();
        if count > 1 {
            warn!(key = %key, count, "received more than one response, using the first");
        }
        let response = batch
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Internal(format!("empty response batch for {key:?}")))?;

        if response.response_id != expected {
            match self.config.on_id_mismatch {
                MismatchPolicy::Warn => {
                    warn!(
                        key = %key,
                        %expected,
                        received = %response.response_id,
                        "response id did not match request id"
                    );
                }
                MismatchPolicy::Reject => {
                    return Err(StoreError::Internal(format!(
                        "response id {} does not match request id {expected} for {key:?}",
                        response.response_id
                    )));
                }
            }
        }
        Ok(response)
    }
}

impl<C> std::fmt::Debug for Correlator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Correlator")
            .field("config", &self.config)
            .finish()
    }
}
