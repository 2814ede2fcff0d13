use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use objstore_lattice::LatticeType;
use tokio::sync::mpsc;
use tracing::debug;

use crate::client::KvsClient;
use crate::error::{KvsError, KvsResult};
use crate::types::{Key, KeyResponse, KeyTuple, KvsErrorCode, RequestId, RequestKind};

/// A value held by the in-memory store.
#[derive(Clone, Debug, PartialEq, Eq)]
struct StoredValue {
    lattice: LatticeType,
    payload: Vec<u8>,
}

/// One accepted write, in the order the store applied it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteRecord {
    pub key: Key,
    pub lattice: LatticeType,
    pub payload: Vec<u8>,
}

/// Faults applied to requests as they arrive.
#[derive(Debug, Default)]
struct Faults {
    /// Per-key error codes returned instead of executing the request.
    errors: HashMap<Key, KvsErrorCode>,
    /// Requests are executed but their responses never arrive.
    drop_responses: bool,
    /// Every response is delivered twice in the same batch.
    duplicate_responses: bool,
    /// The next N responses carry a foreign response id.
    foreign_ids: usize,
    /// Requests fail at the client before reaching the store.
    unreachable: bool,
}

struct Shared {
    entries: RwLock<HashMap<Key, StoredValue>>,
    history: Mutex<Vec<WriteRecord>>,
    faults: Mutex<Faults>,
}

/// Process-local lattice KVS.
///
/// Cheap to clone; clones share the same data. Each [`client`](Self::client)
/// is an independent session with its own response queue.
///
/// Writes replace the stored value outright (no lattice merge). A write
/// whose lattice kind differs from the stored kind fails with
/// [`KvsErrorCode::Lattice`]; a read of an absent key fails with
/// [`KvsErrorCode::KeyDoesNotExist`].
#[derive(Clone)]
pub struct InMemoryKvs {
    shared: Arc<Shared>,
}

impl InMemoryKvs {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: RwLock::new(HashMap::new()),
                history: Mutex::new(Vec::new()),
                faults: Mutex::new(Faults::default()),
            }),
        }
    }

    /// Open a new client session on this store.
    pub fn client(&self) -> InMemoryKvsClient {
        let (tx, rx) = mpsc::unbounded_channel();
        InMemoryKvsClient {
            store: self.clone(),
            tx,
            rx,
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.shared.entries.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.entries.read().expect("lock poisoned").is_empty()
    }

    /// The lattice kind and raw payload stored under `key`.
    pub fn raw(&self, key: &str) -> Option<(LatticeType, Vec<u8>)> {
        let entries = self.shared.entries.read().expect("lock poisoned");
        entries
            .get(key)
            .map(|value| (value.lattice, value.payload.clone()))
    }

    /// Sorted list of all stored keys.
    pub fn keys(&self) -> Vec<Key> {
        let entries = self.shared.entries.read().expect("lock poisoned");
        let mut keys: Vec<Key> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Every accepted write so far, oldest first.
    pub fn history(&self) -> Vec<WriteRecord> {
        self.shared.history.lock().expect("lock poisoned").clone()
    }

    /// Writes accepted for one key, oldest first.
    pub fn history_for(&self, key: &str) -> Vec<WriteRecord> {
        self.history().into_iter().filter(|w| w.key == key).collect()
    }

    /// Answer every request on `key` with `code` instead of executing it.
    pub fn inject_error(&self, key: impl Into<Key>, code: KvsErrorCode) {
        self.faults().errors.insert(key.into(), code);
    }

    pub fn clear_error(&self, key: &str) {
        self.faults().errors.remove(key);
    }

    /// Execute requests but never deliver their responses.
    pub fn set_drop_responses(&self, drop: bool) {
        self.faults().drop_responses = drop;
    }

    /// Deliver every response twice in the same batch.
    pub fn set_duplicate_responses(&self, duplicate: bool) {
        self.faults().duplicate_responses = duplicate;
    }

    /// Relabel the next `count` responses with ids no request was issued under.
    pub fn mislabel_next_responses(&self, count: usize) {
        self.faults().foreign_ids = count;
    }

    /// Fail requests at the client as if no routing node were reachable.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.faults().unreachable = unreachable;
    }

    fn faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.shared.faults.lock().expect("lock poisoned")
    }

    fn check_reachable(&self) -> KvsResult<()> {
        if self.faults().unreachable {
            return Err(KvsError::Unreachable("in-memory store marked unreachable".into()));
        }
        Ok(())
    }

    fn injected_error(&self, key: &str) -> Option<KvsErrorCode> {
        self.faults().errors.get(key).copied()
    }

    fn apply_put(&self, key: &Key, payload: Vec<u8>, lattice: LatticeType) -> KeyTuple {
        if let Some(code) = self.injected_error(key) {
            return KeyTuple {
                key: key.clone(),
                lattice_type: Some(lattice),
                error: code,
                payload: Vec::new(),
            };
        }

        let mut entries = self.shared.entries.write().expect("lock poisoned");
        if let Some(existing) = entries.get(key) {
            if existing.lattice != lattice {
                return KeyTuple {
                    key: key.clone(),
                    lattice_type: Some(existing.lattice),
                    error: KvsErrorCode::Lattice,
                    payload: Vec::new(),
                };
            }
        }
        entries.insert(
            key.clone(),
            StoredValue {
                lattice,
                payload: payload.clone(),
            },
        );
        self.shared
            .history
            .lock()
            .expect("lock poisoned")
            .push(WriteRecord {
                key: key.clone(),
                lattice,
                payload,
            });

        KeyTuple {
            key: key.clone(),
            lattice_type: Some(lattice),
            error: KvsErrorCode::None,
            payload: Vec::new(),
        }
    }

    fn apply_get(&self, key: &Key) -> KeyTuple {
        if let Some(code) = self.injected_error(key) {
            return KeyTuple {
                key: key.clone(),
                lattice_type: None,
                error: code,
                payload: Vec::new(),
            };
        }

        let entries = self.shared.entries.read().expect("lock poisoned");
        match entries.get(key) {
            Some(value) => KeyTuple {
                key: key.clone(),
                lattice_type: Some(value.lattice),
                error: KvsErrorCode::None,
                payload: value.payload.clone(),
            },
            None => KeyTuple {
                key: key.clone(),
                lattice_type: None,
                error: KvsErrorCode::KeyDoesNotExist,
                payload: Vec::new(),
            },
        }
    }
}

impl Default for InMemoryKvs {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryKvs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKvs")
            .field("key_count", &self.len())
            .finish()
    }
}

/// A client session on an [`InMemoryKvs`].
///
/// Requests execute immediately; their responses queue up on this session
/// until drained by [`receive`](KvsClient::receive).
pub struct InMemoryKvsClient {
    store: InMemoryKvs,
    tx: mpsc::UnboundedSender<KeyResponse>,
    rx: mpsc::UnboundedReceiver<KeyResponse>,
}

impl InMemoryKvsClient {
    /// The store this session talks to.
    pub fn store(&self) -> &InMemoryKvs {
        &self.store
    }

    fn deliver(&self, id: RequestId, kind: RequestKind, tuple: KeyTuple) -> KvsResult<()> {
        let (drop, duplicate, relabel) = {
            let mut faults = self.store.faults();
            let relabel = faults.foreign_ids > 0;
            if relabel {
                faults.foreign_ids -= 1;
            }
            (faults.drop_responses, faults.duplicate_responses, relabel)
        };
        if drop {
            debug!(%id, key = %tuple.key, "dropping response");
            return Ok(());
        }

        let response = KeyResponse {
            response_id: if relabel { RequestId::new() } else { id },
            kind,
            tuples: vec![tuple],
        };
        if duplicate {
            self.tx.send(response.clone()).map_err(|_| KvsError::Closed)?;
        }
        self.tx.send(response).map_err(|_| KvsError::Closed)
    }
}

#[async_trait]
impl KvsClient for InMemoryKvsClient {
    async fn put_async(
        &mut self,
        key: &Key,
        payload: Vec<u8>,
        lattice: LatticeType,
    ) -> KvsResult<RequestId> {
        self.store.check_reachable()?;
        let id = RequestId::new();
        let tuple = self.store.apply_put(key, payload, lattice);
        self.deliver(id, RequestKind::Put, tuple)?;
        Ok(id)
    }

    async fn get_async(&mut self, key: &Key) -> KvsResult<RequestId> {
        self.store.check_reachable()?;
        let id = RequestId::new();
        let tuple = self.store.apply_get(key);
        self.deliver(id, RequestKind::Get, tuple)?;
        Ok(id)
    }

    async fn receive(&mut self) -> KvsResult<Vec<KeyResponse>> {
        let first = self.rx.recv().await.ok_or(KvsError::Closed)?;
        let mut batch = vec![first];
        while let Ok(next) = self.rx.try_recv() {
            batch.push(next);
        }
        Ok(batch)
    }
}
