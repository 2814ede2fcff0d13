use std::sync::Arc;

use objstore_kvs::{Key, KvsClient};
use objstore_lattice::{LatticeType, LwwPairLattice, TimestampClock};
use tracing::debug;

use crate::correlator::Correlator;
use crate::error::StoreResult;

/// Object payloads, one LWW register per object key.
pub struct ObjectRegister<C> {
    correlator: Arc<Correlator<C>>,
    clock: TimestampClock,
}

impl<C: KvsClient> ObjectRegister<C> {
    pub fn new(correlator: Arc<Correlator<C>>, clock: TimestampClock) -> Self {
        Self { correlator, clock }
    }

    /// Write `data` under a fresh timestamp.
    pub async fn put(&self, key: &Key, data: Vec<u8>) -> StoreResult<()> {
        self.write(key, LwwPairLattice::new(self.clock.now(), data)).await
    }

    /// Read the current payload.
    pub async fn get(&self, key: &Key) -> StoreResult<Vec<u8>> {
        let tuple = self.correlator.submit_read(key).await?;
        let pair = LwwPairLattice::decode(&tuple.payload)?;
        Ok(pair.into_value())
    }

    /// Overwrite the payload with a tombstone. The key stays in the store.
    pub async fn delete(&self, key: &Key) -> StoreResult<()> {
        self.write(key, LwwPairLattice::tombstone(self.clock.now())).await
    }

    async fn write(&self, key: &Key, pair: LwwPairLattice) -> StoreResult<()> {
        let payload = pair.encode()?;
        self.correlator
            .submit_write(key, &payload, LatticeType::Lww)
            .await?;
        debug!(
            key = %key,
            timestamp = pair.timestamp(),
            bytes = pair.value().len(),
            "register written"
        );
        Ok(())
    }
}
