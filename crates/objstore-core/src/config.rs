use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What the correlator does when a response id differs from the request id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Log a warning and process the response anyway.
    #[default]
    Warn,
    /// Fail the round-trip with an internal error.
    Reject,
}

/// Tuning for KVS round-trips.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelatorConfig {
    /// Deadline for a response to arrive, in milliseconds. `0` waits forever.
    pub request_timeout_ms: u64,
    /// Extra attempts after an unavailable outcome. Other outcomes are
    /// never retried.
    pub unavailable_retries: u32,
    pub on_id_mismatch: MismatchPolicy,
}

impl CorrelatorConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 10_000,
            unavailable_retries: 0,
            on_id_mismatch: MismatchPolicy::Warn,
        }
    }
}

/// Configuration for a [`LatticeObjectStore`](crate::LatticeObjectStore).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    #[serde(flatten)]
    pub correlator: CorrelatorConfig,
    /// Written into the low bits of every LWW timestamp; give each process
    /// sharing a KVS its own value.
    pub node_id: u8,
}
