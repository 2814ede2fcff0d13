//! Client-side view of the lattice KVS.
//!
//! The object store never talks to storage nodes itself. It drives a
//! [`KvsClient`], which issues asynchronous puts and gets and later hands
//! back completed [`KeyResponse`]s tagged with the [`RequestId`] of the
//! request that produced them.
//!
//! # Backends
//!
//! - [`InMemoryKvs`] -- process-local store for tests, development and
//!   embedding. Writes replace the stored value; there is no lattice merge.
//!   Supports fault injection so the correlation protocol can be exercised
//!   against dropped, duplicated, mislabelled and failed responses.

pub mod client;
pub mod error;
pub mod memory;
pub mod types;

pub use client::KvsClient;
pub use error::{KvsError, KvsResult};
pub use memory::{InMemoryKvs, InMemoryKvsClient, WriteRecord};
pub use types::{Key, KeyResponse, KeyTuple, KvsErrorCode, RequestId, RequestKind};

pub use objstore_lattice::LatticeType;
