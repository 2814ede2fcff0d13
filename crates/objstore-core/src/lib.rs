//! S3-style buckets and objects on top of a lattice KVS.
//!
//! Every bucket is a [`SetLattice`](objstore_lattice::SetLattice) under the
//! bucket name, holding the keys of its objects plus a reserved sentinel
//! member. Every object is an
//! [`LwwPairLattice`](objstore_lattice::LwwPairLattice) under
//! `bucket/object`.
//!
//! # Layers
//!
//! - [`Correlator`] -- turns the KVS client's issue/receive pair into one
//!   awaited round-trip with a deadline.
//! - [`status`] -- maps KVS error codes to [`StatusCode`] outcomes.
//! - [`BucketMembership`] / [`ObjectRegister`] -- read-modify-write of the
//!   two lattice kinds.
//! - [`LatticeObjectStore`] -- the six API operations, exposed through the
//!   [`ObjectStoreApi`] trait.
//!
//! # Consistency
//!
//! Operations are not atomic and nothing is rolled back on failure. Bucket
//! updates are unconditional read-modify-writes, so concurrent mutations of
//! one bucket can lose updates.

pub mod api;
pub mod bucket;
pub mod config;
pub mod correlator;
pub mod error;
pub mod key;
pub mod register;
pub mod status;
pub mod store;

pub use api::ObjectStoreApi;
pub use bucket::BucketMembership;
pub use config::{CorrelatorConfig, MismatchPolicy, StoreConfig};
pub use correlator::Correlator;
pub use error::{StoreError, StoreResult};
pub use register::ObjectRegister;
pub use status::StatusCode;
pub use store::LatticeObjectStore;
