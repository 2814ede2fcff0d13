//! Lattice values stored in the KVS by the object store.
//!
//! Two lattice kinds back the whole object store:
//!
//! - [`SetLattice`] -- a set of strings, merged by union inside the KVS. One
//!   set per bucket holds the bucket's object keys.
//! - [`LwwPairLattice`] -- a `(timestamp, bytes)` register, merged by keeping
//!   the greatest timestamp. One register per object holds its payload.
//!
//! This crate only encodes and decodes these values. Merging happens inside
//! the KVS and is never performed here.
//!
//! Timestamps for LWW writes come from a [`TimestampClock`], which never
//! hands out the same value twice.

pub mod clock;
pub mod error;
pub mod kind;
pub mod lww;
pub mod set;

pub use clock::TimestampClock;
pub use error::{CodecError, CodecResult};
pub use kind::LatticeType;
pub use lww::LwwPairLattice;
pub use set::SetLattice;
