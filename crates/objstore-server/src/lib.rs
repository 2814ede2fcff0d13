//! HTTP/JSON surface for the lattice object store.
//!
//! Exposes the six bucket/object operations of any
//! [`ObjectStoreApi`](objstore_core::ObjectStoreApi) implementation over
//! axum, mapping each operation outcome to an HTTP status.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorBody, ServerError, ServerResult};
pub use handler::{HealthResponse, ListBucketResponse, SharedStore};
pub use router::build_router;
pub use server::ObjstoreServer;
