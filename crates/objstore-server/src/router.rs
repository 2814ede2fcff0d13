use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::{self, SharedStore};

/// Build the axum router with all object store endpoints.
///
/// Request bodies are not size-limited.
pub fn build_router(store: SharedStore) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route(
            "/v1/buckets/:bucket",
            get(handler::list_bucket_handler)
                .put(handler::create_bucket_handler)
                .delete(handler::delete_bucket_handler),
        )
        .route(
            "/v1/buckets/:bucket/objects/*object",
            get(handler::get_object_handler)
                .put(handler::put_object_handler)
                .delete(handler::delete_object_handler),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}
