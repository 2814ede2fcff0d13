use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json};
use bytes::Bytes;
use objstore_core::ObjectStoreApi;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Store shared by all handlers.
pub type SharedStore = Arc<dyn ObjectStoreApi>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBucketResponse {
    pub object_names: Vec<String>,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

pub async fn create_bucket_handler(
    State(store): State<SharedStore>,
    Path(bucket): Path<String>,
) -> Result<StatusCode, ApiError> {
    store.create_bucket(&bucket).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_bucket_handler(
    State(store): State<SharedStore>,
    Path(bucket): Path<String>,
) -> Result<Json<ListBucketResponse>, ApiError> {
    let object_names = store.list_bucket(&bucket).await?;
    Ok(Json(ListBucketResponse { object_names }))
}

pub async fn delete_bucket_handler(
    State(store): State<SharedStore>,
    Path(bucket): Path<String>,
) -> Result<StatusCode, ApiError> {
    store.delete_bucket(&bucket).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_object_handler(
    State(store): State<SharedStore>,
    Path((bucket, object)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let data = store.get(&bucket, &object).await?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], data))
}

pub async fn put_object_handler(
    State(store): State<SharedStore>,
    Path((bucket, object)): Path<(String, String)>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    store.put(&bucket, &object, body.to_vec()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_object_handler(
    State(store): State<SharedStore>,
    Path((bucket, object)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    store.delete_object(&bucket, &object).await?;
    Ok(StatusCode::NO_CONTENT)
}
