use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::SecondsFormat;
use relay_blob::{BlobId, BlobPut, TransferProgress};
use relay_core::{PublicConfig, RelayConfig, RelayError};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::blob::blob_response;
use crate::middlewares::{MultipartConfig, MultipartUpload, UploadedFile};
use crate::{RelayAxumError, RelayState};

/// Body of a successful `POST /upload`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub id: String,
    pub file_url: String,
    pub viewer_url: String,
    pub filename: String,
    /// RFC 3339, UTC
    pub expires_at: String,
}

pub fn relay_router(state: RelayState) -> Router<()> {
    let upload_layer = MultipartUpload::with_config(
        MultipartConfig::new().max_file_size(state.config.max_file_bytes()),
    );

    Router::new()
        .route("/health", get(health))
        .route("/config", get(public_config))
        .route("/upload", post(upload).layer(upload_layer))
        .route("/f/{id}", get(file))
        .route("/progress/{id}", get(progress))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn public_config(State(state): State<RelayState>) -> Json<PublicConfig> {
    Json(state.config.public_view())
}

async fn upload(
    State(state): State<RelayState>,
    mut req: Request,
) -> Result<Json<UploadResponse>, RelayAxumError> {
    let file = req
        .extensions_mut()
        .remove::<UploadedFile>()
        .ok_or_else(RelayError::file_required)?;

    let mut put = BlobPut::new();
    if let Some(filename) = file.filename {
        put = put.with_filename(filename);
    }
    if let Some(content_type) = file.content_type {
        put = put.with_content_type(content_type);
    }

    let receipt = state.adapter.put(put, file.data)?;

    let file_url = format!("{}/f/{}", public_base(req.headers(), &state.config), receipt.id);
    let viewer_url = format!(
        "{}{}",
        state.config.viewer_base_url,
        urlencoding::encode(&file_url)
    );

    info!(blob_id = %receipt.id, %file_url, "upload ready");

    Ok(Json(UploadResponse {
        id: receipt.id.to_string(),
        file_url,
        viewer_url,
        filename: receipt.filename,
        expires_at: receipt.expires_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

async fn file(
    State(state): State<RelayState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, RelayAxumError> {
    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    let opened = state.adapter.open(&BlobId::from_string(id), range)?;
    Ok(blob_response(opened))
}

async fn progress(
    State(state): State<RelayState>,
    Path(id): Path<String>,
) -> Result<Json<TransferProgress>, RelayAxumError> {
    Ok(Json(state.adapter.progress(&BlobId::from_string(id))?))
}

/// Origin clients should use to reach this service.
///
/// A proxy-supplied `x-forwarded-host` wins (scheme from `x-forwarded-proto`,
/// `https` when absent); otherwise the configured public base URL.
pub fn public_base(headers: &HeaderMap, config: &RelayConfig) -> String {
    match first_forwarded(headers, "x-forwarded-host") {
        Some(host) => {
            let proto = first_forwarded(headers, "x-forwarded-proto").unwrap_or("https");
            format!("{proto}://{host}")
        }
        None => config.public_base_url.clone(),
    }
}

/// First hop of a possibly comma-separated forwarded header.
fn first_forwarded<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
