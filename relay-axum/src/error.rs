use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use relay_blob::BlobError;
use relay_core::{ErrorKind, RelayError};
use serde_json::json;
use tracing::warn;

const MIB: u64 = 1024 * 1024;

#[derive(Debug)]
pub struct RelayAxumError(pub anyhow::Error);

impl From<anyhow::Error> for RelayAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<RelayError> for RelayAxumError {
    fn from(e: RelayError) -> Self {
        Self(e.into_anyhow())
    }
}

impl From<BlobError> for RelayAxumError {
    fn from(e: BlobError) -> Self {
        relay_error_from_blob(e).into()
    }
}

/// Map storage errors onto their client-facing shape.
///
/// Unknown and expired ids are indistinguishable here: both are `NotFound`.
pub fn relay_error_from_blob(err: BlobError) -> RelayError {
    match &err {
        BlobError::NotFound { id } => RelayError::not_found(format!("No blob {id}")),
        BlobError::TooLarge { max, .. } => RelayError::file_too_large(max / MIB),
        BlobError::RangeNotSatisfiable { size } => {
            RelayError::range_not_satisfiable(err.to_string()).with_data(json!({ "size": size }))
        }
    }
}

impl IntoResponse for RelayAxumError {
    fn into_response(self) -> Response {
        // A RelayError anywhere in the anyhow chain keeps its kind and reason
        let found = self
            .0
            .chain()
            .find_map(|e| e.downcast_ref::<RelayError>())
            .map(RelayError::sanitize_for_client);

        let relay = match found {
            Some(relay) => relay,
            None => {
                let relay = RelayError::normalize(self.0);
                warn!(error = %relay.message, "request failed with internal error");
                relay.sanitize_for_client()
            }
        };

        if relay.kind == ErrorKind::RangeNotSatisfiable {
            return unsatisfiable_range(&relay);
        }

        let status = StatusCode::from_u16(relay.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(relay.to_json())).into_response()
    }
}

/// 416 carries no body, only the size of the representation.
fn unsatisfiable_range(relay: &RelayError) -> Response {
    let size = relay
        .data
        .as_ref()
        .and_then(|data| data.get("size"))
        .and_then(|size| size.as_u64());

    let mut response = (StatusCode::RANGE_NOT_SATISFIABLE, Body::empty()).into_response();
    if let Some(size) = size {
        if let Ok(value) = HeaderValue::from_str(&format!("bytes */{size}")) {
            response.headers_mut().insert(header::CONTENT_RANGE, value);
        }
    }
    response
}
