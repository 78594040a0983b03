//! Turning an opened blob into an HTTP response.
//!
//! Full reads answer `200`, satisfiable ranges `206` with `Content-Range`.
//! Every response is marked `no-store` and advertises byte ranges so viewers
//! can fetch the document piecewise.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use relay_blob::{mime, OpenedBlob};

pub fn blob_response(opened: OpenedBlob) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(opened.content_type())
            .unwrap_or_else(|_| HeaderValue::from_static(mime::OCTET_STREAM)),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(opened.content_length()));
    if let Ok(value) = HeaderValue::from_str(&content_disposition(opened.filename())) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    let status = match &opened.range {
        Some(range) => {
            if let Ok(value) = HeaderValue::from_str(&range.content_range()) {
                headers.insert(header::CONTENT_RANGE, value);
            }
            StatusCode::PARTIAL_CONTENT
        }
        None => StatusCode::OK,
    };

    (status, headers, Body::from(opened.body)).into_response()
}

/// `inline` disposition with an ASCII fallback name and the exact UTF-8 name.
pub fn content_disposition(filename: &str) -> String {
    format!(
        "inline; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_fallback(filename),
        urlencoding::encode(filename)
    )
}

fn ascii_fallback(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            ' '..='~' if c != '"' && c != '\\' => c,
            _ => '_',
        })
        .collect()
}
