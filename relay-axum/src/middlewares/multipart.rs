use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::Request,
    http::header,
    response::{IntoResponse, Response},
};
use bytes::{Bytes, BytesMut};
use futures::future::BoxFuture;
use relay_core::RelayError;
use tower::{Layer, Service};
use tracing::debug;

use crate::RelayAxumError;

/// A decoded upload, handed to the handler as a request extension.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Configuration for upload decoding
#[derive(Debug, Clone)]
pub struct MultipartConfig {
    /// Maximum file size in bytes; decoding stops as soon as it is exceeded
    pub max_file_size: u64,
    /// Name of the form field that carries the file
    pub file_field: String,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_file_size: 5 * 1024 * 1024, // 5MB
            file_field: "file".to_string(),
        }
    }
}

impl MultipartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum file size in bytes
    pub fn max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    pub fn file_field(mut self, name: &str) -> Self {
        self.file_field = name.to_string();
        self
    }

    fn max_mb(&self) -> u64 {
        self.max_file_size / (1024 * 1024)
    }
}

/// Middleware that decodes a `multipart/form-data` upload into an
/// [`UploadedFile`] extension.
///
/// Requests that are not multipart, or carry no file field, pass through
/// untouched; the handler decides what a missing file means.
#[derive(Clone, Default)]
pub struct MultipartUpload {
    config: MultipartConfig,
}

impl MultipartUpload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MultipartConfig) -> Self {
        Self { config }
    }
}

impl<S> Layer<S> for MultipartUpload {
    type Service = MultipartUploadService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MultipartUploadService {
            inner,
            config: self.config.clone(),
        }
    }
}

#[derive(Clone)]
pub struct MultipartUploadService<S> {
    inner: S,
    config: MultipartConfig,
}

impl<S> Service<Request<Body>> for MultipartUploadService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();
        let config = self.config.clone();

        Box::pin(async move {
            let boundary = req
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .and_then(|ct| multer::parse_boundary(ct).ok());

            let Some(boundary) = boundary else {
                debug!("upload without a multipart body, passing through");
                return inner.call(req).await;
            };

            let (mut parts, body) = req.into_parts();
            match read_upload(body, boundary, &config).await {
                Ok(Some(file)) => {
                    debug!(
                        size = file.data.len(),
                        filename = ?file.filename,
                        "decoded multipart upload"
                    );
                    parts.extensions.insert(file);
                }
                Ok(None) => debug!(field = %config.file_field, "multipart body has no file field"),
                Err(e) => return Ok(RelayAxumError::from(e).into_response()),
            }

            inner.call(Request::from_parts(parts, Body::empty())).await
        })
    }
}

/// Stream the configured file field into memory, other fields are skipped.
async fn read_upload(
    body: Body,
    boundary: String,
    config: &MultipartConfig,
) -> Result<Option<UploadedFile>, RelayError> {
    let mut multipart = multer::Multipart::new(body.into_data_stream(), boundary);

    while let Some(mut field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() != Some(config.file_field.as_str()) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(|ct| ct.to_string());

        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(bad_multipart)? {
            if (data.len() + chunk.len()) as u64 > config.max_file_size {
                debug!(max = config.max_file_size, "upload exceeded the byte ceiling");
                return Err(RelayError::file_too_large(config.max_mb()));
            }
            data.extend_from_slice(&chunk);
        }

        return Ok(Some(UploadedFile {
            filename,
            content_type,
            data: data.freeze(),
        }));
    }

    Ok(None)
}

fn bad_multipart(e: multer::Error) -> RelayError {
    RelayError::bad_request("Failed to parse multipart data")
        .with_reason("bad_multipart")
        .with_source(anyhow::Error::new(e))
}
