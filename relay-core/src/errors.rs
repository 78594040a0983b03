//! # Errors
//!
//! The relay surfaces a small, fixed set of structured errors.
//! Core goals:
//! - consistent status codes + names
//! - a short machine-readable `reason` code on every client-facing error
//! - can be carried through anyhow::Error (handlers return `anyhow::Result`)
//! - transport-agnostic (the axum crate decides how to serialize)

use std::fmt;

use anyhow::Error as AnyError;
use serde_json::{json, Value};

/// Error classes with their HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,          // 400
    NotFound,            // 404
    PayloadTooLarge,     // 413
    RangeNotSatisfiable, // 416
    GeneralError,        // 500
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::PayloadTooLarge => 413,
            ErrorKind::RangeNotSatisfiable => 416,
            ErrorKind::GeneralError => 500,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::PayloadTooLarge => "PayloadTooLarge",
            ErrorKind::RangeNotSatisfiable => "RangeNotSatisfiable",
            ErrorKind::GeneralError => "GeneralError",
        }
    }

    /// Reason code used when an error of this kind has none of its own.
    pub fn default_reason(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::NotFound => "not_found",
            ErrorKind::PayloadTooLarge => "file_too_large",
            ErrorKind::RangeNotSatisfiable => "range_not_satisfiable",
            ErrorKind::GeneralError => "internal_error",
        }
    }
}

/// A structured relay error that can live inside `anyhow::Error`.
///
/// Fields:
/// - kind (status code, name)
/// - reason (machine-readable code sent to clients)
/// - message (server-side description, never serialized)
/// - data (optional extra fields merged into the client body)
/// - source (optional inner error, dropped before serialization)
#[derive(Debug)]
pub struct RelayError {
    pub kind: ErrorKind,
    pub reason: String,
    pub message: String,
    pub data: Option<Value>,
    pub source: Option<AnyError>,
}

impl RelayError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            reason: kind.default_reason().to_string(),
            message: message.into(),
            data: None,
            source: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Convert into `anyhow::Error` so it flows through handler results.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Turn any error into a RelayError:
    /// - if it's already a RelayError, keep it
    /// - otherwise wrap as GeneralError
    pub fn normalize(err: AnyError) -> RelayError {
        match err.downcast::<RelayError>() {
            Ok(relay) => relay,
            Err(other) => RelayError::general_error(other.to_string()).with_source(other),
        }
    }

    /// A copy suitable for returning to clients: the inner `source` and the
    /// server-side message of a GeneralError are dropped.
    pub fn sanitize_for_client(&self) -> RelayError {
        let message = match self.kind {
            ErrorKind::GeneralError => "Internal error".to_string(),
            _ => self.message.clone(),
        };
        RelayError {
            kind: self.kind,
            reason: self.reason.clone(),
            message,
            data: self.data.clone(),
            source: None,
        }
    }

    /// Client payload: `{"error": reason}` plus any `data` object fields.
    pub fn to_json(&self) -> Value {
        let mut base = json!({ "error": self.reason });

        if let (Some(Value::Object(extra)), Some(obj)) = (&self.data, base.as_object_mut()) {
            for (k, v) in extra {
                if k != "error" {
                    obj.insert(k.clone(), v.clone());
                }
            }
        }
        base
    }

    // ---- Constructors ----

    /// Upload request without a file part.
    pub fn file_required() -> Self {
        Self::new(ErrorKind::BadRequest, "No file part in upload").with_reason("file_required")
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }

    /// Upload over the byte ceiling; `max_mb` is echoed to the client.
    pub fn file_too_large(max_mb: u64) -> Self {
        Self::new(ErrorKind::PayloadTooLarge, format!("File exceeds {max_mb} MB"))
            .with_data(json!({ "maxMb": max_mb }))
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }

    pub fn range_not_satisfiable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::RangeNotSatisfiable, msg)
    }

    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}
