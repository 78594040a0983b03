use thiserror::Error;

/// Result type for blob operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors that can occur during blob operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
    /// Unknown and expired ids are deliberately indistinguishable.
    #[error("Blob not found: {id}")]
    NotFound { id: String },

    #[error("Blob size {size} exceeds maximum {max}")]
    TooLarge { size: u64, max: u64 },

    #[error("Requested range not satisfiable for blob of {size} bytes")]
    RangeNotSatisfiable { size: u64 },
}

impl BlobError {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(id: S) -> Self {
        Self::NotFound { id: id.into() }
    }
}
