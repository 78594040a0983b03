pub mod multipart;

pub use multipart::{MultipartConfig, MultipartUpload, MultipartUploadService, UploadedFile};
