pub mod cloudinary;

use async_trait::async_trait;
use thiserror::Error;

pub use cloudinary::CloudinaryStore;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob store is not configured: missing {0}")]
    NotConfigured(&'static str),

    #[error("blob store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("blob store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected blob store response: {0}")]
    UnexpectedResponse(String),
}

/// Media received from a client, ready to be stored
#[derive(Debug, Clone)]
pub struct BlobUpload {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Durable, publicly fetchable URL
    pub url: String,
    /// Reference accepted by `BlobStore::delete`
    pub blob_ref: String,
}

/// External object store for voice recordings.
///
/// Failures are reported, never retried here; callers decide what to do.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, upload: BlobUpload) -> Result<StoredBlob, BlobError>;

    /// Deleting an already missing blob is not an error
    async fn delete(&self, blob_ref: &str) -> Result<(), BlobError>;
}
