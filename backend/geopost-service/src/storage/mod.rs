/// Image storage for post attachments
///
/// Services only see the `ImageUploader` contract: hand over a filename and
/// the raw bytes, get back a stable public URL.
pub mod s3;

pub use s3::S3ImageUploader;

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Store the image and return the URL it is served from
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String>;
}

/// An image received from a client, not yet uploaded
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}
