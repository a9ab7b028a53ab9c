/// S3 upload for post images
use super::ImageUploader;
use crate::config::StorageConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct S3ImageUploader {
    client: Arc<Client>,
    config: StorageConfig,
}

impl S3ImageUploader {
    /// Create an uploader using credentials from the environment
    pub async fn from_env(config: StorageConfig) -> Self {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;
        let client = Client::new(&aws_config);

        Self {
            client: Arc::new(client),
            config,
        }
    }

    /// Get CDN URL for object
    fn cdn_url(&self, key: &str) -> String {
        format!("{}/{}", self.config.base_url, key)
    }
}

#[async_trait]
impl ImageUploader for S3ImageUploader {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String> {
        let key = object_key(filename);
        let content_type = content_type_for(filename);
        let size = bytes.len();

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .content_type(content_type.as_ref())
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(%key, error = %e, "image upload failed");
                AppError::Upload(format!("failed to store image {}", filename))
            })?;

        tracing::info!(%key, size, "image uploaded");
        Ok(self.cdn_url(&key))
    }
}

/// Unique object key that keeps a readable tail of the original filename
pub(crate) fn object_key(filename: &str) -> String {
    let sanitized: String = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let tail = if sanitized.is_empty() {
        "image".to_string()
    } else {
        sanitized
    };

    format!("posts/{}-{}", Uuid::new_v4(), tail)
}

pub(crate) fn content_type_for(filename: &str) -> mime::Mime {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "png" => mime::IMAGE_PNG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}
