//! Photo uploads
//!
//! Photos for student profiles, staff profiles and leads are stored on an
//! external image host. The API only proxies the bytes and keeps the URL.

mod imgbb;

pub use imgbb::ImgbbClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where an uploaded image ended up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    pub display_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Photo uploads are not configured")]
    Disabled,

    #[error("Image body is empty")]
    Empty,

    #[error("Image is {size} bytes, the limit is {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("Upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Image host rejected the upload: {0}")]
    Upstream(String),
}

/// Common trait for image hosts
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Host name, for logs
    fn name(&self) -> &str;

    /// Store `bytes` under `name` and return its public URLs
    async fn upload(&self, name: &str, bytes: &[u8]) -> Result<UploadedImage, UploadError>;
}

/// Reject empty and oversized bodies before they reach the host
pub fn check_image(bytes: &[u8], max_bytes: usize) -> Result<(), UploadError> {
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    if bytes.len() > max_bytes {
        return Err(UploadError::TooLarge {
            size: bytes.len(),
            max: max_bytes,
        });
    }
    Ok(())
}

/// Keep an uploaded file name to a safe, short stem
pub fn sanitize_name(name: &str) -> String {
    let stem = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = stem.split('.').next().unwrap_or(stem);
    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(64)
        .collect();

    if cleaned.trim_matches('_').is_empty() {
        "photo".to_string()
    } else {
        cleaned
    }
}
