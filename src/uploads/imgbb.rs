//! ImgBB REST API client

use super::{ImageHost, UploadError, UploadedImage};
use crate::config::UploadsConfig;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub struct ImgbbClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ImgbbResponse {
    #[serde(default)]
    success: bool,
    data: Option<ImgbbData>,
    error: Option<ImgbbErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ImgbbData {
    url: String,
    #[serde(default)]
    display_url: Option<String>,
    #[serde(default)]
    delete_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImgbbErrorBody {
    message: String,
}

impl ImgbbClient {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UploadError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        })
    }

    /// Build a client from config; `None` when no API key is set
    pub fn from_config(config: &UploadsConfig) -> Result<Option<Self>, UploadError> {
        match config.imgbb_api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(Some(Self::new(
                key,
                config.endpoint.clone(),
                Duration::from_secs(config.timeout_secs),
            )?)),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl ImageHost for ImgbbClient {
    fn name(&self) -> &str {
        "imgbb"
    }

    async fn upload(&self, name: &str, bytes: &[u8]) -> Result<UploadedImage, UploadError> {
        let encoded = STANDARD.encode(bytes);
        let form = [
            ("key", self.api_key.as_str()),
            ("image", encoded.as_str()),
            ("name", name),
        ];

        let response = self.client.post(&self.endpoint).form(&form).send().await?;
        let status = response.status();
        let body: ImgbbResponse = response.json().await.map_err(|e| {
            UploadError::Upstream(format!("unreadable response ({}): {}", status, e))
        })?;

        parse_response(status, body)
    }
}

fn parse_response(
    status: reqwest::StatusCode,
    body: ImgbbResponse,
) -> Result<UploadedImage, UploadError> {
    if !status.is_success() || !body.success {
        let message = body
            .error
            .map(|e| e.message)
            .unwrap_or_else(|| format!("status {}", status));
        return Err(UploadError::Upstream(message));
    }

    let data = body
        .data
        .ok_or_else(|| UploadError::Upstream("response has no image data".to_string()))?;

    Ok(UploadedImage {
        display_url: data.display_url.unwrap_or_else(|| data.url.clone()),
        url: data.url,
        delete_url: data.delete_url,
    })
}
