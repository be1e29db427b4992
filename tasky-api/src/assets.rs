/// External asset host client (avatar storage)
///
/// Binary avatar storage is delegated to an external asset host over HTTP.
/// This client covers the two operations Tasky needs: uploading an image
/// and deleting a previously uploaded asset.
///
/// Deletes are best-effort everywhere they are used: the user record is
/// the source of truth for which avatar is current, and an orphaned remote
/// asset is an accepted (logged) resource leak rather than an error the
/// user ever sees. Uploads are the opposite: if the host rejects the
/// image, the whole avatar update fails.

use serde::Deserialize;
use tracing::debug;

use crate::config::AssetStoreConfig;

/// Error type for asset host operations
#[derive(Debug, thiserror::Error)]
pub enum AssetStoreError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Host answered with a non-success status
    #[error("unexpected status {0}")]
    UnexpectedStatus(reqwest::StatusCode),
}

/// Upload response from the asset host
#[derive(Debug, Deserialize)]
struct UploadResponse {
    /// Public URL of the stored asset
    url: String,
}

/// Client for the external asset host
#[derive(Debug, Clone)]
pub struct AssetStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AssetStore {
    /// Creates a new client from configuration
    pub fn new(config: &AssetStoreConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Uploads an image and returns its hosted URL
    ///
    /// The caller has already validated content type and size; this only
    /// ships the bytes.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AssetStoreError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name("avatar")
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/upload", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AssetStoreError::UnexpectedStatus(response.status()));
        }

        let body: UploadResponse = response.json().await?;
        debug!(url = %body.url, "Asset uploaded");

        Ok(body.url)
    }

    /// Deletes an asset by id
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response; the
    /// caller decides whether that is fatal.
    pub async fn delete(&self, asset_id: &str) -> Result<(), AssetStoreError> {
        let response = self
            .http
            .delete(format!("{}/assets/{}", self.base_url, asset_id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AssetStoreError::UnexpectedStatus(response.status()));
        }

        debug!(asset_id, "Asset deleted");
        Ok(())
    }

    /// Derives the asset id from a hosted URL
    ///
    /// The id is the final path segment without its file extension, which
    /// is how the host names uploads.
    pub fn asset_id(url: &str) -> Option<&str> {
        url.rsplit('/')
            .next()
            .map(|segment| segment.split('.').next().unwrap_or(segment))
            .filter(|id| !id.is_empty())
    }
}
