//! Collection asset upload to an IPFS pinning service.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::LaunchpadError;

pub const DEFAULT_PINNING_ENDPOINT: &str = "https://api.pinata.cloud/pinning/pinFileToIPFS";
pub const DEFAULT_GATEWAY: &str = "https://gateway.pinata.cloud";

/// Pinning service settings. Credentials are never compiled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinningConfig {
    pub endpoint: Url,
    /// Base URL returned uploads are served from.
    pub gateway: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_api_key: Option<String>,
}

impl Default for PinningConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_PINNING_ENDPOINT).expect("valid default endpoint"),
            gateway: Url::parse(DEFAULT_GATEWAY).expect("valid default gateway"),
            api_key: None,
            secret_api_key: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Public URL of `hash` behind `gateway`.
pub fn gateway_url(gateway: &Url, hash: &str) -> Result<Url, LaunchpadError> {
    let base = gateway.as_str().trim_end_matches('/');
    Url::parse(&format!("{}/ipfs/{}", base, hash))
        .map_err(|e| LaunchpadError::Upload(format!("bad gateway URL for {}: {}", hash, e)))
}

/// Uploads files to the configured pinning endpoint.
#[derive(Debug, Clone)]
pub struct PinningClient {
    client: reqwest::Client,
    config: PinningConfig,
}

impl PinningClient {
    pub fn new(client: reqwest::Client, config: PinningConfig) -> Self {
        Self { client, config }
    }

    /// Pin `bytes` under `file_name` and return its gateway URL.
    ///
    /// A single attempt; any transport failure or non-success status is an
    /// [`LaunchpadError::Upload`].
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<Url, LaunchpadError> {
        let (Some(api_key), Some(secret)) = (&self.config.api_key, &self.config.secret_api_key)
        else {
            return Err(LaunchpadError::validation(
                "pinning credentials are not configured",
            ));
        };

        tracing::info!(file_name, size = bytes.len(), endpoint = %self.config.endpoint, "Uploading to pinning service");

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));

        let response = self
            .client
            .post(self.config.endpoint.clone())
            .header("pinata_api_key", api_key)
            .header("pinata_secret_api_key", secret)
            .multipart(form)
            .send()
            .await
            .map_err(|e| LaunchpadError::Upload(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LaunchpadError::Upload(format!(
                "pinning service returned {}: {}",
                status,
                body.trim()
            )));
        }

        let pinned: PinResponse = response
            .json()
            .await
            .map_err(|e| LaunchpadError::Upload(format!("unexpected response: {}", e)))?;

        let url = gateway_url(&self.config.gateway, &pinned.ipfs_hash)?;
        tracing::info!(hash = %pinned.ipfs_hash, %url, "Upload pinned");
        Ok(url)
    }

    /// Read `path` and upload it under its file name.
    pub async fn upload_file(&self, path: &Path) -> Result<Url, LaunchpadError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                LaunchpadError::validation(format!("{} has no file name", path.display()))
            })?;

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            LaunchpadError::validation(format!("cannot read {}: {}", path.display(), e))
        })?;

        self.upload(file_name, bytes).await
    }
}
