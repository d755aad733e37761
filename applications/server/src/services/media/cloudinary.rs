/// Cloudinary media host - signed uploads over the REST API
use super::MediaHost;
use crate::config::CloudinarySettings;
use crate::error::{Result, ServerError};
use async_trait::async_trait;
use chrono::Utc;
use pulse_core::MediaRef;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

const API_BASE_URL: &str = "https://api.cloudinary.com";

#[derive(Debug, Clone)]
pub struct CloudinaryHost {
    client: reqwest::Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    #[serde(default)]
    secure_url: Option<String>,
    url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryHost {
    pub fn new(settings: &CloudinarySettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ServerError::Media(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            cloud_name: settings.cloud_name.clone(),
            api_key: settings.api_key.clone(),
            api_secret: settings.api_secret.clone(),
        })
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// SHA-256 request signature.
    ///
    /// Parameters are sorted by name, joined as `k=v&k=v`, and the API
    /// secret is appended before hashing.
    pub fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let joined = sorted
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(joined.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{}",
            self.base_url.trim_end_matches('/'),
            self.cloud_name,
            action
        )
    }
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(&self, payload: &str, folder: &str) -> Result<MediaRef> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("folder", folder), ("timestamp", timestamp.as_str())]);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .form(&[
                ("file", payload),
                ("folder", folder),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.api_key.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ServerError::Media(format!("Upload failed: {e}")))?;

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| ServerError::Media(format!("Unexpected upload response: {e}")))?;

        tracing::debug!(public_id = %uploaded.public_id, "Uploaded media to Cloudinary");

        let url = uploaded.secure_url.unwrap_or(uploaded.url);
        Ok(MediaRef::new(uploaded.public_id, url))
    }

    async fn destroy(&self, public_id: &str) -> Result<()> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", public_id), ("timestamp", timestamp.as_str())]);

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.api_key.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ServerError::Media(format!("Destroy failed: {e}")))?;

        let destroyed: DestroyResponse = response
            .json()
            .await
            .map_err(|e| ServerError::Media(format!("Unexpected destroy response: {e}")))?;

        if destroyed.result != "ok" && destroyed.result != "not found" {
            return Err(ServerError::Media(format!(
                "Destroy of {public_id} returned {}",
                destroyed.result
            )));
        }

        Ok(())
    }
}
