//! Media hosts
//!
//! Images arrive in request bodies as base64 data URLs (or, for Cloudinary,
//! remote URLs). A [`MediaHost`] stores them and hands back a [`MediaRef`].

mod cloudinary;
mod local;

pub use cloudinary::CloudinaryHost;
pub use local::LocalMediaHost;

use crate::config::{MediaProvider, MediaSettings};
use crate::error::{Result, ServerError};
use async_trait::async_trait;
use base64::Engine;
use pulse_core::MediaRef;
use std::sync::Arc;

/// Folder for post images
pub const POST_IMAGE_FOLDER: &str = "postImg";

/// Folder for profile images
pub const PROFILE_IMAGE_FOLDER: &str = "profileImg";

/// Storage for uploaded images
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Store `payload` under `folder`
    async fn upload(&self, payload: &str, folder: &str) -> Result<MediaRef>;

    /// Remove a previously uploaded asset
    async fn destroy(&self, public_id: &str) -> Result<()>;
}

/// Build the media host selected by configuration
pub async fn from_config(settings: &MediaSettings) -> Result<Arc<dyn MediaHost>> {
    match settings.provider {
        MediaProvider::Local => {
            let host = LocalMediaHost::new(settings.path.clone(), settings.public_url.clone());
            host.initialize().await?;
            tracing::info!(path = %settings.path.display(), "Local media host initialized");
            Ok(Arc::new(host))
        }
        MediaProvider::Cloudinary => {
            let cloudinary = settings.cloudinary.as_ref().ok_or_else(|| {
                ServerError::Config("media.cloudinary settings are missing".to_string())
            })?;
            let host = CloudinaryHost::new(cloudinary)?;
            tracing::info!(cloud = %cloudinary.cloud_name, "Cloudinary media host initialized");
            Ok(Arc::new(host))
        }
    }
}

/// Decoded image payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// File extension for the payload's media type
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/svg+xml" => "svg",
            "application/octet-stream" => "bin",
            other => mime_guess::get_mime_extensions_str(other)
                .and_then(|exts| exts.first().copied())
                .unwrap_or("bin"),
        }
    }
}

/// Decode a `data:<mime>;base64,<data>` URL or a bare base64 string
pub fn decode_image(payload: &str) -> Result<DecodedImage> {
    let payload = payload.trim();

    let (mime, data) = match payload.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest
                .split_once(',')
                .ok_or_else(|| ServerError::Validation("Malformed data URL".to_string()))?;
            let mime = meta.strip_suffix(";base64").ok_or_else(|| {
                ServerError::Validation("Only base64 data URLs are supported".to_string())
            })?;
            (mime.to_string(), data)
        }
        None => (String::new(), payload),
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| ServerError::Validation(format!("Image is not valid base64: {e}")))?;

    if bytes.is_empty() {
        return Err(ServerError::Validation("Image is empty".to_string()));
    }

    let mime = if mime.is_empty() {
        sniff_mime(&bytes).to_string()
    } else {
        mime
    };

    Ok(DecodedImage { mime, bytes })
}

fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "application/octet-stream"
    }
}
