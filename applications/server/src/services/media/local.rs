/// Local media host - stores uploaded images on disk
use super::{decode_image, MediaHost, POST_IMAGE_FOLDER, PROFILE_IMAGE_FOLDER};
use crate::error::{Result, ServerError};
use async_trait::async_trait;
use pulse_core::MediaRef;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct LocalMediaHost {
    base_path: PathBuf,
    public_url: String,
}

impl LocalMediaHost {
    pub fn new(base_path: PathBuf, public_url: impl Into<String>) -> Self {
        Self {
            base_path,
            public_url: public_url.into(),
        }
    }

    /// Initialize storage directories
    pub async fn initialize(&self) -> Result<()> {
        for folder in [POST_IMAGE_FOLDER, PROFILE_IMAGE_FOLDER] {
            fs::create_dir_all(self.base_path.join(folder)).await?;
        }
        Ok(())
    }

    /// Directory served under `/media`
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a public id to a path inside the media directory
    pub fn path_for(&self, public_id: &str) -> Result<PathBuf> {
        let relative = Path::new(public_id);
        let contained = !public_id.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !contained {
            return Err(ServerError::Validation(format!(
                "Invalid media id: {public_id}"
            )));
        }

        Ok(self.base_path.join(relative))
    }

    fn url_for(&self, public_id: &str) -> String {
        format!("{}/media/{}", self.public_url.trim_end_matches('/'), public_id)
    }
}

#[async_trait]
impl MediaHost for LocalMediaHost {
    async fn upload(&self, payload: &str, folder: &str) -> Result<MediaRef> {
        let image = decode_image(payload)?;
        let public_id = format!("{}/{}.{}", folder, Uuid::new_v4(), image.extension());
        let path = self.path_for(&public_id)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&path, &image.bytes).await?;
        tracing::debug!(public_id, bytes = image.bytes.len(), "Stored media file");

        Ok(MediaRef::new(public_id.clone(), self.url_for(&public_id)))
    }

    async fn destroy(&self, public_id: &str) -> Result<()> {
        let path = self.path_for(public_id)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(public_id, "Media file already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
