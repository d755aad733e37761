/// Media handle domain type
use serde::{Deserialize, Serialize};

/// Reference to an image stored on the media host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    /// Host-side identifier, used to delete the asset
    pub public_id: String,

    /// Publicly reachable URL
    pub url: String,
}

impl MediaRef {
    /// Create a media reference
    pub fn new(public_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            public_id: public_id.into(),
            url: url.into(),
        }
    }
}
