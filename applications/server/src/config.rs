/// Server configuration
use crate::error::{Result, ServerError};
use crate::services::auth::TokenSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub media: MediaSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub access_token_secret: String,

    #[serde(default)]
    pub refresh_token_secret: String,

    #[serde(default = "default_access_token_ttl_hours")]
    pub access_token_ttl_hours: u64,

    #[serde(default = "default_refresh_token_ttl_days")]
    pub refresh_token_ttl_days: u64,

    /// Mark the refresh cookie `Secure`. Only disable for plain-HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaProvider {
    #[default]
    Local,
    Cloudinary,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaSettings {
    #[serde(default)]
    pub provider: MediaProvider,

    /// Root directory of the local media host
    #[serde(default = "default_media_path")]
    pub path: PathBuf,

    /// Base URL prepended to local media links
    #[serde(default = "default_public_url")]
    pub public_url: String,

    #[serde(default)]
    pub cloudinary: Option<CloudinarySettings>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CloudinarySettings {
    #[serde(default)]
    pub cloud_name: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub api_secret: String,
}

impl ServerConfig {
    /// Load configuration from `config.toml` (or `path`) and the environment
    ///
    /// Environment variables use the `PULSE` prefix and `__` between
    /// sections, e.g. `PULSE__AUTH__ACCESS_TOKEN_SECRET`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from("config.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("PULSE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.access_token_secret.is_empty() {
            return Err(ServerError::Config(
                "Access token secret is required (set PULSE__AUTH__ACCESS_TOKEN_SECRET)"
                    .to_string(),
            ));
        }

        if self.auth.refresh_token_secret.is_empty() {
            return Err(ServerError::Config(
                "Refresh token secret is required (set PULSE__AUTH__REFRESH_TOKEN_SECRET)"
                    .to_string(),
            ));
        }

        if self.auth.access_token_secret == self.auth.refresh_token_secret {
            return Err(ServerError::Config(
                "Access and refresh token secrets must differ".to_string(),
            ));
        }

        self.token_settings()?;

        if self.media.provider == MediaProvider::Cloudinary {
            let complete = self.media.cloudinary.as_ref().is_some_and(|c| {
                !c.cloud_name.is_empty() && !c.api_key.is_empty() && !c.api_secret.is_empty()
            });
            if !complete {
                return Err(ServerError::Config(
                    "Cloudinary provider requires media.cloudinary.cloud_name, api_key and api_secret"
                        .to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Token secrets and lifetimes for the auth service
    ///
    /// Fails if a lifetime is zero or does not fit a `chrono::Duration`.
    pub fn token_settings(&self) -> Result<TokenSettings> {
        let access_ttl = ttl(
            "access_token_ttl_hours",
            self.auth.access_token_ttl_hours,
            chrono::Duration::try_hours,
        )?;
        let refresh_ttl = ttl(
            "refresh_token_ttl_days",
            self.auth.refresh_token_ttl_days,
            chrono::Duration::try_days,
        )?;

        Ok(TokenSettings {
            access_secret: self.auth.access_token_secret.clone(),
            refresh_secret: self.auth.refresh_token_secret.clone(),
            access_ttl,
            refresh_ttl,
        })
    }
}

fn ttl(
    name: &str,
    value: u64,
    to_duration: fn(i64) -> Option<chrono::Duration>,
) -> Result<chrono::Duration> {
    i64::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .and_then(to_duration)
        .ok_or_else(|| ServerError::Config(format!("auth.{name} out of range: {value}")))
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "sqlite://./data/pulse.db".to_string()
}

fn default_access_token_ttl_hours() -> u64 {
    24
}

fn default_refresh_token_ttl_days() -> u64 {
    365
}

fn default_secure_cookies() -> bool {
    true
}

fn default_media_path() -> PathBuf {
    PathBuf::from("./data/media")
}

fn default_public_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_ttl_hours: default_access_token_ttl_hours(),
            refresh_token_ttl_days: default_refresh_token_ttl_days(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            provider: MediaProvider::default(),
            path: default_media_path(),
            public_url: default_public_url(),
            cloudinary: None,
        }
    }
}
