/// Account service - signup, login and the caller's own profile
use crate::error::{Result, ServerError};
use crate::services::media::{MediaHost, PROFILE_IMAGE_FOLDER};
use crate::services::AuthService;
use pulse_core::{NewUser, ProfileUpdate, SocialStore, User, UserId};
use std::sync::Arc;

/// Tokens issued at login
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn SocialStore>,
    auth: Arc<AuthService>,
    media: Arc<dyn MediaHost>,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AccountService {
    pub fn new(
        store: Arc<dyn SocialStore>,
        auth: Arc<AuthService>,
        media: Arc<dyn MediaHost>,
    ) -> Self {
        Self { store, auth, media }
    }

    /// Register a new user
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> Result<User> {
        if is_blank(email) || password.is_empty() || is_blank(name) {
            return Err(ServerError::Validation("All fields are required".to_string()));
        }

        let email = normalize_email(email);
        if self.store.find_credentials(&email).await?.is_some() {
            return Err(ServerError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.auth.hash_password(password)?;

        // The unique index still guards against a concurrent signup
        let user = self
            .store
            .create_user(NewUser {
                email,
                name: name.trim().to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match ServerError::from(e) {
                ServerError::Conflict(_) => {
                    ServerError::Conflict("Email already registered".to_string())
                }
                other => other,
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Check credentials and issue both tokens
    pub async fn login(&self, email: &str, password: &str) -> Result<(UserId, SessionTokens)> {
        if is_blank(email) || password.is_empty() {
            return Err(ServerError::Validation(
                "Email and Password required".to_string(),
            ));
        }

        let credentials = self
            .store
            .find_credentials(&normalize_email(email))
            .await?
            .ok_or_else(|| ServerError::NotFound("User not registered".to_string()))?;

        if !self
            .auth
            .verify_password(password, &credentials.password_hash)?
        {
            return Err(ServerError::Forbidden("Incorrect Password".to_string()));
        }

        let tokens = SessionTokens {
            access_token: self.auth.create_access_token(&credentials.user_id)?,
            refresh_token: self.auth.create_refresh_token(&credentials.user_id)?,
        };

        tracing::info!(user_id = %credentials.user_id, "User logged in");
        Ok((credentials.user_id, tokens))
    }

    /// The caller's own record
    pub async fn get_my_info(&self, actor: &UserId) -> Result<User> {
        self.store
            .get_user(actor)
            .await?
            .ok_or_else(|| ServerError::NotFound("User not found".to_string()))
    }

    /// Edit name, bio and avatar. Absent or blank fields are left untouched.
    pub async fn update_profile(
        &self,
        actor: &UserId,
        name: Option<String>,
        bio: Option<String>,
        user_img: Option<String>,
    ) -> Result<User> {
        let mut user = self.get_my_info(actor).await?;

        let avatar = match user_img.filter(|img| !is_blank(img)) {
            Some(img) => Some(self.media.upload(&img, PROFILE_IMAGE_FOLDER).await?),
            None => None,
        };
        let previous = avatar.as_ref().and(user.avatar.clone());

        user.apply_profile(ProfileUpdate { name, bio, avatar });
        self.store.save_profile(&user).await?;

        if let Some(previous) = previous {
            if let Err(e) = self.media.destroy(&previous.public_id).await {
                tracing::warn!(public_id = %previous.public_id, "Failed to remove old avatar: {}", e);
            }
        }

        Ok(user)
    }
}
