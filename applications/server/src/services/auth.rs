/// Authentication service - JWT, refresh cookie and password handling
use crate::error::{Result, ServerError};
use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use cookie::Cookie;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use pulse_core::UserId;
use serde::{Deserialize, Serialize};

/// bcrypt cost factor for stored password hashes
pub const PASSWORD_HASH_COST: u32 = 10;

/// Name of the cookie carrying the refresh token
pub const REFRESH_COOKIE: &str = "jwt";

/// Secrets and lifetimes for both token kinds
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct AuthService {
    settings: TokenSettings,
    secure_cookies: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
    pub token_type: TokenType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl AuthService {
    pub fn new(settings: TokenSettings) -> Self {
        Self {
            settings,
            secure_cookies: true,
        }
    }

    /// Whether session cookies carry the `Secure` attribute
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Hash a password using bcrypt
    pub fn hash_password(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, PASSWORD_HASH_COST).map_err(ServerError::from)
    }

    /// Verify a password against a hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash).map_err(ServerError::from)
    }

    /// Create an access token
    pub fn create_access_token(&self, user_id: &UserId) -> Result<String> {
        self.create_token(
            user_id,
            TokenType::Access,
            &self.settings.access_secret,
            self.settings.access_ttl,
        )
    }

    /// Create a refresh token
    pub fn create_refresh_token(&self, user_id: &UserId) -> Result<String> {
        self.create_token(
            user_id,
            TokenType::Refresh,
            &self.settings.refresh_secret,
            self.settings.refresh_ttl,
        )
    }

    /// Verify an access token and return its subject
    pub fn verify_access_token(&self, token: &str) -> Result<UserId> {
        self.verify_token(token, TokenType::Access, &self.settings.access_secret)
            .map_err(|e| {
                tracing::debug!("Access token rejected: {}", e);
                ServerError::InvalidToken("Invalid access key".to_string())
            })
    }

    /// Verify a refresh token and return its subject
    pub fn verify_refresh_token(&self, token: &str) -> Result<UserId> {
        self.verify_token(token, TokenType::Refresh, &self.settings.refresh_secret)
            .map_err(|e| {
                tracing::debug!("Refresh token rejected: {}", e);
                ServerError::InvalidToken("Invalid refresh token".to_string())
            })
    }

    /// Issue a new access token from the refresh token found in the cookie.
    ///
    /// The refresh token itself is not rotated.
    pub fn refresh(&self, cookie_token: Option<&str>) -> Result<String> {
        let token = cookie_token.ok_or_else(|| {
            ServerError::InvalidToken("Refresh token in cookie is required".to_string())
        })?;

        let user_id = self.verify_refresh_token(token)?;
        self.create_access_token(&user_id)
    }

    /// `Set-Cookie` carrying a refresh token
    pub fn refresh_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((REFRESH_COOKIE, token))
            .http_only(true)
            .secure(self.secure_cookies)
            .path("/")
            .build()
    }

    /// `Set-Cookie` that clears the refresh token
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.refresh_cookie(String::new());
        cookie.make_removal();
        cookie
    }

    /// Pull the refresh token out of the request's `Cookie` headers
    pub fn refresh_token_from_headers(headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(std::result::Result::ok)
            .find(|cookie| cookie.name() == REFRESH_COOKIE && !cookie.value().is_empty())
            .map(|cookie| cookie.value().to_string())
    }

    fn verify_token(&self, token: &str, expected: TokenType, secret: &str) -> Result<UserId> {
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());
        let validation = Validation::default();

        let claims = decode::<Claims>(token, &decoding_key, &validation)?.claims;
        if claims.token_type != expected {
            return Err(ServerError::InvalidToken("Invalid token type".to_string()));
        }
        Ok(UserId::new(claims.sub))
    }

    fn create_token(
        &self,
        user_id: &UserId,
        token_type: TokenType,
        secret: &str,
        expiration: Duration,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + expiration;

        let claims = Claims {
            sub: user_id.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type,
        };

        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key).map_err(ServerError::from)
    }
}
