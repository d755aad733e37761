/// Authentication API routes
use crate::{
    api::{ApiJson, Envelope},
    error::Result,
    services::AuthService,
    state::AppState,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

/// POST /auth/signup
pub async fn signup(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<Envelope> {
    app_state
        .accounts
        .signup(
            req.email.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
            req.name.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Envelope::message(
        StatusCode::CREATED,
        "user successfully created",
    ))
}

/// POST /auth/login
///
/// Answers with the access token and sets the refresh token cookie.
pub async fn login(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse> {
    let (_, tokens) = app_state
        .accounts
        .login(
            req.email.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
        .await?;

    let cookie = app_state
        .auth_service
        .refresh_cookie(tokens.refresh_token)
        .to_string();

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Envelope::ok(AccessTokenResponse {
            access_token: tokens.access_token,
        }),
    ))
}

/// GET /auth/refresh
///
/// Issues a new access token from the refresh token cookie.
pub async fn refresh(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Envelope<AccessTokenResponse>> {
    let token = AuthService::refresh_token_from_headers(&headers);
    let access_token = app_state.auth_service.refresh(token.as_deref())?;

    Ok(Envelope::data(
        StatusCode::CREATED,
        AccessTokenResponse { access_token },
    ))
}

/// POST /auth/logout
pub async fn logout(State(app_state): State<AppState>) -> impl IntoResponse {
    let cookie = app_state.auth_service.removal_cookie().to_string();

    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Envelope::message(StatusCode::OK, "user logged out"),
    )
}
