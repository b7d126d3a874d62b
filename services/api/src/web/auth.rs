//! services/api/src/web/auth.rs
//!
//! Account endpoints for registration, login and logout. Only available when
//! the service runs with `IDENTITY_MODE=accounts`.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use scrible_core::{AccountIdentity, UserProfile};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl From<UserProfile> for AuthResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            name: profile.name,
        }
    }
}

fn accounts(state: &AppState) -> ApiResult<&AccountIdentity> {
    state
        .identity
        .accounts()
        .ok_or_else(|| ApiError::NotFound("Accounts are disabled".to_string()))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Create a new account and sign it in
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthResponse),
        (status = 400, description = "Missing email or password"),
        (status = 404, description = "Accounts are disabled"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let accounts = accounts(&state)?;

    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let profile = accounts
        .register(email, &req.password, req.name.trim())?
        .ok_or_else(|| ApiError::Conflict("Email already registered".to_string()))?;

    Ok((StatusCode::CREATED, Json(AuthResponse::from(profile))))
}

/// POST /auth/login - Sign in with an existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "Accounts are disabled")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let profile = accounts(&state)?
        .login(req.email.trim(), &req.password)?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(profile.into()))
}

/// POST /auth/logout - Sign out the current account
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Logout successful"),
        (status = 404, description = "Accounts are disabled")
    )
)]
pub async fn logout_handler(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    accounts(&state)?.logout()?;
    info!("Signed out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/me - The signed-in account
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "The current account", body = AuthResponse),
        (status = 401, description = "Nobody is signed in"),
        (status = 404, description = "Accounts are disabled")
    )
)]
pub async fn me_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<AuthResponse>> {
    let profile = accounts(&state)?
        .current_user()?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(profile.into()))
}
