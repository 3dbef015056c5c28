//! Login endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use domain::models::{LoginRequest, UserSummary};
use serde::Serialize;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub user: UserSummary,
    pub access_token: String,
}

/// Checks credentials and issues an access token.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let user = state
        .users
        .authenticate(&request.login, &request.password)
        .await
        .inspect_err(|_| tracing::info!(login = %request.login.trim(), "Login rejected"))?;

    let (access_token, _jti) = state
        .jwt
        .generate_access_token(user.id, user.role.as_str())
        .map_err(|e| ApiError::Internal(format!("Failed to issue token: {}", e)))?;

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        success: true,
        user: user.into(),
        access_token,
    }))
}
