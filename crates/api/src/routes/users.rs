//! User management endpoint handlers (admin only).

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use domain::models::{CreateUserRequest, UpdateUserRequest, UserSummary};
use domain::DomainError;
use serde::Serialize;
use validator::Validate;

use super::parse_id;
use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub success: bool,
}

/// Lists every user except the master account.
///
/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UsersResponse>, ApiError> {
    let users = state.users.list().await?;
    Ok(Json(UsersResponse {
        users: users.into_iter().map(Into::into).collect(),
    }))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;
    let role = request
        .role
        .ok_or_else(|| ApiError::Validation("Role is required".to_string()))?;

    let user = state
        .users
        .create(&request.login, &request.password, role)
        .await?;
    Ok(Json(UserResponse {
        success: true,
        user: user.into(),
    }))
}

/// Changes a user's password.
///
/// PUT /api/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_id(&id, DomainError::user_not_found)?;
    let Json(request) = payload?;
    request.validate()?;

    let user = state.users.update_password(id, &request.password).await?;
    Ok(Json(UserResponse {
        success: true,
        user: user.into(),
    }))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    let id = parse_id(&id, DomainError::user_not_found)?;
    state.users.delete(id).await?;
    Ok(Json(DeleteUserResponse { success: true }))
}
