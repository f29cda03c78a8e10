//! User profile endpoints.
//!
//! Email, username, and role are immutable after registration; only the
//! profile fields can change. Accounts are soft-deleted (deactivated),
//! never removed, so papers and reviews keep a valid author reference.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{UpdateUserRequest, User, UserResponse, UserRole};
use crate::AppState;

use super::error::ApiError;

/// Get a user by id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;

    let user = user.ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(UserResponse::from(user)))
}

/// Get a user by email
pub async fn get_user_by_email(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    let user = user.ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(UserResponse::from(user)))
}

/// List users holding a given role
pub async fn list_users_by_role(
    State(state): State<Arc<AppState>>,
    Path(role): Path<String>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let role: UserRole = role
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid role: {}", role)))?;

    let users: Vec<User> = sqlx::query_as("SELECT * FROM users WHERE role = ?")
        .bind(role.to_string())
        .fetch_all(&state.db)
        .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Partial update of the mutable profile fields
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let _existing: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        UPDATE users SET
            first_name = COALESCE(?, first_name),
            last_name = COALESCE(?, last_name),
            affiliation = COALESCE(?, affiliation),
            bio = COALESCE(?, bio),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&req.affiliation)
    .bind(&req.bio)
    .bind(&now)
    .bind(&id)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update user: {}", e);
        ApiError::database("Failed to update user")
    })?;

    let user: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Deactivate a user account. There is no reactivation.
pub async fn deactivate_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let now = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query("UPDATE users SET is_active = 0, updated_at = ? WHERE id = ?")
        .bind(&now)
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(user_id = %id, "Deactivated user account");
    Ok(StatusCode::NO_CONTENT)
}

/// List all active users (diagnostic endpoint)
pub async fn debug_list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users: Vec<User> = sqlx::query_as("SELECT * FROM users WHERE is_active = 1")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
