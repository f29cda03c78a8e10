//! Registration, login, and session token handling.
//!
//! Tokens are opaque 32-byte random values handed to the client once;
//! only their SHA-256 hash is stored. The `User` extractor resolves the
//! authenticated account from the `Authorization: Bearer` header so
//! handlers never guess at the acting principal.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::{request::Parts, StatusCode},
    Json,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::db::{
    DbPool, LoginRequest, LoginResponse, RegisterRequest, Session, User, UserResponse, UserRole,
};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_email, validate_name, validate_password};

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Generate a random bearer token
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Hash a token for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Derive a username from the email local part: lowercased, with
/// everything outside [a-z0-9] stripped
pub fn derive_username(email: &str) -> String {
    email
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Issue a new session for the user and return the raw token
async fn create_session(pool: &DbPool, ttl_hours: u64, user_id: &str) -> Result<String, ApiError> {
    let token = generate_token();
    let token_hash = hash_token(&token);
    let now = chrono::Utc::now();
    let expires_at = (now + chrono::Duration::hours(ttl_hours as i64)).to_rfc3339();

    let session_id = uuid::Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO sessions (id, user_id, token_hash, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&session_id)
    .bind(user_id)
    .bind(&token_hash)
    .bind(&expires_at)
    .bind(now.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(token)
}

fn validate_register_request(req: &RegisterRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_email(&req.email) {
        errors.add("email", &e);
    }
    if let Err(e) = validate_password(&req.password) {
        errors.add("password", &e);
    }
    if let Err(e) = validate_name(&req.first_name, "First name") {
        errors.add("firstName", &e);
    }
    if let Err(e) = validate_name(&req.last_name, "Last name") {
        errors.add("lastName", &e);
    }

    errors.finish()
}

/// Register a new account and log it in
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    let role: UserRole = req
        .role
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid role: {}", req.role)))?;

    validate_register_request(&req)?;

    let existing: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("User with this email already exists"));
    }

    let username = match req.username.as_deref() {
        Some(u) if !u.trim().is_empty() => u.trim().to_string(),
        _ => derive_username(&req.email),
    };

    let password_hash = hash_password(&req.password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;

    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, first_name, last_name,
                           role, affiliation, bio, is_active, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, '', 1, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&username)
    .bind(&req.email)
    .bind(&password_hash)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(role.to_string())
    .bind(&req.affiliation)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to register user: {}", e);
        if e.to_string().contains("UNIQUE constraint failed") {
            ApiError::conflict("User with this email already exists")
        } else {
            ApiError::database("Failed to register user")
        }
    })?;

    let user: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    tracing::info!(email = %user.email, role = %user.role, "Registered new account");

    let token = create_session(&state.db, state.config.auth.session_ttl_hours, &user.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            token,
            user: UserResponse::from(user),
        }),
    ))
}

/// Login endpoint
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?;

    let user = user.ok_or_else(|| ApiError::not_found("User not found"))?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid password"));
    }

    if !user.is_active {
        return Err(ApiError::unauthorized("User account is inactive"));
    }

    let token = create_session(&state.db, state.config.auth.session_ttl_hours, &user.id).await?;

    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub email: String,
    pub user_id: String,
}

/// Validate a token and return the identity bound to it
pub async fn validate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ValidateQuery>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let user = get_current_user(&state.db, &query.token).await?;

    Ok(Json(ValidateResponse {
        email: user.email,
        user_id: user.id,
    }))
}

/// Resolve the user bound to a live session token
pub async fn get_current_user(pool: &DbPool, token: &str) -> Result<User, ApiError> {
    let token_hash = hash_token(token);
    let now = chrono::Utc::now().to_rfc3339();

    let session: Option<Session> =
        sqlx::query_as("SELECT * FROM sessions WHERE token_hash = ? AND expires_at > ?")
            .bind(&token_hash)
            .bind(&now)
            .fetch_optional(pool)
            .await?;

    let session = session.ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&session.user_id)
        .fetch_optional(pool)
        .await?;

    let user = user.ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    if !user.is_active {
        return Err(ApiError::unauthorized("User account is inactive"));
    }

    Ok(user)
}

/// Extract the bearer token from request headers
fn extract_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Extractor for the current authenticated user
#[async_trait]
impl FromRequestParts<Arc<AppState>> for User {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;
        get_current_user(&state.db, token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testutil;
    use axum::http::StatusCode;

    #[test]
    fn test_derive_username() {
        assert_eq!(derive_username("Ada.Lovelace@cam.ac.uk"), "adalovelace");
        assert_eq!(derive_username("j_doe+papers@example.org"), "jdoepapers");
        assert_eq!(derive_username("reviewer42@example.org"), "reviewer42");
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert_ne!(hash, "hunter2hunter2");
        assert!(verify_password("hunter2hunter2", &hash));
        assert!(!verify_password("wrong password", &hash));
        assert!(!verify_password("hunter2hunter2", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflict() {
        let state = testutil::state().await;

        let first = register(
            State(state.clone()),
            Json(testutil::register_request("ada@example.org", "AUTHOR")),
        )
        .await;
        assert!(first.is_ok());

        let second = register(
            State(state.clone()),
            Json(testutil::register_request("ada@example.org", "AUTHOR")),
        )
        .await;
        let err = second.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_register_invalid_role_rejected() {
        let state = testutil::state().await;

        let result = register(
            State(state),
            Json(testutil::register_request("ada@example.org", "JANITOR")),
        )
        .await;
        assert_eq!(result.unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_wrong_password_unauthorized() {
        let state = testutil::state().await;
        testutil::register_user(&state, "ada@example.org", "AUTHOR").await;

        let result = login(
            State(state),
            Json(LoginRequest {
                email: "ada@example.org".to_string(),
                password: "not the password".to_string(),
            }),
        )
        .await;
        assert_eq!(result.unwrap_err().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_unknown_email_not_found() {
        let state = testutil::state().await;

        let result = login(
            State(state),
            Json(LoginRequest {
                email: "nobody@example.org".to_string(),
                password: "irrelevant".to_string(),
            }),
        )
        .await;
        assert_eq!(result.unwrap_err().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_login_inactive_account_unauthorized() {
        let state = testutil::state().await;
        let (_, user) = testutil::register_user(&state, "ada@example.org", "AUTHOR").await;

        sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
            .bind(&user.id)
            .execute(&state.db)
            .await
            .unwrap();

        // Correct password, deactivated account
        let result = login(
            State(state),
            Json(LoginRequest {
                email: "ada@example.org".to_string(),
                password: testutil::PASSWORD.to_string(),
            }),
        )
        .await;
        assert_eq!(result.unwrap_err().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_validate_token_round_trip() {
        let state = testutil::state().await;
        let (token, user) = testutil::register_user(&state, "ada@example.org", "AUTHOR").await;

        let Json(validated) = validate(
            State(state.clone()),
            Query(ValidateQuery {
                token: token.clone(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(validated.email, "ada@example.org");
        assert_eq!(validated.user_id, user.id);

        let result = validate(
            State(state),
            Query(ValidateQuery {
                token: "deadbeef".to_string(),
            }),
        )
        .await;
        assert_eq!(result.unwrap_err().status(), StatusCode::UNAUTHORIZED);
    }
}
