use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use smart_shared::models::user::{Role, User};
use smart_store::user_repo::{hash_password, verify_password, UserRepository as _};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::{AppState, AuthConfig};

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: String,
    pub exp: usize,
}

pub fn issue_token(auth: &AuthConfig, user: &User) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        role: user.role.to_string(),
        exp: (Utc::now() + Duration::seconds(auth.expiration_seconds as i64)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.secret.as_bytes()),
    )
    .map_err(|err| ApiError::Internal(anyhow::Error::new(err)))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// User payload for responses; never includes the password hash.
fn user_payload(user: &User) -> Value {
    json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "fullName": user.full_name,
        "role": user.role,
    })
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .filter(|user| verify_password(&req.password, &user.password_hash))
        .ok_or_else(|| ApiError::Authentication("Invalid credentials".to_string()))?;

    let token = issue_token(&state.auth, &user)?;
    tracing::info!(username = %user.username, role = %user.role, "user logged in");

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "data": { "token": token, "user": user_payload(&user) },
    })))
}

/// POST /api/auth/register — public signup, always staff
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    validate_password(&req.password)?;

    let user = User::new(
        req.username.trim(),
        req.email.trim().to_ascii_lowercase(),
        hash_password(&req.password)?,
        req.full_name.trim(),
        Role::Staff,
    );
    state.users.insert(&user).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "data": user_payload(&user),
        })),
    ))
}

/// POST /api/auth/admin/register — admin creates an account with a role
pub async fn admin_register(
    State(state): State<AppState>,
    Json(req): Json<AdminRegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    validate_password(&req.password)?;
    let role = Role::from_str(&req.role).map_err(ApiError::Validation)?;

    let user = User::new(
        req.username.trim(),
        req.email.trim().to_ascii_lowercase(),
        hash_password(&req.password)?,
        req.full_name.trim(),
        role,
    );
    state.users.insert(&user).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "data": user_payload(&user),
        })),
    ))
}

/// GET /api/auth/profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Value>, ApiError> {
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::Authentication("Invalid token subject".to_string()))?;
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": user_payload(&user),
    })))
}

/// PATCH /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    validate_password(&req.new_password)?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::Authentication("Invalid token subject".to_string()))?;
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !verify_password(&req.current_password, &user.password_hash) {
        return Err(ApiError::Authentication(
            "Current password is incorrect".to_string(),
        ));
    }

    state
        .users
        .update_password(user.id, &hash_password(&req.new_password)?)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Password changed successfully",
    })))
}

/// POST /api/auth/logout — tokens are stateless; this is an acknowledgement
pub async fn logout() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Logged out successfully",
    }))
}
