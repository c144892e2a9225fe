//! Authentication API endpoints
//!
//! Handles HTTP requests for user authentication:
//! - POST /api/v1/auth/register - User registration
//! - POST /api/v1/auth/login    - User login
//! - POST /api/v1/auth/logout   - User logout
//! - GET  /api/v1/auth/me       - Get current user

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::profiles::map_user_error;
use crate::api::responses::UserResponse;
use crate::services::{LoginInput, RegisterInput};

/// Request body for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Response for successful authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// POST /api/v1/auth/register - Register a new account
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .user_service
        .register(RegisterInput::new(body.username, body.email, body.password))
        .await
        .map_err(map_user_error)?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /api/v1/auth/login - Log in, returning the session token and
/// setting it as an HttpOnly cookie
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let session = state
        .user_service
        .login(LoginInput::new(body.username_or_email, body.password))
        .await
        .map_err(map_user_error)?;

    let user = state
        .user_service
        .get_by_id(session.user_id)
        .await
        .map_err(map_user_error)?
        .ok_or_else(|| ApiError::internal_error("Session user missing"))?;

    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        session.id,
        (session.expires_at - session.created_at).num_seconds()
    );

    let body = Json(AuthResponse {
        user: UserResponse::from(user),
        token: session.id,
    });

    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

/// POST /api/v1/auth/logout - Invalidate the current session
pub async fn logout(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    request: Request,
) -> Result<Response, ApiError> {
    // The middleware validated the token, so it is present.
    if let Some(token) = crate::api::middleware::extract_session_token(&request) {
        state
            .user_service
            .logout(&token)
            .await
            .map_err(map_user_error)?;
    }

    let clear_cookie = "session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0".to_string();
    Ok(([(header::SET_COOKIE, clear_cookie)], StatusCode::NO_CONTENT).into_response())
}

/// GET /api/v1/auth/me - The authenticated user's own account
pub async fn get_current_user(user: AuthenticatedUser) -> Json<UserResponse> {
    Json(UserResponse::from(user.0))
}
