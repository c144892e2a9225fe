//! Profile API endpoints
//!
//! Handles HTTP requests for author profiles:
//! - GET /api/v1/profiles/{username}       - Public profile info
//! - GET /api/v1/profiles/{username}/posts - The author's posts: unfiltered
//!   when the viewer is the author, publicly filtered otherwise
//! - PUT /api/v1/profile                   - Edit own profile (authenticated)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;

use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser, MaybeUser};
use crate::api::posts::map_post_error;
use crate::api::responses::{PostResponse, ProfileResponse, UserResponse};
use crate::models::UpdateProfileInput;
use crate::services::UserServiceError;

/// Profile page response: the author plus their listing
#[derive(Debug, Serialize)]
pub struct ProfilePostsResponse {
    pub profile: ProfileResponse,
    pub posts: Vec<PostResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// GET /api/v1/profiles/{username} - Public profile info
pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state
        .user_service
        .get_by_username(&username)
        .await
        .map_err(map_user_error)?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    Ok(Json(ProfileResponse::from(user)))
}

/// GET /api/v1/profiles/{username}/posts - The author's posts
pub async fn list_profile_posts(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(username): Path<String>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ProfilePostsResponse>, ApiError> {
    let params = query.params(state.posts_per_page);
    let (author, result) = state
        .post_service
        .list_by_author(&username, user.viewer(), &params)
        .await
        .map_err(map_post_error)?;

    let total = result.total;
    let page = result.page;
    let page_size = result.per_page;
    let total_pages = result.total_pages();

    Ok(Json(ProfilePostsResponse {
        profile: ProfileResponse::from(author),
        posts: result.items.into_iter().map(PostResponse::from).collect(),
        total,
        page,
        page_size,
        total_pages,
    }))
}

/// PUT /api/v1/profile - Edit the authenticated user's own profile
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<UpdateProfileInput>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = state
        .user_service
        .update_profile(user.0.id, input)
        .await
        .map_err(map_user_error)?;

    Ok(Json(UserResponse::from(updated)))
}

pub(crate) fn map_user_error(e: UserServiceError) -> ApiError {
    match e {
        UserServiceError::NotFound => ApiError::not_found("User not found"),
        UserServiceError::ValidationError(message) => ApiError::validation_error(message),
        UserServiceError::UserExists(what) => {
            ApiError::conflict(format!("Already taken: {}", what))
        }
        UserServiceError::AuthenticationError(message) => ApiError::unauthorized(message),
        UserServiceError::InternalError(e) => {
            tracing::error!("User operation failed: {:#}", e);
            ApiError::internal_error("Internal error")
        }
    }
}
