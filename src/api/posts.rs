//! Post API endpoints
//!
//! Handles HTTP requests for posts:
//! - GET    /api/v1/posts        - Home listing (filtered + aggregated)
//! - GET    /api/v1/posts/{id}   - Detail with ordered comments
//! - POST   /api/v1/posts        - Create (authenticated)
//! - PUT    /api/v1/posts/{id}   - Update (author only, redirect-guarded)
//! - DELETE /api/v1/posts/{id}   - Delete (author only, redirect-guarded)
//!
//! An ownership mismatch on update/delete does not produce an error: the
//! handler answers with a redirect to the post's detail route and the
//! data is left untouched.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser, MaybeUser};
use crate::api::responses::{CommentResponse, PostListResponse, PostResponse};
use crate::models::{CreatePostInput, UpdatePostInput};
use crate::services::{CommentServiceError, PostServiceError};

/// Detail response: the aggregated post plus its comments, oldest first
#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
}

/// The detail route for a post, used as the redirect target on
/// unauthorized mutations
pub fn post_detail_path(post_id: i64) -> String {
    format!("/api/v1/posts/{}", post_id)
}

/// GET /api/v1/posts - List visible posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let params = query.params(state.posts_per_page);
    let result = state
        .post_service
        .list_home(&params)
        .await
        .map_err(map_post_error)?;

    let total = result.total;
    let page = result.page;
    let page_size = result.per_page;
    let total_pages = result.total_pages();

    Ok(Json(PostListResponse {
        posts: result.items.into_iter().map(PostResponse::from).collect(),
        total,
        page,
        page_size,
        total_pages,
    }))
}

/// GET /api/v1/posts/{id} - Post detail
///
/// Not-found when the post is invisible to this viewer; the author sees
/// their own post regardless of its state.
pub async fn get_post(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<i64>,
) -> Result<Json<PostDetailResponse>, ApiError> {
    let viewer = user.viewer();
    let post = state
        .post_service
        .get_detail(id, viewer)
        .await
        .map_err(map_post_error)?;

    let comments = state
        .comment_service
        .list_for_post(id, viewer)
        .await
        .map_err(map_comment_error)?;

    Ok(Json(PostDetailResponse {
        post: PostResponse::from(post),
        comments: comments.into_iter().map(CommentResponse::from).collect(),
    }))
}

/// POST /api/v1/posts - Create a post owned by the authenticated viewer
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<CreatePostInput>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let post = state
        .post_service
        .create(user.0.id, input)
        .await
        .map_err(map_post_error)?;

    // Re-read through the aggregator so the response carries the same
    // shape as every listing.
    let detail = state
        .post_service
        .get_detail(post.id, user.viewer())
        .await
        .map_err(map_post_error)?;

    Ok((StatusCode::CREATED, Json(PostResponse::from(detail))))
}

/// PUT /api/v1/posts/{id} - Update a post
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(input): Json<UpdatePostInput>,
) -> Result<Response, ApiError> {
    match state.post_service.update(id, user.viewer(), input).await {
        Ok(post) => {
            let detail = state
                .post_service
                .get_detail(post.id, user.viewer())
                .await
                .map_err(map_post_error)?;
            Ok(Json(PostResponse::from(detail)).into_response())
        }
        Err(PostServiceError::NotOwner { post_id }) => {
            Ok(Redirect::to(&post_detail_path(post_id)).into_response())
        }
        Err(e) => Err(map_post_error(e)),
    }
}

/// DELETE /api/v1/posts/{id} - Delete a post
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    match state.post_service.delete(id, user.viewer()).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(PostServiceError::NotOwner { post_id }) => {
            Ok(Redirect::to(&post_detail_path(post_id)).into_response())
        }
        Err(e) => Err(map_post_error(e)),
    }
}

pub(crate) fn map_post_error(e: PostServiceError) -> ApiError {
    match e {
        PostServiceError::NotFound => ApiError::not_found("Post not found"),
        PostServiceError::ValidationError(message) => ApiError::validation_error(message),
        PostServiceError::NotOwner { .. } => {
            // Callers handle NotOwner before mapping; reaching here is a bug.
            ApiError::internal_error("Unhandled ownership failure")
        }
        PostServiceError::InternalError(e) => {
            tracing::error!("Post operation failed: {:#}", e);
            ApiError::internal_error("Internal error")
        }
    }
}

pub(crate) fn map_comment_error(e: CommentServiceError) -> ApiError {
    match e {
        CommentServiceError::NotFound => ApiError::not_found("Not found"),
        CommentServiceError::ValidationError(message) => ApiError::validation_error(message),
        CommentServiceError::NotOwner { .. } => {
            ApiError::internal_error("Unhandled ownership failure")
        }
        CommentServiceError::InternalError(e) => {
            tracing::error!("Comment operation failed: {:#}", e);
            ApiError::internal_error("Internal error")
        }
    }
}
