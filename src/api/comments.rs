//! Comment API endpoints
//!
//! Handles HTTP requests for comments:
//! - GET    /api/v1/posts/{id}/comments                - List (post must be visible)
//! - POST   /api/v1/posts/{id}/comments                - Create (post must be published)
//! - PUT    /api/v1/posts/{post_id}/comments/{id}      - Update (author only, redirect-guarded)
//! - DELETE /api/v1/posts/{post_id}/comments/{id}      - Delete (scoped lookup, 404 on mismatch)
//!
//! Note the asymmetry, kept as observed behavior: editing someone else's
//! comment redirects, deleting it is a plain not-found.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser, MaybeUser};
use crate::api::posts::{map_comment_error, post_detail_path};
use crate::api::responses::CommentResponse;
use crate::models::{Comment, CreateCommentInput};
use crate::services::CommentServiceError;

/// GET /api/v1/posts/{id}/comments - List a post's comments, oldest first
pub async fn list_comments(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let comments = state
        .comment_service
        .list_for_post(post_id, user.viewer())
        .await
        .map_err(map_comment_error)?;

    Ok(Json(
        comments.into_iter().map(CommentResponse::from).collect(),
    ))
}

/// POST /api/v1/posts/{id}/comments - Comment on a published post
pub async fn create_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(post_id): Path<i64>,
    Json(input): Json<CreateCommentInput>,
) -> Result<(StatusCode, Json<CreatedComment>), ApiError> {
    let comment = state
        .comment_service
        .create(post_id, user.0.id, input)
        .await
        .map_err(map_comment_error)?;

    Ok((StatusCode::CREATED, Json(CreatedComment::from(comment))))
}

/// PUT /api/v1/posts/{post_id}/comments/{id} - Edit a comment
pub async fn update_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Json(input): Json<CreateCommentInput>,
) -> Result<Response, ApiError> {
    match state
        .comment_service
        .update(post_id, comment_id, user.viewer(), input)
        .await
    {
        Ok(comment) => Ok(Json(CreatedComment::from(comment)).into_response()),
        Err(CommentServiceError::NotOwner { post_id }) => {
            Ok(Redirect::to(&post_detail_path(post_id)).into_response())
        }
        Err(e) => Err(map_comment_error(e)),
    }
}

/// DELETE /api/v1/posts/{post_id}/comments/{id} - Delete a comment
///
/// The lookup is scoped by comment, post, and author, so any mismatch
/// yields not-found rather than a redirect.
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    state
        .comment_service
        .delete(post_id, comment_id, user.viewer())
        .await
        .map_err(map_comment_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// A freshly created or edited comment (no join data needed; the author
/// is the current viewer)
#[derive(Debug, serde::Serialize)]
pub struct CreatedComment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created_at: String,
}

impl From<Comment> for CreatedComment {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}
