//! Category API endpoints
//!
//! Handles HTTP requests for categories:
//! - GET    /api/v1/categories               - List published categories
//! - GET    /api/v1/categories/{slug}/posts  - Category page (404 when missing or unpublished)
//! - POST   /api/v1/categories               - Create (authenticated)
//! - PUT    /api/v1/categories/{id}          - Update (authenticated)
//! - DELETE /api/v1/categories/{id}          - Delete (authenticated)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::posts::map_post_error;
use crate::api::responses::{CategoryResponse, PostResponse};
use crate::models::{CreateCategoryInput, UpdateCategoryInput};
use crate::services::CategoryServiceError;

/// Category page response: the category plus its filtered posts
#[derive(Debug, Serialize)]
pub struct CategoryPostsResponse {
    pub category: CategoryResponse,
    pub posts: Vec<PostResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// GET /api/v1/categories - List published categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = state
        .category_service
        .list_published()
        .await
        .map_err(map_category_error)?;

    Ok(Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

/// GET /api/v1/categories/{slug}/posts - Posts of a published category
pub async fn list_category_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<CategoryPostsResponse>, ApiError> {
    let params = query.params(state.posts_per_page);
    let (category, result) = state
        .post_service
        .list_by_category(&slug, &params)
        .await
        .map_err(map_post_error)?;

    let total = result.total;
    let page = result.page;
    let page_size = result.per_page;
    let total_pages = result.total_pages();

    Ok(Json(CategoryPostsResponse {
        category: CategoryResponse::from(category),
        posts: result.items.into_iter().map(PostResponse::from).collect(),
        total,
        page,
        page_size,
        total_pages,
    }))
}

/// POST /api/v1/categories - Create a category
pub async fn create_category(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(input): Json<CreateCategoryInput>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let category = state
        .category_service
        .create(input)
        .await
        .map_err(map_category_error)?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

/// PUT /api/v1/categories/{id} - Update a category
pub async fn update_category(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(input): Json<UpdateCategoryInput>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = state
        .category_service
        .update(id, input)
        .await
        .map_err(map_category_error)?;

    Ok(Json(CategoryResponse::from(category)))
}

/// DELETE /api/v1/categories/{id} - Delete a category
pub async fn delete_category(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .category_service
        .delete(id)
        .await
        .map_err(map_category_error)?;

    Ok(StatusCode::NO_CONTENT)
}

fn map_category_error(e: CategoryServiceError) -> ApiError {
    match e {
        CategoryServiceError::NotFound => ApiError::not_found("Category not found"),
        CategoryServiceError::ValidationError(message) => ApiError::validation_error(message),
        CategoryServiceError::DuplicateSlug(slug) => {
            ApiError::conflict(format!("Category slug already exists: {}", slug))
        }
        CategoryServiceError::InternalError(e) => {
            tracing::error!("Category operation failed: {:#}", e);
            ApiError::internal_error("Internal error")
        }
    }
}
