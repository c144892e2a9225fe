//! Location API endpoints
//!
//! - GET    /api/v1/locations      - List locations
//! - POST   /api/v1/locations      - Create (authenticated)
//! - PUT    /api/v1/locations/{id} - Update (authenticated)
//! - DELETE /api/v1/locations/{id} - Delete (authenticated; posts keep existing with a null location)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::LocationResponse;
use crate::models::{CreateLocationInput, UpdateLocationInput};
use crate::services::LocationServiceError;

/// GET /api/v1/locations - List locations
pub async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<LocationResponse>>, ApiError> {
    let locations = state
        .location_service
        .list()
        .await
        .map_err(map_location_error)?;

    Ok(Json(
        locations.into_iter().map(LocationResponse::from).collect(),
    ))
}

/// POST /api/v1/locations - Create a location
pub async fn create_location(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(input): Json<CreateLocationInput>,
) -> Result<(StatusCode, Json<LocationResponse>), ApiError> {
    let location = state
        .location_service
        .create(input)
        .await
        .map_err(map_location_error)?;

    Ok((StatusCode::CREATED, Json(LocationResponse::from(location))))
}

/// PUT /api/v1/locations/{id} - Update a location
pub async fn update_location(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(input): Json<UpdateLocationInput>,
) -> Result<Json<LocationResponse>, ApiError> {
    let location = state
        .location_service
        .update(id, input)
        .await
        .map_err(map_location_error)?;

    Ok(Json(LocationResponse::from(location)))
}

/// DELETE /api/v1/locations/{id} - Delete a location
pub async fn delete_location(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .location_service
        .delete(id)
        .await
        .map_err(map_location_error)?;

    Ok(StatusCode::NO_CONTENT)
}

fn map_location_error(e: LocationServiceError) -> ApiError {
    match e {
        LocationServiceError::NotFound => ApiError::not_found("Location not found"),
        LocationServiceError::ValidationError(message) => ApiError::validation_error(message),
        LocationServiceError::InternalError(e) => {
            tracing::error!("Location operation failed: {:#}", e);
            ApiError::internal_error("Internal error")
        }
    }
}
