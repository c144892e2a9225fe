//! Location service

use crate::db::repositories::LocationRepository;
use crate::models::{CreateLocationInput, Location, UpdateLocationInput};
use anyhow::Context;
use std::sync::Arc;

/// Error types for location service operations
#[derive(Debug, thiserror::Error)]
pub enum LocationServiceError {
    /// Location not found
    #[error("Location not found")]
    NotFound,

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Location service
pub struct LocationService {
    repo: Arc<dyn LocationRepository>,
}

impl LocationService {
    /// Create a new location service
    pub fn new(repo: Arc<dyn LocationRepository>) -> Self {
        Self { repo }
    }

    /// List all locations
    pub async fn list(&self) -> Result<Vec<Location>, LocationServiceError> {
        Ok(self.repo.list().await.context("Failed to list locations")?)
    }

    /// Create a location
    pub async fn create(
        &self,
        input: CreateLocationInput,
    ) -> Result<Location, LocationServiceError> {
        if input.name.trim().is_empty() {
            return Err(LocationServiceError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }

        Ok(self
            .repo
            .create(&input)
            .await
            .context("Failed to create location")?)
    }

    /// Update a location
    pub async fn update(
        &self,
        id: i64,
        input: UpdateLocationInput,
    ) -> Result<Location, LocationServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get location")?
            .ok_or(LocationServiceError::NotFound)?;

        if let Some(name) = &input.name {
            if name.trim().is_empty() {
                return Err(LocationServiceError::ValidationError(
                    "Name cannot be empty".to_string(),
                ));
            }
        }

        Ok(self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update location")?)
    }

    /// Delete a location. Referencing posts get their location cleared by
    /// the store.
    pub async fn delete(&self, id: i64) -> Result<(), LocationServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get location")?
            .ok_or(LocationServiceError::NotFound)?;

        self.repo
            .delete(id)
            .await
            .context("Failed to delete location")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxLocationRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> LocationService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        LocationService::new(SqlxLocationRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let service = setup().await;

        service
            .create(CreateLocationInput {
                name: "Reykjavík".to_string(),
                is_published: true,
            })
            .await
            .expect("create");

        let locations = service.list().await.expect("list");
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].name, "Reykjavík");
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let service = setup().await;

        let result = service
            .create(CreateLocationInput {
                name: "  ".to_string(),
                is_published: true,
            })
            .await;
        assert!(matches!(
            result,
            Err(LocationServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let service = setup().await;
        let result = service.delete(7).await;
        assert!(matches!(result, Err(LocationServiceError::NotFound)));
    }
}
