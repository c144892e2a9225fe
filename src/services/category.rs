//! Category service
//!
//! Management operations for categories plus the published-only reads the
//! public surface uses. Slugs follow the usual URL identifier rule:
//! letters, digits, hyphen, underscore.

use crate::db::repositories::CategoryRepository;
use crate::models::{Category, CreateCategoryInput, UpdateCategoryInput};
use anyhow::Context;
use std::sync::Arc;

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Category not found
    #[error("Category not found")]
    NotFound,

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Duplicate slug
    #[error("Category slug already exists: {0}")]
    DuplicateSlug(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Category service
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// List published categories (the public index)
    pub async fn list_published(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self
            .repo
            .list_published()
            .await
            .context("Failed to list categories")?)
    }

    /// List all categories, published or not
    pub async fn list_all(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self.repo.list().await.context("Failed to list categories")?)
    }

    /// Create a category
    pub async fn create(
        &self,
        input: CreateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        validate_category_input(&input.title, &input.slug)?;

        if self
            .repo
            .exists_by_slug(&input.slug)
            .await
            .context("Failed to check slug")?
        {
            return Err(CategoryServiceError::DuplicateSlug(input.slug));
        }

        let category = self
            .repo
            .create(&input)
            .await
            .context("Failed to create category")?;

        tracing::info!("Created category {} ({})", category.slug, category.id);
        Ok(category)
    }

    /// Update a category
    pub async fn update(
        &self,
        id: i64,
        input: UpdateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        let existing = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or(CategoryServiceError::NotFound)?;

        if let Some(title) = &input.title {
            if title.trim().is_empty() {
                return Err(CategoryServiceError::ValidationError(
                    "Title cannot be empty".to_string(),
                ));
            }
        }

        if let Some(slug) = &input.slug {
            if !is_valid_slug(slug) {
                return Err(CategoryServiceError::ValidationError(format!(
                    "Invalid slug: {}",
                    slug
                )));
            }
            if slug != &existing.slug
                && self
                    .repo
                    .exists_by_slug(slug)
                    .await
                    .context("Failed to check slug")?
            {
                return Err(CategoryServiceError::DuplicateSlug(slug.clone()));
            }
        }

        Ok(self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update category")?)
    }

    /// Delete a category. Referencing posts stay, with their category
    /// cleared by the store.
    pub async fn delete(&self, id: i64) -> Result<(), CategoryServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or(CategoryServiceError::NotFound)?;

        self.repo
            .delete(id)
            .await
            .context("Failed to delete category")?;

        tracing::info!("Deleted category {}", id);
        Ok(())
    }
}

fn validate_category_input(title: &str, slug: &str) -> Result<(), CategoryServiceError> {
    if title.trim().is_empty() {
        return Err(CategoryServiceError::ValidationError(
            "Title cannot be empty".to_string(),
        ));
    }
    if !is_valid_slug(slug) {
        return Err(CategoryServiceError::ValidationError(format!(
            "Invalid slug: {}",
            slug
        )));
    }
    Ok(())
}

/// A slug is non-empty and contains only ASCII letters, digits, hyphens,
/// and underscores.
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 100
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxCategoryRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> CategoryService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        CategoryService::new(SqlxCategoryRepository::boxed(pool))
    }

    fn input(slug: &str, published: bool) -> CreateCategoryInput {
        CreateCategoryInput {
            title: format!("Category {}", slug),
            description: "about things".to_string(),
            slug: slug.to_string(),
            is_published: published,
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let service = setup().await;

        service.create(input("travel", true)).await.expect("create");
        service.create(input("drafts", false)).await.expect("create");

        let published = service.list_published().await.expect("list published");
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].slug, "travel");

        let all = service.list_all().await.expect("list all");
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let service = setup().await;

        service.create(input("travel", true)).await.expect("create");
        let result = service.create(input("travel", true)).await;
        assert!(matches!(
            result,
            Err(CategoryServiceError::DuplicateSlug(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_slug_rejected() {
        let service = setup().await;

        for slug in ["", "has space", "naïve", "semi;colon"] {
            let result = service.create(input(slug, true)).await;
            assert!(
                matches!(result, Err(CategoryServiceError::ValidationError(_))),
                "slug {:?} should be rejected",
                slug
            );
        }
    }

    #[tokio::test]
    async fn test_unpublish_via_update() {
        let service = setup().await;

        let category = service.create(input("travel", true)).await.expect("create");
        let updated = service
            .update(
                category.id,
                UpdateCategoryInput {
                    is_published: Some(false),
                    ..Default::default()
                },
            )
            .await
            .expect("update");
        assert!(!updated.is_published);
        assert!(service.list_published().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let service = setup().await;
        let result = service.update(42, UpdateCategoryInput::default()).await;
        assert!(matches!(result, Err(CategoryServiceError::NotFound)));
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("travel-notes_2024"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug("ünicode"));
    }
}
