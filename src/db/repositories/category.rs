//! Category repository
//!
//! Database operations for categories.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Category, CreateCategoryInput, UpdateCategoryInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, input: &CreateCategoryInput) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by slug, regardless of publication state
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// Get a published category by slug. Unpublished categories resolve
    /// to `None`, which category pages surface as not-found.
    async fn get_published_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// List published categories
    async fn list_published(&self) -> Result<Vec<Category>>;

    /// List all categories
    async fn list(&self) -> Result<Vec<Category>>;

    /// Update a category
    async fn update(&self, id: i64, input: &UpdateCategoryInput) -> Result<Category>;

    /// Delete a category (referencing posts keep existing, detached)
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if a slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;
}

/// SQLx-based category repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, input: &CreateCategoryInput) -> Result<Category> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_category_sqlite(self.pool.as_sqlite().unwrap(), input).await
            }
            DatabaseDriver::Mysql => {
                create_category_mysql(self.pool.as_mysql().unwrap(), input).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_category_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_category_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_category_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug, false).await
            }
            DatabaseDriver::Mysql => {
                get_category_by_slug_mysql(self.pool.as_mysql().unwrap(), slug, false).await
            }
        }
    }

    async fn get_published_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_category_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug, true).await
            }
            DatabaseDriver::Mysql => {
                get_category_by_slug_mysql(self.pool.as_mysql().unwrap(), slug, true).await
            }
        }
    }

    async fn list_published(&self) -> Result<Vec<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_categories_sqlite(self.pool.as_sqlite().unwrap(), true).await
            }
            DatabaseDriver::Mysql => {
                list_categories_mysql(self.pool.as_mysql().unwrap(), true).await
            }
        }
    }

    async fn list(&self) -> Result<Vec<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_categories_sqlite(self.pool.as_sqlite().unwrap(), false).await
            }
            DatabaseDriver::Mysql => {
                list_categories_mysql(self.pool.as_mysql().unwrap(), false).await
            }
        }
    }

    async fn update(&self, id: i64, input: &UpdateCategoryInput) -> Result<Category> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_category_sqlite(self.pool.as_sqlite().unwrap(), id, input).await
            }
            DatabaseDriver::Mysql => {
                update_category_mysql(self.pool.as_mysql().unwrap(), id, input).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_category_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => delete_category_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        Ok(self.get_by_slug(slug).await?.is_some())
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_category_sqlite(pool: &SqlitePool, input: &CreateCategoryInput) -> Result<Category> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO categories (title, description, slug, is_published, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.slug)
    .bind(input.is_published)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create category")?;

    Ok(Category {
        id: result.last_insert_rowid(),
        title: input.title.clone(),
        description: input.description.clone(),
        slug: input.slug.clone(),
        is_published: input.is_published,
        created_at: now,
    })
}

async fn get_category_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_category_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn get_category_by_slug_sqlite(
    pool: &SqlitePool,
    slug: &str,
    published_only: bool,
) -> Result<Option<Category>> {
    let sql = if published_only {
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE slug = ? AND is_published = 1
        "#
    } else {
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE slug = ?
        "#
    };

    let row = sqlx::query(sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by slug")?;

    match row {
        Some(row) => Ok(Some(row_to_category_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn list_categories_sqlite(pool: &SqlitePool, published_only: bool) -> Result<Vec<Category>> {
    let sql = if published_only {
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE is_published = 1
        ORDER BY title
        "#
    } else {
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        ORDER BY title
        "#
    };

    let rows = sqlx::query(sql)
        .fetch_all(pool)
        .await
        .context("Failed to list categories")?;

    rows.iter().map(row_to_category_sqlite).collect()
}

async fn update_category_sqlite(
    pool: &SqlitePool,
    id: i64,
    input: &UpdateCategoryInput,
) -> Result<Category> {
    let existing = get_category_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Category not found for update: {}", id))?;

    let merged = merge_category(existing, input);

    sqlx::query(
        r#"
        UPDATE categories
        SET title = ?, description = ?, slug = ?, is_published = ?
        WHERE id = ?
        "#,
    )
    .bind(&merged.title)
    .bind(&merged.description)
    .bind(&merged.slug)
    .bind(merged.is_published)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update category")?;

    Ok(merged)
}

async fn delete_category_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete category")?;

    Ok(())
}

fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Category> {
    Ok(Category {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        slug: row.get("slug"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_category_mysql(pool: &MySqlPool, input: &CreateCategoryInput) -> Result<Category> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO categories (title, description, slug, is_published, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.slug)
    .bind(input.is_published)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create category")?;

    Ok(Category {
        id: result.last_insert_id() as i64,
        title: input.title.clone(),
        description: input.description.clone(),
        slug: input.slug.clone(),
        is_published: input.is_published,
        created_at: now,
    })
}

async fn get_category_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_category_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn get_category_by_slug_mysql(
    pool: &MySqlPool,
    slug: &str,
    published_only: bool,
) -> Result<Option<Category>> {
    let sql = if published_only {
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE slug = ? AND is_published = 1
        "#
    } else {
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE slug = ?
        "#
    };

    let row = sqlx::query(sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by slug")?;

    match row {
        Some(row) => Ok(Some(row_to_category_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn list_categories_mysql(pool: &MySqlPool, published_only: bool) -> Result<Vec<Category>> {
    let sql = if published_only {
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE is_published = 1
        ORDER BY title
        "#
    } else {
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        ORDER BY title
        "#
    };

    let rows = sqlx::query(sql)
        .fetch_all(pool)
        .await
        .context("Failed to list categories")?;

    rows.iter().map(row_to_category_mysql).collect()
}

async fn update_category_mysql(
    pool: &MySqlPool,
    id: i64,
    input: &UpdateCategoryInput,
) -> Result<Category> {
    let existing = get_category_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Category not found for update: {}", id))?;

    let merged = merge_category(existing, input);

    sqlx::query(
        r#"
        UPDATE categories
        SET title = ?, description = ?, slug = ?, is_published = ?
        WHERE id = ?
        "#,
    )
    .bind(&merged.title)
    .bind(&merged.description)
    .bind(&merged.slug)
    .bind(merged.is_published)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update category")?;

    Ok(merged)
}

async fn delete_category_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete category")?;

    Ok(())
}

fn row_to_category_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Category> {
    Ok(Category {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        slug: row.get("slug"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    })
}

// ============================================================================
// Shared helpers
// ============================================================================

fn merge_category(existing: Category, input: &UpdateCategoryInput) -> Category {
    Category {
        id: existing.id,
        title: input.title.clone().unwrap_or(existing.title),
        description: input.description.clone().unwrap_or(existing.description),
        slug: input.slug.clone().unwrap_or(existing.slug),
        is_published: input.is_published.unwrap_or(existing.is_published),
        created_at: existing.created_at,
    }
}
