//! Location repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateLocationInput, Location, UpdateLocationInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Location repository trait
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Create a new location
    async fn create(&self, input: &CreateLocationInput) -> Result<Location>;

    /// Get location by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Location>>;

    /// List all locations
    async fn list(&self) -> Result<Vec<Location>>;

    /// Update a location
    async fn update(&self, id: i64, input: &UpdateLocationInput) -> Result<Location>;

    /// Delete a location (referencing posts get a null location)
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based location repository implementation
pub struct SqlxLocationRepository {
    pool: DynDatabasePool,
}

impl SqlxLocationRepository {
    /// Create a new SQLx location repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn LocationRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl LocationRepository for SqlxLocationRepository {
    async fn create(&self, input: &CreateLocationInput) -> Result<Location> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_location_sqlite(self.pool.as_sqlite().unwrap(), input).await
            }
            DatabaseDriver::Mysql => {
                create_location_mysql(self.pool.as_mysql().unwrap(), input).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Location>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_location_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_location_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn list(&self) -> Result<Vec<Location>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_locations_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_locations_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn update(&self, id: i64, input: &UpdateLocationInput) -> Result<Location> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_location_sqlite(self.pool.as_sqlite().unwrap(), id, input).await
            }
            DatabaseDriver::Mysql => {
                update_location_mysql(self.pool.as_mysql().unwrap(), id, input).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_location_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => delete_location_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_location_sqlite(pool: &SqlitePool, input: &CreateLocationInput) -> Result<Location> {
    let now = Utc::now();

    let result = sqlx::query(
        "INSERT INTO locations (name, is_published, created_at) VALUES (?, ?, ?)",
    )
    .bind(&input.name)
    .bind(input.is_published)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create location")?;

    Ok(Location {
        id: result.last_insert_rowid(),
        name: input.name.clone(),
        is_published: input.is_published,
        created_at: now,
    })
}

async fn get_location_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Location>> {
    let row = sqlx::query("SELECT id, name, is_published, created_at FROM locations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get location by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_location_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn list_locations_sqlite(pool: &SqlitePool) -> Result<Vec<Location>> {
    let rows = sqlx::query("SELECT id, name, is_published, created_at FROM locations ORDER BY name")
        .fetch_all(pool)
        .await
        .context("Failed to list locations")?;

    rows.iter().map(row_to_location_sqlite).collect()
}

async fn update_location_sqlite(
    pool: &SqlitePool,
    id: i64,
    input: &UpdateLocationInput,
) -> Result<Location> {
    let existing = get_location_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Location not found for update: {}", id))?;

    let merged = merge_location(existing, input);

    sqlx::query("UPDATE locations SET name = ?, is_published = ? WHERE id = ?")
        .bind(&merged.name)
        .bind(merged.is_published)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update location")?;

    Ok(merged)
}

async fn delete_location_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM locations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete location")?;

    Ok(())
}

fn row_to_location_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Location> {
    Ok(Location {
        id: row.get("id"),
        name: row.get("name"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_location_mysql(pool: &MySqlPool, input: &CreateLocationInput) -> Result<Location> {
    let now = Utc::now();

    let result = sqlx::query(
        "INSERT INTO locations (name, is_published, created_at) VALUES (?, ?, ?)",
    )
    .bind(&input.name)
    .bind(input.is_published)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create location")?;

    Ok(Location {
        id: result.last_insert_id() as i64,
        name: input.name.clone(),
        is_published: input.is_published,
        created_at: now,
    })
}

async fn get_location_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Location>> {
    let row = sqlx::query("SELECT id, name, is_published, created_at FROM locations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get location by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_location_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn list_locations_mysql(pool: &MySqlPool) -> Result<Vec<Location>> {
    let rows = sqlx::query("SELECT id, name, is_published, created_at FROM locations ORDER BY name")
        .fetch_all(pool)
        .await
        .context("Failed to list locations")?;

    rows.iter().map(row_to_location_mysql).collect()
}

async fn update_location_mysql(
    pool: &MySqlPool,
    id: i64,
    input: &UpdateLocationInput,
) -> Result<Location> {
    let existing = get_location_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Location not found for update: {}", id))?;

    let merged = merge_location(existing, input);

    sqlx::query("UPDATE locations SET name = ?, is_published = ? WHERE id = ?")
        .bind(&merged.name)
        .bind(merged.is_published)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update location")?;

    Ok(merged)
}

async fn delete_location_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM locations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete location")?;

    Ok(())
}

fn row_to_location_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Location> {
    Ok(Location {
        id: row.get("id"),
        name: row.get("name"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    })
}

// ============================================================================
// Shared helpers
// ============================================================================

fn merge_location(existing: Location, input: &UpdateLocationInput) -> Location {
    Location {
        id: existing.id,
        name: input.name.clone().unwrap_or(existing.name),
        is_published: input.is_published.unwrap_or(existing.is_published),
        created_at: existing.created_at,
    }
}
