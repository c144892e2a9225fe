//! Comment repository
//!
//! Database operations for comments. Besides plain lookups this module
//! provides the scoped fetch used by comment deletion: the row must match
//! comment id, post id, and author at once, so a mismatch on any of the
//! three is indistinguishable from a missing row.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentWithAuthor};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a comment on a post
    async fn create(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment>;

    /// Get comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Get a comment only if it matches post and author as well
    async fn get_scoped(&self, id: i64, post_id: i64, author_id: i64)
        -> Result<Option<Comment>>;

    /// List a post's comments with author usernames, oldest first
    async fn list_by_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>>;

    /// Update a comment's text
    async fn update_text(&self, id: i64, text: &str) -> Result<Comment>;

    /// Delete a comment
    async fn delete(&self, id: i64) -> Result<()>;

    /// Count comments on a post
    async fn count_by_post(&self, post_id: i64) -> Result<i64>;
}

/// SQLx-based comment repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    /// Create a new SQLx comment repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_comment_sqlite(self.pool.as_sqlite().unwrap(), post_id, author_id, text)
                    .await
            }
            DatabaseDriver::Mysql => {
                create_comment_mysql(self.pool.as_mysql().unwrap(), post_id, author_id, text).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_comment_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_comment_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn get_scoped(
        &self,
        id: i64,
        post_id: i64,
        author_id: i64,
    ) -> Result<Option<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_scoped_sqlite(self.pool.as_sqlite().unwrap(), id, post_id, author_id).await
            }
            DatabaseDriver::Mysql => {
                get_scoped_mysql(self.pool.as_mysql().unwrap(), id, post_id, author_id).await
            }
        }
    }

    async fn list_by_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_by_post_sqlite(self.pool.as_sqlite().unwrap(), post_id).await
            }
            DatabaseDriver::Mysql => {
                list_by_post_mysql(self.pool.as_mysql().unwrap(), post_id).await
            }
        }
    }

    async fn update_text(&self, id: i64, text: &str) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_text_sqlite(self.pool.as_sqlite().unwrap(), id, text).await
            }
            DatabaseDriver::Mysql => update_text_mysql(self.pool.as_mysql().unwrap(), id, text).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_comment_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_comment_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn count_by_post(&self, post_id: i64) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_by_post_sqlite(self.pool.as_sqlite().unwrap(), post_id).await
            }
            DatabaseDriver::Mysql => {
                count_by_post_mysql(self.pool.as_mysql().unwrap(), post_id).await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_comment_sqlite(
    pool: &SqlitePool,
    post_id: i64,
    author_id: i64,
    text: &str,
) -> Result<Comment> {
    let now = Utc::now();

    let result = sqlx::query(
        "INSERT INTO comments (post_id, author_id, text, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(post_id)
    .bind(author_id)
    .bind(text)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_rowid(),
        post_id,
        author_id,
        text: text.to_string(),
        created_at: now,
    })
}

async fn get_comment_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query(
        "SELECT id, post_id, author_id, text, created_at FROM comments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get comment by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_comment_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn get_scoped_sqlite(
    pool: &SqlitePool,
    id: i64,
    post_id: i64,
    author_id: i64,
) -> Result<Option<Comment>> {
    let row = sqlx::query(
        r#"
        SELECT id, post_id, author_id, text, created_at
        FROM comments
        WHERE id = ? AND post_id = ? AND author_id = ?
        "#,
    )
    .bind(id)
    .bind(post_id)
    .bind(author_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get scoped comment")?;

    match row {
        Some(row) => Ok(Some(row_to_comment_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn list_by_post_sqlite(pool: &SqlitePool, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(
        r#"
        SELECT comments.id, comments.post_id, comments.author_id, comments.text, comments.created_at,
               users.username AS author_username
        FROM comments
        INNER JOIN users ON users.id = comments.author_id
        WHERE comments.post_id = ?
        ORDER BY comments.created_at ASC, comments.id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .context("Failed to list comments")?;

    rows.iter().map(row_to_comment_with_author_sqlite).collect()
}

async fn update_text_sqlite(pool: &SqlitePool, id: i64, text: &str) -> Result<Comment> {
    sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
        .bind(text)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update comment")?;

    get_comment_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Comment not found after update"))
}

async fn delete_comment_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(())
}

async fn count_by_post_sqlite(pool: &SqlitePool, post_id: i64) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM comments WHERE post_id = ?")
        .bind(post_id)
        .fetch_one(pool)
        .await
        .context("Failed to count comments")?;

    Ok(row.get("count"))
}

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Comment> {
    Ok(Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        text: row.get("text"),
        created_at: row.get("created_at"),
    })
}

fn row_to_comment_with_author_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<CommentWithAuthor> {
    Ok(CommentWithAuthor {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        author_username: row.get("author_username"),
        text: row.get("text"),
        created_at: row.get("created_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_comment_mysql(
    pool: &MySqlPool,
    post_id: i64,
    author_id: i64,
    text: &str,
) -> Result<Comment> {
    let now = Utc::now();

    let result = sqlx::query(
        "INSERT INTO comments (post_id, author_id, text, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(post_id)
    .bind(author_id)
    .bind(text)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_id() as i64,
        post_id,
        author_id,
        text: text.to_string(),
        created_at: now,
    })
}

async fn get_comment_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query(
        "SELECT id, post_id, author_id, text, created_at FROM comments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get comment by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_comment_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn get_scoped_mysql(
    pool: &MySqlPool,
    id: i64,
    post_id: i64,
    author_id: i64,
) -> Result<Option<Comment>> {
    let row = sqlx::query(
        r#"
        SELECT id, post_id, author_id, text, created_at
        FROM comments
        WHERE id = ? AND post_id = ? AND author_id = ?
        "#,
    )
    .bind(id)
    .bind(post_id)
    .bind(author_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get scoped comment")?;

    match row {
        Some(row) => Ok(Some(row_to_comment_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn list_by_post_mysql(pool: &MySqlPool, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(
        r#"
        SELECT comments.id, comments.post_id, comments.author_id, comments.text, comments.created_at,
               users.username AS author_username
        FROM comments
        INNER JOIN users ON users.id = comments.author_id
        WHERE comments.post_id = ?
        ORDER BY comments.created_at ASC, comments.id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .context("Failed to list comments")?;

    rows.iter().map(row_to_comment_with_author_mysql).collect()
}

async fn update_text_mysql(pool: &MySqlPool, id: i64, text: &str) -> Result<Comment> {
    sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
        .bind(text)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update comment")?;

    get_comment_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Comment not found after update"))
}

async fn delete_comment_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(())
}

async fn count_by_post_mysql(pool: &MySqlPool, post_id: i64) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM comments WHERE post_id = ?")
        .bind(post_id)
        .fetch_one(pool)
        .await
        .context("Failed to count comments")?;

    Ok(row.get("count"))
}

fn row_to_comment_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Comment> {
    Ok(Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        text: row.get("text"),
        created_at: row.get("created_at"),
    })
}

fn row_to_comment_with_author_mysql(row: &sqlx::mysql::MySqlRow) -> Result<CommentWithAuthor> {
    Ok(CommentWithAuthor {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        author_username: row.get("author_username"),
        text: row.get("text"),
        created_at: row.get("created_at"),
    })
}
