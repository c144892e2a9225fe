//! Post repository
//!
//! Database operations for posts. This module owns the two query shapes
//! the rest of the system depends on:
//!
//! - the public-visibility predicate (`VISIBLE_PREDICATE`), used by every
//!   listing query and by the filtered single-post lookup, so the rule
//!   cannot drift between entry points;
//! - the aggregated row shape (`PostWithMeta`): related author, category
//!   and location data plus an exact comment count, ordered by
//!   publication time descending.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{
    AuthorBrief, CategoryBrief, CreatePostInput, LocationBrief, Post, PostWithMeta,
    UpdatePostInput,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// The public-visibility predicate.
///
/// A post is publicly visible when it is published, its publication time
/// is not in the future, and its category exists and is itself published.
/// The one bound parameter is the current time.
pub(crate) const VISIBLE_PREDICATE: &str =
    "posts.is_published = 1 AND posts.pub_date <= ? AND categories.is_published = 1";

/// Column list producing a `PostWithMeta` row. The comment count is an
/// exact per-post subquery so it stays correct in every listing.
const POST_META_COLUMNS: &str = "\
    posts.id, posts.title, posts.text, posts.pub_date, posts.is_published, posts.image, \
    posts.author_id, posts.location_id, posts.category_id, posts.created_at, \
    users.username AS author_username, \
    categories.title AS category_title, categories.slug AS category_slug, \
    locations.name AS location_name, \
    (SELECT COUNT(*) FROM comments WHERE comments.post_id = posts.id) AS comment_count";

/// Joins for publicly filtered queries. The category join is inner: a
/// post without a category cannot satisfy the predicate.
const VISIBLE_JOINS: &str = "\
    INNER JOIN users ON users.id = posts.author_id \
    INNER JOIN categories ON categories.id = posts.category_id \
    LEFT JOIN locations ON locations.id = posts.location_id";

/// Joins for the author's own unfiltered view; category-less and
/// unpublished posts are still included.
const OWNER_JOINS: &str = "\
    INNER JOIN users ON users.id = posts.author_id \
    LEFT JOIN categories ON categories.id = posts.category_id \
    LEFT JOIN locations ON locations.id = posts.location_id";

/// Canonical listing order: most recently published first.
const LISTING_ORDER: &str = "ORDER BY posts.pub_date DESC, posts.id DESC";

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post owned by the given author
    async fn create(&self, author_id: i64, input: &CreatePostInput) -> Result<Post>;

    /// Get post by ID, regardless of visibility
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Get an aggregated post row by ID, regardless of visibility
    async fn get_with_meta(&self, id: i64) -> Result<Option<PostWithMeta>>;

    /// Get an aggregated post row by ID if it satisfies the visibility
    /// predicate at `now`
    async fn get_visible_with_meta(&self, id: i64, now: DateTime<Utc>)
        -> Result<Option<PostWithMeta>>;

    /// Update a post
    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Post>;

    /// Delete a post (its comments cascade)
    async fn delete(&self, id: i64) -> Result<()>;

    /// List publicly visible posts
    async fn list_visible(&self, now: DateTime<Utc>, offset: i64, limit: i64)
        -> Result<Vec<PostWithMeta>>;

    /// Count publicly visible posts
    async fn count_visible(&self, now: DateTime<Utc>) -> Result<i64>;

    /// List publicly visible posts in a category
    async fn list_visible_by_category(
        &self,
        category_id: i64,
        now: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PostWithMeta>>;

    /// Count publicly visible posts in a category
    async fn count_visible_by_category(&self, category_id: i64, now: DateTime<Utc>)
        -> Result<i64>;

    /// List publicly visible posts by an author
    async fn list_visible_by_author(
        &self,
        author_id: i64,
        now: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PostWithMeta>>;

    /// Count publicly visible posts by an author
    async fn count_visible_by_author(&self, author_id: i64, now: DateTime<Utc>) -> Result<i64>;

    /// List all posts by an author, unfiltered (the author's own view)
    async fn list_by_author(&self, author_id: i64, offset: i64, limit: i64)
        -> Result<Vec<PostWithMeta>>;

    /// Count all posts by an author
    async fn count_by_author(&self, author_id: i64) -> Result<i64>;
}

/// SQLx-based post repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, author_id: i64, input: &CreatePostInput) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_post_sqlite(self.pool.as_sqlite().unwrap(), author_id, input).await
            }
            DatabaseDriver::Mysql => {
                create_post_mysql(self.pool.as_mysql().unwrap(), author_id, input).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_post_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_post_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_with_meta(&self, id: i64) -> Result<Option<PostWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_with_meta_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => get_with_meta_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_visible_with_meta(
        &self,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<PostWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_visible_with_meta_sqlite(self.pool.as_sqlite().unwrap(), id, now).await
            }
            DatabaseDriver::Mysql => {
                get_visible_with_meta_mysql(self.pool.as_mysql().unwrap(), id, now).await
            }
        }
    }

    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_post_sqlite(self.pool.as_sqlite().unwrap(), id, input).await
            }
            DatabaseDriver::Mysql => update_post_mysql(self.pool.as_mysql().unwrap(), id, input).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_post_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_post_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list_visible(
        &self,
        now: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PostWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_visible_sqlite(self.pool.as_sqlite().unwrap(), now, offset, limit).await
            }
            DatabaseDriver::Mysql => {
                list_visible_mysql(self.pool.as_mysql().unwrap(), now, offset, limit).await
            }
        }
    }

    async fn count_visible(&self, now: DateTime<Utc>) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_visible_sqlite(self.pool.as_sqlite().unwrap(), now).await
            }
            DatabaseDriver::Mysql => count_visible_mysql(self.pool.as_mysql().unwrap(), now).await,
        }
    }

    async fn list_visible_by_category(
        &self,
        category_id: i64,
        now: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PostWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_visible_by_category_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    category_id,
                    now,
                    offset,
                    limit,
                )
                .await
            }
            DatabaseDriver::Mysql => {
                list_visible_by_category_mysql(
                    self.pool.as_mysql().unwrap(),
                    category_id,
                    now,
                    offset,
                    limit,
                )
                .await
            }
        }
    }

    async fn count_visible_by_category(
        &self,
        category_id: i64,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_visible_by_category_sqlite(self.pool.as_sqlite().unwrap(), category_id, now)
                    .await
            }
            DatabaseDriver::Mysql => {
                count_visible_by_category_mysql(self.pool.as_mysql().unwrap(), category_id, now)
                    .await
            }
        }
    }

    async fn list_visible_by_author(
        &self,
        author_id: i64,
        now: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PostWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_visible_by_author_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    author_id,
                    now,
                    offset,
                    limit,
                )
                .await
            }
            DatabaseDriver::Mysql => {
                list_visible_by_author_mysql(
                    self.pool.as_mysql().unwrap(),
                    author_id,
                    now,
                    offset,
                    limit,
                )
                .await
            }
        }
    }

    async fn count_visible_by_author(&self, author_id: i64, now: DateTime<Utc>) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_visible_by_author_sqlite(self.pool.as_sqlite().unwrap(), author_id, now).await
            }
            DatabaseDriver::Mysql => {
                count_visible_by_author_mysql(self.pool.as_mysql().unwrap(), author_id, now).await
            }
        }
    }

    async fn list_by_author(
        &self,
        author_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PostWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_by_author_sqlite(self.pool.as_sqlite().unwrap(), author_id, offset, limit)
                    .await
            }
            DatabaseDriver::Mysql => {
                list_by_author_mysql(self.pool.as_mysql().unwrap(), author_id, offset, limit).await
            }
        }
    }

    async fn count_by_author(&self, author_id: i64) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_by_author_sqlite(self.pool.as_sqlite().unwrap(), author_id).await
            }
            DatabaseDriver::Mysql => {
                count_by_author_mysql(self.pool.as_mysql().unwrap(), author_id).await
            }
        }
    }
}

// ============================================================================
// Shared SQL builders (identical text for both drivers; `?` placeholders)
// ============================================================================

fn select_visible(extra_predicate: &str) -> String {
    format!(
        "SELECT {} FROM posts {} WHERE {}{} {} LIMIT ? OFFSET ?",
        POST_META_COLUMNS, VISIBLE_JOINS, VISIBLE_PREDICATE, extra_predicate, LISTING_ORDER
    )
}

fn count_visible_sql(extra_predicate: &str) -> String {
    format!(
        "SELECT COUNT(*) AS count FROM posts {} WHERE {}{}",
        VISIBLE_JOINS, VISIBLE_PREDICATE, extra_predicate
    )
}

fn select_owner(predicate: &str) -> String {
    format!(
        "SELECT {} FROM posts {} WHERE {} {} LIMIT ? OFFSET ?",
        POST_META_COLUMNS, OWNER_JOINS, predicate, LISTING_ORDER
    )
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(
    pool: &SqlitePool,
    author_id: i64,
    input: &CreatePostInput,
) -> Result<Post> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO posts (title, text, pub_date, is_published, image, author_id, location_id, category_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.text)
    .bind(input.pub_date)
    .bind(input.is_published)
    .bind(&input.image)
    .bind(author_id)
    .bind(input.location_id)
    .bind(input.category_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    let id = result.last_insert_rowid();

    Ok(Post {
        id,
        title: input.title.clone(),
        text: input.text.clone(),
        pub_date: input.pub_date,
        is_published: input.is_published,
        image: input.image.clone(),
        author_id,
        location_id: input.location_id,
        category_id: input.category_id,
        created_at: now,
    })
}

async fn get_post_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, text, pub_date, is_published, image, author_id, location_id, category_id, created_at
        FROM posts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get post by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_post_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn get_with_meta_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<PostWithMeta>> {
    let sql = format!(
        "SELECT {} FROM posts {} WHERE posts.id = ?",
        POST_META_COLUMNS, OWNER_JOINS
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post with meta")?;

    match row {
        Some(row) => Ok(Some(row_to_post_meta_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn get_visible_with_meta_sqlite(
    pool: &SqlitePool,
    id: i64,
    now: DateTime<Utc>,
) -> Result<Option<PostWithMeta>> {
    let sql = format!(
        "SELECT {} FROM posts {} WHERE {} AND posts.id = ?",
        POST_META_COLUMNS, VISIBLE_JOINS, VISIBLE_PREDICATE
    );
    let row = sqlx::query(&sql)
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get visible post")?;

    match row {
        Some(row) => Ok(Some(row_to_post_meta_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn update_post_sqlite(pool: &SqlitePool, id: i64, input: &UpdatePostInput) -> Result<Post> {
    let existing = get_post_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found for update: {}", id))?;

    let merged = merge_post(existing, input);

    sqlx::query(
        r#"
        UPDATE posts
        SET title = ?, text = ?, pub_date = ?, is_published = ?, image = ?, location_id = ?, category_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&merged.title)
    .bind(&merged.text)
    .bind(merged.pub_date)
    .bind(merged.is_published)
    .bind(&merged.image)
    .bind(merged.location_id)
    .bind(merged.category_id)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    Ok(merged)
}

async fn delete_post_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(())
}

async fn list_visible_sqlite(
    pool: &SqlitePool,
    now: DateTime<Utc>,
    offset: i64,
    limit: i64,
) -> Result<Vec<PostWithMeta>> {
    let sql = select_visible("");
    let rows = sqlx::query(&sql)
        .bind(now)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list visible posts")?;

    rows.iter().map(row_to_post_meta_sqlite).collect()
}

async fn count_visible_sqlite(pool: &SqlitePool, now: DateTime<Utc>) -> Result<i64> {
    let sql = count_visible_sql("");
    let row = sqlx::query(&sql)
        .bind(now)
        .fetch_one(pool)
        .await
        .context("Failed to count visible posts")?;

    Ok(row.get("count"))
}

async fn list_visible_by_category_sqlite(
    pool: &SqlitePool,
    category_id: i64,
    now: DateTime<Utc>,
    offset: i64,
    limit: i64,
) -> Result<Vec<PostWithMeta>> {
    let sql = select_visible(" AND posts.category_id = ?");
    let rows = sqlx::query(&sql)
        .bind(now)
        .bind(category_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list visible posts by category")?;

    rows.iter().map(row_to_post_meta_sqlite).collect()
}

async fn count_visible_by_category_sqlite(
    pool: &SqlitePool,
    category_id: i64,
    now: DateTime<Utc>,
) -> Result<i64> {
    let sql = count_visible_sql(" AND posts.category_id = ?");
    let row = sqlx::query(&sql)
        .bind(now)
        .bind(category_id)
        .fetch_one(pool)
        .await
        .context("Failed to count visible posts by category")?;

    Ok(row.get("count"))
}

async fn list_visible_by_author_sqlite(
    pool: &SqlitePool,
    author_id: i64,
    now: DateTime<Utc>,
    offset: i64,
    limit: i64,
) -> Result<Vec<PostWithMeta>> {
    let sql = select_visible(" AND posts.author_id = ?");
    let rows = sqlx::query(&sql)
        .bind(now)
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list visible posts by author")?;

    rows.iter().map(row_to_post_meta_sqlite).collect()
}

async fn count_visible_by_author_sqlite(
    pool: &SqlitePool,
    author_id: i64,
    now: DateTime<Utc>,
) -> Result<i64> {
    let sql = count_visible_sql(" AND posts.author_id = ?");
    let row = sqlx::query(&sql)
        .bind(now)
        .bind(author_id)
        .fetch_one(pool)
        .await
        .context("Failed to count visible posts by author")?;

    Ok(row.get("count"))
}

async fn list_by_author_sqlite(
    pool: &SqlitePool,
    author_id: i64,
    offset: i64,
    limit: i64,
) -> Result<Vec<PostWithMeta>> {
    let sql = select_owner("posts.author_id = ?");
    let rows = sqlx::query(&sql)
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list posts by author")?;

    rows.iter().map(row_to_post_meta_sqlite).collect()
}

async fn count_by_author_sqlite(pool: &SqlitePool, author_id: i64) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM posts WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(pool)
        .await
        .context("Failed to count posts by author")?;

    Ok(row.get("count"))
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    Ok(Post {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        pub_date: row.get("pub_date"),
        is_published: row.get("is_published"),
        image: row.get("image"),
        author_id: row.get("author_id"),
        location_id: row.get("location_id"),
        category_id: row.get("category_id"),
        created_at: row.get("created_at"),
    })
}

fn row_to_post_meta_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<PostWithMeta> {
    let post = row_to_post_sqlite(row)?;

    let category = match post.category_id {
        Some(id) => {
            let title: Option<String> = row.get("category_title");
            let slug: Option<String> = row.get("category_slug");
            match (title, slug) {
                (Some(title), Some(slug)) => Some(CategoryBrief { id, title, slug }),
                _ => None,
            }
        }
        None => None,
    };

    let location = match post.location_id {
        Some(id) => {
            let name: Option<String> = row.get("location_name");
            name.map(|name| LocationBrief { id, name })
        }
        None => None,
    };

    Ok(PostWithMeta {
        author: AuthorBrief {
            id: post.author_id,
            username: row.get("author_username"),
        },
        category,
        location,
        comment_count: row.get("comment_count"),
        post,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_post_mysql(
    pool: &MySqlPool,
    author_id: i64,
    input: &CreatePostInput,
) -> Result<Post> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO posts (title, text, pub_date, is_published, image, author_id, location_id, category_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.text)
    .bind(input.pub_date)
    .bind(input.is_published)
    .bind(&input.image)
    .bind(author_id)
    .bind(input.location_id)
    .bind(input.category_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    let id = result.last_insert_id() as i64;

    Ok(Post {
        id,
        title: input.title.clone(),
        text: input.text.clone(),
        pub_date: input.pub_date,
        is_published: input.is_published,
        image: input.image.clone(),
        author_id,
        location_id: input.location_id,
        category_id: input.category_id,
        created_at: now,
    })
}

async fn get_post_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, text, pub_date, is_published, image, author_id, location_id, category_id, created_at
        FROM posts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get post by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_post_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn get_with_meta_mysql(pool: &MySqlPool, id: i64) -> Result<Option<PostWithMeta>> {
    let sql = format!(
        "SELECT {} FROM posts {} WHERE posts.id = ?",
        POST_META_COLUMNS, OWNER_JOINS
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post with meta")?;

    match row {
        Some(row) => Ok(Some(row_to_post_meta_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn get_visible_with_meta_mysql(
    pool: &MySqlPool,
    id: i64,
    now: DateTime<Utc>,
) -> Result<Option<PostWithMeta>> {
    let sql = format!(
        "SELECT {} FROM posts {} WHERE {} AND posts.id = ?",
        POST_META_COLUMNS, VISIBLE_JOINS, VISIBLE_PREDICATE
    );
    let row = sqlx::query(&sql)
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get visible post")?;

    match row {
        Some(row) => Ok(Some(row_to_post_meta_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn update_post_mysql(pool: &MySqlPool, id: i64, input: &UpdatePostInput) -> Result<Post> {
    let existing = get_post_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found for update: {}", id))?;

    let merged = merge_post(existing, input);

    sqlx::query(
        r#"
        UPDATE posts
        SET title = ?, text = ?, pub_date = ?, is_published = ?, image = ?, location_id = ?, category_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&merged.title)
    .bind(&merged.text)
    .bind(merged.pub_date)
    .bind(merged.is_published)
    .bind(&merged.image)
    .bind(merged.location_id)
    .bind(merged.category_id)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    Ok(merged)
}

async fn delete_post_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(())
}

async fn list_visible_mysql(
    pool: &MySqlPool,
    now: DateTime<Utc>,
    offset: i64,
    limit: i64,
) -> Result<Vec<PostWithMeta>> {
    let sql = select_visible("");
    let rows = sqlx::query(&sql)
        .bind(now)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list visible posts")?;

    rows.iter().map(row_to_post_meta_mysql).collect()
}

async fn count_visible_mysql(pool: &MySqlPool, now: DateTime<Utc>) -> Result<i64> {
    let sql = count_visible_sql("");
    let row = sqlx::query(&sql)
        .bind(now)
        .fetch_one(pool)
        .await
        .context("Failed to count visible posts")?;

    Ok(row.get("count"))
}

async fn list_visible_by_category_mysql(
    pool: &MySqlPool,
    category_id: i64,
    now: DateTime<Utc>,
    offset: i64,
    limit: i64,
) -> Result<Vec<PostWithMeta>> {
    let sql = select_visible(" AND posts.category_id = ?");
    let rows = sqlx::query(&sql)
        .bind(now)
        .bind(category_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list visible posts by category")?;

    rows.iter().map(row_to_post_meta_mysql).collect()
}

async fn count_visible_by_category_mysql(
    pool: &MySqlPool,
    category_id: i64,
    now: DateTime<Utc>,
) -> Result<i64> {
    let sql = count_visible_sql(" AND posts.category_id = ?");
    let row = sqlx::query(&sql)
        .bind(now)
        .bind(category_id)
        .fetch_one(pool)
        .await
        .context("Failed to count visible posts by category")?;

    Ok(row.get("count"))
}

async fn list_visible_by_author_mysql(
    pool: &MySqlPool,
    author_id: i64,
    now: DateTime<Utc>,
    offset: i64,
    limit: i64,
) -> Result<Vec<PostWithMeta>> {
    let sql = select_visible(" AND posts.author_id = ?");
    let rows = sqlx::query(&sql)
        .bind(now)
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list visible posts by author")?;

    rows.iter().map(row_to_post_meta_mysql).collect()
}

async fn count_visible_by_author_mysql(
    pool: &MySqlPool,
    author_id: i64,
    now: DateTime<Utc>,
) -> Result<i64> {
    let sql = count_visible_sql(" AND posts.author_id = ?");
    let row = sqlx::query(&sql)
        .bind(now)
        .bind(author_id)
        .fetch_one(pool)
        .await
        .context("Failed to count visible posts by author")?;

    Ok(row.get("count"))
}

async fn list_by_author_mysql(
    pool: &MySqlPool,
    author_id: i64,
    offset: i64,
    limit: i64,
) -> Result<Vec<PostWithMeta>> {
    let sql = select_owner("posts.author_id = ?");
    let rows = sqlx::query(&sql)
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list posts by author")?;

    rows.iter().map(row_to_post_meta_mysql).collect()
}

async fn count_by_author_mysql(pool: &MySqlPool, author_id: i64) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM posts WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(pool)
        .await
        .context("Failed to count posts by author")?;

    Ok(row.get("count"))
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Post> {
    Ok(Post {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        pub_date: row.get("pub_date"),
        is_published: row.get("is_published"),
        image: row.get("image"),
        author_id: row.get("author_id"),
        location_id: row.get("location_id"),
        category_id: row.get("category_id"),
        created_at: row.get("created_at"),
    })
}

fn row_to_post_meta_mysql(row: &sqlx::mysql::MySqlRow) -> Result<PostWithMeta> {
    let post = row_to_post_mysql(row)?;

    let category = match post.category_id {
        Some(id) => {
            let title: Option<String> = row.get("category_title");
            let slug: Option<String> = row.get("category_slug");
            match (title, slug) {
                (Some(title), Some(slug)) => Some(CategoryBrief { id, title, slug }),
                _ => None,
            }
        }
        None => None,
    };

    let location = match post.location_id {
        Some(id) => {
            let name: Option<String> = row.get("location_name");
            name.map(|name| LocationBrief { id, name })
        }
        None => None,
    };

    Ok(PostWithMeta {
        author: AuthorBrief {
            id: post.author_id,
            username: row.get("author_username"),
        },
        category,
        location,
        comment_count: row.get("comment_count"),
        post,
    })
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Merge an update input into an existing post. Nullable fields use
/// double-option semantics: absent leaves the value, explicit null clears it.
fn merge_post(existing: Post, input: &UpdatePostInput) -> Post {
    Post {
        id: existing.id,
        title: input.title.clone().unwrap_or(existing.title),
        text: input.text.clone().unwrap_or(existing.text),
        pub_date: input.pub_date.unwrap_or(existing.pub_date),
        is_published: input.is_published.unwrap_or(existing.is_published),
        image: match &input.image {
            Some(value) => value.clone(),
            None => existing.image,
        },
        author_id: existing.author_id,
        location_id: match input.location_id {
            Some(value) => value,
            None => existing.location_id,
        },
        category_id: match input.category_id {
            Some(value) => value,
            None => existing.category_id,
        },
        created_at: existing.created_at,
    }
}
