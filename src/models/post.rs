//! Post model
//!
//! This module provides:
//! - `Post` entity representing a publication
//! - Input types for creating and updating posts
//! - `PostWithMeta`, the aggregated listing row (related entities plus
//!   comment count)
//! - Pagination types for list queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// Body text
    pub text: String,
    /// Publication timestamp; a future value defers public visibility
    pub pub_date: DateTime<Utc>,
    /// Whether the post is published at all
    pub is_published: bool,
    /// Optional image path or URL
    #[serde(default)]
    pub image: Option<String>,
    /// Author user ID
    pub author_id: i64,
    /// Optional location ID
    pub location_id: Option<i64>,
    /// Optional category ID
    pub category_id: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Author data embedded in an aggregated listing row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorBrief {
    pub id: i64,
    pub username: String,
}

/// Category data embedded in an aggregated listing row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBrief {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

/// Location data embedded in an aggregated listing row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationBrief {
    pub id: i64,
    pub name: String,
}

/// A post together with the related data every view renders: author,
/// category, location, and the comment count.
///
/// All listing queries and the detail lookup produce this shape so the
/// comment count is consistent across entry points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWithMeta {
    #[serde(flatten)]
    pub post: Post,
    pub author: AuthorBrief,
    pub category: Option<CategoryBrief>,
    pub location: Option<LocationBrief>,
    pub comment_count: i64,
}

/// Input for creating a new post
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostInput {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    #[serde(default = "default_is_published")]
    pub is_published: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub category_id: Option<i64>,
}

fn default_is_published() -> bool {
    true
}

/// Input for updating an existing post
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub text: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub is_published: Option<bool>,
    /// Double-option: outer None leaves the image untouched, inner None clears it
    #[serde(default, with = "double_option")]
    pub image: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub location_id: Option<Option<i64>>,
    #[serde(default, with = "double_option")]
    pub category_id: Option<Option<i64>>,
}

impl UpdatePostInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.text.is_some()
            || self.pub_date.is_some()
            || self.is_published.is_some()
            || self.image.is_some()
            || self.location_id.is_some()
            || self.category_id.is_some()
    }
}

/// Serde helper distinguishing "absent" from "explicitly null" for
/// nullable update fields.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(de).map(Some)
    }
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        ((self.page.saturating_sub(1)) * self.per_page) as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        ((self.total as u32) + self.per_page - 1) / self.per_page
    }

    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if there is a previous page
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items in the current page
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
