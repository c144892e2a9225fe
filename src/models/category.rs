//! Category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity
///
/// Categories have a lifecycle independent of posts: unpublishing a
/// category hides all of its posts from public filtering without deleting
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// URL-friendly identifier (unique)
    pub slug: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a category
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryInput {
    pub title: String,
    pub description: String,
    pub slug: String,
    #[serde(default = "default_is_published")]
    pub is_published: bool,
}

fn default_is_published() -> bool {
    true
}

/// Input for updating a category
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub is_published: Option<bool>,
}

impl UpdateCategoryInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.slug.is_some()
            || self.is_published.is_some()
    }
}
