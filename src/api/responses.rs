//! Shared API response types
//!
//! Common response structures used across endpoints so listings and the
//! detail view render posts identically.

use serde::Serialize;

use crate::models::{Category, CommentWithAuthor, Location, PostWithMeta, User};

// ============================================================================
// Post response types
// ============================================================================

/// Aggregated post as rendered everywhere: related entities plus the
/// comment count.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: String,
    pub is_published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: String,
    pub author: AuthorInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationInfo>,
    pub comment_count: i64,
}

/// Author info embedded in a post response
#[derive(Debug, Serialize, Clone)]
pub struct AuthorInfo {
    pub id: i64,
    pub username: String,
}

/// Category info embedded in a post response
#[derive(Debug, Serialize, Clone)]
pub struct CategoryInfo {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

/// Location info embedded in a post response
#[derive(Debug, Serialize, Clone)]
pub struct LocationInfo {
    pub id: i64,
    pub name: String,
}

impl From<PostWithMeta> for PostResponse {
    fn from(meta: PostWithMeta) -> Self {
        Self {
            id: meta.post.id,
            title: meta.post.title,
            text: meta.post.text,
            pub_date: meta.post.pub_date.to_rfc3339(),
            is_published: meta.post.is_published,
            image: meta.post.image,
            created_at: meta.post.created_at.to_rfc3339(),
            author: AuthorInfo {
                id: meta.author.id,
                username: meta.author.username,
            },
            category: meta.category.map(|c| CategoryInfo {
                id: c.id,
                title: c.title,
                slug: c.slug,
            }),
            location: meta.location.map(|l| LocationInfo {
                id: l.id,
                name: l.name,
            }),
            comment_count: meta.comment_count,
        }
    }
}

/// Paginated post list response
#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

// ============================================================================
// Comment response types
// ============================================================================

/// Comment as rendered under a post
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub post_id: i64,
    pub text: String,
    pub created_at: String,
    pub author: AuthorInfo,
}

impl From<CommentWithAuthor> for CommentResponse {
    fn from(comment: CommentWithAuthor) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            text: comment.text,
            created_at: comment.created_at.to_rfc3339(),
            author: AuthorInfo {
                id: comment.author_id,
                username: comment.author_username,
            },
        }
    }
}

// ============================================================================
// Category / location / profile response types
// ============================================================================

/// Category response
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
    pub created_at: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            title: category.title,
            description: category.description,
            slug: category.slug,
            is_published: category.is_published,
            created_at: category.created_at.to_rfc3339(),
        }
    }
}

/// Location response
#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
    pub created_at: String,
}

impl From<Location> for LocationResponse {
    fn from(location: Location) -> Self {
        Self {
            id: location.id,
            name: location.name,
            is_published: location.is_published,
            created_at: location.created_at.to_rfc3339(),
        }
    }
}

/// Public profile response
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub created_at: String,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Response for the authenticated user's own account
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}
