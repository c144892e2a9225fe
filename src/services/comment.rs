//! Comment service
//!
//! Implements comment creation, editing, and deletion with the observed
//! guard asymmetry:
//!
//! - creating a comment requires the target post's `is_published` flag
//!   (only that flag; a future-dated post still accepts comments);
//! - updating looks the comment up by id alone and reports an author
//!   mismatch as `NotOwner`, which the HTTP layer turns into a silent
//!   redirect to the post's detail page;
//! - deleting scopes the lookup by comment id, post id, and author at
//!   once, so any mismatch is a plain not-found.

use crate::db::repositories::{CommentRepository, PostRepository};
use crate::models::{Comment, CommentWithAuthor, CreateCommentInput, Viewer};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// The post or comment does not resolve to anything the viewer is
    /// entitled to touch
    #[error("Not found")]
    NotFound,

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The viewer is not the comment's author. Handlers redirect to the
    /// post's detail page without surfacing an error.
    #[error("Viewer is not the author of the comment on post {post_id}")]
    NotOwner { post_id: i64 },

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    comment_repo: Arc<dyn CommentRepository>,
    post_repo: Arc<dyn PostRepository>,
}

impl CommentService {
    /// Create a new comment service
    pub fn new(
        comment_repo: Arc<dyn CommentRepository>,
        post_repo: Arc<dyn PostRepository>,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
        }
    }

    /// Create a comment on a post. The target post must have its
    /// published flag set; nothing else about its visibility is checked.
    pub async fn create(
        &self,
        post_id: i64,
        author_id: i64,
        input: CreateCommentInput,
    ) -> Result<Comment, CommentServiceError> {
        validate_text(&input.text)?;

        let post = self
            .post_repo
            .get_by_id(post_id)
            .await
            .context("Failed to get post")?
            .ok_or(CommentServiceError::NotFound)?;

        if !post.is_published {
            return Err(CommentServiceError::NotFound);
        }

        let comment = self
            .comment_repo
            .create(post_id, author_id, &input.text)
            .await
            .context("Failed to create comment")?;

        Ok(comment)
    }

    /// List a post's comments, oldest first. The post must be visible to
    /// the viewer under the same rule as the detail page (public
    /// predicate, bypassed for the author).
    pub async fn list_for_post(
        &self,
        post_id: i64,
        viewer: Viewer,
    ) -> Result<Vec<CommentWithAuthor>, CommentServiceError> {
        let post = self
            .post_repo
            .get_by_id(post_id)
            .await
            .context("Failed to get post")?
            .ok_or(CommentServiceError::NotFound)?;

        if !viewer.is_user(post.author_id) {
            self.post_repo
                .get_visible_with_meta(post_id, Utc::now())
                .await
                .context("Failed to check post visibility")?
                .ok_or(CommentServiceError::NotFound)?;
        }

        Ok(self
            .comment_repo
            .list_by_post(post_id)
            .await
            .context("Failed to list comments")?)
    }

    /// Update a comment's text. The lookup is by comment id alone; an
    /// author mismatch soft-fails as `NotOwner` with the post id taken
    /// from the request path.
    pub async fn update(
        &self,
        post_id: i64,
        comment_id: i64,
        viewer: Viewer,
        input: CreateCommentInput,
    ) -> Result<Comment, CommentServiceError> {
        let comment = self
            .comment_repo
            .get_by_id(comment_id)
            .await
            .context("Failed to get comment")?
            .ok_or(CommentServiceError::NotFound)?;

        if !viewer.is_user(comment.author_id) {
            return Err(CommentServiceError::NotOwner { post_id });
        }

        validate_text(&input.text)?;

        let updated = self
            .comment_repo
            .update_text(comment_id, &input.text)
            .await
            .context("Failed to update comment")?;

        Ok(updated)
    }

    /// Delete a comment. The lookup is scoped by comment id, post id and
    /// author, so a mismatch on any of them is not-found rather than a
    /// redirect.
    pub async fn delete(
        &self,
        post_id: i64,
        comment_id: i64,
        viewer: Viewer,
    ) -> Result<(), CommentServiceError> {
        let author_id = viewer.user_id().ok_or(CommentServiceError::NotFound)?;

        let comment = self
            .comment_repo
            .get_scoped(comment_id, post_id, author_id)
            .await
            .context("Failed to get comment")?
            .ok_or(CommentServiceError::NotFound)?;

        self.comment_repo
            .delete(comment.id)
            .await
            .context("Failed to delete comment")?;

        Ok(())
    }
}

fn validate_text(text: &str) -> Result<(), CommentServiceError> {
    if text.trim().is_empty() {
        return Err(CommentServiceError::ValidationError(
            "Comment text cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        CategoryRepository, PostRepository, SqlxCategoryRepository, SqlxCommentRepository,
        SqlxPostRepository, SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::{CreateCategoryInput, CreatePostInput};
    use chrono::Duration;

    struct Fixture {
        pool: DynDatabasePool,
        service: CommentService,
        post_repo: Arc<dyn PostRepository>,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let post_repo = SqlxPostRepository::boxed(pool.clone());
        let comment_repo = SqlxCommentRepository::boxed(pool.clone());
        let service = CommentService::new(comment_repo, post_repo.clone());

        Fixture {
            pool,
            service,
            post_repo,
        }
    }

    async fn create_user(fixture: &Fixture, username: &str) -> i64 {
        let repo = SqlxUserRepository::new(fixture.pool.clone());
        let user = crate::models::User::new(
            username.to_string(),
            format!("{}@example.com", username),
            "hash".to_string(),
        );
        repo.create(&user).await.expect("create user").id
    }

    async fn create_post(fixture: &Fixture, author_id: i64, published: bool) -> i64 {
        let category_repo = SqlxCategoryRepository::new(fixture.pool.clone());
        let category = category_repo
            .create(&CreateCategoryInput {
                title: "news".to_string(),
                description: String::new(),
                slug: format!("news-{}-{}", author_id, published),
                is_published: true,
            })
            .await
            .expect("create category");

        fixture
            .post_repo
            .create(
                author_id,
                &CreatePostInput {
                    title: "Post".to_string(),
                    text: "Body".to_string(),
                    pub_date: Utc::now() - Duration::hours(1),
                    is_published: published,
                    image: None,
                    location_id: None,
                    category_id: Some(category.id),
                },
            )
            .await
            .expect("create post")
            .id
    }

    fn text_input(text: &str) -> CreateCommentInput {
        CreateCommentInput {
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_comment_on_published_post() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let commenter = create_user(&fixture, "commenter").await;
        let post = create_post(&fixture, author, true).await;

        let comment = fixture
            .service
            .create(post, commenter, text_input("nice post"))
            .await
            .expect("create comment");
        assert_eq!(comment.post_id, post);
        assert_eq!(comment.author_id, commenter);
    }

    #[tokio::test]
    async fn test_create_comment_on_unpublished_post_is_not_found() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let commenter = create_user(&fixture, "commenter").await;
        let post = create_post(&fixture, author, false).await;

        let result = fixture
            .service
            .create(post, commenter, text_input("hello"))
            .await;
        assert!(matches!(result, Err(CommentServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_create_comment_on_missing_post_is_not_found() {
        let fixture = setup().await;
        let commenter = create_user(&fixture, "commenter").await;

        let result = fixture
            .service
            .create(999, commenter, text_input("hello"))
            .await;
        assert!(matches!(result, Err(CommentServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_create_comment_rejects_empty_text() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let post = create_post(&fixture, author, true).await;

        let result = fixture.service.create(post, author, text_input("  ")).await;
        assert!(matches!(
            result,
            Err(CommentServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_comments_listed_oldest_first() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let post = create_post(&fixture, author, true).await;

        for text in ["first", "second", "third"] {
            fixture
                .service
                .create(post, author, text_input(text))
                .await
                .expect("create comment");
        }

        let comments = fixture
            .service
            .list_for_post(post, Viewer::Anonymous)
            .await
            .expect("list");
        let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
        assert_eq!(comments[0].author_username, "author");
    }

    #[tokio::test]
    async fn test_list_comments_of_invisible_post_is_not_found() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let post = create_post(&fixture, author, false).await;

        let result = fixture.service.list_for_post(post, Viewer::Anonymous).await;
        assert!(matches!(result, Err(CommentServiceError::NotFound)));

        // The author can still read them
        fixture
            .service
            .list_for_post(post, Viewer::User(author))
            .await
            .expect("author list");
    }

    #[tokio::test]
    async fn test_update_own_comment() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let post = create_post(&fixture, author, true).await;

        let comment = fixture
            .service
            .create(post, author, text_input("typo"))
            .await
            .expect("create");

        let updated = fixture
            .service
            .update(post, comment.id, Viewer::User(author), text_input("fixed"))
            .await
            .expect("update");
        assert_eq!(updated.text, "fixed");
    }

    #[tokio::test]
    async fn test_update_by_non_author_is_not_owner() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let intruder = create_user(&fixture, "intruder").await;
        let post = create_post(&fixture, author, true).await;

        let comment = fixture
            .service
            .create(post, author, text_input("mine"))
            .await
            .expect("create");

        let result = fixture
            .service
            .update(post, comment.id, Viewer::User(intruder), text_input("taken"))
            .await;
        assert!(matches!(
            result,
            Err(CommentServiceError::NotOwner { post_id }) if post_id == post
        ));
    }

    #[tokio::test]
    async fn test_delete_own_comment() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let post = create_post(&fixture, author, true).await;

        let comment = fixture
            .service
            .create(post, author, text_input("gone soon"))
            .await
            .expect("create");

        fixture
            .service
            .delete(post, comment.id, Viewer::User(author))
            .await
            .expect("delete");

        let comments = fixture
            .service
            .list_for_post(post, Viewer::User(author))
            .await
            .expect("list");
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn test_delete_with_mismatched_author_is_not_found() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let intruder = create_user(&fixture, "intruder").await;
        let post = create_post(&fixture, author, true).await;

        let comment = fixture
            .service
            .create(post, author, text_input("mine"))
            .await
            .expect("create");

        // Author mismatch: not-found, never a redirect
        let result = fixture
            .service
            .delete(post, comment.id, Viewer::User(intruder))
            .await;
        assert!(matches!(result, Err(CommentServiceError::NotFound)));

        // Post id mismatch: also not-found
        let other_post = create_post(&fixture, intruder, true).await;
        let result = fixture
            .service
            .delete(other_post, comment.id, Viewer::User(author))
            .await;
        assert!(matches!(result, Err(CommentServiceError::NotFound)));

        // The comment survives both attempts
        let comments = fixture
            .service
            .list_for_post(post, Viewer::User(author))
            .await
            .expect("list");
        assert_eq!(comments.len(), 1);
    }
}
