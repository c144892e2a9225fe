//! Post service
//!
//! Implements the visibility filter and the post ownership guard:
//!
//! - the home, category, and profile listings all run the same filtered,
//!   aggregated repository queries;
//! - a single post bypasses the filter entirely when the viewer is its
//!   author;
//! - an author viewing their own profile gets their posts unfiltered;
//! - update and delete compare the viewer to the post author and report a
//!   mismatch as `NotOwner`, which the HTTP layer turns into a silent
//!   redirect to the post's detail page.

use crate::db::repositories::{CategoryRepository, PostRepository, UserRepository};
use crate::models::{
    Category, CreatePostInput, ListParams, PagedResult, Post, PostWithMeta, UpdatePostInput,
    User, Viewer,
};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// The post, category, or author does not resolve to anything the
    /// viewer is entitled to see
    #[error("Not found")]
    NotFound,

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The viewer is not the post's author. Handlers redirect to the
    /// post's detail page without surfacing an error.
    #[error("Viewer is not the author of post {post_id}")]
    NotOwner { post_id: i64 },

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Post service
pub struct PostService {
    post_repo: Arc<dyn PostRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl PostService {
    /// Create a new post service
    pub fn new(
        post_repo: Arc<dyn PostRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            post_repo,
            category_repo,
            user_repo,
        }
    }

    /// The home listing: publicly visible posts, aggregated and paginated.
    pub async fn list_home(
        &self,
        params: &ListParams,
    ) -> Result<PagedResult<PostWithMeta>, PostServiceError> {
        let now = Utc::now();
        let total = self
            .post_repo
            .count_visible(now)
            .await
            .context("Failed to count visible posts")?;
        let items = self
            .post_repo
            .list_visible(now, params.offset(), params.limit())
            .await
            .context("Failed to list visible posts")?;

        Ok(PagedResult::new(items, total, params))
    }

    /// The category page: not-found when the category is missing or
    /// unpublished (for every viewer), otherwise the filtered listing.
    pub async fn list_by_category(
        &self,
        slug: &str,
        params: &ListParams,
    ) -> Result<(Category, PagedResult<PostWithMeta>), PostServiceError> {
        let category = self
            .category_repo
            .get_published_by_slug(slug)
            .await
            .context("Failed to get category")?
            .ok_or(PostServiceError::NotFound)?;

        let now = Utc::now();
        let total = self
            .post_repo
            .count_visible_by_category(category.id, now)
            .await
            .context("Failed to count category posts")?;
        let items = self
            .post_repo
            .list_visible_by_category(category.id, now, params.offset(), params.limit())
            .await
            .context("Failed to list category posts")?;

        Ok((category, PagedResult::new(items, total, params)))
    }

    /// The profile page: the author sees their own posts unfiltered
    /// (drafts, future-dated, unpublished category and all); every other
    /// viewer gets the public filter. Both views are aggregated the same
    /// way.
    pub async fn list_by_author(
        &self,
        username: &str,
        viewer: Viewer,
        params: &ListParams,
    ) -> Result<(User, PagedResult<PostWithMeta>), PostServiceError> {
        let author = self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to get author")?
            .ok_or(PostServiceError::NotFound)?;

        let result = if viewer.is_user(author.id) {
            let total = self
                .post_repo
                .count_by_author(author.id)
                .await
                .context("Failed to count own posts")?;
            let items = self
                .post_repo
                .list_by_author(author.id, params.offset(), params.limit())
                .await
                .context("Failed to list own posts")?;
            PagedResult::new(items, total, params)
        } else {
            let now = Utc::now();
            let total = self
                .post_repo
                .count_visible_by_author(author.id, now)
                .await
                .context("Failed to count author posts")?;
            let items = self
                .post_repo
                .list_visible_by_author(author.id, now, params.offset(), params.limit())
                .await
                .context("Failed to list author posts")?;
            PagedResult::new(items, total, params)
        };

        Ok((author, result))
    }

    /// A single post. The author sees it unconditionally; anyone else
    /// only if it passes the visibility predicate.
    pub async fn get_detail(
        &self,
        post_id: i64,
        viewer: Viewer,
    ) -> Result<PostWithMeta, PostServiceError> {
        let post = self
            .post_repo
            .get_by_id(post_id)
            .await
            .context("Failed to get post")?
            .ok_or(PostServiceError::NotFound)?;

        if viewer.is_user(post.author_id) {
            return self
                .post_repo
                .get_with_meta(post_id)
                .await
                .context("Failed to get post with meta")?
                .ok_or(PostServiceError::NotFound);
        }

        self.post_repo
            .get_visible_with_meta(post_id, Utc::now())
            .await
            .context("Failed to get visible post")?
            .ok_or(PostServiceError::NotFound)
    }

    /// Create a post owned by the given author.
    pub async fn create(
        &self,
        author_id: i64,
        input: CreatePostInput,
    ) -> Result<Post, PostServiceError> {
        validate_title(&input.title)?;
        validate_text(&input.text)?;

        let post = self
            .post_repo
            .create(author_id, &input)
            .await
            .context("Failed to create post")?;

        tracing::info!("Created post {} by user {}", post.id, author_id);
        Ok(post)
    }

    /// Update a post. Only the author may update; anyone else gets
    /// `NotOwner` and is redirected by the HTTP layer.
    pub async fn update(
        &self,
        post_id: i64,
        viewer: Viewer,
        input: UpdatePostInput,
    ) -> Result<Post, PostServiceError> {
        let post = self
            .post_repo
            .get_by_id(post_id)
            .await
            .context("Failed to get post")?
            .ok_or(PostServiceError::NotFound)?;

        if !viewer.is_user(post.author_id) {
            return Err(PostServiceError::NotOwner { post_id });
        }

        if let Some(title) = &input.title {
            validate_title(title)?;
        }
        if let Some(text) = &input.text {
            validate_text(text)?;
        }

        let updated = self
            .post_repo
            .update(post_id, &input)
            .await
            .context("Failed to update post")?;

        Ok(updated)
    }

    /// Delete a post. Same ownership guard as update; comments cascade.
    pub async fn delete(&self, post_id: i64, viewer: Viewer) -> Result<(), PostServiceError> {
        let post = self
            .post_repo
            .get_by_id(post_id)
            .await
            .context("Failed to get post")?
            .ok_or(PostServiceError::NotFound)?;

        if !viewer.is_user(post.author_id) {
            return Err(PostServiceError::NotOwner { post_id });
        }

        self.post_repo
            .delete(post_id)
            .await
            .context("Failed to delete post")?;

        tracing::info!("Deleted post {}", post_id);
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), PostServiceError> {
    if title.trim().is_empty() {
        return Err(PostServiceError::ValidationError(
            "Title cannot be empty".to_string(),
        ));
    }
    if title.len() > 256 {
        return Err(PostServiceError::ValidationError(
            "Title too long".to_string(),
        ));
    }
    Ok(())
}

fn validate_text(text: &str) -> Result<(), PostServiceError> {
    if text.trim().is_empty() {
        return Err(PostServiceError::ValidationError(
            "Text cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        CategoryRepository, CommentRepository, SqlxCategoryRepository, SqlxCommentRepository,
        SqlxPostRepository, SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::CreateCategoryInput;
    use chrono::Duration;

    struct Fixture {
        pool: DynDatabasePool,
        service: PostService,
        comment_repo: Arc<dyn CommentRepository>,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let post_repo = SqlxPostRepository::boxed(pool.clone());
        let category_repo = SqlxCategoryRepository::boxed(pool.clone());
        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let comment_repo = SqlxCommentRepository::boxed(pool.clone());

        let service = PostService::new(post_repo, category_repo, user_repo);
        Fixture {
            pool,
            service,
            comment_repo,
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

    async fn create_category(fixture: &Fixture, slug: &str, published: bool) -> i64 {
        let repo = SqlxCategoryRepository::new(fixture.pool.clone());
        repo.create(&CreateCategoryInput {
            title: slug.to_string(),
            description: String::new(),
            slug: slug.to_string(),
            is_published: published,
        })
        .await
        .expect("create category")
        .id
    }

    fn post_input(category_id: Option<i64>, published: bool, hours_offset: i64) -> CreatePostInput {
        CreatePostInput {
            title: "A post".to_string(),
            text: "Body".to_string(),
            pub_date: Utc::now() + Duration::hours(hours_offset),
            is_published: published,
            image: None,
            location_id: None,
            category_id,
        }
    }

    #[tokio::test]
    async fn test_unpublished_post_hidden_from_home_and_detail() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let category = create_category(&fixture, "news", true).await;

        let post = fixture
            .service
            .create(author, post_input(Some(category), false, -1))
            .await
            .expect("create post");

        let home = fixture
            .service
            .list_home(&ListParams::default())
            .await
            .expect("home");
        assert!(home.is_empty());

        let result = fixture.service.get_detail(post.id, Viewer::Anonymous).await;
        assert!(matches!(result, Err(PostServiceError::NotFound)));

        // The author still sees it
        let detail = fixture
            .service
            .get_detail(post.id, Viewer::User(author))
            .await
            .expect("author detail");
        assert_eq!(detail.post.id, post.id);
    }

    #[tokio::test]
    async fn test_future_dated_post_hidden_until_pub_date() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let other = create_user(&fixture, "reader").await;
        let category = create_category(&fixture, "news", true).await;

        let post = fixture
            .service
            .create(author, post_input(Some(category), true, 24))
            .await
            .expect("create post");

        let home = fixture
            .service
            .list_home(&ListParams::default())
            .await
            .expect("home");
        assert!(home.is_empty());

        let result = fixture.service.get_detail(post.id, Viewer::User(other)).await;
        assert!(matches!(result, Err(PostServiceError::NotFound)));

        let detail = fixture
            .service
            .get_detail(post.id, Viewer::User(author))
            .await
            .expect("author detail");
        assert_eq!(detail.post.id, post.id);
    }

    #[tokio::test]
    async fn test_unpublished_category_hides_posts_from_everyone_on_home() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let category = create_category(&fixture, "hidden", false).await;

        fixture
            .service
            .create(author, post_input(Some(category), true, -1))
            .await
            .expect("create post");

        // Hidden even from the author on the home listing
        let home = fixture
            .service
            .list_home(&ListParams::default())
            .await
            .expect("home");
        assert!(home.is_empty());

        // But the author's own profile shows it
        let (_user, own) = fixture
            .service
            .list_by_author("author", Viewer::User(author), &ListParams::default())
            .await
            .expect("own profile");
        assert_eq!(own.total, 1);

        // Other viewers of the profile do not see it
        let (_user, public) = fixture
            .service
            .list_by_author("author", Viewer::Anonymous, &ListParams::default())
            .await
            .expect("public profile");
        assert_eq!(public.total, 0);
    }

    #[tokio::test]
    async fn test_category_less_post_not_publicly_visible() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;

        let post = fixture
            .service
            .create(author, post_input(None, true, -1))
            .await
            .expect("create post");

        let home = fixture
            .service
            .list_home(&ListParams::default())
            .await
            .expect("home");
        assert!(home.is_empty());

        let result = fixture.service.get_detail(post.id, Viewer::Anonymous).await;
        assert!(matches!(result, Err(PostServiceError::NotFound)));

        // Still present in the author's own views
        let detail = fixture
            .service
            .get_detail(post.id, Viewer::User(author))
            .await
            .expect("author detail");
        assert!(detail.category.is_none());
    }

    #[tokio::test]
    async fn test_visible_post_appears_everywhere() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let category = create_category(&fixture, "news", true).await;

        let post = fixture
            .service
            .create(author, post_input(Some(category), true, -1))
            .await
            .expect("create post");

        let home = fixture
            .service
            .list_home(&ListParams::default())
            .await
            .expect("home");
        assert_eq!(home.total, 1);
        assert_eq!(home.items[0].post.id, post.id);
        assert_eq!(home.items[0].author.username, "author");
        assert_eq!(home.items[0].category.as_ref().unwrap().slug, "news");

        let (category_row, listing) = fixture
            .service
            .list_by_category("news", &ListParams::default())
            .await
            .expect("category page");
        assert_eq!(category_row.slug, "news");
        assert_eq!(listing.total, 1);

        let detail = fixture
            .service
            .get_detail(post.id, Viewer::Anonymous)
            .await
            .expect("anonymous detail");
        assert_eq!(detail.post.id, post.id);
    }

    #[tokio::test]
    async fn test_unpublished_category_page_is_not_found() {
        let fixture = setup().await;
        create_category(&fixture, "hidden", false).await;

        let result = fixture
            .service
            .list_by_category("hidden", &ListParams::default())
            .await;
        assert!(matches!(result, Err(PostServiceError::NotFound)));

        let result = fixture
            .service
            .list_by_category("missing", &ListParams::default())
            .await;
        assert!(matches!(result, Err(PostServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_comment_count_matches_rows_in_every_listing() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let commenter = create_user(&fixture, "commenter").await;
        let category = create_category(&fixture, "news", true).await;

        let post = fixture
            .service
            .create(author, post_input(Some(category), true, -1))
            .await
            .expect("create post");

        for i in 0..3 {
            fixture
                .comment_repo
                .create(post.id, commenter, &format!("comment {}", i))
                .await
                .expect("create comment");
        }

        let stored = fixture
            .comment_repo
            .count_by_post(post.id)
            .await
            .expect("count comments");
        assert_eq!(stored, 3);

        let home = fixture
            .service
            .list_home(&ListParams::default())
            .await
            .expect("home");
        assert_eq!(home.items[0].comment_count, stored);

        let (_category, listing) = fixture
            .service
            .list_by_category("news", &ListParams::default())
            .await
            .expect("category");
        assert_eq!(listing.items[0].comment_count, 3);

        let (_author, profile) = fixture
            .service
            .list_by_author("author", Viewer::Anonymous, &ListParams::default())
            .await
            .expect("profile");
        assert_eq!(profile.items[0].comment_count, 3);

        let detail = fixture
            .service
            .get_detail(post.id, Viewer::Anonymous)
            .await
            .expect("detail");
        assert_eq!(detail.comment_count, 3);
    }

    #[tokio::test]
    async fn test_listing_ordered_most_recent_first() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let category = create_category(&fixture, "news", true).await;

        let older = fixture
            .service
            .create(author, post_input(Some(category), true, -48))
            .await
            .expect("older post");
        let newer = fixture
            .service
            .create(author, post_input(Some(category), true, -1))
            .await
            .expect("newer post");

        let home = fixture
            .service
            .list_home(&ListParams::default())
            .await
            .expect("home");
        assert_eq!(home.items[0].post.id, newer.id);
        assert_eq!(home.items[1].post.id, older.id);
    }

    #[tokio::test]
    async fn test_update_by_non_author_is_not_owner() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let intruder = create_user(&fixture, "intruder").await;
        let category = create_category(&fixture, "news", true).await;

        let post = fixture
            .service
            .create(author, post_input(Some(category), true, -1))
            .await
            .expect("create post");

        let result = fixture
            .service
            .update(
                post.id,
                Viewer::User(intruder),
                UpdatePostInput {
                    title: Some("hijacked".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(PostServiceError::NotOwner { post_id }) if post_id == post.id
        ));

        // Nothing changed
        let detail = fixture
            .service
            .get_detail(post.id, Viewer::User(author))
            .await
            .expect("detail");
        assert_eq!(detail.post.title, "A post");
    }

    #[tokio::test]
    async fn test_delete_by_non_author_is_not_owner() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let intruder = create_user(&fixture, "intruder").await;
        let category = create_category(&fixture, "news", true).await;

        let post = fixture
            .service
            .create(author, post_input(Some(category), true, -1))
            .await
            .expect("create post");

        let result = fixture.service.delete(post.id, Viewer::User(intruder)).await;
        assert!(matches!(result, Err(PostServiceError::NotOwner { .. })));

        // Still present
        fixture
            .service
            .get_detail(post.id, Viewer::Anonymous)
            .await
            .expect("post survives");
    }

    #[tokio::test]
    async fn test_author_can_update_and_delete() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;
        let category = create_category(&fixture, "news", true).await;

        let post = fixture
            .service
            .create(author, post_input(Some(category), true, -1))
            .await
            .expect("create post");

        let updated = fixture
            .service
            .update(
                post.id,
                Viewer::User(author),
                UpdatePostInput {
                    title: Some("Edited".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.title, "Edited");

        fixture
            .service
            .delete(post.id, Viewer::User(author))
            .await
            .expect("delete");

        let result = fixture.service.get_detail(post.id, Viewer::User(author)).await;
        assert!(matches!(result, Err(PostServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_mutating_missing_post_is_not_found() {
        let fixture = setup().await;
        let user = create_user(&fixture, "author").await;

        let result = fixture
            .service
            .update(999, Viewer::User(user), UpdatePostInput::default())
            .await;
        assert!(matches!(result, Err(PostServiceError::NotFound)));

        let result = fixture.service.delete(999, Viewer::User(user)).await;
        assert!(matches!(result, Err(PostServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title_and_text() {
        let fixture = setup().await;
        let author = create_user(&fixture, "author").await;

        let mut input = post_input(None, true, 0);
        input.title = "  ".to_string();
        let result = fixture.service.create(author, input).await;
        assert!(matches!(result, Err(PostServiceError::ValidationError(_))));

        let mut input = post_input(None, true, 0);
        input.text = String::new();
        let result = fixture.service.create(author, input).await;
        assert!(matches!(result, Err(PostServiceError::ValidationError(_))));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Pure mirror of the SQL visibility predicate, for property checks.
    fn publicly_visible(
        is_published: bool,
        hours_until_pub: i64,
        category_published: Option<bool>,
    ) -> bool {
        is_published && hours_until_pub <= 0 && category_published == Some(true)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn property_unpublished_never_visible(
            hours in -100i64..100,
            category in prop::option::of(prop::bool::ANY),
        ) {
            prop_assert!(!publicly_visible(false, hours, category));
        }

        #[test]
        fn property_future_dated_never_visible(
            published in prop::bool::ANY,
            hours in 1i64..100,
            category in prop::option::of(prop::bool::ANY),
        ) {
            prop_assert!(!publicly_visible(published, hours, category));
        }

        #[test]
        fn property_category_must_be_published(
            published in prop::bool::ANY,
            hours in -100i64..=0,
        ) {
            prop_assert!(!publicly_visible(published, hours, Some(false)));
            prop_assert!(!publicly_visible(published, hours, None));
        }

        #[test]
        fn property_all_conditions_met_is_visible(hours in -100i64..=0) {
            prop_assert!(publicly_visible(true, hours, Some(true)));
        }
    }
}
