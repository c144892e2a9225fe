//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP endpoints for the Inkpost publishing
//! system:
//! - Post endpoints (listing, detail, authoring)
//! - Comment endpoints
//! - Category and location endpoints
//! - Profile endpoints
//! - Auth endpoints
//!
//! Public routes run behind `optional_auth` so the visibility filter can
//! honor the owner exception; mutation routes run behind `require_auth`.

pub mod auth;
pub mod categories;
pub mod comments;
pub mod common;
pub mod locations;
pub mod middleware;
pub mod posts;
pub mod profiles;
pub mod responses;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser, MaybeUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Mutation routes (need a valid session)
    let protected_routes = Router::new()
        .route("/posts", post(posts::create_post))
        .route("/posts/{id}", put(posts::update_post))
        .route("/posts/{id}", delete(posts::delete_post))
        .route("/posts/{id}/comments", post(comments::create_comment))
        .route(
            "/posts/{post_id}/comments/{comment_id}",
            put(comments::update_comment),
        )
        .route(
            "/posts/{post_id}/comments/{comment_id}",
            delete(comments::delete_comment),
        )
        .route("/categories", post(categories::create_category))
        .route("/categories/{id}", put(categories::update_category))
        .route("/categories/{id}", delete(categories::delete_category))
        .route("/locations", post(locations::create_location))
        .route("/locations/{id}", put(locations::update_location))
        .route("/locations/{id}", delete(locations::delete_location))
        .route("/profile", put(profiles::update_profile))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::get_current_user))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes; a session is recognized when presented so authors
    // see their own unpublished content
    let public_routes = Router::new()
        .route("/posts", get(posts::list_posts))
        .route("/posts/{id}", get(posts::get_post))
        .route("/posts/{id}/comments", get(comments::list_comments))
        .route("/categories", get(categories::list_categories))
        .route(
            "/categories/{slug}/posts",
            get(categories::list_category_posts),
        )
        .route("/locations", get(locations::list_locations))
        .route("/profiles/{username}", get(profiles::get_profile))
        .route(
            "/profiles/{username}/posts",
            get(profiles::list_profile_posts),
        )
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::optional_auth,
        ));

    public_routes.merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxCategoryRepository, SqlxCommentRepository, SqlxLocationRepository, SqlxPostRepository,
        SqlxSessionRepository, SqlxUserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::services::{
        CategoryService, CommentService, LocationService, PostService, UserService,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use std::sync::Arc;

    async fn test_server() -> TestServer {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let session_repo = SqlxSessionRepository::boxed(pool.clone());
        let category_repo = SqlxCategoryRepository::boxed(pool.clone());
        let location_repo = SqlxLocationRepository::boxed(pool.clone());
        let post_repo = SqlxPostRepository::boxed(pool.clone());
        let comment_repo = SqlxCommentRepository::boxed(pool.clone());

        let state = AppState {
            user_service: Arc::new(UserService::new(user_repo.clone(), session_repo)),
            post_service: Arc::new(PostService::new(
                post_repo.clone(),
                category_repo.clone(),
                user_repo,
            )),
            comment_service: Arc::new(CommentService::new(comment_repo, post_repo)),
            category_service: Arc::new(CategoryService::new(category_repo)),
            location_service: Arc::new(LocationService::new(location_repo)),
            posts_per_page: 10,
        };

        let app = build_router(state, "http://localhost:3000");
        TestServer::new(app).expect("Failed to start test server")
    }

    /// Register a user and log in, returning the session token
    async fn register_and_login(server: &TestServer, username: &str) -> String {
        let response = server
            .post("/api/v1/auth/register")
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "password123",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({
                "username_or_email": username,
                "password": "password123",
            }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    async fn create_category(server: &TestServer, token: &str, slug: &str) -> i64 {
        let response = server
            .post("/api/v1/categories")
            .authorization_bearer(token)
            .json(&json!({
                "title": slug,
                "description": "",
                "slug": slug,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["id"].as_i64().expect("category id")
    }

    async fn create_post(
        server: &TestServer,
        token: &str,
        category_id: i64,
        published: bool,
        hours_offset: i64,
    ) -> i64 {
        let response = server
            .post("/api/v1/posts")
            .authorization_bearer(token)
            .json(&json!({
                "title": "A post",
                "text": "Body",
                "pub_date": (Utc::now() + Duration::hours(hours_offset)).to_rfc3339(),
                "is_published": published,
                "category_id": category_id,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["id"].as_i64().expect("post id")
    }

    #[tokio::test]
    async fn test_anonymous_listing_hides_invisible_posts() {
        let server = test_server().await;
        let token = register_and_login(&server, "author").await;
        let category = create_category(&server, &token, "news").await;

        create_post(&server, &token, category, true, -1).await;
        create_post(&server, &token, category, false, -1).await;
        create_post(&server, &token, category, true, 24).await;

        let response = server.get("/api/v1/posts").await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["total"], 1);
        assert_eq!(body["posts"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_future_post_detail_owner_exception() {
        let server = test_server().await;
        let token = register_and_login(&server, "author").await;
        let category = create_category(&server, &token, "news").await;
        let post = create_post(&server, &token, category, true, 24).await;

        // Anonymous viewer: not found
        let response = server.get(&format!("/api/v1/posts/{}", post)).await;
        response.assert_status(StatusCode::NOT_FOUND);

        // The author: full post
        let response = server
            .get(&format!("/api/v1/posts/{}", post))
            .authorization_bearer(&token)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["title"], "A post");
    }

    #[tokio::test]
    async fn test_foreign_post_update_redirects_silently() {
        let server = test_server().await;
        let author_token = register_and_login(&server, "author").await;
        let intruder_token = register_and_login(&server, "intruder").await;
        let category = create_category(&server, &author_token, "news").await;
        let post = create_post(&server, &author_token, category, true, -1).await;

        let response = server
            .put(&format!("/api/v1/posts/{}", post))
            .authorization_bearer(&intruder_token)
            .json(&json!({ "title": "hijacked" }))
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()["location"].to_str().unwrap(),
            format!("/api/v1/posts/{}", post)
        );

        // The post is unchanged
        let response = server.get(&format!("/api/v1/posts/{}", post)).await;
        assert_eq!(response.json::<Value>()["title"], "A post");
    }

    #[tokio::test]
    async fn test_foreign_post_delete_redirects_silently() {
        let server = test_server().await;
        let author_token = register_and_login(&server, "author").await;
        let intruder_token = register_and_login(&server, "intruder").await;
        let category = create_category(&server, &author_token, "news").await;
        let post = create_post(&server, &author_token, category, true, -1).await;

        let response = server
            .delete(&format!("/api/v1/posts/{}", post))
            .authorization_bearer(&intruder_token)
            .await;
        response.assert_status(StatusCode::SEE_OTHER);

        let response = server.get(&format!("/api/v1/posts/{}", post)).await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_unpublished_category_page_404s() {
        let server = test_server().await;
        let token = register_and_login(&server, "author").await;
        let category = create_category(&server, &token, "hidden").await;

        let response = server
            .put(&format!("/api/v1/categories/{}", category))
            .authorization_bearer(&token)
            .json(&json!({ "is_published": false }))
            .await;
        response.assert_status_ok();

        let response = server.get("/api/v1/categories/hidden/posts").await;
        response.assert_status(StatusCode::NOT_FOUND);

        // And it disappears from the category index
        let response = server.get("/api/v1/categories").await;
        assert!(response.json::<Value>().as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comment_lifecycle_and_guards() {
        let server = test_server().await;
        let author_token = register_and_login(&server, "author").await;
        let other_token = register_and_login(&server, "reader").await;
        let category = create_category(&server, &author_token, "news").await;
        let post = create_post(&server, &author_token, category, true, -1).await;

        // Reader comments
        let response = server
            .post(&format!("/api/v1/posts/{}/comments", post))
            .authorization_bearer(&other_token)
            .json(&json!({ "text": "nice" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let comment = response.json::<Value>()["id"].as_i64().unwrap();

        // Author edits reader's comment: silent redirect
        let response = server
            .put(&format!("/api/v1/posts/{}/comments/{}", post, comment))
            .authorization_bearer(&author_token)
            .json(&json!({ "text": "rewritten" }))
            .await;
        response.assert_status(StatusCode::SEE_OTHER);

        // Author deletes reader's comment: plain not-found
        let response = server
            .delete(&format!("/api/v1/posts/{}/comments/{}", post, comment))
            .authorization_bearer(&author_token)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        // Reader deletes their own comment
        let response = server
            .delete(&format!("/api/v1/posts/{}/comments/{}", post, comment))
            .authorization_bearer(&other_token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_profile_own_view_includes_drafts() {
        let server = test_server().await;
        let token = register_and_login(&server, "author").await;
        let category = create_category(&server, &token, "news").await;

        create_post(&server, &token, category, true, -1).await;
        create_post(&server, &token, category, false, -1).await;

        let response = server.get("/api/v1/profiles/author/posts").await;
        assert_eq!(response.json::<Value>()["total"], 1);

        let response = server
            .get("/api/v1/profiles/author/posts")
            .authorization_bearer(&token)
            .await;
        assert_eq!(response.json::<Value>()["total"], 2);
    }

    #[tokio::test]
    async fn test_mutations_require_auth() {
        let server = test_server().await;

        let response = server
            .post("/api/v1/posts")
            .json(&json!({
                "title": "t",
                "text": "b",
                "pub_date": Utc::now().to_rfc3339(),
            }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_comment_on_unpublished_post_404s() {
        let server = test_server().await;
        let author_token = register_and_login(&server, "author").await;
        let other_token = register_and_login(&server, "reader").await;
        let category = create_category(&server, &author_token, "news").await;
        let post = create_post(&server, &author_token, category, false, -1).await;

        let response = server
            .post(&format!("/api/v1/posts/{}/comments", post))
            .authorization_bearer(&other_token)
            .json(&json!({ "text": "hello" }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
