//! Data models
//!
//! This module contains all data structures used throughout the Inkpost
//! publishing system. Models represent:
//! - Database entities (Post, Category, Location, Comment, User, Session)
//! - Input types for create/update operations
//! - The viewer identity passed into visibility and ownership decisions

mod category;
mod comment;
mod location;
mod post;
mod session;
mod user;
mod viewer;

pub use category::{Category, CreateCategoryInput, UpdateCategoryInput};
pub use comment::{Comment, CommentWithAuthor, CreateCommentInput};
pub use location::{CreateLocationInput, Location, UpdateLocationInput};
pub use post::{
    AuthorBrief, CategoryBrief, CreatePostInput, ListParams, LocationBrief, PagedResult, Post,
    PostWithMeta, UpdatePostInput,
};
pub use session::Session;
pub use user::{UpdateProfileInput, User};
pub use viewer::Viewer;
