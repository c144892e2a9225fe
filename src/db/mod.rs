//! Database layer
//!
//! Connection pool abstraction, embedded migrations, and per-entity
//! repositories.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DatabasePool, DynDatabasePool};
