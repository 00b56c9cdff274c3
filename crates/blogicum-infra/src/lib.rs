//! # Blogicum Infrastructure
//!
//! Storage implementations of the ports defined in `blogicum-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL storage via SeaORM

pub mod database;
pub mod memory;

pub use database::{ConfigError, DatabaseConfig};
pub use memory::InMemoryStore;

#[cfg(feature = "postgres")]
pub use database::{
    PostgresCategoryRepository, PostgresLocationRepository, PostgresPostRepository,
    PostgresUserRepository, connect,
};
