//! # Blogicum Core
//!
//! The content schema of the Blogicum blog: posts, categories, locations and
//! the publication flag they share.
//! This crate contains pure domain logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{DomainError, RepoError};
