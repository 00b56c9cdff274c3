//! Ports - trait definitions for storage.
//! These are the "interfaces" that infrastructure must implement.

mod query;
mod repository;

pub use query::{CategorizedPostQuery, PostOrder, PostQuery};
pub use repository::{
    BaseRepository, CategoryRepository, LocationRepository, PostRepository, UserRepository,
};
