use async_trait::async_trait;
use uuid::Uuid;

use super::query::{CategorizedPostQuery, PostQuery};
use crate::domain::{Category, Location, Post, PostWithCategory, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. The stored creation time is kept.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID, applying the schema's delete policies.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository. Deleting a user deletes their posts.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Location repository. Deleting a location detaches it from its posts.
#[async_trait]
pub trait LocationRepository: BaseRepository<Location, Uuid> {
    async fn list(&self) -> Result<Vec<Location>, RepoError>;
}

/// Category repository. Deleting a category detaches it from its posts.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// Resolve a category by its unique slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// Posts filed under the category, newest first.
    async fn posts(&self, category_id: Uuid) -> Result<Vec<Post>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Run a post query.
    async fn fetch(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError>;

    /// Run a post query, loading each post's category in the same round trip.
    async fn fetch_with_category(
        &self,
        query: &CategorizedPostQuery,
    ) -> Result<Vec<PostWithCategory>, RepoError>;
}
