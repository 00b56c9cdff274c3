//! In-memory content store - used when no database is configured and in tests.
//!
//! Applies the same rules the PostgreSQL schema enforces: unique category
//! slugs and usernames, foreign keys on posts, cascading author deletes and
//! nulling location/category deletes. Note: data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::domain::{
    Category, Location, Post, PostWithCategory, Published, User, Validate,
};
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    BaseRepository, CategorizedPostQuery, CategoryRepository, LocationRepository, PostQuery,
    PostRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    locations: HashMap<Uuid, Location>,
    categories: HashMap<Uuid, Category>,
    posts: HashMap<Uuid, Post>,
}

impl Tables {
    fn check_post_references(&self, post: &Post) -> Result<(), RepoError> {
        if !self.users.contains_key(&post.author_id) {
            return Err(RepoError::Constraint(format!(
                "posts.author_id references missing user {}",
                post.author_id
            )));
        }
        if let Some(id) = post.location_id.filter(|id| !self.locations.contains_key(id)) {
            return Err(RepoError::Constraint(format!(
                "posts.location_id references missing location {id}"
            )));
        }
        if let Some(id) = post.category_id.filter(|id| !self.categories.contains_key(id)) {
            return Err(RepoError::Constraint(format!(
                "posts.category_id references missing category {id}"
            )));
        }
        Ok(())
    }

    fn check_unique_slug(&self, category: &Category) -> Result<(), RepoError> {
        let taken = self
            .categories
            .values()
            .any(|other| other.id != category.id && other.slug == category.slug);
        if taken {
            tracing::warn!(slug = %category.slug, "Category slug already in use");
            return Err(RepoError::Duplicate(format!(
                "categories.slug {:?} already exists",
                category.slug.as_str()
            )));
        }
        Ok(())
    }

    fn check_unique_username(&self, user: &User) -> Result<(), RepoError> {
        let taken = self
            .users
            .values()
            .any(|other| other.id != user.id && other.username == user.username);
        if taken {
            return Err(RepoError::Duplicate(format!(
                "users.username {:?} already exists",
                user.username
            )));
        }
        Ok(())
    }
}

/// Creation time is the insert instant, not whatever the caller built.
fn stamp_created_at(published: &mut Published) {
    *published = Published::restore(published.is_published(), Utc::now());
}

/// Keep the stored creation time when a row is overwritten.
fn keep_created_at(published: &mut Published, stored: &Published) {
    *published = Published::restore(published.is_published(), stored.created_at());
}

/// Shared in-memory tables. Repositories handed out by one store see the
/// same data.
///
/// Every write takes the single write lock, so checks and inserts are atomic
/// with respect to each other.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn locations(&self) -> InMemoryLocationRepository {
        InMemoryLocationRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn categories(&self) -> InMemoryCategoryRepository {
        InMemoryCategoryRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository {
            tables: self.tables.clone(),
        }
    }
}

/// In-memory user repository.
#[derive(Clone)]
pub struct InMemoryUserRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create(&self, mut user: User) -> Result<User, RepoError> {
        user.validate()?;
        user.created_at = Utc::now();
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id) {
            return Err(RepoError::Duplicate(format!("users.id {}", user.id)));
        }
        tables.check_unique_username(&user)?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, mut user: User) -> Result<User, RepoError> {
        user.validate()?;
        let mut tables = self.tables.write().await;
        let stored = tables.users.get(&user.id).ok_or(RepoError::NotFound)?;
        user.created_at = stored.created_at;
        tables.check_unique_username(&user)?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;

        let before = tables.posts.len();
        tables.posts.retain(|_, post| post.author_id != id);
        tracing::debug!(
            user_id = %id,
            deleted_posts = before - tables.posts.len(),
            "User deleted with their posts"
        );
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }
}

/// In-memory location repository.
#[derive(Clone)]
pub struct InMemoryLocationRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl BaseRepository<Location, Uuid> for InMemoryLocationRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, RepoError> {
        Ok(self.tables.read().await.locations.get(&id).cloned())
    }

    async fn create(&self, mut location: Location) -> Result<Location, RepoError> {
        location.validate()?;
        stamp_created_at(&mut location.published);
        let mut tables = self.tables.write().await;
        if tables.locations.contains_key(&location.id) {
            return Err(RepoError::Duplicate(format!("locations.id {}", location.id)));
        }
        tables.locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn update(&self, mut location: Location) -> Result<Location, RepoError> {
        location.validate()?;
        let mut tables = self.tables.write().await;
        let stored = tables
            .locations
            .get(&location.id)
            .ok_or(RepoError::NotFound)?;
        keep_created_at(&mut location.published, &stored.published);
        tables.locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.locations.remove(&id).ok_or(RepoError::NotFound)?;

        for post in tables.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
        tracing::debug!(location_id = %id, "Location deleted, posts detached");
        Ok(())
    }
}

#[async_trait]
impl LocationRepository for InMemoryLocationRepository {
    async fn list(&self) -> Result<Vec<Location>, RepoError> {
        let tables = self.tables.read().await;
        let mut locations: Vec<Location> = tables.locations.values().cloned().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(locations)
    }
}

/// In-memory category repository.
#[derive(Clone)]
pub struct InMemoryCategoryRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn create(&self, mut category: Category) -> Result<Category, RepoError> {
        category.validate()?;
        stamp_created_at(&mut category.published);
        let mut tables = self.tables.write().await;
        if tables.categories.contains_key(&category.id) {
            return Err(RepoError::Duplicate(format!("categories.id {}", category.id)));
        }
        tables.check_unique_slug(&category)?;
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, mut category: Category) -> Result<Category, RepoError> {
        category.validate()?;
        let mut tables = self.tables.write().await;
        let stored = tables
            .categories
            .get(&category.id)
            .ok_or(RepoError::NotFound)?;
        keep_created_at(&mut category.published, &stored.published);
        tables.check_unique_slug(&category)?;
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.categories.remove(&id).ok_or(RepoError::NotFound)?;

        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        tracing::debug!(category_id = %id, "Category deleted, posts detached");
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|category| category.slug.as_str() == slug)
            .cloned())
    }

    async fn posts(&self, category_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(PostQuery::new()
            .in_category(category_id)
            .apply(tables.posts.values()))
    }
}

/// In-memory post repository.
#[derive(Clone)]
pub struct InMemoryPostRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn create(&self, mut post: Post) -> Result<Post, RepoError> {
        post.validate()?;
        stamp_created_at(&mut post.published);
        let mut tables = self.tables.write().await;
        if tables.posts.contains_key(&post.id) {
            return Err(RepoError::Duplicate(format!("posts.id {}", post.id)));
        }
        tables.check_post_references(&post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, mut post: Post) -> Result<Post, RepoError> {
        post.validate()?;
        let mut tables = self.tables.write().await;
        let stored = tables.posts.get(&post.id).ok_or(RepoError::NotFound)?;
        keep_created_at(&mut post.published, &stored.published);
        tables.check_post_references(&post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.posts.remove(&id).ok_or(RepoError::NotFound)?;
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        self.fetch(&PostQuery::new().by_author(author_id)).await
    }

    async fn fetch(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(query.apply(tables.posts.values()))
    }

    async fn fetch_with_category(
        &self,
        query: &CategorizedPostQuery,
    ) -> Result<Vec<PostWithCategory>, RepoError> {
        // One read guard for posts and categories alike.
        let tables = self.tables.read().await;
        Ok(query
            .query()
            .apply(tables.posts.values())
            .into_iter()
            .map(|post| {
                let category = post
                    .category_id
                    .and_then(|id| tables.categories.get(&id))
                    .cloned();
                PostWithCategory { post, category }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogicum_core::domain::{PostDraft, Publishable};
    use chrono::{Duration, TimeZone};

    struct Fixture {
        store: InMemoryStore,
        author: User,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let author = store.users().create(User::new("author").unwrap()).await.unwrap();
        Fixture { store, author }
    }

    fn draft(author: &User) -> PostDraft {
        PostDraft::new()
            .title("Пост")
            .text("Текст")
            .pub_date(Utc::now())
            .author(author.id)
    }

    #[tokio::test]
    async fn test_create_post_sets_defaults() {
        let fx = fixture().await;
        let before = Utc::now();

        let post = fx.store.posts().create(draft(&fx.author).build().unwrap()).await.unwrap();

        let stored = fx.store.posts().find_by_id(post.id).await.unwrap().unwrap();
        assert!(stored.is_published());
        assert!(stored.created_at() >= before);
        assert_eq!(stored.author_id, fx.author.id);
    }

    #[tokio::test]
    async fn test_post_needs_existing_author() {
        let fx = fixture().await;
        let orphan = PostDraft::new()
            .title("Пост")
            .text("Текст")
            .pub_date(Utc::now())
            .author(Uuid::new_v4())
            .build()
            .unwrap();

        let err = fx.store.posts().create(orphan).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_future_pub_date_is_stored() {
        let fx = fixture().await;
        let scheduled = Utc::now() + Duration::days(3);

        let post = draft(&fx.author).pub_date(scheduled).build().unwrap();
        let created = fx.store.posts().create(post).await.unwrap();

        assert_eq!(created.pub_date, scheduled);
        // Scheduled posts are still stored; listing them is the reader's call.
        let visible = fx
            .store
            .posts()
            .fetch(&PostQuery::new().pub_date_until(Utc::now()))
            .await
            .unwrap();
        assert!(visible.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_rejected() {
        let store = InMemoryStore::new();
        let categories = store.categories();

        categories
            .create(Category::new("Путешествия", "Про поездки", "travel").unwrap())
            .await
            .unwrap();
        let err = categories
            .create(Category::new("Поездки", "Ещё про поездки", "travel").unwrap())
            .await
            .unwrap_err();

        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn test_slug_change_to_taken_slug_is_rejected() {
        let store = InMemoryStore::new();
        let categories = store.categories();

        categories
            .create(Category::new("Путешествия", "Про поездки", "travel").unwrap())
            .await
            .unwrap();
        let mut food = categories
            .create(Category::new("Еда", "Про еду", "food").unwrap())
            .await
            .unwrap();

        food.slug = "travel".to_string().try_into().unwrap();
        assert!(categories.update(food).await.unwrap_err().is_duplicate());
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_slug_has_one_winner() {
        let store = InMemoryStore::new();
        let first = store.categories();
        let second = store.categories();

        let (a, b) = tokio::join!(
            first.create(Category::new("Первая", "Описание", "news").unwrap()),
            second.create(Category::new("Вторая", "Описание", "news").unwrap()),
        );

        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        assert!(a.err().or(b.err()).unwrap().is_duplicate());
    }

    #[tokio::test]
    async fn test_deleting_location_detaches_posts() {
        let fx = fixture().await;
        let location = fx
            .store
            .locations()
            .create(Location::new("Остров радости").unwrap())
            .await
            .unwrap();
        let post = fx
            .store
            .posts()
            .create(draft(&fx.author).location(location.id).build().unwrap())
            .await
            .unwrap();

        fx.store.locations().delete(location.id).await.unwrap();

        let stored = fx.store.posts().find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.location_id, None);
    }

    #[tokio::test]
    async fn test_deleting_category_detaches_posts() {
        let fx = fixture().await;
        let category = fx
            .store
            .categories()
            .create(Category::new("Путешествия", "Про поездки", "travel").unwrap())
            .await
            .unwrap();
        let post = fx
            .store
            .posts()
            .create(draft(&fx.author).category(category.id).build().unwrap())
            .await
            .unwrap();

        assert_eq!(fx.store.categories().posts(category.id).await.unwrap().len(), 1);
        fx.store.categories().delete(category.id).await.unwrap();

        let stored = fx.store.posts().find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.category_id, None);
    }

    #[tokio::test]
    async fn test_deleting_author_deletes_posts() {
        let fx = fixture().await;
        let other = fx.store.users().create(User::new("other").unwrap()).await.unwrap();
        let doomed = fx.store.posts().create(draft(&fx.author).build().unwrap()).await.unwrap();
        let kept = fx.store.posts().create(draft(&other).build().unwrap()).await.unwrap();

        fx.store.users().delete(fx.author.id).await.unwrap();

        assert!(fx.store.posts().find_by_id(doomed.id).await.unwrap().is_none());
        assert!(fx.store.posts().find_by_id(kept.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_with_category_returns_same_posts() {
        let fx = fixture().await;
        let category = fx
            .store
            .categories()
            .create(Category::new("Путешествия", "Про поездки", "travel").unwrap())
            .await
            .unwrap();
        let posts = fx.store.posts();
        for days in 0..3 {
            let mut post = draft(&fx.author).pub_date(Utc::now() - Duration::days(days));
            if days != 1 {
                post = post.category(category.id);
            }
            posts.create(post.build().unwrap()).await.unwrap();
        }

        let query = PostQuery::new().published();
        let plain = posts.fetch(&query).await.unwrap();
        let joined = posts.fetch_with_category(&query.clone().with_category()).await.unwrap();

        assert_eq!(
            joined.iter().map(|entry| entry.post.clone()).collect::<Vec<_>>(),
            plain
        );
        assert_eq!(joined[0].category.as_ref(), Some(&category));
        assert_eq!(joined[1].category, None);
        assert_eq!(joined[2].category.as_ref(), Some(&category));
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let store = InMemoryStore::new();
        let locations = store.locations();
        let location = locations.create(Location::new("Гора").unwrap()).await.unwrap();

        let mut edited = location.clone();
        edited.name = "Высокая гора".to_string();
        edited.published = Published::restore(false, Utc::now() + Duration::days(1));
        let updated = locations.update(edited).await.unwrap();

        assert_eq!(updated.created_at(), location.created_at());
        assert!(!updated.is_published());
        assert_eq!(updated.name, "Высокая гора");
    }

    #[tokio::test]
    async fn test_create_ignores_supplied_created_at() {
        let fx = fixture().await;
        let backdated = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        let before = Utc::now();

        let mut location = Location::new("Гора").unwrap();
        location.published = Published::restore(true, backdated);
        let location = fx.store.locations().create(location).await.unwrap();

        let mut post = draft(&fx.author).hidden().build().unwrap();
        post.published = Published::restore(false, backdated);
        let post = fx.store.posts().create(post).await.unwrap();

        let stored = fx.store.locations().find_by_id(location.id).await.unwrap().unwrap();
        assert!(stored.created_at() >= before);
        assert!(stored.is_published());
        let stored = fx.store.posts().find_by_id(post.id).await.unwrap().unwrap();
        assert!(stored.created_at() >= before);
        assert!(!stored.is_published());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let store = InMemoryStore::new();
        let result = store.locations().delete(Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_locations_allow_duplicate_names() {
        let store = InMemoryStore::new();
        let locations = store.locations();
        locations.create(Location::new("Парк").unwrap()).await.unwrap();
        locations.create(Location::new("Парк").unwrap()).await.unwrap();

        assert_eq!(locations.list().await.unwrap().len(), 2);
    }
}
