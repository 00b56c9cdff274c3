//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select};
use uuid::Uuid;

use blogicum_core::domain::{Category, Location, Post, PostWithCategory, User};
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    CategorizedPostQuery, CategoryRepository, LocationRepository, PostOrder, PostQuery,
    PostRepository, UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn list(&self) -> Result<Vec<Location>, RepoError> {
        let result = LocationEntity::find()
            .order_by_asc(location::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        tracing::debug!(slug, "Finding category by slug");

        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Category::try_from).transpose()?)
    }

    async fn posts(&self, category_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = select_posts(&PostQuery::new().in_category(category_id))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// Translate a [`PostQuery`] into a SELECT on `posts`.
pub(crate) fn select_posts(query: &PostQuery) -> Select<PostEntity> {
    let condition = Condition::all()
        .add_option(
            query
                .published_only
                .then(|| post::Column::IsPublished.eq(true)),
        )
        .add_option(query.pub_date_until.map(|until| post::Column::PubDate.lte(until)))
        .add_option(query.author_id.map(|id| post::Column::AuthorId.eq(id)))
        .add_option(query.category_id.map(|id| post::Column::CategoryId.eq(id)))
        .add_option(query.location_id.map(|id| post::Column::LocationId.eq(id)));

    let select = PostEntity::find().filter(condition);
    let select = match query.order {
        PostOrder::NewestFirst => select.order_by_desc(post::Column::PubDate),
        PostOrder::OldestFirst => select.order_by_asc(post::Column::PubDate),
    };

    select
        .order_by_asc(post::Column::Id)
        .offset(query.offset)
        .limit(query.limit)
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        self.fetch(&PostQuery::new().by_author(author_id)).await
    }

    async fn fetch(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError> {
        tracing::debug!(?query, "Fetching posts");

        let result = select_posts(query)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn fetch_with_category(
        &self,
        query: &CategorizedPostQuery,
    ) -> Result<Vec<PostWithCategory>, RepoError> {
        tracing::debug!(query = ?query.query(), "Fetching posts with category");

        // LEFT JOIN on categories: posts without a category are kept.
        let rows = select_posts(query.query())
            .find_also_related(CategoryEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        rows.into_iter()
            .map(|(post, category)| -> Result<PostWithCategory, RepoError> {
                Ok(PostWithCategory {
                    post: post.into(),
                    category: category.map(Category::try_from).transpose()?,
                })
            })
            .collect()
    }
}
