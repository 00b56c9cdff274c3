//! Post query builder.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::Post;

/// Sort order of post listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostOrder {
    /// Latest `pub_date` first.
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Filters, ordering and paging for post listings.
///
/// Every filter is opt-in; an empty query returns all posts.
///
/// ```
/// use blogicum_core::ports::PostQuery;
/// use chrono::Utc;
///
/// let feed = PostQuery::new()
///     .published()
///     .pub_date_until(Utc::now())
///     .limit(10)
///     .with_category();
/// assert_eq!(feed.query().limit, Some(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub published_only: bool,
    pub pub_date_until: Option<DateTime<Utc>>,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub order: PostOrder,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl PostQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only posts with `is_published` set.
    pub fn published(mut self) -> Self {
        self.published_only = true;
        self
    }

    /// Only posts whose `pub_date` is not after `until`.
    pub fn pub_date_until(mut self, until: DateTime<Utc>) -> Self {
        self.pub_date_until = Some(until);
        self
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn at_location(mut self, location_id: Uuid) -> Self {
        self.location_id = Some(location_id);
        self
    }

    pub fn oldest_first(mut self) -> Self {
        self.order = PostOrder::OldestFirst;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Same query, with each post's category joined into the result.
    pub fn with_category(self) -> CategorizedPostQuery {
        CategorizedPostQuery(self)
    }

    /// Whether `post` passes the filters. Ordering and paging are not applied.
    pub fn matches(&self, post: &Post) -> bool {
        if self.published_only && !post.published.is_published() {
            return false;
        }
        if self.pub_date_until.is_some_and(|until| post.pub_date > until) {
            return false;
        }
        if self.author_id.is_some_and(|id| post.author_id != id) {
            return false;
        }
        if self.category_id.is_some_and(|id| post.category_id != Some(id)) {
            return false;
        }
        if self.location_id.is_some_and(|id| post.location_id != Some(id)) {
            return false;
        }
        true
    }

    /// Filter, sort and page an in-memory collection of posts.
    ///
    /// Ties on `pub_date` are broken by id so paging is stable.
    pub fn apply<'a, I>(&self, posts: I) -> Vec<Post>
    where
        I: IntoIterator<Item = &'a Post>,
    {
        let mut selected: Vec<Post> = posts
            .into_iter()
            .filter(|post| self.matches(post))
            .cloned()
            .collect();

        selected.sort_by(|a, b| match self.order {
            PostOrder::NewestFirst => b.pub_date.cmp(&a.pub_date).then(a.id.cmp(&b.id)),
            PostOrder::OldestFirst => a.pub_date.cmp(&b.pub_date).then(a.id.cmp(&b.id)),
        });

        let offset = self
            .offset
            .map_or(0, |o| usize::try_from(o).unwrap_or(usize::MAX));
        let limit = self
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        selected.into_iter().skip(offset).take(limit).collect()
    }
}

/// A [`PostQuery`] whose results carry their category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorizedPostQuery(PostQuery);

impl CategorizedPostQuery {
    pub fn query(&self) -> &PostQuery {
        &self.0
    }

    pub fn into_query(self) -> PostQuery {
        self.0
    }
}

impl From<PostQuery> for CategorizedPostQuery {
    fn from(query: PostQuery) -> Self {
        query.with_category()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostDraft;
    use chrono::Duration;

    fn post_at(author: Uuid, offset_days: i64) -> Post {
        PostDraft::new()
            .title("Пост")
            .text("Текст")
            .pub_date(Utc::now() + Duration::days(offset_days))
            .author(author)
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_query_keeps_everything_newest_first() {
        let author = Uuid::new_v4();
        let posts = vec![post_at(author, -2), post_at(author, 0), post_at(author, -1)];

        let result = PostQuery::new().apply(&posts);

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].id, posts[1].id);
        assert_eq!(result[2].id, posts[0].id);
    }

    #[test]
    fn test_published_and_scheduled_filters() {
        let author = Uuid::new_v4();
        let mut hidden = post_at(author, -1);
        hidden.published.set_published(false);
        let scheduled = post_at(author, 7);
        let visible = post_at(author, -1);
        let posts = vec![hidden, scheduled, visible.clone()];

        let result = PostQuery::new()
            .published()
            .pub_date_until(Utc::now())
            .apply(&posts);

        assert_eq!(result, vec![visible]);
    }

    #[test]
    fn test_paging() {
        let author = Uuid::new_v4();
        let posts: Vec<Post> = (0..5).map(|d| post_at(author, -d)).collect();

        let page = PostQuery::new().oldest_first().offset(1).limit(2).apply(&posts);

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, posts[3].id);
        assert_eq!(page[1].id, posts[2].id);
    }

    #[test]
    fn test_paging_saturates_large_bounds() {
        let author = Uuid::new_v4();
        let posts: Vec<Post> = (0..3).map(|d| post_at(author, -d)).collect();

        assert_eq!(PostQuery::new().limit(u64::MAX).apply(&posts).len(), 3);
        assert!(PostQuery::new().offset(u64::MAX).apply(&posts).is_empty());
    }

    #[test]
    fn test_with_category_keeps_filters() {
        let category = Uuid::new_v4();
        let query = PostQuery::new().in_category(category).limit(3);
        let categorized = query.clone().with_category();
        assert_eq!(categorized.query(), &query);
    }
}
