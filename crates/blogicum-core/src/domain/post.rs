use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Validate, validate};
use super::{Category, Labeled, Publishable, Published};
use crate::error::DomainError;

/// Post entity - a blog publication.
///
/// `pub_date` may lie in the future to schedule a post. Hiding scheduled
/// posts is up to whoever lists them (see `PostQuery::pub_date_until`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub location_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    #[serde(flatten)]
    pub published: Published,
}

impl Post {
    pub const TITLE_MAX_LEN: usize = 256;

    pub const TITLE_LABEL: &'static str = "Название";
    pub const TEXT_LABEL: &'static str = "Текст";
    pub const PUB_DATE_LABEL: &'static str = "Дата и время публикации";
    pub const AUTHOR_LABEL: &'static str = "Автор публикации";
    pub const LOCATION_LABEL: &'static str = "Местоположение";
    pub const CATEGORY_LABEL: &'static str = "Категория";
    pub const PUB_DATE_HELP: &'static str =
        "Если установить дату и время в будущем — можно делать отложенные публикации.";

    /// Create a new, published post without location or category.
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        pub_date: DateTime<Utc>,
        author_id: Uuid,
    ) -> Result<Self, DomainError> {
        PostDraft::new()
            .title(title)
            .text(text)
            .pub_date(pub_date)
            .author(author_id)
            .build()
    }
}

impl Publishable for Post {
    fn published(&self) -> &Published {
        &self.published
    }

    fn published_mut(&mut self) -> &mut Published {
        &mut self.published
    }
}

impl Labeled for Post {
    const VERBOSE_NAME: &'static str = "публикация";
    const VERBOSE_NAME_PLURAL: &'static str = "Публикации";
}

impl Validate for Post {
    fn validate(&self) -> Result<(), DomainError> {
        validate::bounded("post", "title", &self.title, Self::TITLE_MAX_LEN)?;
        validate::required("post", "text", &self.text)
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Incrementally assembled post, e.g. from submitted form data.
///
/// `build` reports the first missing required field.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    title: Option<String>,
    text: Option<String>,
    pub_date: Option<DateTime<Utc>>,
    author_id: Option<Uuid>,
    location_id: Option<Uuid>,
    category_id: Option<Uuid>,
    hidden: bool,
}

impl PostDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn pub_date(mut self, pub_date: DateTime<Utc>) -> Self {
        self.pub_date = Some(pub_date);
        self
    }

    pub fn author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn location(mut self, location_id: Uuid) -> Self {
        self.location_id = Some(location_id);
        self
    }

    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Start unpublished.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn build(self) -> Result<Post, DomainError> {
        let missing = |field| DomainError::RequiredField {
            entity: "post",
            field,
        };

        let post = Post {
            id: Uuid::new_v4(),
            title: self.title.ok_or_else(|| missing("title"))?,
            text: self.text.ok_or_else(|| missing("text"))?,
            pub_date: self.pub_date.ok_or_else(|| missing("pub_date"))?,
            author_id: self.author_id.ok_or_else(|| missing("author"))?,
            location_id: self.location_id,
            category_id: self.category_id,
            published: if self.hidden {
                Published::hidden()
            } else {
                Published::new()
            },
        };
        post.validate()?;
        Ok(post)
    }
}

/// A post together with its category, loaded in the same query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWithCategory {
    #[serde(flatten)]
    pub post: Post,
    pub category: Option<Category>,
}
