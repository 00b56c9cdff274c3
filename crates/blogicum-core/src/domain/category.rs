use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Validate, validate};
use super::{Labeled, Publishable, Published};
use crate::error::DomainError;

/// URL identifier of a category: latin letters, digits, `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub const MAX_LEN: usize = 50;
    pub const HELP: &'static str = "Идентификатор страницы для URL; \
         разрешены символы латиницы, цифры, дефис и подчёркивание.";

    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        validate::bounded("category", "slug", &value, Self::MAX_LEN)?;

        let allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
        if !value.chars().all(allowed) {
            return Err(DomainError::InvalidSlug(value));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Slug {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category entity - a titled grouping of posts addressed by its slug.
///
/// Slugs are unique across all categories; storage rejects duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub slug: Slug,
    #[serde(flatten)]
    pub published: Published,
}

impl Category {
    pub const TITLE_MAX_LEN: usize = 256;

    pub const TITLE_LABEL: &'static str = "Заголовок";
    pub const DESCRIPTION_LABEL: &'static str = "Описание";
    pub const SLUG_LABEL: &'static str = "Идентификатор";

    /// Create a new, published category.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        slug: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let category = Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            slug: Slug::parse(slug)?,
            published: Published::new(),
        };
        category.validate()?;
        Ok(category)
    }
}

impl Publishable for Category {
    fn published(&self) -> &Published {
        &self.published
    }

    fn published_mut(&mut self) -> &mut Published {
        &mut self.published
    }
}

impl Labeled for Category {
    const VERBOSE_NAME: &'static str = "категория";
    const VERBOSE_NAME_PLURAL: &'static str = "Категории";
}

impl Validate for Category {
    fn validate(&self) -> Result<(), DomainError> {
        validate::bounded("category", "title", &self.title, Self::TITLE_MAX_LEN)?;
        validate::required("category", "description", &self.description)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
