use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publication fields shared by every content entity.
///
/// `created_at` is fixed when the value is created and has no setter;
/// `is_published` is the only part an editor can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Published {
    is_published: bool,
    created_at: DateTime<Utc>,
}

impl Published {
    pub const IS_PUBLISHED_LABEL: &'static str = "Опубликовано";
    pub const IS_PUBLISHED_HELP: &'static str = "Снимите галочку, чтобы скрыть публикацию.";
    pub const CREATED_AT_LABEL: &'static str = "Добавлено";

    /// Visible, created now.
    pub fn new() -> Self {
        Self::restore(true, Utc::now())
    }

    /// Hidden, created now.
    pub fn hidden() -> Self {
        Self::restore(false, Utc::now())
    }

    /// Rebuild from stored values.
    pub fn restore(is_published: bool, created_at: DateTime<Utc>) -> Self {
        Self {
            is_published,
            created_at,
        }
    }

    pub fn is_published(&self) -> bool {
        self.is_published
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn set_published(&mut self, is_published: bool) {
        self.is_published = is_published;
    }
}

impl Default for Published {
    fn default() -> Self {
        Self::new()
    }
}

/// Entities that carry [`Published`] fields.
pub trait Publishable {
    fn published(&self) -> &Published;

    fn published_mut(&mut self) -> &mut Published;

    fn is_published(&self) -> bool {
        self.published().is_published()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.published().created_at()
    }

    fn publish(&mut self) {
        self.published_mut().set_published(true);
    }

    fn unpublish(&mut self) {
        self.published_mut().set_published(false);
    }
}
