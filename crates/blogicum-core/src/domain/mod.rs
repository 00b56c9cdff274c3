//! Domain entities - the content schema of the blog.

mod category;
mod location;
mod post;
mod published;
mod user;
mod validate;

pub use category::{Category, Slug};
pub use location::Location;
pub use post::{Post, PostDraft, PostWithCategory};
pub use published::{Publishable, Published};
pub use user::User;

/// Human-readable names of an entity, as shown to editors.
pub trait Labeled {
    const VERBOSE_NAME: &'static str;
    const VERBOSE_NAME_PLURAL: &'static str;
}

/// Field constraints checked before an entity is written.
pub trait Validate {
    fn validate(&self) -> Result<(), crate::error::DomainError>;
}
