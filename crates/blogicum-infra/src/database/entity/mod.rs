//! SeaORM entities, one per table.

pub mod category;
pub mod location;
pub mod post;
pub mod user;

use sea_orm::entity::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveValue, Set};

/// `created_at` is written once: the insert instant, whatever the caller
/// supplied, and never sent on update.
pub(crate) fn stamp_created_at(created_at: &mut ActiveValue<DateTimeWithTimeZone>, insert: bool) {
    *created_at = if insert {
        Set(chrono::Utc::now().into())
    } else {
        ActiveValue::NotSet
    };
}
