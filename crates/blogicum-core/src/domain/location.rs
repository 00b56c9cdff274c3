use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Validate, validate};
use super::{Labeled, Publishable, Published};
use crate::error::DomainError;

/// Location entity - a named place a post can be attached to.
///
/// Names are not unique; two places may share a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub published: Published,
}

impl Location {
    pub const NAME_MAX_LEN: usize = 256;
    pub const NAME_LABEL: &'static str = "Название места";

    /// Create a new, published location.
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let location = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            published: Published::new(),
        };
        location.validate()?;
        Ok(location)
    }
}

impl Publishable for Location {
    fn published(&self) -> &Published {
        &self.published
    }

    fn published_mut(&mut self) -> &mut Published {
        &mut self.published
    }
}

impl Labeled for Location {
    const VERBOSE_NAME: &'static str = "местоположение";
    const VERBOSE_NAME_PLURAL: &'static str = "Местоположения";
}

impl Validate for Location {
    fn validate(&self) -> Result<(), DomainError> {
        validate::bounded("location", "name", &self.name, Self::NAME_MAX_LEN)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_location_is_published() {
        let location = Location::new("Остров радости").unwrap();
        assert!(location.is_published());
        assert_eq!(location.to_string(), "Остров радости");
        assert_eq!(Location::VERBOSE_NAME_PLURAL, "Местоположения");
        assert_eq!(Location::NAME_LABEL, "Название места");
    }

    #[test]
    fn test_name_is_required() {
        assert_eq!(
            Location::new(""),
            Err(DomainError::RequiredField {
                entity: "location",
                field: "name"
            })
        );
    }

    #[test]
    fn test_name_length_limit() {
        assert!(Location::new("a".repeat(256)).is_ok());
        assert!(matches!(
            Location::new("a".repeat(257)),
            Err(DomainError::TooLong { max: 256, .. })
        ));
    }

    #[test]
    fn test_serializes_flat() {
        let location = Location::new("Планета Земля").unwrap();
        let json = serde_json::to_value(&location).unwrap();
        assert_eq!(json["is_published"], true);
        assert!(json.get("created_at").is_some());
        assert!(json.get("published").is_none());
    }
}
