//! Domain-level error types.

use std::convert::Infallible;

use thiserror::Error;

/// Domain errors - invalid entity state caught before it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{entity}.{field} is required")]
    RequiredField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("{entity}.{field} exceeds {max} characters")]
    TooLong {
        entity: &'static str,
        field: &'static str,
        max: usize,
    },

    #[error("Invalid slug {0:?}: only latin letters, digits, hyphen and underscore are allowed")]
    InvalidSlug(String),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    /// A unique constraint rejected the write. Callers decide what to do;
    /// repositories never retry.
    #[error("Duplicate value: {0}")]
    Duplicate(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

impl RepoError {
    /// True when the error is a uniqueness violation.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, RepoError::Duplicate(_))
    }
}

impl From<Infallible> for RepoError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
