use crate::error::DomainError;

/// Reject blank values of a required text field.
pub(crate) fn required(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::RequiredField { entity, field });
    }
    Ok(())
}

/// Required and at most `max` characters long.
pub(crate) fn bounded(
    entity: &'static str,
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), DomainError> {
    required(entity, field, value)?;
    if value.chars().count() > max {
        return Err(DomainError::TooLong { entity, field, max });
    }
    Ok(())
}
