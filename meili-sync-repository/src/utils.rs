//! Utility functions for the sync repository.

use reqwest::StatusCode;

use crate::errors::SearchIndexError;

/// Validate an index identifier.
///
/// The service accepts identifiers made of ASCII alphanumerics, `-` and `_`.
///
/// # Example
///
/// ```
/// use meili_sync_repository::validate_index_uid;
///
/// assert!(validate_index_uid("lots").is_ok());
/// assert!(validate_index_uid("lots/v2").is_err());
/// ```
pub fn validate_index_uid(index_uid: &str) -> Result<(), SearchIndexError> {
    if index_uid.is_empty() {
        return Err(SearchIndexError::validation("Index uid cannot be empty"));
    }

    if !index_uid
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(SearchIndexError::validation(format!(
            "Index uid '{}' contains invalid characters. Only alphanumeric characters, hyphens and underscores are allowed",
            index_uid
        )));
    }

    Ok(())
}

/// Statuses treated as success for document writes.
pub fn is_write_accepted(status: StatusCode) -> bool {
    matches!(status.as_u16(), 200 | 201 | 202)
}

/// Statuses treated as success for settings updates.
pub fn is_settings_accepted(status: StatusCode) -> bool {
    matches!(status.as_u16(), 200 | 202)
}
