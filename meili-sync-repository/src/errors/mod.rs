//! Error types for the sync repository.
//!
//! This module provides the error type for search service operations and the
//! error type for reading host records.

mod record_source_error;
mod search_index_error;

pub use record_source_error::RecordSourceError;
pub use search_index_error::SearchIndexError;
