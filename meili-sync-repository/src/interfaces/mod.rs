//! Interface definitions for the sync repository.
//!
//! This module defines the abstract `SearchIndexProvider` and `RecordSource`
//! traits that allow for dependency injection and swappable implementations.

mod record_source;
mod search_index_provider;

pub use record_source::RecordSource;
pub use search_index_provider::SearchIndexProvider;
