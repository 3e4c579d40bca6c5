//! # Meili Sync Shared
//!
//! This crate defines the data structures shared across the Meilisearch sync
//! workspace: the flat documents pushed to an index, the index settings
//! payload, the read-only projections of host records, and the task
//! notification payload delivered by the search service.

pub mod types;

pub use types::index_document::IndexDocument;
pub use types::index_settings::IndexSettings;
pub use types::lot_record::{LotRecord, ProductRef};
pub use types::task_notification::TaskNotification;
