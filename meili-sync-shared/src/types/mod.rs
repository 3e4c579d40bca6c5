//! This module defines the core data structures used across the sync service.
//! It re-exports the document, settings, record and notification types.

pub mod index_document;
pub mod index_settings;
pub mod lot_record;
pub mod task_notification;

pub use index_document::IndexDocument;
pub use index_settings::IndexSettings;
pub use lot_record::{LotRecord, ProductRef};
pub use task_notification::TaskNotification;
