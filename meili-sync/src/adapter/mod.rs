//! Record to document adapters.
//!
//! A [`DocumentAdapter`] names the index a record type lives in and turns
//! records into [`IndexDocument`]s. There is one adapter per indexed record
//! type; each is a plain value with no I/O.

mod lot;

pub use lot::{digits_only, LotAdapter, LOTS_INDEX};

use meili_sync_shared::{IndexDocument, IndexSettings};

/// Converts host records of one type into search documents.
///
/// `produce_documents` must be pure: no I/O, one document per record, each
/// with a non-empty string `id` taken from [`document_id`](Self::document_id).
/// Absent related fields are emitted as `""`.
pub trait DocumentAdapter: Send + Sync {
    /// Host record type this adapter reads.
    type Record: Send + Sync;

    /// Identifier of the target index, constant per adapter.
    fn index_id(&self) -> &str;

    /// Primary key field of the index.
    fn primary_key(&self) -> &str {
        IndexDocument::ID_FIELD
    }

    /// Plural name used in operator messages, e.g. `lots`.
    fn record_label(&self) -> &str;

    /// String form of the record's unique identifier.
    fn document_id(&self, record: &Self::Record) -> String;

    /// Build one document per record.
    ///
    /// The default emits only the mandatory `id` field.
    fn produce_documents(&self, records: &[Self::Record]) -> Vec<IndexDocument> {
        records
            .iter()
            .map(|record| IndexDocument::new(self.document_id(record)))
            .collect()
    }

    /// Settings applied before a bulk reindex. `None` leaves the index as is.
    fn index_settings(&self) -> Option<IndexSettings> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoteAdapter;

    impl DocumentAdapter for NoteAdapter {
        type Record = (u32, &'static str);

        fn index_id(&self) -> &str {
            "notes"
        }

        fn record_label(&self) -> &str {
            "notes"
        }

        fn document_id(&self, record: &Self::Record) -> String {
            record.0.to_string()
        }
    }

    #[test]
    fn test_default_documents_carry_only_id() {
        let docs = NoteAdapter.produce_documents(&[(1, "a"), (22, "b")]);

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id(), Some("1"));
        assert_eq!(docs[1].id(), Some("22"));
        assert!(docs.iter().all(|doc| doc.len() == 1));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(NoteAdapter.primary_key(), "id");
        assert!(NoteAdapter.index_settings().is_none());
        assert!(NoteAdapter.produce_documents(&[]).is_empty());
    }
}
