//! PostgreSQL access to the host record store.
//!
//! Read-only: lots are projected for indexing and configuration parameters are
//! snapshotted for credential resolution. Writes stay with the host.

mod lot_source;
mod parameter_store;

pub use lot_source::PostgresLotSource;
pub use parameter_store::PostgresParameterStore;
