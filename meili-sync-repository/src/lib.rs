//! # Meili Sync Repository
//!
//! This crate provides traits and implementations for the outbound side of
//! search synchronization: credential resolution, the search service client
//! (a concrete implementation for Meilisearch), read access to the host
//! record store (PostgreSQL), and the shared error types.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod meilisearch;
pub mod postgres;
pub mod types;
pub mod utils;

pub use config::{
    ConfigResolver, EnvParameterStore, MemoryParameterStore, ParameterStore, ServiceCredentials,
    ADMIN_KEY_PARAM, HOST_PARAM,
};
pub use errors::{RecordSourceError, SearchIndexError};
pub use interfaces::{RecordSource, SearchIndexProvider};
pub use meilisearch::{MeilisearchConfig, MeilisearchProvider, DEFAULT_API_KEY_HEADER};
pub use postgres::{PostgresLotSource, PostgresParameterStore};
pub use types::{AuthScheme, ConnectionReport};
pub use utils::validate_index_uid;
