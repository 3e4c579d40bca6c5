//! Meilisearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! that talks to the Meilisearch HTTP API with reqwest.

mod client_config;
mod provider;

pub use client_config::{MeilisearchConfig, DEFAULT_API_KEY_HEADER};
pub use provider::MeilisearchProvider;
