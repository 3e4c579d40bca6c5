//! Index settings payload.
//!
//! This module defines the settings object sent to an index's settings
//! endpoint. The service applies it with overwrite semantics: every field that
//! is present replaces the stored value, so sending the same settings twice is
//! harmless.

use serde::{Deserialize, Serialize};

/// Ranking, searchable, filterable and tokenizer configuration for an index.
///
/// Fields that are `None` are omitted from the payload and left untouched on
/// the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSettings {
    /// Ordered ranking rules (e.g. `words`, `typo`, `exactness`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking_rules: Option<Vec<String>>,
    /// Attributes searched by full-text queries, in order of importance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searchable_attributes: Option<Vec<String>>,
    /// Attributes usable in filter expressions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filterable_attributes: Option<Vec<String>>,
    /// Attributes usable for sorting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sortable_attributes: Option<Vec<String>>,
    /// Extra characters treated as word separators by the tokenizer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator_tokens: Option<Vec<String>>,
    /// Characters the tokenizer must never split on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_separator_tokens: Option<Vec<String>>,
}

/// The service's default ranking rules, in order.
pub const DEFAULT_RANKING_RULES: [&str; 6] =
    ["words", "typo", "proximity", "attribute", "sort", "exactness"];

impl IndexSettings {
    /// Create an empty settings object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the service's default ranking rules.
    pub fn with_default_ranking_rules(mut self) -> Self {
        self.ranking_rules = Some(to_strings(&DEFAULT_RANKING_RULES));
        self
    }

    /// Set the searchable attributes.
    pub fn with_searchable_attributes(mut self, attributes: &[&str]) -> Self {
        self.searchable_attributes = Some(to_strings(attributes));
        self
    }

    /// Set the filterable attributes.
    pub fn with_filterable_attributes(mut self, attributes: &[&str]) -> Self {
        self.filterable_attributes = Some(to_strings(attributes));
        self
    }

    /// Set the sortable attributes.
    pub fn with_sortable_attributes(mut self, attributes: &[&str]) -> Self {
        self.sortable_attributes = Some(to_strings(attributes));
        self
    }

    /// Set the extra separator tokens.
    pub fn with_separator_tokens(mut self, tokens: &[&str]) -> Self {
        self.separator_tokens = Some(to_strings(tokens));
        self
    }

    /// Set the non-separator tokens.
    pub fn with_non_separator_tokens(mut self, tokens: &[&str]) -> Self {
        self.non_separator_tokens = Some(to_strings(tokens));
        self
    }

    /// Check if any setting is present.
    pub fn has_settings(&self) -> bool {
        self.ranking_rules.is_some()
            || self.searchable_attributes.is_some()
            || self.filterable_attributes.is_some()
            || self.sortable_attributes.is_some()
            || self.separator_tokens.is_some()
            || self.non_separator_tokens.is_some()
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
