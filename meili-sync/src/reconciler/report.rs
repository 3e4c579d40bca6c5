//! Bulk reindex report and operator notification.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// How a bulk reindex ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// The record set was empty. No request was sent.
    Empty,
    /// Every batch was accepted.
    Complete,
    /// At least one batch failed.
    Partial,
    /// No credentials. No request was sent.
    NotConfigured,
    /// The record store could not be read.
    SourceUnavailable { reason: String },
}

/// Notification severity, matching the host UI's levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

/// User-facing result of an operator action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    /// Whether the notification stays until dismissed.
    pub sticky: bool,
}

/// Aggregate counts of one bulk reindex run.
///
/// `indexed + failed == total` once the run has finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub index_uid: String,
    /// Plural record name used in messages.
    pub label: String,
    pub outcome: ReconcileOutcome,
    pub total: usize,
    pub indexed: usize,
    pub failed: usize,
    /// Number of upsert requests sent.
    pub batches: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

const TITLE: &str = "Meilisearch Bulk Index";
const TITLE_COMPLETE: &str = "Meilisearch Bulk Index Complete";

impl ReconcileReport {
    pub(crate) fn start(index_uid: &str, label: &str) -> Self {
        let now = Utc::now();
        Self {
            index_uid: index_uid.to_string(),
            label: label.to_string(),
            outcome: ReconcileOutcome::Empty,
            total: 0,
            indexed: 0,
            failed: 0,
            batches: 0,
            started_at: now,
            finished_at: now,
        }
    }

    pub(crate) fn finish(mut self, outcome: ReconcileOutcome) -> Self {
        self.outcome = outcome;
        self.finished_at = Utc::now();
        self
    }

    /// Whether every record reached the index (trivially true when empty).
    pub fn is_success(&self) -> bool {
        matches!(
            self.outcome,
            ReconcileOutcome::Empty | ReconcileOutcome::Complete
        )
    }

    /// Build the notification shown to the operator.
    pub fn notification(&self) -> Notification {
        let label = &self.label;
        match &self.outcome {
            ReconcileOutcome::Empty => Notification {
                title: TITLE.to_string(),
                message: format!("No {} found to index.", label),
                severity: Severity::Warning,
                sticky: false,
            },
            ReconcileOutcome::Complete | ReconcileOutcome::Partial => {
                let mut message = format!(
                    "Successfully indexed {} {} to Meilisearch.",
                    self.indexed, label
                );
                if self.failed > 0 {
                    message.push_str(&format!(
                        " Failed to index {} {} (check logs for details).",
                        self.failed, label
                    ));
                }
                Notification {
                    title: TITLE_COMPLETE.to_string(),
                    message,
                    severity: if self.failed == 0 {
                        Severity::Success
                    } else {
                        Severity::Warning
                    },
                    sticky: true,
                }
            }
            ReconcileOutcome::NotConfigured => Notification {
                title: TITLE.to_string(),
                message: "Meilisearch host or admin key not configured.".to_string(),
                severity: Severity::Danger,
                sticky: true,
            },
            ReconcileOutcome::SourceUnavailable { reason } => Notification {
                title: TITLE.to_string(),
                message: format!("Could not read {} to index: {}", label, reason),
                severity: Severity::Danger,
                sticky: true,
            },
        }
    }
}
