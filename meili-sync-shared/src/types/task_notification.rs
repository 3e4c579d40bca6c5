//! Task status callback payload.
//!
//! The search service can call back when an asynchronous task finishes. Only
//! a handful of fields are named here; anything else is kept verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a task-completion callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNotification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_uid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_uid: Option<String>,
    /// Task status, e.g. `succeeded` or `failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Unrecognised fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskNotification {
    /// Build a notification from any JSON value without failing.
    ///
    /// Known fields are taken when their type fits (`taskUid` may also be a
    /// numeric string); otherwise they stay in `extra`. A value that is not
    /// an object is kept under `extra["payload"]`.
    pub fn from_value(value: Value) -> Self {
        let mut extra = match value {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("payload".to_string(), other);
                return Self {
                    extra: map,
                    ..Self::default()
                };
            }
        };

        let task_uid = match extra.get("taskUid") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        if task_uid.is_some() {
            extra.remove("taskUid");
        }

        Self {
            task_uid,
            index_uid: take_string(&mut extra, "indexUid"),
            status: take_string(&mut extra, "status"),
            extra,
        }
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(_)) => match map.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

impl From<Value> for TaskNotification {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}
