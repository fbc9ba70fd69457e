use crate::task::{EpochMs, Task};
use serde::{Deserialize, Serialize};

/// Schema version stamped into export envelopes.
pub const EXPORT_VERSION: &str = "1.0";

/// The single durable record: the full task collection plus counter state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Tasks in store order.
    pub tasks: Vec<Task>,
    /// Next id the engine will assign.
    pub current_id: u64,
    /// When the record was written.
    pub saved_at: EpochMs,
}

/// Human-readable snapshot envelope produced by export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    /// Tasks in store order.
    pub tasks: Vec<Task>,
    /// ISO-8601 export timestamp.
    pub exported_at: String,
    /// Snapshot schema version.
    pub version: String,
}

/// Import accepts any payload carrying a `tasks` array; everything else in
/// the document is ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct ImportPayload {
    pub tasks: Vec<Task>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::id::TaskId;

    #[test]
    fn record_wire_form_is_camel_case() {
        let state = PersistedState {
            tasks: Vec::new(),
            current_id: 5,
            saved_at: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["currentId"], 5);
        assert_eq!(json["savedAt"], 1_700_000_000_000_i64);
    }

    #[test]
    fn older_records_without_hierarchy_fields_still_load() {
        let json = r#"{
            "tasks": [
                {"id": 1, "text": "a", "completed": false, "createdAt": 1, "updatedAt": 1}
            ],
            "currentId": 2,
            "savedAt": 10
        }"#;
        let state: PersistedState = serde_json::from_str(json).unwrap();
        assert_eq!(state.tasks[0].id, TaskId(1));
        assert_eq!(state.tasks[0].parent_id, None);
        assert_eq!(state.tasks[0].indent_level, 0);
        assert_eq!(state.tasks[0].due_date, None);
    }

    #[test]
    fn import_payload_ignores_extra_fields() {
        let json = r#"{"tasks": [], "exportedAt": "2026-01-01T00:00:00Z", "version": "1.0"}"#;
        let payload: ImportPayload = serde_json::from_str(json).unwrap();
        assert!(payload.tasks.is_empty());
    }
}
