use crate::id::TaskId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Milliseconds since the Unix epoch, UTC.
pub type EpochMs = i64;

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_ms() -> EpochMs {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    i64::try_from(nanos / 1_000_000).unwrap_or(i64::MAX)
}

/// A single to-do item; the engine's only entity.
///
/// The wire form is camelCase JSON. `parentId`, `indentLevel`, and `dueDate`
/// default when absent so records written before those fields existed still
/// load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Process-unique identifier.
    pub id: TaskId,
    /// Task text, trimmed on every write.
    pub text: String,
    /// Completion flag, mutated only through the toggle cascade.
    pub completed: bool,
    /// Parent task; `None` for top-level tasks.
    #[serde(default)]
    pub parent_id: Option<TaskId>,
    /// Depth below the top level, nominally `0..=3`.
    #[serde(default)]
    pub indent_level: u8,
    /// Creation timestamp.
    pub created_at: EpochMs,
    /// Timestamp of the most recent mutation of this task.
    pub updated_at: EpochMs,
    /// Optional due date captured at creation time; immutable afterwards.
    #[serde(default)]
    pub due_date: Option<EpochMs>,
}
