//! Plain-text rendering of tasks and counters.

use tasknest_core::{Stats, SubtaskStats, Task};
use time::OffsetDateTime;

/// One-line rendering: indentation, checkbox, id, text, optional due date.
#[must_use]
pub fn line(task: &Task) -> String {
    let indent = "  ".repeat(usize::from(task.indent_level));
    let mark = if task.completed { "x" } else { " " };
    let mut out = format!("{indent}[{mark}] #{} {}", task.id, task.text);
    if let Some(due) = task.due_date.and_then(format_day) {
        out.push_str(&format!(" (due {due})"));
    }
    out
}

/// Multi-line rendering of a task list, one task per line.
#[must_use]
pub fn listing(tasks: &[Task]) -> String {
    tasks.iter().map(line).collect::<Vec<_>>().join("\n")
}

/// Single-line stats summary.
#[must_use]
pub fn stats_line(stats: Stats) -> String {
    format!(
        "{} tasks: {} active, {} completed ({}%)",
        stats.total, stats.active, stats.completed, stats.completion_rate
    )
}

/// Single-line subtask summary for one parent.
#[must_use]
pub fn subtask_line(stats: SubtaskStats) -> String {
    format!(
        "{} subtasks: {} active, {} completed",
        stats.total, stats.active, stats.completed
    )
}

fn format_day(ms: i64) -> Option<String> {
    let secs = ms.div_euclid(1_000);
    OffsetDateTime::from_unix_timestamp(secs)
        .ok()
        .map(|moment| moment.date().to_string())
}
