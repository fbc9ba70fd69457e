use tasknest_core::{Task, TaskEngine, TaskId};
use tracing::warn;

use crate::store::StateStore;

/// Service façade that wires the hierarchy engine to a durable store and
/// the date extractor.
///
/// The service owns exactly one engine instance; consumers go through it
/// (or its engine accessors) rather than any shared global state.
pub struct TaskService<S> {
    engine: TaskEngine,
    store: S,
    extract_dates: bool,
}

impl<S> TaskService<S> {
    /// Create a service over `store`. `extract_dates` controls whether
    /// [`Self::add`] scans input for due-date phrases.
    pub fn new(store: S, extract_dates: bool) -> Self
    where
        S: StateStore,
    {
        Self {
            engine: TaskEngine::new(),
            store,
            extract_dates,
        }
    }

    /// Borrow the engine for queries.
    pub const fn engine(&self) -> &TaskEngine {
        &self.engine
    }

    /// Mutable engine access for direct operations.
    pub const fn engine_mut(&mut self) -> &mut TaskEngine {
        &mut self.engine
    }
}

impl<S: StateStore> TaskService<S> {
    /// Create a task from raw input text.
    ///
    /// Runs the date extractor over the input (when enabled) and derives
    /// the indent level from the parent. Returns `None` for blank text or
    /// an unknown parent, same as the engine.
    pub fn add(&mut self, raw_text: &str, parent_id: Option<TaskId>) -> Option<Task> {
        let (text, due_date) = if self.extract_dates {
            let extraction = tasknest_dates::parse(raw_text);
            (extraction.clean_text, extraction.due_date)
        } else {
            (raw_text.trim().to_owned(), None)
        };
        let level = parent_id
            .and_then(|parent| self.engine.by_id(parent))
            .map_or(0, |parent| parent.indent_level + 1);
        self.engine.create(&text, parent_id, level, due_date)
    }

    /// Persist the full engine state.
    ///
    /// Failures are logged and reported as `false`; in-memory state is
    /// never touched by a failed save.
    pub fn save(&mut self) -> bool {
        let record = self.engine.to_persisted();
        match self.store.write_state(&record) {
            Ok(()) => true,
            Err(err) => {
                let err: anyhow::Error = err.into();
                warn!("save failed: {err:#}");
                false
            }
        }
    }

    /// Load the durable record into the engine.
    ///
    /// Missing or unreadable data reads as "no data" and reports `false`,
    /// leaving the current in-memory state exactly as it was.
    pub fn load(&mut self) -> bool {
        match self.store.read_state() {
            Ok(Some(state)) => {
                self.engine.restore(state);
                true
            }
            Ok(None) => false,
            Err(err) => {
                let err: anyhow::Error = err.into();
                warn!("load failed: {err:#}");
                false
            }
        }
    }
}
