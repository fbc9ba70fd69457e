//! The task store and hierarchy engine.
//!
//! One engine instance owns the ordered task collection and the id counter;
//! it is the sole writer. The flat sequence is the source of truth for both
//! render order and hierarchy position; id and children indexes are rebuilt
//! after structural mutations so descendant and sibling lookups avoid
//! repeated linear scans. Every operation is synchronous and runs to
//! completion before returning.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::filter::TaskFilter;
use crate::id::TaskId;
use crate::record::{EXPORT_VERSION, ExportEnvelope, ImportPayload, PersistedState};
use crate::task::{EpochMs, Task, now_ms};
use crate::text_matcher::TextMatcher;

/// Maximum nesting depth below the top level.
pub const MAX_INDENT: u8 = 3;

const FIRST_ID: u64 = 1;
const SEARCH_CACHE_CAPACITY: usize = 100;
const STATS_TTL: Duration = Duration::from_millis(100);

/// Aggregate completion counters over the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Number of tasks in the collection.
    pub total: usize,
    /// Tasks not yet complete.
    pub active: usize,
    /// Tasks marked complete.
    pub completed: usize,
    /// Rounded integer percentage of completed tasks; 0 when empty.
    pub completion_rate: u8,
}

/// Direct-children counters for one parent (one level, not the subtree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubtaskStats {
    /// Direct children.
    pub total: usize,
    /// Direct children marked complete.
    pub completed: usize,
    /// Direct children not yet complete.
    pub active: usize,
}

/// Bounded cache of search results keyed by `(query, collection size)`.
///
/// Eviction is oldest-inserted-first, not least-recently-used. Any mutation
/// clears the whole cache, so entries never outlive the collection state
/// they were computed from.
#[derive(Debug, Default)]
struct SearchCache {
    entries: HashMap<(String, usize), Vec<TaskId>>,
    order: VecDeque<(String, usize)>,
}

impl SearchCache {
    fn get(&self, key: &(String, usize)) -> Option<&Vec<TaskId>> {
        self.entries.get(key)
    }

    fn insert(&mut self, key: (String, usize), ids: Vec<TaskId>) {
        if self.entries.insert(key.clone(), ids).is_some() {
            return;
        }
        self.order.push_back(key);
        if self.order.len() > SEARCH_CACHE_CAPACITY
            && let Some(oldest) = self.order.pop_front()
        {
            self.entries.remove(&oldest);
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

/// The task store and hierarchy engine.
#[derive(Debug)]
pub struct TaskEngine {
    tasks: Vec<Task>,
    next_id: u64,
    position: HashMap<TaskId, usize>,
    children: HashMap<TaskId, Vec<TaskId>>,
    search_cache: SearchCache,
    stats_cache: Option<(Instant, Stats)>,
}

impl Default for TaskEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskEngine {
    /// Create an empty engine with a fresh id counter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: FIRST_ID,
            position: HashMap::new(),
            children: HashMap::new(),
            search_cache: SearchCache::default(),
            stats_cache: None,
        }
    }

    /// Every task in store order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of tasks in the collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Look up a task by id.
    #[must_use]
    pub fn by_id(&self, id: TaskId) -> Option<&Task> {
        self.position.get(&id).and_then(|&idx| self.tasks.get(idx))
    }

    /// Position of a task in the ordered collection.
    #[must_use]
    pub fn position_of(&self, id: TaskId) -> Option<usize> {
        self.position.get(&id).copied()
    }

    /// Direct children of `id` in store order.
    #[must_use]
    pub fn children_of(&self, id: TaskId) -> &[TaskId] {
        self.children.get(&id).map_or(&[], |children| children.as_slice())
    }

    /// Ids of every task below `id`, collected through the parent relation
    /// at any depth.
    #[must_use]
    pub fn descendants_of(&self, id: TaskId) -> Vec<TaskId> {
        let mut collected = Vec::new();
        let mut pending = self.children_of(id).to_vec();
        while let Some(next) = pending.pop() {
            collected.push(next);
            pending.extend_from_slice(self.children_of(next));
        }
        collected
    }

    /// Create a task at the end of the collection.
    ///
    /// Returns `None` when the trimmed text is empty or when `parent_id`
    /// does not reference an existing task. With a parent the requested
    /// level is forced into `1..=MAX_INDENT`; without one it is forced to 0.
    pub fn create(
        &mut self,
        text: &str,
        parent_id: Option<TaskId>,
        indent_level: u8,
        due_date: Option<EpochMs>,
    ) -> Option<Task> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if parent_id.is_some_and(|parent| self.by_id(parent).is_none()) {
            return None;
        }
        let level = if parent_id.is_some() {
            indent_level.clamp(1, MAX_INDENT)
        } else {
            0
        };
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let now = now_ms();
        let task = Task {
            id,
            text: trimmed.to_owned(),
            completed: false,
            parent_id,
            indent_level: level,
            created_at: now,
            updated_at: now,
            due_date,
        };
        self.tasks.push(task.clone());
        self.rebuild_indexes();
        self.invalidate_caches();
        Some(task)
    }

    /// Overwrite a task's text (trimmed) and refresh its `updated_at`.
    ///
    /// The engine never auto-deletes on an empty update; callers route
    /// empty edits to [`Self::delete`].
    pub fn update(&mut self, id: TaskId, text: &str) -> Option<Task> {
        let idx = *self.position.get(&id)?;
        let task = self.tasks.get_mut(idx)?;
        task.text = text.trim().to_owned();
        task.updated_at = now_ms();
        let updated = task.clone();
        self.invalidate_caches();
        Some(updated)
    }

    /// Flip a task's completion flag and settle the cascade.
    ///
    /// In fixed order after the flip: descendants of a newly-complete task
    /// are forced complete at any depth; a newly-incomplete task forces its
    /// immediate parent incomplete; a newly-complete task whose siblings are
    /// all complete forces its immediate parent complete. Parent corrections
    /// stop after one level and do not re-trigger up the chain.
    pub fn toggle_complete(&mut self, id: TaskId) -> Option<Task> {
        let idx = *self.position.get(&id)?;
        let now = now_ms();
        let (completed, parent_id) = {
            let task = self.tasks.get_mut(idx)?;
            task.completed = !task.completed;
            task.updated_at = now;
            (task.completed, task.parent_id)
        };

        if completed {
            self.force_descendants_complete(id, now);
        }
        if let Some(parent) = parent_id {
            if completed {
                self.complete_parent_if_siblings_done(parent, now);
            } else {
                self.set_completed(parent, false, now);
            }
        }

        let toggled = self.by_id(id).cloned();
        self.invalidate_caches();
        toggled
    }

    /// Delete a task together with its full descendant set.
    ///
    /// Returns the originally targeted task; descendants are removed
    /// silently.
    pub fn delete(&mut self, id: TaskId) -> Option<Task> {
        let idx = *self.position.get(&id)?;
        let target = self.tasks.get(idx)?.clone();
        let mut doomed: HashSet<TaskId> = self.descendants_of(id).into_iter().collect();
        doomed.insert(id);
        self.tasks.retain(|task| !doomed.contains(&task.id));
        self.rebuild_indexes();
        self.invalidate_caches();
        Some(target)
    }

    /// Indent a task one level, reparenting onto its positional predecessor.
    ///
    /// Fails for the first task in the collection and for tasks already at
    /// [`MAX_INDENT`]. The new level is always one more than the
    /// predecessor's level at call time, and the predecessor becomes the
    /// parent whether or not its own level lines up with the mover's
    /// previous depth.
    pub fn indent(&mut self, id: TaskId) -> Option<Task> {
        let idx = *self.position.get(&id)?;
        if idx == 0 || self.tasks.get(idx)?.indent_level >= MAX_INDENT {
            return None;
        }
        let (prev_id, prev_level) = {
            let prev = self.tasks.get(idx - 1)?;
            (prev.id, prev.indent_level)
        };
        let task = self.tasks.get_mut(idx)?;
        task.indent_level = prev_level + 1;
        task.parent_id = Some(prev_id);
        task.updated_at = now_ms();
        let updated = task.clone();
        self.rebuild_indexes();
        self.invalidate_caches();
        Some(updated)
    }

    /// Outdent a task one level.
    ///
    /// Fails at level 0. Reaching level 0 clears the parent; otherwise the
    /// nearest preceding task one level up becomes the parent. When no such
    /// task precedes it, the old parent reference is left in place, stale.
    pub fn outdent(&mut self, id: TaskId) -> Option<Task> {
        let idx = *self.position.get(&id)?;
        let level = self.tasks.get(idx)?.indent_level;
        if level == 0 {
            return None;
        }
        let new_level = level - 1;
        let new_parent = if new_level == 0 {
            Some(None)
        } else {
            self.tasks[..idx]
                .iter()
                .rev()
                .find(|candidate| candidate.indent_level == new_level - 1)
                .map(|candidate| Some(candidate.id))
        };
        let task = self.tasks.get_mut(idx)?;
        task.indent_level = new_level;
        if let Some(parent) = new_parent {
            task.parent_id = parent;
        }
        task.updated_at = now_ms();
        let updated = task.clone();
        self.rebuild_indexes();
        self.invalidate_caches();
        Some(updated)
    }

    /// Move one element of the collection between positions.
    ///
    /// Positional only: neither `indent_level` nor `parent_id` is adjusted,
    /// so reordering across hierarchy boundaries can leave a visually
    /// inconsistent tree until a later indent or outdent repairs it. Counts
    /// and text matches are unaffected, so the search and stats caches are
    /// deliberately left alone.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.tasks.len() || to >= self.tasks.len() {
            return false;
        }
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        self.rebuild_indexes();
        true
    }

    /// Remove every completed task, returning how many were removed.
    ///
    /// Completed subtasks go too, even when their parent stays; an active
    /// parent's subtree is never cascade-deleted by this call, which can
    /// leave a child with a dangling parent reference.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        let removed = before - self.tasks.len();
        if removed > 0 {
            self.rebuild_indexes();
        }
        self.invalidate_caches();
        removed
    }

    /// Empty the collection and reset the id counter to its initial value.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.tasks.len();
        self.tasks.clear();
        self.next_id = FIRST_ID;
        self.rebuild_indexes();
        self.invalidate_caches();
        removed
    }

    /// Tasks matching `filter`, in store order.
    #[must_use]
    pub fn by_filter(&self, filter: TaskFilter) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect()
    }

    /// Direct-children counters for `parent_id`.
    #[must_use]
    pub fn subtask_stats(&self, parent_id: TaskId) -> SubtaskStats {
        let mut stats = SubtaskStats::default();
        for child in self.children_of(parent_id) {
            if let Some(task) = self.by_id(*child) {
                stats.total += 1;
                if task.completed {
                    stats.completed += 1;
                } else {
                    stats.active += 1;
                }
            }
        }
        stats
    }

    /// Find tasks whose text contains the query as a substring or in-order
    /// subsequence.
    ///
    /// Results are cached per `(query, collection size)` until the next
    /// mutation; a blank query returns the full collection and clears the
    /// cache.
    pub fn search(&mut self, query: &str) -> Vec<Task> {
        let Some(matcher) = TextMatcher::new(query) else {
            self.search_cache.clear();
            return self.tasks.clone();
        };
        let key = (matcher.needle().to_owned(), self.tasks.len());
        if let Some(ids) = self.search_cache.get(&key) {
            return ids.iter().filter_map(|&id| self.by_id(id)).cloned().collect();
        }
        let matches: Vec<Task> = self
            .tasks
            .iter()
            .filter(|task| matcher.matches(&task.text))
            .cloned()
            .collect();
        let ids = matches.iter().map(|task| task.id).collect();
        self.search_cache.insert(key, ids);
        matches
    }

    /// Aggregate counters, recomputed at most every 100 ms.
    ///
    /// Staleness inside the window is tolerated by contract; any mutation
    /// drops the cached value immediately.
    pub fn stats(&mut self) -> Stats {
        if let Some((stamp, cached)) = self.stats_cache
            && stamp.elapsed() < STATS_TTL
        {
            return cached;
        }
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|task| task.completed).count();
        let active = total - completed;
        let completion_rate = if total == 0 {
            0
        } else {
            // Round completed/total to the nearest whole percent.
            u8::try_from((completed * 200 + total) / (2 * total)).unwrap_or(100)
        };
        let stats = Stats {
            total,
            active,
            completed,
            completion_rate,
        };
        self.stats_cache = Some((Instant::now(), stats));
        stats
    }

    /// Snapshot the full engine state as the durable record shape.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            tasks: self.tasks.clone(),
            current_id: self.next_id,
            saved_at: now_ms(),
        }
    }

    /// Replace the engine state from a durable record.
    pub fn restore(&mut self, state: PersistedState) {
        self.tasks = state.tasks;
        self.next_id = state.current_id.max(FIRST_ID);
        self.rebuild_indexes();
        self.invalidate_caches();
    }

    /// Serialize the collection as a pretty-printed export envelope.
    #[must_use]
    pub fn export_snapshot(&self) -> String {
        let envelope = ExportEnvelope {
            tasks: self.tasks.clone(),
            exported_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
            version: EXPORT_VERSION.to_owned(),
        };
        serde_json::to_string_pretty(&envelope).unwrap_or_default()
    }

    /// Replace the collection wholesale from a serialized snapshot.
    ///
    /// Accepts any JSON payload carrying a `tasks` array. The id counter is
    /// recomputed past the largest imported id so future creates never
    /// collide. Parse failures leave existing state untouched and report
    /// `false`.
    pub fn import_snapshot(&mut self, serialized: &str) -> bool {
        let Ok(payload) = serde_json::from_str::<ImportPayload>(serialized) else {
            return false;
        };
        self.next_id = payload
            .tasks
            .iter()
            .map(|task| task.id.0)
            .max()
            .unwrap_or(0)
            + 1;
        self.tasks = payload.tasks;
        self.rebuild_indexes();
        self.invalidate_caches();
        true
    }

    fn set_completed(&mut self, id: TaskId, completed: bool, now: EpochMs) {
        if let Some(&idx) = self.position.get(&id)
            && let Some(task) = self.tasks.get_mut(idx)
            && task.completed != completed
        {
            task.completed = completed;
            task.updated_at = now;
        }
    }

    fn force_descendants_complete(&mut self, id: TaskId, now: EpochMs) {
        for descendant in self.descendants_of(id) {
            self.set_completed(descendant, true, now);
        }
    }

    fn complete_parent_if_siblings_done(&mut self, parent: TaskId, now: EpochMs) {
        let all_done = self
            .children_of(parent)
            .iter()
            .filter_map(|&child| self.by_id(child))
            .all(|child| child.completed);
        if all_done {
            self.set_completed(parent, true, now);
        }
    }

    fn rebuild_indexes(&mut self) {
        self.position.clear();
        self.children.clear();
        for (idx, task) in self.tasks.iter().enumerate() {
            self.position.insert(task.id, idx);
        }
        for task in &self.tasks {
            if let Some(parent) = task.parent_id {
                self.children.entry(parent).or_default().push(task.id);
            }
        }
    }

    fn invalidate_caches(&mut self) {
        self.search_cache.clear();
        self.stats_cache = None;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::thread;

    fn create(engine: &mut TaskEngine, text: &str, parent: Option<TaskId>) -> TaskId {
        let level = parent
            .and_then(|p| engine.by_id(p))
            .map_or(0, |p| p.indent_level + 1);
        engine
            .create(text, parent, level, None)
            .expect("create must succeed")
            .id
    }

    fn import_fixture(engine: &mut TaskEngine, json: &str) {
        assert!(engine.import_snapshot(json), "fixture must import");
    }

    #[test]
    fn create_trims_text_and_appends_in_order() {
        let mut engine = TaskEngine::new();
        let first = engine.create("  buy milk  ", None, 0, None).unwrap();
        let second = engine.create("call dentist", None, 0, None).unwrap();
        assert_eq!(first.text, "buy milk");
        assert_eq!(
            engine.tasks().iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
    }

    #[test]
    fn create_rejects_blank_text() {
        let mut engine = TaskEngine::new();
        assert!(engine.create("", None, 0, None).is_none());
        assert!(engine.create("   \t ", None, 0, None).is_none());
        assert!(engine.is_empty());
    }

    #[test]
    fn create_rejects_unknown_parent() {
        let mut engine = TaskEngine::new();
        assert!(engine.create("orphan", Some(TaskId(99)), 1, None).is_none());
        assert!(engine.is_empty());
    }

    #[test]
    fn create_normalizes_indent_levels() {
        let mut engine = TaskEngine::new();
        let root = engine.create("root", None, 2, None).unwrap();
        assert_eq!(root.indent_level, 0);

        let child = engine.create("child", Some(root.id), 0, None).unwrap();
        assert_eq!(child.indent_level, 1);

        let deep = engine.create("deep", Some(root.id), 9, None).unwrap();
        assert_eq!(deep.indent_level, MAX_INDENT);
    }

    #[test]
    fn create_stores_due_date_verbatim() {
        let mut engine = TaskEngine::new();
        let task = engine.create("pay rent", None, 0, Some(1_900_000_000_000)).unwrap();
        assert_eq!(task.due_date, Some(1_900_000_000_000));
    }

    #[test]
    fn ids_increase_and_are_never_reused() {
        let mut engine = TaskEngine::new();
        let a = create(&mut engine, "a", None);
        let b = create(&mut engine, "b", None);
        engine.delete(b).unwrap();
        let c = create(&mut engine, "c", None);
        assert!(a < b && b < c);
    }

    #[test]
    fn update_overwrites_text_and_refreshes_timestamp() {
        let mut engine = TaskEngine::new();
        let id = create(&mut engine, "tpyo", None);
        let created_at = engine.by_id(id).unwrap().created_at;
        thread::sleep(Duration::from_millis(5));

        let updated = engine.update(id, "  typo fixed ").unwrap();
        assert_eq!(updated.text, "typo fixed");
        assert!(updated.updated_at > created_at);
        assert_eq!(updated.created_at, created_at);
    }

    #[test]
    fn update_missing_task_reports_absence() {
        let mut engine = TaskEngine::new();
        assert!(engine.update(TaskId(1), "ghost").is_none());
    }

    #[test]
    fn completing_a_task_completes_all_descendants() {
        let mut engine = TaskEngine::new();
        let root = create(&mut engine, "root", None);
        let child = create(&mut engine, "child", Some(root));
        let grandchild = create(&mut engine, "grandchild", Some(child));
        let bystander = create(&mut engine, "bystander", None);
        thread::sleep(Duration::from_millis(5));

        engine.toggle_complete(root).unwrap();
        assert!(engine.by_id(root).unwrap().completed);
        assert!(engine.by_id(child).unwrap().completed);
        assert!(engine.by_id(grandchild).unwrap().completed);
        assert!(!engine.by_id(bystander).unwrap().completed);

        let forced = engine.by_id(grandchild).unwrap();
        assert!(forced.updated_at > forced.created_at);
    }

    #[test]
    fn uncompleting_a_subtask_reopens_only_the_immediate_parent() {
        let mut engine = TaskEngine::new();
        let root = create(&mut engine, "root", None);
        let child = create(&mut engine, "child", Some(root));
        let grandchild = create(&mut engine, "grandchild", Some(child));
        engine.toggle_complete(root).unwrap();

        engine.toggle_complete(grandchild).unwrap();
        assert!(!engine.by_id(grandchild).unwrap().completed);
        assert!(!engine.by_id(child).unwrap().completed);
        // One level only: the grandparent keeps its completed flag.
        assert!(engine.by_id(root).unwrap().completed);
    }

    #[test]
    fn completing_last_open_sibling_completes_parent_one_level_only() {
        let mut engine = TaskEngine::new();
        let root = create(&mut engine, "root", None);
        let parent = create(&mut engine, "parent", Some(root));
        let first = create(&mut engine, "first", Some(parent));
        let second = create(&mut engine, "second", Some(parent));

        engine.toggle_complete(first).unwrap();
        assert!(!engine.by_id(parent).unwrap().completed);

        engine.toggle_complete(second).unwrap();
        assert!(engine.by_id(parent).unwrap().completed);
        // The consequent parent completion does not re-run the sibling
        // check one level further up.
        assert!(!engine.by_id(root).unwrap().completed);
    }

    #[test]
    fn delete_removes_target_and_descendants_only() {
        let mut engine = TaskEngine::new();
        let root = create(&mut engine, "root", None);
        let child = create(&mut engine, "child", Some(root));
        let grandchild = create(&mut engine, "grandchild", Some(child));
        let bystander = create(&mut engine, "bystander", None);

        let deleted = engine.delete(root).unwrap();
        assert_eq!(deleted.id, root);
        assert!(engine.by_id(child).is_none());
        assert!(engine.by_id(grandchild).is_none());
        assert!(engine.by_id(bystander).is_some());
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn delete_missing_task_reports_absence() {
        let mut engine = TaskEngine::new();
        assert!(engine.delete(TaskId(5)).is_none());
    }

    #[test]
    fn indent_first_task_always_fails() {
        let mut engine = TaskEngine::new();
        let first = create(&mut engine, "first", None);
        create(&mut engine, "second", None);
        assert!(engine.indent(first).is_none());
    }

    #[test]
    fn indent_at_max_depth_always_fails() {
        let mut engine = TaskEngine::new();
        let a = create(&mut engine, "a", None);
        let b = create(&mut engine, "b", Some(a));
        let c = create(&mut engine, "c", Some(b));
        let d = create(&mut engine, "d", Some(c));
        assert_eq!(engine.by_id(d).unwrap().indent_level, MAX_INDENT);
        assert!(engine.indent(d).is_none());
    }

    #[test]
    fn indent_adopts_the_positional_predecessor() {
        let mut engine = TaskEngine::new();
        let a = create(&mut engine, "a", None);
        let b = create(&mut engine, "b", None);
        let c = create(&mut engine, "c", None);

        let b = engine.indent(b).unwrap();
        assert_eq!(b.indent_level, 1);
        assert_eq!(b.parent_id, Some(a));

        // Purely positional: c lands one below b, not next to it.
        let c = engine.indent(c).unwrap();
        assert_eq!(c.indent_level, 2);
        assert_eq!(c.parent_id, Some(b.id));
    }

    #[test]
    fn indent_missing_task_fails() {
        let mut engine = TaskEngine::new();
        assert!(engine.indent(TaskId(3)).is_none());
    }

    #[test]
    fn outdent_level_one_clears_parent() {
        let mut engine = TaskEngine::new();
        let root = create(&mut engine, "root", None);
        let child = create(&mut engine, "child", Some(root));

        let child = engine.outdent(child).unwrap();
        assert_eq!(child.indent_level, 0);
        assert_eq!(child.parent_id, None);
    }

    #[test]
    fn outdent_top_level_task_fails() {
        let mut engine = TaskEngine::new();
        let root = create(&mut engine, "root", None);
        assert!(engine.outdent(root).is_none());
    }

    #[test]
    fn outdent_reparents_to_nearest_shallower_predecessor() {
        let mut engine = TaskEngine::new();
        let a = create(&mut engine, "a", None);
        let b = create(&mut engine, "b", Some(a));
        let c = create(&mut engine, "c", Some(b));

        let c = engine.outdent(c).unwrap();
        assert_eq!(c.indent_level, 1);
        assert_eq!(c.parent_id, Some(a));
    }

    #[test]
    fn outdent_without_matching_ancestor_keeps_stale_parent() {
        let mut engine = TaskEngine::new();
        import_fixture(
            &mut engine,
            r#"{"tasks":[
                {"id":1,"text":"root","completed":false,"createdAt":1,"updatedAt":1},
                {"id":2,"text":"deep","completed":false,"parentId":1,"indentLevel":3,
                 "createdAt":1,"updatedAt":1}
            ]}"#,
        );

        let deep = engine.outdent(TaskId(2)).unwrap();
        assert_eq!(deep.indent_level, 2);
        // No preceding task sits at level 1, so the old reference stays,
        // now inconsistent with the level.
        assert_eq!(deep.parent_id, Some(TaskId(1)));
    }

    #[test]
    fn reorder_rejects_equal_or_out_of_bounds_indices() {
        let mut engine = TaskEngine::new();
        create(&mut engine, "a", None);
        create(&mut engine, "b", None);
        assert!(!engine.reorder(1, 1));
        assert!(!engine.reorder(0, 2));
        assert!(!engine.reorder(5, 0));
    }

    #[test]
    fn reorder_moves_without_touching_hierarchy_fields() {
        let mut engine = TaskEngine::new();
        let a = create(&mut engine, "a", None);
        let b = create(&mut engine, "b", Some(a));
        let c = create(&mut engine, "c", None);

        assert!(engine.reorder(2, 0));
        let order: Vec<TaskId> = engine.tasks().iter().map(|t| t.id).collect();
        assert_eq!(order, vec![c, a, b]);

        let moved = engine.by_id(b).unwrap();
        assert_eq!(moved.parent_id, Some(a));
        assert_eq!(moved.indent_level, 1);
    }

    #[test]
    fn clear_completed_keeps_dangling_children_of_removed_parents() {
        let mut engine = TaskEngine::new();
        import_fixture(
            &mut engine,
            r#"{"tasks":[
                {"id":1,"text":"a","completed":true,"createdAt":1,"updatedAt":1},
                {"id":2,"text":"b","completed":false,"parentId":1,"indentLevel":1,
                 "createdAt":1,"updatedAt":1}
            ]}"#,
        );

        assert_eq!(engine.clear_completed(), 1);
        assert!(engine.by_id(TaskId(1)).is_none());
        let orphan = engine.by_id(TaskId(2)).unwrap();
        assert_eq!(orphan.parent_id, Some(TaskId(1)));
    }

    #[test]
    fn clear_completed_removes_completed_subtasks_of_active_parents() {
        let mut engine = TaskEngine::new();
        let root = create(&mut engine, "root", None);
        let done = create(&mut engine, "done", Some(root));
        let open = create(&mut engine, "open", Some(root));
        engine.toggle_complete(done).unwrap();

        assert_eq!(engine.clear_completed(), 1);
        assert!(engine.by_id(done).is_none());
        assert!(engine.by_id(root).is_some());
        assert!(engine.by_id(open).is_some());
    }

    #[test]
    fn by_filter_respects_store_order() {
        let mut engine = TaskEngine::new();
        let a = create(&mut engine, "a", None);
        let b = create(&mut engine, "b", None);
        let c = create(&mut engine, "c", None);
        engine.toggle_complete(b).unwrap();

        let active: Vec<TaskId> = engine
            .by_filter(TaskFilter::Active)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(active, vec![a, c]);
        let completed: Vec<TaskId> = engine
            .by_filter(TaskFilter::Completed)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(completed, vec![b]);
        assert_eq!(engine.by_filter(TaskFilter::All).len(), 3);
    }

    #[test]
    fn subtask_stats_counts_direct_children_only() {
        let mut engine = TaskEngine::new();
        let root = create(&mut engine, "root", None);
        let child = create(&mut engine, "child", Some(root));
        create(&mut engine, "grandchild", Some(child));

        let stats = engine.subtask_stats(root);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.completed, 0);
    }

    #[test]
    fn subtask_completion_scenario() {
        let mut engine = TaskEngine::new();
        let milk = create(&mut engine, "Buy milk", None);
        let dentist = create(&mut engine, "Call dentist", Some(milk));

        let stats = engine.subtask_stats(milk);
        assert_eq!((stats.total, stats.completed, stats.active), (1, 0, 1));

        engine.toggle_complete(dentist).unwrap();
        let stats = engine.subtask_stats(milk);
        assert_eq!((stats.total, stats.completed, stats.active), (1, 1, 0));
        assert!(engine.by_id(milk).unwrap().completed);
    }

    #[test]
    fn blank_search_returns_the_full_collection() {
        let mut engine = TaskEngine::new();
        create(&mut engine, "a", None);
        create(&mut engine, "b", None);
        assert_eq!(engine.search("").len(), 2);
        assert_eq!(engine.search("   ").len(), 2);
    }

    #[test]
    fn search_is_a_superset_of_substring_containment() {
        let mut engine = TaskEngine::new();
        let milk = create(&mut engine, "Buy MILK at the store", None);
        create(&mut engine, "call dentist", None);

        let results = engine.search("milk");
        assert_eq!(results.iter().map(|t| t.id).collect::<Vec<_>>(), vec![milk]);
    }

    #[test]
    fn search_matches_in_order_subsequences() {
        let mut engine = TaskEngine::new();
        let milk = create(&mut engine, "buy milk", None);
        create(&mut engine, "walk dog", None);

        let results = engine.search("bmk");
        assert_eq!(results.iter().map(|t| t.id).collect::<Vec<_>>(), vec![milk]);
        assert!(engine.search("kmb").is_empty());
    }

    #[test]
    fn search_reflects_mutations_even_when_size_is_unchanged() {
        let mut engine = TaskEngine::new();
        let old = create(&mut engine, "milk run", None);
        assert_eq!(engine.search("milk").len(), 1);

        // One delete plus one create leaves the size unchanged; the cache
        // must still have been dropped by both mutations.
        engine.delete(old).unwrap();
        create(&mut engine, "milk delivery", None);
        let results = engine.search("milk");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "milk delivery");
    }

    #[test]
    fn repeated_searches_return_identical_results() {
        let mut engine = TaskEngine::new();
        create(&mut engine, "buy milk", None);
        create(&mut engine, "buy bread", None);
        let first = engine.search("buy");
        let second = engine.search("buy");
        assert_eq!(first, second);
    }

    #[test]
    fn search_cache_evicts_oldest_inserted_entries() {
        let mut engine = TaskEngine::new();
        create(&mut engine, "solo", None);
        for n in 0..=SEARCH_CACHE_CAPACITY {
            let _ = engine.search(&format!("query-{n}"));
        }
        // Capacity exceeded by one; the engine still answers correctly.
        assert_eq!(engine.search("solo").len(), 1);
    }

    #[test]
    fn stats_counts_and_rounds_the_completion_rate() {
        let mut engine = TaskEngine::new();
        let a = create(&mut engine, "a", None);
        let b = create(&mut engine, "b", None);
        create(&mut engine, "c", None);

        engine.toggle_complete(a).unwrap();
        let stats = engine.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.completion_rate, 33);

        engine.toggle_complete(b).unwrap();
        assert_eq!(engine.stats().completion_rate, 67);
    }

    #[test]
    fn stats_on_empty_collection_is_all_zero() {
        let mut engine = TaskEngine::new();
        let stats = engine.stats();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completion_rate, 0);
    }

    #[test]
    fn stats_within_the_window_are_identical() {
        let mut engine = TaskEngine::new();
        create(&mut engine, "a", None);
        assert_eq!(engine.stats(), engine.stats());
    }

    #[test]
    fn mutations_drop_the_stats_cache_immediately() {
        let mut engine = TaskEngine::new();
        let a = create(&mut engine, "a", None);
        assert_eq!(engine.stats().completed, 0);
        engine.toggle_complete(a).unwrap();
        assert_eq!(engine.stats().completed, 1);
    }

    #[test]
    fn export_import_round_trip_is_field_for_field() {
        let mut engine = TaskEngine::new();
        let root = create(&mut engine, "root", None);
        create(&mut engine, "child", Some(root));
        engine.toggle_complete(root).unwrap();
        let original = engine.tasks().to_vec();
        let max_id = original.iter().map(|t| t.id.0).max().unwrap();

        let snapshot = engine.export_snapshot();
        let mut restored = TaskEngine::new();
        assert!(restored.import_snapshot(&snapshot));
        assert_eq!(restored.tasks(), original.as_slice());

        let next = restored.create("fresh", None, 0, None).unwrap();
        assert!(next.id.0 > max_id);
    }

    #[test]
    fn export_envelope_carries_version_and_timestamp() {
        let engine = TaskEngine::new();
        let snapshot = engine.export_snapshot();
        let envelope: ExportEnvelope = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(envelope.version, EXPORT_VERSION);
        assert!(!envelope.exported_at.is_empty());
    }

    #[test]
    fn import_failure_leaves_state_untouched() {
        let mut engine = TaskEngine::new();
        let keep = create(&mut engine, "keep me", None);

        assert!(!engine.import_snapshot("not json at all"));
        assert!(!engine.import_snapshot(r#"{"items": []}"#));
        assert!(engine.by_id(keep).is_some());
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn persisted_round_trip_preserves_counter_and_tasks() {
        let mut engine = TaskEngine::new();
        let a = create(&mut engine, "a", None);
        create(&mut engine, "b", Some(a));
        let record = engine.to_persisted();

        let mut restored = TaskEngine::new();
        restored.restore(record.clone());
        assert_eq!(restored.tasks(), engine.tasks());

        let next = restored.create("c", None, 0, None).unwrap();
        assert_eq!(next.id.0, record.current_id);
    }

    #[test]
    fn clear_all_resets_the_id_counter() {
        let mut engine = TaskEngine::new();
        create(&mut engine, "a", None);
        create(&mut engine, "b", None);

        assert_eq!(engine.clear_all(), 2);
        assert!(engine.is_empty());
        let fresh = engine.create("again", None, 0, None).unwrap();
        assert_eq!(fresh.id, TaskId(FIRST_ID));
    }
}
