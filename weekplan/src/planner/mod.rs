use std::collections::HashMap;
use std::time::Instant;

use time::Date;
use tracing::{debug, info, warn};

use crate::backup::Backup;
use crate::feedback::{Feedback, SilentFeedback};
use crate::persistence::SaveHandle;
use crate::pool::TodoPool;
use crate::storage::{Storage, StorageError, POOL_KEY, WEEKS_KEY};
use crate::store::WeekStore;
use crate::types::{Category, Day, Todo, TodoId, Week, WeekKey};
use crate::week_key::WeekInfo;

mod completion;
mod edit;
mod state;
mod transfer;
mod views;

pub use edit::parse_duration;
pub use state::{
    DayLoad, DragSource, DragState, DropOutcome, DropTarget, EditDraft, EditOutcome, LoadTier,
    DAILY_CAPACITY_MINUTES, DEFAULT_ADD_DURATION, JUST_COMPLETED_FOR,
};

static EMPTY_WEEK: Week = Week::EMPTY;

/// Loaded ids above this are renumbered so minting can never run out.
const MAX_LOADED_ID: TodoId = TodoId::MAX / 2;

/// Single-writer planner state: the week grid, the pool and the transient
/// interaction state layered on top.
///
/// Every mutating call finishes its change before returning and then
/// publishes one combined snapshot to the attached saver, if any.
pub struct Planner {
    store: WeekStore,
    pool: TodoPool,
    today: Date,
    week_offset: i32,
    drag: DragState,
    edit: Option<EditDraft>,
    just_completed: HashMap<TodoId, Instant>,
    feedback: Box<dyn Feedback>,
    saver: Option<SaveHandle>,
    next_id: TodoId,
    daily_capacity: u32,
    revision: u64,
}

impl Planner {
    pub fn new(today: Date) -> Self {
        Self::from_parts(WeekStore::new(), TodoPool::new(), today)
    }

    pub fn from_parts(store: WeekStore, pool: TodoPool, today: Date) -> Self {
        let mut planner = Self {
            store,
            pool,
            today,
            week_offset: 0,
            drag: DragState::Idle,
            edit: None,
            just_completed: HashMap::new(),
            feedback: Box::new(SilentFeedback),
            saver: None,
            next_id: 1,
            daily_capacity: DAILY_CAPACITY_MINUTES,
            revision: 0,
        };
        planner.reseed_ids();
        let key = planner.active_key();
        planner.store.ensure_week(&key);
        planner
    }

    /// Load persisted state, upgrading legacy week data on the way in.
    pub fn load(storage: &dyn Storage, today: Date) -> Result<Self, StorageError> {
        let weeks = read_blob(storage, WEEKS_KEY)?;
        let pool = read_blob(storage, POOL_KEY)?;

        let (store, report) = match weeks {
            Some(raw) => WeekStore::from_stored(raw),
            None => (WeekStore::new(), Default::default()),
        };
        let pool = pool.map(TodoPool::from_stored).unwrap_or_default();

        info!(
            weeks = store.len(),
            pool = pool.len(),
            migrated = !report.is_noop(),
            "Loaded planner state"
        );
        Ok(Self::from_parts(store, pool, today))
    }

    pub fn with_feedback(mut self, feedback: impl Feedback + 'static) -> Self {
        self.feedback = Box::new(feedback);
        self
    }

    pub fn with_daily_capacity(mut self, minutes: u32) -> Self {
        self.daily_capacity = minutes;
        self
    }

    /// Route every subsequent change to `saver`.
    pub fn attach_saver(&mut self, saver: SaveHandle) {
        self.saver = Some(saver);
    }

    pub fn saver(&self) -> Option<&SaveHandle> {
        self.saver.as_ref()
    }

    pub fn store(&self) -> &WeekStore {
        &self.store
    }

    pub fn pool(&self) -> &TodoPool {
        &self.pool
    }

    pub fn today(&self) -> Date {
        self.today
    }

    /// Incremented on every published change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn daily_capacity(&self) -> u32 {
        self.daily_capacity
    }

    // Navigation

    pub fn week_offset(&self) -> i32 {
        self.week_offset
    }

    pub fn active_week_info(&self) -> WeekInfo {
        WeekInfo::for_offset(self.today, self.week_offset)
    }

    pub fn active_key(&self) -> WeekKey {
        self.active_week_info().key
    }

    pub fn active_week(&self) -> &Week {
        self.store
            .week(&self.active_key())
            .unwrap_or(&EMPTY_WEEK)
    }

    /// `DD.MM.YY - DD.MM.YY` for the active week.
    pub fn week_range(&self) -> String {
        self.active_week_info().range_label()
    }

    pub fn week_dates(&self) -> [Date; 7] {
        self.active_week_info().dates()
    }

    pub fn set_week_offset(&mut self, offset: i32) {
        self.week_offset = offset;
        let key = self.active_key();
        debug!(offset, week = %key, "navigated");
        if self.store.ensure_week(&key) {
            self.publish();
        }
    }

    pub fn next_week(&mut self) {
        self.set_week_offset(self.week_offset.saturating_add(1));
    }

    pub fn previous_week(&mut self) {
        self.set_week_offset(self.week_offset.saturating_sub(1));
    }

    pub fn this_week(&mut self) {
        self.set_week_offset(0);
    }

    /// Move "today" forward, e.g. when the process outlives midnight.
    pub fn set_today(&mut self, today: Date) {
        self.today = today;
        self.set_week_offset(self.week_offset);
    }

    // Adding tasks

    /// Add a backlog task or habit template to the front of the pool.
    /// Blank text is ignored.
    pub fn add_to_pool(&mut self, text: &str, duration: u32, habit: bool) -> Option<TodoId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let todo = Todo {
            habit,
            ..Todo::new(self.mint_id(), text, duration)
        };
        let id = todo.id;
        self.pool.push_front(todo);
        debug!(id, habit, "added to pool");
        self.publish();
        Some(id)
    }

    /// Quick add straight into a slot of the active week. Flags follow the
    /// category; an occupied goal slot rejects the add.
    pub fn add_to_day(
        &mut self,
        day: Day,
        category: Category,
        text: &str,
        duration: u32,
    ) -> Option<TodoId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let key = self.active_key();
        let mut week = self.store.snapshot_week(&key);
        if category == Category::Goal && !week.slot(day, Category::Goal).is_empty() {
            debug!(%day, "goal slot occupied, quick add ignored");
            return None;
        }

        let mut todo = Todo::new(self.mint_id(), text, duration);
        todo.apply_flags(category.flags());
        let id = todo.id;
        week.slot_mut(day, category).push(todo);
        self.store.commit([(key, week)]);
        self.publish();
        Some(id)
    }

    /// Locate a task in the active week.
    pub fn find_in_week(&self, id: TodoId) -> Option<(Day, Category, &Todo)> {
        self.active_week().find(id)
    }

    // Backup

    /// Combined weeks + pool, as written by persistence and export.
    pub fn snapshot(&self) -> Backup {
        Backup {
            all_weeks: self.store.weeks().clone(),
            todo_pool: self.pool.todos().to_vec(),
        }
    }

    /// Replace all state with an already validated backup.
    pub fn import_backup(&mut self, backup: Backup) {
        info!(
            weeks = backup.all_weeks.len(),
            pool = backup.todo_pool.len(),
            "Importing backup"
        );
        self.store = WeekStore::from_collection(backup.all_weeks);
        self.pool = TodoPool::from_todos(backup.todo_pool);
        self.drag = DragState::Idle;
        self.edit = None;
        self.just_completed.clear();
        self.reseed_ids();
        let key = self.active_key();
        self.store.ensure_week(&key);
        self.publish();
    }

    fn mint_id(&mut self) -> TodoId {
        let id = self.next_id;
        self.next_id = id.saturating_add(1);
        id
    }

    fn reseed_ids(&mut self) {
        let max = self.store.max_id().max(self.pool.max_id()).unwrap_or(0);
        self.next_id = if max > MAX_LOADED_ID {
            warn!(max, "task ids out of range, renumbering");
            self.renumber_ids()
        } else {
            max + 1
        };
    }

    /// Give every task a fresh id counting from 1, pool first, keeping habit
    /// instances pointed at their templates. Returns the next free id.
    fn renumber_ids(&mut self) -> TodoId {
        let mut next: TodoId = 1;
        let mut templates = HashMap::new();
        for todo in self.pool.todos_mut() {
            templates.insert(todo.id, next);
            todo.id = next;
            next += 1;
        }

        let mut weeks = self.store.weeks().clone();
        for week in weeks.values_mut() {
            for day in Day::ALL {
                for category in Category::ALL {
                    for todo in week.slot_mut(day, category) {
                        todo.id = next;
                        next += 1;
                        // An instance whose template is gone keeps an id no live task uses.
                        todo.source_id = todo
                            .source_id
                            .map(|source| templates.get(&source).copied().unwrap_or(0));
                    }
                }
            }
        }
        self.store = WeekStore::from_collection(weeks);
        next
    }

    fn publish(&mut self) {
        self.revision += 1;
        if let Some(saver) = &self.saver {
            saver.schedule(self.snapshot());
        }
    }
}

fn read_blob(storage: &dyn Storage, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
    let Some(blob) = storage.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&blob) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            warn!(key, error = %err, "stored blob is not JSON, ignoring");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use time::macros::date;

    #[test]
    fn new_planner_has_the_current_week() {
        let planner = Planner::new(date!(2026 - 10 - 18));
        assert_eq!(planner.active_key().as_str(), "2026-W42");
        assert!(planner.store().week(&planner.active_key()).is_some());
        assert_eq!(planner.week_range(), "12.10.26 - 18.10.26");
    }

    #[test]
    fn navigation_creates_weeks_lazily_and_keeps_them() {
        let mut planner = Planner::new(date!(2026 - 10 - 18));
        planner.previous_week();
        planner.previous_week();
        assert_eq!(planner.active_key().as_str(), "2026-W40");
        planner.this_week();
        planner.next_week();
        assert_eq!(planner.active_key().as_str(), "2026-W43");
        assert_eq!(planner.store().len(), 4);
    }

    #[test]
    fn revisiting_a_week_does_not_publish() {
        let mut planner = Planner::new(date!(2026 - 10 - 18));
        planner.next_week();
        let revision = planner.revision();
        planner.this_week();
        planner.next_week();
        assert_eq!(planner.revision(), revision);
    }

    #[test]
    fn add_to_pool_puts_new_tasks_first_with_default_flags() {
        let mut planner = Planner::new(date!(2026 - 10 - 18));
        let first = planner.add_to_pool("water plants", 10, false).unwrap();
        let second = planner.add_to_pool("  pay rent  ", 5, false).unwrap();

        let todos = planner.pool().todos();
        assert_eq!(todos[0].id, second);
        assert_eq!(todos[0].text, "pay rent");
        assert_eq!(todos[1].id, first);
        assert!(!todos[0].urgent && todos[0].important);
        assert!(planner.add_to_pool("   ", 10, false).is_none());
    }

    #[test]
    fn quick_add_uses_category_flags_and_respects_goal() {
        let mut planner = Planner::new(date!(2026 - 10 - 18));
        let id = planner
            .add_to_day(Day::Monday, Category::Work, "standup", 15)
            .unwrap();
        let (_, _, todo) = planner.find_in_week(id).unwrap();
        assert!(todo.urgent && !todo.important);

        assert!(planner
            .add_to_day(Day::Monday, Category::Goal, "ship v1", 240)
            .is_some());
        assert!(planner
            .add_to_day(Day::Monday, Category::Goal, "ship v2", 240)
            .is_none());
        assert_eq!(planner.active_week().slot(Day::Monday, Category::Goal).len(), 1);
    }

    #[test]
    fn ids_continue_after_loaded_data() {
        let storage = MemoryStorage::new()
            .with_entry(POOL_KEY, r#"[{ "id": 41, "text": "old" }]"#)
            .with_entry(
                WEEKS_KEY,
                r#"{ "2026-W42": { "MONDAY": { "focus": [{ "id": 77 }] } } }"#,
            );
        let mut planner = Planner::load(&storage, date!(2026 - 10 - 18)).unwrap();
        assert_eq!(planner.add_to_pool("new", 30, false), Some(78));
    }

    #[test]
    fn huge_ids_are_renumbered_on_import() {
        let mut planner = Planner::new(date!(2026 - 10 - 18));
        let mut template = Todo::new(TodoId::MAX, "stretch", 15);
        template.habit = true;
        let instance = Todo {
            id: TodoId::MAX - 1,
            source_id: Some(TodoId::MAX),
            ..template.clone()
        };
        let mut week = Week::default();
        week.slot_mut(Day::Monday, Category::Basics).push(instance);
        let mut all_weeks = crate::types::WeekCollection::new();
        all_weeks.insert(planner.active_key(), week);

        planner.import_backup(Backup {
            all_weeks,
            todo_pool: vec![template],
        });

        assert_eq!(planner.pool().todos()[0].id, 1);
        let scheduled = &planner.active_week().slot(Day::Monday, Category::Basics)[0];
        assert_eq!(scheduled.id, 2);
        assert_eq!(scheduled.source_id, Some(1));
        assert!(planner.basics_templates().is_empty());
        assert_eq!(planner.add_to_pool("next", 30, false), Some(3));
    }

    #[test]
    fn huge_ids_in_storage_load_without_panicking() {
        let storage = MemoryStorage::new().with_entry(
            POOL_KEY,
            r#"[{ "id": 18446744073709551615, "text": "x" }]"#,
        );
        let mut planner = Planner::load(&storage, date!(2026 - 10 - 18)).unwrap();
        assert_eq!(planner.pool().todos()[0].id, 1);
        assert_eq!(planner.add_to_pool("y", 30, false), Some(2));
    }

    #[test]
    fn load_ignores_corrupt_blobs() {
        let storage = MemoryStorage::new().with_entry(WEEKS_KEY, "{{{");
        let planner = Planner::load(&storage, date!(2026 - 10 - 18)).unwrap();
        assert_eq!(planner.store().len(), 1);
        assert!(planner.pool().is_empty());
    }
}
