mod migration;

pub use migration::{migrate_legacy_categories, MigrationReport, LEGACY_CATEGORIES};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::types::{Todo, TodoId, Week, WeekCollection, WeekKey};

/// Owns every week the user has visited. Weeks are created lazily and never
/// pruned. Mutations replace whole weeks so observers never see a partially
/// applied change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeekStore {
    weeks: WeekCollection,
}

impl WeekStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_collection(weeks: WeekCollection) -> Self {
        Self { weeks }
    }

    /// Build a store from a stored JSON blob, upgrading legacy category names
    /// first. Never fails: unreadable data yields an empty store.
    pub fn from_stored(mut raw: Value) -> (Self, MigrationReport) {
        let report = migrate_legacy_categories(&mut raw);
        if !report.is_noop() {
            info!(
                weeks = report.weeks,
                renamed = report.renamed_slots,
                dropped = report.dropped_entries,
                "Migrated legacy week data"
            );
        }
        let weeks = match serde_json::from_value::<WeekCollection>(raw) {
            Ok(weeks) => weeks,
            Err(err) => {
                warn!(error = %err, "stored weeks unreadable after migration, starting empty");
                WeekCollection::new()
            }
        };
        (Self { weeks }, report)
    }

    /// Insert an empty week under `key` if it is missing. Returns whether a
    /// week was created.
    pub fn ensure_week(&mut self, key: &WeekKey) -> bool {
        if self.weeks.contains_key(key) {
            return false;
        }
        debug!(week = %key, "creating empty week");
        self.weeks.insert(key.clone(), Week::default());
        true
    }

    pub fn week(&self, key: &WeekKey) -> Option<&Week> {
        self.weeks.get(key)
    }

    /// A detached copy of the week to build a replacement from.
    pub fn snapshot_week(&self, key: &WeekKey) -> Week {
        self.weeks.get(key).cloned().unwrap_or_default()
    }

    pub fn replace_week(&mut self, key: WeekKey, week: Week) {
        self.weeks.insert(key, week);
    }

    /// Publish several rebuilt weeks in one step.
    pub fn commit(&mut self, updates: impl IntoIterator<Item = (WeekKey, Week)>) {
        for (key, week) in updates {
            self.weeks.insert(key, week);
        }
    }

    pub fn weeks(&self) -> &WeekCollection {
        &self.weeks
    }

    pub fn into_weeks(self) -> WeekCollection {
        self.weeks
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    pub fn all_todos(&self) -> impl Iterator<Item = &Todo> {
        self.weeks
            .values()
            .flat_map(|week| week.todos().map(|(_, _, todo)| todo))
    }

    pub fn max_id(&self) -> Option<TodoId> {
        self.all_todos().map(|todo| todo.id).max()
    }
}
