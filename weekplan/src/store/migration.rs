//! One-shot upgrade of stored week data from legacy category names.
//!
//! Runs on raw JSON before typed parsing so that malformed or partial
//! documents never abort startup: anything unexpected collapses to an
//! empty slot.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::types::{Category, Todo};

/// Legacy slot names and the category they were renamed to.
pub const LEGACY_CATEGORIES: [(&str, Category); 3] = [
    ("habits", Category::Basics),
    ("delegate", Category::Work),
    ("eliminate", Category::Leisure),
];

/// Counts gathered while upgrading a stored week collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub weeks: usize,
    pub renamed_slots: usize,
    pub dropped_entries: usize,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.renamed_slots == 0 && self.dropped_entries == 0
    }
}

/// Rewrite every week in `raw` in place so that each day holds exactly the
/// current category keys, each mapped to an array of well-formed todos.
///
/// Idempotent: a collection that is already migrated comes back unchanged.
pub fn migrate_legacy_categories(raw: &mut Value) -> MigrationReport {
    let mut report = MigrationReport::default();

    let Some(weeks) = raw.as_object_mut() else {
        warn!("stored weeks are not an object, starting empty");
        *raw = Value::Object(Map::new());
        return report;
    };

    for (key, week) in weeks.iter_mut() {
        report.weeks += 1;
        let Some(days) = week.as_object_mut() else {
            warn!(week = %key, "week is not an object, resetting");
            *week = Value::Object(Map::new());
            continue;
        };
        for (day, tasks) in days.iter_mut() {
            migrate_day(key, day, tasks, &mut report);
        }
    }

    if !report.is_noop() {
        debug!(?report, "legacy week data upgraded");
    }
    report
}

fn migrate_day(week: &str, day: &str, tasks: &mut Value, report: &mut MigrationReport) {
    let mut slots = match tasks.take() {
        Value::Object(slots) => slots,
        _ => Map::new(),
    };
    let mut migrated = Map::new();

    for category in Category::ALL {
        let name = category.to_string();
        let mut todos = slot_entries(slots.remove(&name), week, day, report);

        for (legacy, target) in LEGACY_CATEGORIES {
            if target != category {
                continue;
            }
            if let Some(old) = slots.remove(legacy) {
                report.renamed_slots += 1;
                todos.extend(slot_entries(Some(old), week, day, report));
            }
        }

        migrated.insert(name, Value::Array(todos));
    }

    for unknown in slots.keys() {
        warn!(week, day, slot = %unknown, "dropping unknown slot");
    }

    *tasks = Value::Object(migrated);
}

fn slot_entries(
    slot: Option<Value>,
    week: &str,
    day: &str,
    report: &mut MigrationReport,
) -> Vec<Value> {
    let Some(Value::Array(items)) = slot else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter(|item| {
            let ok = serde_json::from_value::<Todo>(item.clone()).is_ok();
            if !ok {
                report.dropped_entries += 1;
                warn!(week, day, "dropping malformed task entry");
            }
            ok
        })
        .collect()
}
