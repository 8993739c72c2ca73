//! JSON backup documents: `{ "allWeeks": {...}, "todoPool": [...] }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Date;

use crate::store::{migrate_legacy_categories, LEGACY_CATEGORIES};
use crate::types::{Category, Day, Todo, WeekCollection};

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("parse error: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("could not encode backup: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Combined planner state. Also the unit the persistence scheduler writes,
/// so weeks and pool are always saved together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub all_weeks: WeekCollection,
    pub todo_pool: Vec<Todo>,
}

impl Backup {
    pub fn to_json(&self) -> Result<String, BackupError> {
        serde_json::to_string_pretty(self).map_err(BackupError::Encode)
    }

    /// Parse and validate a backup document. Nothing is applied here, so a
    /// rejected document can never leave partial state behind.
    pub fn parse(input: &str) -> Result<Self, BackupError> {
        let mut doc: Value = serde_json::from_str(input).map_err(BackupError::Parse)?;
        let Some(fields) = doc.as_object_mut() else {
            return Err(BackupError::InvalidData(
                "backup must be a JSON object".to_string(),
            ));
        };

        let weeks = fields
            .remove("allWeeks")
            .ok_or_else(|| BackupError::InvalidData("missing allWeeks".to_string()))?;
        let pool = fields
            .remove("todoPool")
            .ok_or_else(|| BackupError::InvalidData("missing todoPool".to_string()))?;

        if !weeks.is_object() {
            return Err(BackupError::InvalidData(
                "allWeeks must be an object".to_string(),
            ));
        }
        if !pool.is_array() {
            return Err(BackupError::InvalidData(
                "todoPool must be a list".to_string(),
            ));
        }

        let all_weeks = strict_weeks(weeks)?;
        let todo_pool: Vec<Todo> = serde_json::from_value(pool)
            .map_err(|err| BackupError::InvalidData(format!("todoPool: {err}")))?;
        Ok(Self {
            all_weeks,
            todo_pool,
        })
    }
}

/// Unlike loading from storage, an import must not quietly drop anything:
/// every week, day and task entry has to be well formed before legacy slot
/// names are upgraded.
fn strict_weeks(mut raw: Value) -> Result<WeekCollection, BackupError> {
    let weeks = raw.as_object().into_iter().flatten();
    for (key, week) in weeks {
        let days = week
            .as_object()
            .ok_or_else(|| invalid(format!("week {key} must be an object")))?;
        for (day, slots) in days {
            if !Day::ALL.iter().any(|known| known.to_string() == *day) {
                return Err(invalid(format!("unknown day {day} in week {key}")));
            }
            let slots = slots
                .as_object()
                .ok_or_else(|| invalid(format!("{key} {day} must be an object")))?;
            for (slot, entries) in slots.iter().filter(|(slot, _)| is_task_slot(slot)) {
                let entries = entries
                    .as_array()
                    .ok_or_else(|| invalid(format!("{key} {day} {slot} must be a list")))?;
                for entry in entries {
                    serde_json::from_value::<Todo>(entry.clone())
                        .map_err(|err| invalid(format!("{key} {day} {slot}: {err}")))?;
                }
            }
        }
    }

    migrate_legacy_categories(&mut raw);
    serde_json::from_value(raw).map_err(|err| invalid(format!("allWeeks: {err}")))
}

fn is_task_slot(slot: &str) -> bool {
    Category::ALL.iter().any(|category| category.to_string() == slot)
        || LEGACY_CATEGORIES.iter().any(|(legacy, _)| *legacy == slot)
}

fn invalid(message: String) -> BackupError {
    BackupError::InvalidData(message)
}

/// `weekplan-backup-YYYY-MM-DD.json`
pub fn backup_file_name(date: Date) -> String {
    format!(
        "weekplan-backup-{:04}-{:02}-{:02}.json",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Week, WeekKey};
    use time::macros::date;

    fn sample() -> Backup {
        let mut week = Week::default();
        week.slot_mut(Day::Tuesday, Category::Goal)
            .push(Todo::new(4, "launch", 90));
        let mut all_weeks = WeekCollection::new();
        all_weeks.insert(WeekKey::new("2026-W42"), week);
        Backup {
            all_weeks,
            todo_pool: vec![Todo::new(1, "call mom", 20)],
        }
    }

    #[test]
    fn export_then_parse_is_identity() {
        let backup = sample();
        let json = backup.to_json().unwrap();
        assert!(json.contains("\"allWeeks\""));
        assert!(json.contains("\"todoPool\""));
        assert_eq!(Backup::parse(&json).unwrap(), backup);
    }

    #[test]
    fn missing_keys_are_invalid_data() {
        let err = Backup::parse(r#"{ "allWeeks": {} }"#).unwrap_err();
        assert!(matches!(err, BackupError::InvalidData(_)));
        assert!(err.to_string().starts_with("invalid data"));

        let err = Backup::parse(r#"{ "todoPool": [] }"#).unwrap_err();
        assert!(matches!(err, BackupError::InvalidData(_)));

        let err = Backup::parse("[]").unwrap_err();
        assert!(matches!(err, BackupError::InvalidData(_)));
    }

    #[test]
    fn unparsable_input_is_a_parse_error() {
        let err = Backup::parse("{ not json").unwrap_err();
        assert!(matches!(err, BackupError::Parse(_)));
        assert!(err.to_string().starts_with("parse error"));
    }

    #[test]
    fn legacy_backups_are_upgraded_on_parse() {
        let backup = Backup::parse(
            r#"{ "allWeeks": { "2026-W10": { "MONDAY": { "habits": [{ "id": 2 }] } } }, "todoPool": [] }"#,
        )
        .unwrap();
        let week = &backup.all_weeks[&WeekKey::new("2026-W10")];
        assert_eq!(week.slot(Day::Monday, Category::Basics)[0].id, 2);
    }

    #[test]
    fn malformed_entries_reject_the_whole_document() {
        for input in [
            r#"{ "allWeeks": { "2026-W42": "garbage" }, "todoPool": [] }"#,
            r#"{ "allWeeks": {}, "todoPool": [{ "text": "no id" }] }"#,
            r#"{ "allWeeks": {}, "todoPool": [7] }"#,
            r#"{ "allWeeks": {}, "todoPool": [{ "id": 1, "duration": "30" }] }"#,
            r#"{ "allWeeks": { "2026-W42": { "FUNDAY": {} } }, "todoPool": [] }"#,
            r#"{ "allWeeks": { "2026-W42": { "MONDAY": { "focus": {} } } }, "todoPool": [] }"#,
            r#"{ "allWeeks": { "2026-W42": { "MONDAY": { "habits": [{ "id": 1, "duration": "30" }] } } }, "todoPool": [] }"#,
        ] {
            let err = Backup::parse(input).unwrap_err();
            assert!(matches!(err, BackupError::InvalidData(_)), "{input}");
        }
    }

    #[test]
    fn unknown_slots_are_ignored() {
        let backup = Backup::parse(
            r#"{ "allWeeks": { "2026-W42": { "MONDAY": { "someday": 3, "goal": [{ "id": 1 }] } } }, "todoPool": [] }"#,
        )
        .unwrap();
        let week = &backup.all_weeks[&WeekKey::new("2026-W42")];
        assert_eq!(week.slot(Day::Monday, Category::Goal)[0].id, 1);
    }

    #[test]
    fn file_name_includes_the_date() {
        assert_eq!(
            backup_file_name(date!(2026 - 10 - 18)),
            "weekplan-backup-2026-10-18.json"
        );
    }
}
