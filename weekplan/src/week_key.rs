//! Week identifiers derived from an offset relative to today.
//!
//! The week number is `ceil((days_since_jan1 + jan1_weekday + 1) / 7)` computed
//! from the week's Monday, with weekdays counted from Sunday = 0. This is not
//! ISO-8601 numbering; stored keys depend on its exact rounding, so it must not
//! be swapped for `Date::iso_week`.

use time::{Date, Duration};

use crate::types::{Day, WeekKey};

/// A resolved calendar week: its key and the Monday it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekInfo {
    pub key: WeekKey,
    pub monday: Date,
    pub number: u32,
}

impl WeekInfo {
    /// Resolve the week `offset` weeks away from `today` (0 = this week).
    pub fn for_offset(today: Date, offset: i32) -> Self {
        let shifted = today.saturating_add(Duration::weeks(offset as i64));
        Self::containing(shifted)
    }

    /// Resolve the week containing `date`.
    pub fn containing(date: Date) -> Self {
        let monday = monday_of(date);
        let number = week_number(monday);
        let key = WeekKey::new(format!("{}-W{:02}", monday.year(), number));
        Self {
            key,
            monday,
            number,
        }
    }

    /// The seven consecutive dates starting at Monday.
    pub fn dates(&self) -> [Date; 7] {
        Day::ALL.map(|day| self.date_of(day))
    }

    pub fn date_of(&self, day: Day) -> Date {
        self.monday.saturating_add(Duration::days(day.index() as i64))
    }

    /// `DD.MM.YY - DD.MM.YY` for Monday through Sunday.
    pub fn range_label(&self) -> String {
        format!(
            "{} - {}",
            short_date(self.monday),
            short_date(self.date_of(Day::Sunday))
        )
    }
}

fn monday_of(date: Date) -> Date {
    let weekday = date.weekday().number_days_from_sunday() as i64;
    let back = if weekday == 0 { 6 } else { weekday - 1 };
    date.saturating_sub(Duration::days(back))
}

fn week_number(monday: Date) -> u32 {
    let days_since_jan1 = monday.ordinal() as i64 - 1;
    let jan1 = monday.saturating_sub(Duration::days(days_since_jan1));
    let jan1_weekday = jan1.weekday().number_days_from_sunday() as i64;
    // Integer ceiling of (n + w + 1) / 7.
    ((days_since_jan1 + jan1_weekday + 1 + 6) / 7) as u32
}

fn short_date(date: Date) -> String {
    format!(
        "{:02}.{:02}.{:02}",
        date.day(),
        u8::from(date.month()),
        date.year().rem_euclid(100)
    )
}
