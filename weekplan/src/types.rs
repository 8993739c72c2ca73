use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum::{Display, EnumString};

pub type TodoId = u64;

/// A single task, either in the pool or placed in a week slot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub important: bool,
    /// Minutes.
    #[serde(default)]
    pub duration: u32,
    /// Marks a recurring template living in the pool.
    #[serde(default)]
    pub habit: bool,
    /// Set only on habit instances; points at the originating pool template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<TodoId>,
}

impl Todo {
    pub fn new(id: TodoId, text: impl Into<String>, duration: u32) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            urgent: false,
            important: true,
            duration,
            habit: false,
            source_id: None,
        }
    }

    pub fn is_template(&self) -> bool {
        self.habit && self.source_id.is_none()
    }

    pub fn is_instance(&self) -> bool {
        self.source_id.is_some()
    }

    pub fn apply_flags(&mut self, (urgent, important): (bool, bool)) {
        self.urgent = urgent;
        self.important = important;
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Deserialize,
    Serialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
    Goal,
    Focus,
    Work,
    Leisure,
    Basics,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Goal,
        Category::Focus,
        Category::Work,
        Category::Leisure,
        Category::Basics,
    ];

    /// Number of slots rendered for the category. Only `Goal` is enforced.
    pub fn display_capacity(self) -> usize {
        match self {
            Category::Goal => 1,
            Category::Focus => 3,
            Category::Work => 3,
            Category::Leisure => 2,
            Category::Basics => 4,
        }
    }

    /// `(urgent, important)` assigned to a task scheduled into this category.
    pub fn flags(self) -> (bool, bool) {
        match self {
            Category::Goal => (true, true),
            Category::Focus => (false, true),
            Category::Work => (true, false),
            Category::Leisure | Category::Basics => (false, false),
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Deserialize,
    Serialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// The five category slots of one day. Every slot always exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DayTasks {
    #[serde(default)]
    pub goal: Vec<Todo>,
    #[serde(default)]
    pub focus: Vec<Todo>,
    #[serde(default)]
    pub work: Vec<Todo>,
    #[serde(default)]
    pub leisure: Vec<Todo>,
    #[serde(default)]
    pub basics: Vec<Todo>,
}

impl DayTasks {
    pub const EMPTY: DayTasks = DayTasks {
        goal: Vec::new(),
        focus: Vec::new(),
        work: Vec::new(),
        leisure: Vec::new(),
        basics: Vec::new(),
    };

    pub fn slot(&self, category: Category) -> &Vec<Todo> {
        match category {
            Category::Goal => &self.goal,
            Category::Focus => &self.focus,
            Category::Work => &self.work,
            Category::Leisure => &self.leisure,
            Category::Basics => &self.basics,
        }
    }

    pub fn slot_mut(&mut self, category: Category) -> &mut Vec<Todo> {
        match category {
            Category::Goal => &mut self.goal,
            Category::Focus => &mut self.focus,
            Category::Work => &mut self.work,
            Category::Leisure => &mut self.leisure,
            Category::Basics => &mut self.basics,
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = (Category, &Vec<Todo>)> {
        Category::ALL.into_iter().map(move |c| (c, self.slot(c)))
    }

    /// Sum of durations. Widened so a day full of huge tasks cannot overflow.
    pub fn total_minutes(&self) -> u64 {
        self.slots()
            .flat_map(|(_, todos)| todos.iter())
            .map(|todo| u64::from(todo.duration))
            .sum()
    }
}

/// Seven days of category slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Week {
    #[serde(default, rename = "MONDAY")]
    pub monday: DayTasks,
    #[serde(default, rename = "TUESDAY")]
    pub tuesday: DayTasks,
    #[serde(default, rename = "WEDNESDAY")]
    pub wednesday: DayTasks,
    #[serde(default, rename = "THURSDAY")]
    pub thursday: DayTasks,
    #[serde(default, rename = "FRIDAY")]
    pub friday: DayTasks,
    #[serde(default, rename = "SATURDAY")]
    pub saturday: DayTasks,
    #[serde(default, rename = "SUNDAY")]
    pub sunday: DayTasks,
}

impl Week {
    pub const EMPTY: Week = Week {
        monday: DayTasks::EMPTY,
        tuesday: DayTasks::EMPTY,
        wednesday: DayTasks::EMPTY,
        thursday: DayTasks::EMPTY,
        friday: DayTasks::EMPTY,
        saturday: DayTasks::EMPTY,
        sunday: DayTasks::EMPTY,
    };

    pub fn day(&self, day: Day) -> &DayTasks {
        match day {
            Day::Monday => &self.monday,
            Day::Tuesday => &self.tuesday,
            Day::Wednesday => &self.wednesday,
            Day::Thursday => &self.thursday,
            Day::Friday => &self.friday,
            Day::Saturday => &self.saturday,
            Day::Sunday => &self.sunday,
        }
    }

    pub fn day_mut(&mut self, day: Day) -> &mut DayTasks {
        match day {
            Day::Monday => &mut self.monday,
            Day::Tuesday => &mut self.tuesday,
            Day::Wednesday => &mut self.wednesday,
            Day::Thursday => &mut self.thursday,
            Day::Friday => &mut self.friday,
            Day::Saturday => &mut self.saturday,
            Day::Sunday => &mut self.sunday,
        }
    }

    pub fn days(&self) -> impl Iterator<Item = (Day, &DayTasks)> {
        Day::ALL.into_iter().map(move |d| (d, self.day(d)))
    }

    pub fn slot(&self, day: Day, category: Category) -> &Vec<Todo> {
        self.day(day).slot(category)
    }

    pub fn slot_mut(&mut self, day: Day, category: Category) -> &mut Vec<Todo> {
        self.day_mut(day).slot_mut(category)
    }

    /// Every placed task with its position.
    pub fn todos(&self) -> impl Iterator<Item = (Day, Category, &Todo)> {
        self.days().flat_map(|(day, tasks)| {
            tasks
                .slots()
                .flat_map(move |(category, todos)| todos.iter().map(move |t| (day, category, t)))
        })
    }

    pub fn find(&self, id: TodoId) -> Option<(Day, Category, &Todo)> {
        self.todos().find(|(_, _, todo)| todo.id == id)
    }

    /// Removes the task with `id` from one slot, returning it if present.
    pub fn take(&mut self, day: Day, category: Category, id: TodoId) -> Option<Todo> {
        let slot = self.slot_mut(day, category);
        let idx = slot.iter().position(|todo| todo.id == id)?;
        Some(slot.remove(idx))
    }
}

/// Identifier of one calendar week, formatted `YYYY-Www`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct WeekKey(String);

impl WeekKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type WeekCollection = BTreeMap<WeekKey, Week>;
