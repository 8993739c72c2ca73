use std::time::Duration;

use strum::Display;

use crate::types::{Category, Day, Todo, TodoId, WeekKey};

/// Minutes a single day can hold before it reads as fully booked.
pub const DAILY_CAPACITY_MINUTES: u32 = 480;

/// Default duration for tasks created through add forms.
pub const DEFAULT_ADD_DURATION: u32 = 30;

/// How long a freshly completed task stays marked for celebration.
pub const JUST_COMPLETED_FOR: Duration = Duration::from_secs(1);

/// Where a dragged task was picked up from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSource {
    Pool {
        todo: Todo,
    },
    Week {
        week_key: WeekKey,
        day: Day,
        category: Category,
        todo: Todo,
    },
}

impl DragSource {
    pub fn todo(&self) -> &Todo {
        match self {
            DragSource::Pool { todo } | DragSource::Week { todo, .. } => todo,
        }
    }
}

/// Candidate drop location, used only for highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Pool,
    Day { day: Day, category: Category },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: DragSource,
    },
    Hovering {
        source: DragSource,
        target: DropTarget,
    },
}

impl DragState {
    pub fn source(&self) -> Option<&DragSource> {
        match self {
            DragState::Idle => None,
            DragState::Dragging { source } | DragState::Hovering { source, .. } => Some(source),
        }
    }

    pub fn target(&self) -> Option<DropTarget> {
        match self {
            DragState::Hovering { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// Move to `Idle`, handing back the source if a drag was active.
    pub(super) fn take_source(&mut self) -> Option<DragSource> {
        match std::mem::take(self) {
            DragState::Idle => None,
            DragState::Dragging { source } | DragState::Hovering { source, .. } => Some(source),
        }
    }
}

/// What a drop did. Rejections are normal interaction outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    NoDragSource,
    /// The day's goal slot already holds another task.
    GoalOccupied,
    /// Pool-sourced task dropped back on the pool.
    Ignored,
    HabitInstantiated {
        template_id: TodoId,
        instance_id: TodoId,
    },
    Moved {
        id: TodoId,
    },
    ReturnedToPool {
        id: TodoId,
    },
    InstanceDiscarded {
        id: TodoId,
    },
}

impl DropOutcome {
    pub fn changed_state(&self) -> bool {
        !matches!(
            self,
            DropOutcome::NoDragSource | DropOutcome::GoalOccupied | DropOutcome::Ignored
        )
    }
}

/// Editable copy of a task's text and duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub id: TodoId,
    pub text: String,
    /// Raw user input; coerced on commit.
    pub duration_input: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    NoDraft,
    UpdatedInWeek,
    UpdatedInPool,
    /// The task disappeared while editing.
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum LoadTier {
    Green,
    Yellow,
    Orange,
    Red,
}

impl LoadTier {
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage >= 95.0 {
            LoadTier::Red
        } else if percentage >= 75.0 {
            LoadTier::Orange
        } else if percentage >= 50.0 {
            LoadTier::Yellow
        } else {
            LoadTier::Green
        }
    }
}

/// Booked minutes for one day of the active week.
#[derive(Debug, Clone, PartialEq)]
pub struct DayLoad {
    pub day: Day,
    pub total_minutes: u64,
    /// Share of the daily capacity, capped at 100.0.
    pub percentage: f64,
    pub tier: LoadTier,
}
