use super::*;

impl Planner {
    /// Non-habit pool tasks, newest first.
    pub fn backlog(&self) -> Vec<&Todo> {
        self.pool.backlog()
    }

    /// Habit templates not currently scheduled in the active week.
    pub fn basics_templates(&self) -> Vec<&Todo> {
        self.pool.basics_templates(self.active_week())
    }

    /// Booked minutes and capacity tier for each day of the active week.
    pub fn daily_load(&self) -> Vec<DayLoad> {
        daily_load(self.active_week(), self.daily_capacity)
    }

    pub fn day_load(&self, day: Day) -> DayLoad {
        day_load(day, self.active_week().day(day).total_minutes(), self.daily_capacity)
    }
}

fn daily_load(week: &Week, capacity: u32) -> Vec<DayLoad> {
    week.days()
        .map(|(day, tasks)| day_load(day, tasks.total_minutes(), capacity))
        .collect()
}

fn day_load(day: Day, total_minutes: u64, capacity: u32) -> DayLoad {
    let percentage = if capacity == 0 {
        if total_minutes > 0 {
            100.0
        } else {
            0.0
        }
    } else {
        (total_minutes as f64 / f64::from(capacity) * 100.0).min(100.0)
    };
    DayLoad {
        day,
        total_minutes,
        percentage,
        tier: LoadTier::for_percentage(percentage),
    }
}
