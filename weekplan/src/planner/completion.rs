use super::*;

impl Planner {
    /// Flip `completed` on a task in the active week. Returns the new value,
    /// or `None` if no such task sits in that slot.
    pub fn toggle_completed(&mut self, day: Day, category: Category, id: TodoId) -> Option<bool> {
        self.toggle_completed_at(day, category, id, Instant::now())
    }

    pub fn toggle_completed_at(
        &mut self,
        day: Day,
        category: Category,
        id: TodoId,
        now: Instant,
    ) -> Option<bool> {
        self.prune_just_completed(now);
        let key = self.active_key();
        let mut week = self.store.snapshot_week(&key);
        let todo = week
            .slot_mut(day, category)
            .iter_mut()
            .find(|todo| todo.id == id)?;
        todo.completed = !todo.completed;
        let completed = todo.completed;

        self.store.commit([(key, week)]);
        self.publish();

        if completed {
            self.feedback.play_success_sound();
            self.just_completed.insert(id, now + JUST_COMPLETED_FOR);
        } else {
            self.just_completed.remove(&id);
        }
        Some(completed)
    }

    /// Whether `id` was completed within the last second.
    pub fn is_just_completed(&self, id: TodoId) -> bool {
        self.is_just_completed_at(id, Instant::now())
    }

    pub fn is_just_completed_at(&self, id: TodoId, now: Instant) -> bool {
        self.just_completed
            .get(&id)
            .is_some_and(|until| now < *until)
    }

    /// Forget expired celebration markers.
    pub fn prune_just_completed(&mut self, now: Instant) {
        self.just_completed.retain(|_, until| now < *until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use time::macros::date;

    #[derive(Clone, Default)]
    struct CountingFeedback(Arc<AtomicUsize>);

    impl Feedback for CountingFeedback {
        fn play_success_sound(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn completing_plays_sound_and_marks_briefly() {
        let sounds = CountingFeedback::default();
        let mut planner = Planner::new(date!(2026 - 10 - 18)).with_feedback(sounds.clone());
        let id = planner
            .add_to_day(Day::Sunday, Category::Basics, "laundry", 60)
            .unwrap();

        let now = Instant::now();
        assert_eq!(
            planner.toggle_completed_at(Day::Sunday, Category::Basics, id, now),
            Some(true)
        );
        assert_eq!(sounds.0.load(Ordering::SeqCst), 1);
        assert!(planner.is_just_completed_at(id, now));
        assert!(!planner.is_just_completed_at(id, now + JUST_COMPLETED_FOR));

        planner.prune_just_completed(now + JUST_COMPLETED_FOR);
        assert!(!planner.is_just_completed_at(id, now));
    }

    #[test]
    fn uncompleting_is_silent() {
        let sounds = CountingFeedback::default();
        let mut planner = Planner::new(date!(2026 - 10 - 18)).with_feedback(sounds.clone());
        let id = planner
            .add_to_day(Day::Monday, Category::Focus, "write", 60)
            .unwrap();

        planner.toggle_completed(Day::Monday, Category::Focus, id);
        assert_eq!(
            planner.toggle_completed(Day::Monday, Category::Focus, id),
            Some(false)
        );
        assert_eq!(sounds.0.load(Ordering::SeqCst), 1);
        assert!(!planner.is_just_completed(id));
        assert!(!planner.find_in_week(id).unwrap().2.completed);
    }

    #[test]
    fn expired_markers_are_dropped_on_the_next_toggle() {
        let mut planner = Planner::new(date!(2026 - 10 - 18));
        let first = planner
            .add_to_day(Day::Monday, Category::Work, "a", 10)
            .unwrap();
        let second = planner
            .add_to_day(Day::Monday, Category::Work, "b", 10)
            .unwrap();

        let start = Instant::now();
        planner.toggle_completed_at(Day::Monday, Category::Work, first, start);
        planner.toggle_completed_at(
            Day::Monday,
            Category::Work,
            second,
            start + JUST_COMPLETED_FOR * 2,
        );

        assert_eq!(planner.just_completed.len(), 1);
        assert!(planner.just_completed.contains_key(&second));
    }

    #[test]
    fn toggle_in_wrong_slot_is_a_noop() {
        let mut planner = Planner::new(date!(2026 - 10 - 18));
        let id = planner
            .add_to_day(Day::Monday, Category::Focus, "write", 60)
            .unwrap();
        let revision = planner.revision();
        assert_eq!(planner.toggle_completed(Day::Monday, Category::Work, id), None);
        assert_eq!(planner.revision(), revision);
    }
}
