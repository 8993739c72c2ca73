use tracing::debug;

use super::*;

impl Planner {
    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn is_dragging(&self) -> bool {
        !matches!(self.drag, DragState::Idle)
    }

    /// Start dragging. Replaces any drag already in progress.
    pub fn begin_drag(&mut self, source: DragSource) {
        debug!(id = source.todo().id, "drag started");
        self.drag = DragState::Dragging { source };
    }

    /// Pick up a pool task by id. Returns false if it is not in the pool.
    pub fn begin_drag_from_pool(&mut self, id: TodoId) -> bool {
        let Some(todo) = self.pool.get(id).cloned() else {
            return false;
        };
        self.begin_drag(DragSource::Pool { todo });
        true
    }

    /// Pick up a task from a slot of the active week.
    pub fn begin_drag_from_week(&mut self, day: Day, category: Category, id: TodoId) -> bool {
        let Some(todo) = self
            .active_week()
            .slot(day, category)
            .iter()
            .find(|todo| todo.id == id)
            .cloned()
        else {
            return false;
        };
        let week_key = self.active_key();
        self.begin_drag(DragSource::Week {
            week_key,
            day,
            category,
            todo,
        });
        true
    }

    /// Record the drop candidate under the pointer. Ignored when idle.
    pub fn hover(&mut self, target: DropTarget) {
        self.drag = match std::mem::take(&mut self.drag) {
            DragState::Idle => DragState::Idle,
            DragState::Dragging { source } | DragState::Hovering { source, .. } => {
                DragState::Hovering { source, target }
            }
        };
    }

    /// Drag ended without a drop.
    pub fn cancel_drag(&mut self) {
        if self.drag.take_source().is_some() {
            debug!("drag cancelled");
        }
    }

    /// Reset drag state unconditionally.
    pub fn cleanup_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Drop the dragged task into `day`/`category` of the active week.
    pub fn drop_on_grid(&mut self, day: Day, category: Category) -> DropOutcome {
        let Some(source) = self.drag.take_source() else {
            return DropOutcome::NoDragSource;
        };

        let active_key = self.active_key();
        let mut active = self.store.snapshot_week(&active_key);

        let mut candidate = source.todo().clone();
        candidate.completed = false;

        if category == Category::Goal
            && active
                .slot(day, Category::Goal)
                .iter()
                .any(|occupant| occupant.id != candidate.id)
        {
            debug!(%day, id = candidate.id, "goal slot occupied, drop rejected");
            return DropOutcome::GoalOccupied;
        }

        let outcome = match source {
            DragSource::Pool { todo } => {
                candidate.apply_flags(category.flags());

                if todo.habit {
                    let instance = Todo {
                        id: self.mint_id(),
                        source_id: Some(todo.id),
                        ..candidate
                    };
                    let instance_id = instance.id;
                    active.slot_mut(day, category).push(instance);
                    self.store.commit([(active_key, active)]);
                    debug!(template = todo.id, instance = instance_id, %day, %category, "habit instantiated");
                    DropOutcome::HabitInstantiated {
                        template_id: todo.id,
                        instance_id,
                    }
                } else {
                    let id = candidate.id;
                    active.slot_mut(day, category).push(candidate);
                    self.store.commit([(active_key, active)]);
                    self.pool.remove(id);
                    debug!(id, %day, %category, "scheduled from pool");
                    DropOutcome::Moved { id }
                }
            }
            DragSource::Week {
                week_key,
                day: from_day,
                category: from_category,
                todo,
            } => {
                let id = todo.id;
                if week_key == active_key {
                    active.take(from_day, from_category, id);
                    active.slot_mut(day, category).push(candidate);
                    self.store.commit([(active_key, active)]);
                } else {
                    let mut origin = self.store.snapshot_week(&week_key);
                    origin.take(from_day, from_category, id);
                    active.slot_mut(day, category).push(candidate);
                    self.store.commit([(week_key, origin), (active_key, active)]);
                }
                debug!(id, from = %from_day, to = %day, %category, "moved within grid");
                DropOutcome::Moved { id }
            }
        };

        self.publish();
        outcome
    }

    /// Drop the dragged task onto the pool. Only week-sourced drags do
    /// anything: ordinary tasks go back to the front of the pool with default
    /// flags, habit instances are discarded.
    pub fn drop_on_pool(&mut self) -> DropOutcome {
        let Some(source) = self.drag.take_source() else {
            return DropOutcome::NoDragSource;
        };
        let DragSource::Week {
            week_key,
            day,
            category,
            todo,
        } = source
        else {
            return DropOutcome::Ignored;
        };

        let mut origin = self.store.snapshot_week(&week_key);
        let mut todo = origin.take(day, category, todo.id).unwrap_or(todo);
        self.store.commit([(week_key, origin)]);

        let outcome = if todo.is_instance() {
            debug!(id = todo.id, "habit instance discarded");
            DropOutcome::InstanceDiscarded { id: todo.id }
        } else {
            todo.apply_flags((false, true));
            let id = todo.id;
            self.pool.push_front(todo);
            debug!(id, "returned to pool");
            DropOutcome::ReturnedToPool { id }
        };

        self.publish();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn planner() -> Planner {
        Planner::new(date!(2026 - 10 - 18))
    }

    fn make_habit(planner: &mut Planner, text: &str) -> TodoId {
        planner.add_to_pool(text, 20, true).unwrap()
    }

    #[test]
    fn drop_without_drag_is_a_noop() {
        let mut planner = planner();
        let revision = planner.revision();
        assert_eq!(
            planner.drop_on_grid(Day::Monday, Category::Focus),
            DropOutcome::NoDragSource
        );
        assert_eq!(planner.drop_on_pool(), DropOutcome::NoDragSource);
        assert_eq!(planner.revision(), revision);
    }

    #[test]
    fn hover_tracks_target_only_while_dragging() {
        let mut planner = planner();
        planner.hover(DropTarget::Pool);
        assert_eq!(planner.drag_state(), &DragState::Idle);

        let id = planner.add_to_pool("x", 5, false).unwrap();
        assert!(planner.begin_drag_from_pool(id));
        let target = DropTarget::Day {
            day: Day::Friday,
            category: Category::Leisure,
        };
        planner.hover(DropTarget::Pool);
        planner.hover(target);
        assert_eq!(planner.drag_state().target(), Some(target));
        assert_eq!(planner.pool().len(), 1);

        planner.cancel_drag();
        assert!(!planner.is_dragging());
        assert_eq!(planner.pool().len(), 1);
    }

    #[test]
    fn pool_to_grid_sets_flags_by_category() {
        let cases = [
            (Category::Goal, (true, true)),
            (Category::Focus, (false, true)),
            (Category::Work, (true, false)),
            (Category::Leisure, (false, false)),
            (Category::Basics, (false, false)),
        ];
        for (category, (urgent, important)) in cases {
            let mut planner = planner();
            let id = planner.add_to_pool("task", 30, false).unwrap();
            planner.begin_drag_from_pool(id);
            assert_eq!(
                planner.drop_on_grid(Day::Tuesday, category),
                DropOutcome::Moved { id }
            );

            let placed = &planner.active_week().slot(Day::Tuesday, category)[0];
            assert_eq!((placed.urgent, placed.important), (urgent, important));
            assert!(planner.pool().is_empty());
        }
    }

    #[test]
    fn occupied_goal_rejects_without_mutation() {
        let mut planner = planner();
        planner.add_to_day(Day::Monday, Category::Goal, "big rock", 120);
        let id = planner.add_to_pool("another", 30, false).unwrap();
        let before_pool = planner.pool().clone();
        let before_week = planner.active_week().clone();

        planner.begin_drag_from_pool(id);
        assert_eq!(
            planner.drop_on_grid(Day::Monday, Category::Goal),
            DropOutcome::GoalOccupied
        );
        assert_eq!(planner.pool(), &before_pool);
        assert_eq!(planner.active_week(), &before_week);
        assert!(!planner.is_dragging());
    }

    #[test]
    fn goal_occupant_can_be_dropped_back_on_its_own_slot() {
        let mut planner = planner();
        let id = planner
            .add_to_day(Day::Monday, Category::Goal, "big rock", 120)
            .unwrap();
        planner.begin_drag_from_week(Day::Monday, Category::Goal, id);
        assert_eq!(
            planner.drop_on_grid(Day::Monday, Category::Goal),
            DropOutcome::Moved { id }
        );
        assert_eq!(planner.active_week().slot(Day::Monday, Category::Goal).len(), 1);
    }

    #[test]
    fn habit_template_stays_in_pool_when_instantiated() {
        let mut planner = planner();
        let template_id = make_habit(&mut planner, "meditate");
        let template = planner.pool().get(template_id).cloned().unwrap();

        planner.begin_drag_from_pool(template_id);
        let DropOutcome::HabitInstantiated { instance_id, .. } =
            planner.drop_on_grid(Day::Monday, Category::Basics)
        else {
            panic!("expected habit instantiation");
        };

        assert_eq!(planner.pool().get(template_id), Some(&template));
        let slot = planner.active_week().slot(Day::Monday, Category::Basics);
        assert_eq!(slot.len(), 1);
        assert_eq!(slot[0].id, instance_id);
        assert_ne!(instance_id, template_id);
        assert_eq!(slot[0].source_id, Some(template_id));
    }

    #[test]
    fn habit_instance_dropped_on_pool_is_discarded() {
        let mut planner = planner();
        let template_id = make_habit(&mut planner, "meditate");
        planner.begin_drag_from_pool(template_id);
        let DropOutcome::HabitInstantiated { instance_id, .. } =
            planner.drop_on_grid(Day::Monday, Category::Basics)
        else {
            panic!("expected habit instantiation");
        };

        planner.begin_drag_from_week(Day::Monday, Category::Basics, instance_id);
        assert_eq!(
            planner.drop_on_pool(),
            DropOutcome::InstanceDiscarded { id: instance_id }
        );

        let ids: Vec<TodoId> = planner.pool().todos().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![template_id]);
        assert!(planner.find_in_week(instance_id).is_none());
    }

    #[test]
    fn ordinary_task_returns_to_front_of_pool_with_reset_flags() {
        let mut planner = planner();
        planner.add_to_pool("older", 30, false);
        let id = planner
            .add_to_day(Day::Wednesday, Category::Work, "report", 60)
            .unwrap();

        planner.begin_drag_from_week(Day::Wednesday, Category::Work, id);
        planner.hover(DropTarget::Pool);
        assert_eq!(planner.drop_on_pool(), DropOutcome::ReturnedToPool { id });

        let front = &planner.pool().todos()[0];
        assert_eq!(front.id, id);
        assert_eq!((front.urgent, front.important), (false, true));
        assert!(planner.active_week().slot(Day::Wednesday, Category::Work).is_empty());
    }

    #[test]
    fn pool_task_dropped_on_pool_is_ignored() {
        let mut planner = planner();
        let id = planner.add_to_pool("stay", 30, false).unwrap();
        planner.begin_drag_from_pool(id);
        assert_eq!(planner.drop_on_pool(), DropOutcome::Ignored);
        assert_eq!(planner.pool().len(), 1);
    }

    #[test]
    fn moving_within_grid_keeps_flags_and_clears_completion() {
        let mut planner = planner();
        let id = planner
            .add_to_day(Day::Monday, Category::Work, "deploy", 45)
            .unwrap();
        planner.toggle_completed(Day::Monday, Category::Work, id);

        planner.begin_drag_from_week(Day::Monday, Category::Work, id);
        assert_eq!(
            planner.drop_on_grid(Day::Thursday, Category::Focus),
            DropOutcome::Moved { id }
        );

        let (day, category, todo) = planner.find_in_week(id).unwrap();
        assert_eq!((day, category), (Day::Thursday, Category::Focus));
        assert!(!todo.completed);
        assert!(todo.urgent && !todo.important);
        assert!(planner.active_week().slot(Day::Monday, Category::Work).is_empty());
    }

    #[test]
    fn drag_picked_up_in_another_week_moves_across_weeks() {
        let mut planner = planner();
        let id = planner
            .add_to_day(Day::Friday, Category::Leisure, "cinema", 150)
            .unwrap();
        let origin = planner.active_key();
        planner.begin_drag_from_week(Day::Friday, Category::Leisure, id);

        planner.next_week();
        assert_eq!(
            planner.drop_on_grid(Day::Saturday, Category::Leisure),
            DropOutcome::Moved { id }
        );

        assert!(planner.find_in_week(id).is_some());
        let origin_week = planner.store().week(&origin).unwrap();
        assert!(origin_week.find(id).is_none());
    }

    #[test]
    fn cleanup_resets_any_state() {
        let mut planner = planner();
        let id = planner.add_to_pool("x", 5, false).unwrap();
        planner.begin_drag_from_pool(id);
        planner.hover(DropTarget::Pool);
        planner.cleanup_drag();
        assert_eq!(planner.drag_state(), &DragState::Idle);
        planner.cleanup_drag();
        assert_eq!(planner.drag_state(), &DragState::Idle);
    }
}
