use super::*;

impl Planner {
    /// Open an edit draft for `todo`, replacing any open draft.
    pub fn begin_edit(&mut self, todo: &Todo) {
        self.edit = Some(EditDraft {
            id: todo.id,
            text: todo.text.clone(),
            duration_input: todo.duration.to_string(),
        });
    }

    /// Open a draft for a task in the active week or, failing that, the pool.
    pub fn begin_edit_by_id(&mut self, id: TodoId) -> bool {
        let todo = self
            .find_in_week(id)
            .map(|(_, _, todo)| todo)
            .or_else(|| self.pool.get(id))
            .cloned();
        match todo {
            Some(todo) => {
                self.begin_edit(&todo);
                true
            }
            None => false,
        }
    }

    pub fn edit_draft(&self) -> Option<&EditDraft> {
        self.edit.as_ref()
    }

    pub fn edit_draft_mut(&mut self) -> Option<&mut EditDraft> {
        self.edit.as_mut()
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    /// Drop the draft without touching any task.
    pub fn discard_edit(&mut self) {
        self.edit = None;
    }

    /// Write the draft back. The active week is searched first, then the pool;
    /// a task that vanished meanwhile is silently skipped.
    pub fn commit_edit(&mut self) -> EditOutcome {
        let Some(draft) = self.edit.take() else {
            return EditOutcome::NoDraft;
        };
        let duration = parse_duration(&draft.duration_input, 0);

        let key = self.active_key();
        let mut week = self.store.snapshot_week(&key);
        let location = week.find(draft.id).map(|(day, category, _)| (day, category));

        if let Some((day, category)) = location {
            if let Some(todo) = week
                .slot_mut(day, category)
                .iter_mut()
                .find(|todo| todo.id == draft.id)
            {
                todo.text = draft.text;
                todo.duration = duration;
            }
            self.store.commit([(key, week)]);
            self.publish();
            return EditOutcome::UpdatedInWeek;
        }

        match self.pool.get_mut(draft.id) {
            Some(todo) => {
                todo.text = draft.text;
                todo.duration = duration;
                self.publish();
                EditOutcome::UpdatedInPool
            }
            None => {
                tracing::debug!(id = draft.id, "edited task no longer exists");
                EditOutcome::NotFound
            }
        }
    }
}

/// Coerce user input to whole non-negative minutes. Negative numbers clamp
/// to 0; anything unparsable yields `default`.
pub fn parse_duration(input: &str, default: u32) -> u32 {
    let input = input.trim();
    if let Ok(minutes) = input.parse::<i64>() {
        return minutes.clamp(0, u32::MAX as i64) as u32;
    }
    match input.parse::<f64>() {
        Ok(minutes) if minutes.is_finite() => minutes.max(0.0).min(u32::MAX as f64) as u32,
        _ => default,
    }
}
