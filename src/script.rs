//! Dense, zero-based ordering of a script's events.
//!
//! A script's events live in a strictly ordered, gap-free sequence. Every
//! structural change (insert, move, delete) renumbers the whole sequence so
//! the `line_index` values are exactly `{0, ..., n-1}` between commands.

use crate::error::CoreError;
use crate::project::{ScriptEvent, ScriptEventDraft, ScriptEventId};
use tracing::debug;

/// Mutating view over one script's event sequence.
pub struct ScriptSequencer<'a> {
    events: &'a mut Vec<ScriptEvent>,
}

impl<'a> ScriptSequencer<'a> {
    pub fn new(events: &'a mut Vec<ScriptEvent>) -> Self {
        Self { events }
    }

    /// Insert a new event at `position`, clamped to `[0, n]`.
    pub fn insert(
        &mut self,
        position: usize,
        draft: ScriptEventDraft,
    ) -> Result<ScriptEvent, CoreError> {
        draft.validate()?;
        let position = position.min(self.events.len());
        let event = ScriptEvent::new(draft);
        debug!(event_id = %event.id, position, "script event inserted");
        self.events.insert(position, event);
        self.renumber();
        Ok(self.events[position].clone())
    }

    /// Replace an event's fields from a draft, keeping its id and position.
    pub fn update(
        &mut self,
        id: ScriptEventId,
        draft: ScriptEventDraft,
    ) -> Result<ScriptEvent, CoreError> {
        draft.validate()?;
        let event = self
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| CoreError::not_found("script event", id))?;
        event.apply(draft);
        Ok(event.clone())
    }

    /// Move an event to `new_position` as one atomic step.
    ///
    /// The event is removed, the position clamped to the resulting array,
    /// and the event re-inserted; the sequence is renumbered afterwards.
    /// Moving an event to its current position is a no-op.
    pub fn move_event(
        &mut self,
        id: ScriptEventId,
        new_position: usize,
    ) -> Result<ScriptEvent, CoreError> {
        let current = self
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| CoreError::not_found("script event", id))?;

        let event = self.events.remove(current);
        let target = new_position.min(self.events.len());
        self.events.insert(target, event);
        self.renumber();
        Ok(self.events[target].clone())
    }

    /// Delete an event and close the gap.
    ///
    /// Idempotent: deleting a missing id returns `false` and changes nothing.
    pub fn delete(&mut self, id: ScriptEventId) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        if self.events.len() == before {
            return false;
        }
        self.renumber();
        true
    }

    /// The event at a given line, if that line is occupied.
    pub fn event_at_line(&self, line_index: usize) -> Option<&ScriptEvent> {
        self.events.iter().find(|e| e.line_index == line_index)
    }

    /// Number of visual rows: one per event plus the trailing empty
    /// insertion slot the presentation layer always renders.
    pub fn row_count(&self) -> usize {
        self.events.len() + 1
    }

    fn renumber(&mut self) {
        for (index, event) in self.events.iter_mut().enumerate() {
            event.line_index = index;
        }
    }
}
