//! Placement of events on a timeline's bounded integer axis.
//!
//! Events are bucketed by their `time` value; a bucket keeps insertion
//! order and has no further intra-bucket ordering. Placement and movement
//! are bounds-checked against the owning timeline.

use crate::error::CoreError;
use crate::project::{Event, EventDraft, EventId, Timeline};
use tracing::debug;

/// Mutating view over one timeline's event list.
pub struct TimelineEngine<'a> {
    timeline: &'a Timeline,
    events: &'a mut Vec<Event>,
}

impl<'a> TimelineEngine<'a> {
    pub fn new(timeline: &'a Timeline, events: &'a mut Vec<Event>) -> Self {
        Self { timeline, events }
    }

    /// Place a new event at `time`.
    ///
    /// Fails with a range error when `time` falls outside the timeline
    /// bounds, and with a validation error when the draft is incomplete.
    /// Nothing is placed on failure.
    pub fn place_event(&mut self, time: i64, draft: EventDraft) -> Result<Event, CoreError> {
        draft.validate()?;
        self.check_bounds(time)?;

        let event = Event::new(time, draft);
        debug!(event_id = %event.id, time, "event placed");
        self.events.push(event.clone());
        Ok(event)
    }

    /// Replace an event's fields from a draft, keeping its id and time.
    pub fn update_event(&mut self, id: EventId, draft: EventDraft) -> Result<Event, CoreError> {
        draft.validate()?;
        let event = self
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| CoreError::not_found("event", id))?;
        event.apply(draft);
        Ok(event.clone())
    }

    /// Move an event to a new time value.
    ///
    /// Bounds-checked like placement. No history of the previous time is
    /// retained.
    pub fn move_event(&mut self, id: EventId, new_time: i64) -> Result<Event, CoreError> {
        self.check_bounds(new_time)?;
        let event = self
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| CoreError::not_found("event", id))?;
        event.time = new_time;
        Ok(event.clone())
    }

    /// Purge an event from the timeline.
    ///
    /// Idempotent: removing a missing id returns `false` and changes
    /// nothing. Links in other events' `related_events` that pointed at the
    /// removed id are left dangling and resolve to nothing at read time.
    pub fn remove_event(&mut self, id: EventId) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        self.events.len() != before
    }

    /// All events in the time bucket at `time`, in insertion order.
    pub fn events_at(&self, time: i64) -> Vec<&Event> {
        self.events.iter().filter(|e| e.time == time).collect()
    }

    fn check_bounds(&self, time: i64) -> Result<(), CoreError> {
        if self.timeline.contains(time) {
            Ok(())
        } else {
            Err(CoreError::Range {
                time,
                start: self.timeline.start_event,
                end: self.timeline.end_event,
            })
        }
    }
}
