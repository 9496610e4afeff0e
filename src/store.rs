//! Project store: aggregate ownership and snapshot persistence.
//!
//! The store owns the project list, the monotonic id counter, and the
//! per-timeline and per-script event lists. It follows an explicit
//! init(load)/mutate/flush(save) lifecycle: `open` reads everything
//! reachable from the persisted snapshot, every engine operation goes
//! through a store method that mutates in memory and writes through
//! immediately, and a rejected operation changes nothing.
//!
//! Independent processes sharing one adapter are not coordinated: there is
//! no locking or versioning, and concurrent writers clobber each other
//! (last write wins).

use crate::error::CoreError;
use crate::persist::{
    script_events_key, timeline_events_key, PersistError, PersistenceAdapter, NEXT_ID_KEY,
    PROJECTS_KEY,
};
use crate::project::{
    Character, CharacterDraft, CharacterId, Event, EventAssociation, EventDraft, EventId, Project,
    ProjectDraft, ProjectId, Script, ScriptDraft, ScriptEvent, ScriptEventDraft, ScriptEventId,
    ScriptId, Timeline, TimelineDraft, TimelineId,
};
use crate::relationship;
use crate::script::ScriptSequencer;
use crate::timeline::TimelineEngine;
use crate::xref::{self, Resolution};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Owner of all persisted narrative-planning state.
#[derive(Debug)]
pub struct ProjectStore<A: PersistenceAdapter> {
    adapter: A,
    projects: Vec<Project>,
    next_id: u64,
    timeline_events: HashMap<TimelineId, Vec<Event>>,
    script_events: HashMap<ScriptId, Vec<ScriptEvent>>,
}

impl<A: PersistenceAdapter> ProjectStore<A> {
    /// Open a store over an adapter, loading the persisted snapshot.
    ///
    /// Missing keys load as empty state, so the first run over a fresh
    /// adapter starts with no projects and the counter at 1. Event lists
    /// are loaded for every timeline and script reachable from the project
    /// list; orphaned keys left behind by past deletes are ignored.
    pub fn open(adapter: A) -> Result<Self, CoreError> {
        let mut store = Self {
            adapter,
            projects: Vec::new(),
            next_id: 1,
            timeline_events: HashMap::new(),
            script_events: HashMap::new(),
        };

        if let Some(bytes) = store.adapter.get(PROJECTS_KEY)? {
            store.projects = serde_json::from_slice(&bytes).map_err(PersistError::from)?;
        }
        // Snapshots are validated on load as well as on write, so a
        // hand-edited file cannot smuggle in entities the drafts would
        // have rejected.
        for project in &store.projects {
            project.validate()?;
        }
        if let Some(bytes) = store.adapter.get(NEXT_ID_KEY)? {
            store.next_id = serde_json::from_slice(&bytes).map_err(PersistError::from)?;
        }

        let timeline_ids: Vec<TimelineId> = store
            .projects
            .iter()
            .flat_map(|p| p.timelines.iter().map(|t| t.id))
            .collect();
        for id in timeline_ids {
            if let Some(bytes) = store.adapter.get(&timeline_events_key(id))? {
                let events = serde_json::from_slice(&bytes).map_err(PersistError::from)?;
                store.timeline_events.insert(id, events);
            }
        }

        let script_ids: Vec<ScriptId> = store
            .projects
            .iter()
            .flat_map(|p| p.scripts.iter().map(|s| s.id))
            .collect();
        for id in script_ids {
            if let Some(bytes) = store.adapter.get(&script_events_key(id))? {
                let mut events: Vec<ScriptEvent> =
                    serde_json::from_slice(&bytes).map_err(PersistError::from)?;
                // A sequence whose indices are not exactly 0..n is repaired
                // on load: order by stored index, then renumber.
                events.sort_by_key(|e| e.line_index);
                if events.iter().enumerate().any(|(i, e)| e.line_index != i) {
                    warn!(script_id = %id, "script event sequence has index gaps, renumbering");
                    for (i, event) in events.iter_mut().enumerate() {
                        event.line_index = i;
                    }
                }
                store.script_events.insert(id, events);
            }
        }

        debug!(projects = store.projects.len(), "store opened");
        Ok(store)
    }

    /// Consume the store, returning the adapter.
    pub fn into_adapter(self) -> A {
        self.adapter
    }

    // =========================================================================
    // Projects
    // =========================================================================

    /// All projects, in creation order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Find a project by id.
    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    /// Create a project with empty child collections.
    ///
    /// Assigns the next `p{n}` id; the counter is incremented exactly once
    /// per successful create and persisted alongside the project list.
    pub fn create_project(&mut self, draft: ProjectDraft) -> Result<Project, CoreError> {
        draft.validate()?;
        let id = ProjectId::from_counter(self.next_id);
        let project = Project::new(id, draft);
        debug!(id = %project.id, "project created");

        self.projects.push(project.clone());
        self.next_id += 1;
        self.persist_projects()?;
        Ok(project)
    }

    /// Replace a whole project aggregate by id. Last writer wins; there is
    /// no field-level merge and no concurrency check.
    ///
    /// The replacement is validated as a whole, so embedded entities cannot
    /// bypass the invariants their drafts enforce (required names, timeline
    /// bounds).
    pub fn update_project(&mut self, project: Project) -> Result<Project, CoreError> {
        project.validate()?;
        let slot = self
            .projects
            .iter_mut()
            .find(|p| p.id == project.id)
            .ok_or_else(|| CoreError::not_found("project", &project.id))?;
        *slot = project.clone();
        self.persist_projects()?;
        Ok(project)
    }

    /// Delete a project. Idempotent; event-list keys of its timelines and
    /// scripts are left behind in the adapter as tolerated orphans.
    pub fn delete_project(&mut self, id: &ProjectId) -> Result<(), CoreError> {
        let Some(index) = self.projects.iter().position(|p| &p.id == id) else {
            return Ok(());
        };
        let project = self.projects.remove(index);
        for timeline in &project.timelines {
            self.timeline_events.remove(&timeline.id);
        }
        for script in &project.scripts {
            self.script_events.remove(&script.id);
        }
        debug!(%id, "project deleted");
        self.persist_projects()?;
        Ok(())
    }

    // =========================================================================
    // Characters
    // =========================================================================

    /// Create a character (no id) or update one (id supplied by the caller).
    pub fn save_character(
        &mut self,
        project_id: &ProjectId,
        id: Option<CharacterId>,
        draft: CharacterDraft,
    ) -> Result<Character, CoreError> {
        draft.validate()?;
        let project = self.project_mut_required(project_id)?;
        let character = match id {
            Some(id) => {
                let character = project
                    .character_mut(id)
                    .ok_or_else(|| CoreError::not_found("character", id))?;
                character.apply(draft);
                character.clone()
            }
            None => {
                let character = Character::new(draft);
                project.characters.push(character.clone());
                character
            }
        };
        self.persist_projects()?;
        Ok(character)
    }

    /// Delete a character. Idempotent; relationship edges and event
    /// character references pointing at it are left dangling and resolve
    /// as stale at read time.
    pub fn delete_character(
        &mut self,
        project_id: &ProjectId,
        id: CharacterId,
    ) -> Result<(), CoreError> {
        let Some(project) = self.projects.iter_mut().find(|p| &p.id == project_id) else {
            return Ok(());
        };
        let before = project.characters.len();
        project.characters.retain(|c| c.id != id);
        if project.characters.len() != before {
            self.persist_projects()?;
        }
        Ok(())
    }

    /// Add a directed relationship edge; see [`relationship::add`] for the
    /// no-op conditions. Persists only when an edge was added.
    pub fn add_relationship(
        &mut self,
        project_id: &ProjectId,
        character_id: CharacterId,
        target_id: CharacterId,
        kind: &str,
    ) -> Result<bool, CoreError> {
        let project = self.project_mut_required(project_id)?;
        let added = relationship::add(&mut project.characters, character_id, target_id, kind);
        if added {
            self.persist_projects()?;
        }
        Ok(added)
    }

    /// Remove a relationship edge by position in the character's list.
    pub fn remove_relationship(
        &mut self,
        project_id: &ProjectId,
        character_id: CharacterId,
        index: usize,
    ) -> Result<bool, CoreError> {
        let project = self.project_mut_required(project_id)?;
        let character = project
            .character_mut(character_id)
            .ok_or_else(|| CoreError::not_found("character", character_id))?;
        let removed = relationship::remove(character, index);
        if removed {
            self.persist_projects()?;
        }
        Ok(removed)
    }

    // =========================================================================
    // Timelines and Events
    // =========================================================================

    /// Create or update a timeline. The draft is validated on both paths,
    /// so `end_event > start_event` holds for every stored timeline.
    pub fn save_timeline(
        &mut self,
        project_id: &ProjectId,
        id: Option<TimelineId>,
        draft: TimelineDraft,
    ) -> Result<Timeline, CoreError> {
        draft.validate()?;
        let project = self.project_mut_required(project_id)?;
        let timeline = match id {
            Some(id) => {
                let timeline = project
                    .timeline_mut(id)
                    .ok_or_else(|| CoreError::not_found("timeline", id))?;
                timeline.apply(draft);
                timeline.clone()
            }
            None => {
                let timeline = Timeline::new(draft);
                project.timelines.push(timeline.clone());
                timeline
            }
        };
        self.timeline_events.entry(timeline.id).or_default();
        self.persist_projects()?;
        Ok(timeline)
    }

    /// Delete a timeline. Idempotent. Its persisted event-list key is left
    /// behind as a tolerated orphan; script event associations pointing at
    /// it resolve as broken from now on.
    pub fn delete_timeline(
        &mut self,
        project_id: &ProjectId,
        id: TimelineId,
    ) -> Result<(), CoreError> {
        let Some(project) = self.projects.iter_mut().find(|p| &p.id == project_id) else {
            return Ok(());
        };
        let before = project.timelines.len();
        project.timelines.retain(|t| t.id != id);
        if project.timelines.len() != before {
            self.timeline_events.remove(&id);
            self.persist_projects()?;
        }
        Ok(())
    }

    /// Events placed on a timeline, in placement order.
    pub fn timeline_events(&self, id: TimelineId) -> &[Event] {
        self.timeline_events.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Events in one time bucket, in placement order.
    pub fn events_at(&self, timeline_id: TimelineId, time: i64) -> Vec<&Event> {
        self.timeline_events(timeline_id)
            .iter()
            .filter(|e| e.time == time)
            .collect()
    }

    /// Place an event on a timeline; see [`TimelineEngine::place_event`].
    pub fn place_event(
        &mut self,
        project_id: &ProjectId,
        timeline_id: TimelineId,
        time: i64,
        draft: EventDraft,
    ) -> Result<Event, CoreError> {
        let timeline = self.timeline_required(project_id, timeline_id)?;
        let events = self.timeline_events.entry(timeline_id).or_default();
        let event = TimelineEngine::new(&timeline, events).place_event(time, draft)?;
        self.persist_timeline_events(timeline_id)?;
        Ok(event)
    }

    /// Update an event's fields, keeping its id and time.
    pub fn update_event(
        &mut self,
        project_id: &ProjectId,
        timeline_id: TimelineId,
        event_id: EventId,
        draft: EventDraft,
    ) -> Result<Event, CoreError> {
        let timeline = self.timeline_required(project_id, timeline_id)?;
        let events = self.timeline_events.entry(timeline_id).or_default();
        let event = TimelineEngine::new(&timeline, events).update_event(event_id, draft)?;
        self.persist_timeline_events(timeline_id)?;
        Ok(event)
    }

    /// Move an event to a new time; see [`TimelineEngine::move_event`].
    pub fn move_event(
        &mut self,
        project_id: &ProjectId,
        timeline_id: TimelineId,
        event_id: EventId,
        new_time: i64,
    ) -> Result<Event, CoreError> {
        let timeline = self.timeline_required(project_id, timeline_id)?;
        let events = self.timeline_events.entry(timeline_id).or_default();
        let event = TimelineEngine::new(&timeline, events).move_event(event_id, new_time)?;
        self.persist_timeline_events(timeline_id)?;
        Ok(event)
    }

    /// Remove an event from a timeline. Idempotent, including when the
    /// timeline itself is gone.
    pub fn remove_event(
        &mut self,
        project_id: &ProjectId,
        timeline_id: TimelineId,
        event_id: EventId,
    ) -> Result<(), CoreError> {
        let Ok(timeline) = self.timeline_required(project_id, timeline_id) else {
            return Ok(());
        };
        let events = self.timeline_events.entry(timeline_id).or_default();
        if TimelineEngine::new(&timeline, events).remove_event(event_id) {
            self.persist_timeline_events(timeline_id)?;
        }
        Ok(())
    }

    // =========================================================================
    // Scripts and Script Events
    // =========================================================================

    /// Create or update a script.
    pub fn save_script(
        &mut self,
        project_id: &ProjectId,
        id: Option<ScriptId>,
        draft: ScriptDraft,
    ) -> Result<Script, CoreError> {
        draft.validate()?;
        let project = self.project_mut_required(project_id)?;
        let script = match id {
            Some(id) => {
                let script = project
                    .script_mut(id)
                    .ok_or_else(|| CoreError::not_found("script", id))?;
                script.apply(draft);
                script.clone()
            }
            None => {
                let script = Script::new(draft);
                project.scripts.push(script.clone());
                script
            }
        };
        self.script_events.entry(script.id).or_default();
        self.persist_projects()?;
        Ok(script)
    }

    /// Delete a script. Idempotent; its persisted event-sequence key is
    /// left behind as a tolerated orphan.
    pub fn delete_script(
        &mut self,
        project_id: &ProjectId,
        id: ScriptId,
    ) -> Result<(), CoreError> {
        let Some(project) = self.projects.iter_mut().find(|p| &p.id == project_id) else {
            return Ok(());
        };
        let before = project.scripts.len();
        project.scripts.retain(|s| s.id != id);
        if project.scripts.len() != before {
            self.script_events.remove(&id);
            self.persist_projects()?;
        }
        Ok(())
    }

    /// A script's event sequence, ordered by line index.
    pub fn script_events(&self, id: ScriptId) -> &[ScriptEvent] {
        self.script_events.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Visual rows for a script: its events plus the trailing empty
    /// insertion slot.
    pub fn script_row_count(&self, id: ScriptId) -> usize {
        self.script_events(id).len() + 1
    }

    /// Insert a script event; see [`ScriptSequencer::insert`].
    pub fn insert_script_event(
        &mut self,
        project_id: &ProjectId,
        script_id: ScriptId,
        position: usize,
        draft: ScriptEventDraft,
    ) -> Result<ScriptEvent, CoreError> {
        self.script_required(project_id, script_id)?;
        let events = self.script_events.entry(script_id).or_default();
        let event = ScriptSequencer::new(events).insert(position, draft)?;
        self.persist_script_events(script_id)?;
        Ok(event)
    }

    /// Update a script event's fields, keeping its id and line index.
    pub fn update_script_event(
        &mut self,
        project_id: &ProjectId,
        script_id: ScriptId,
        event_id: ScriptEventId,
        draft: ScriptEventDraft,
    ) -> Result<ScriptEvent, CoreError> {
        self.script_required(project_id, script_id)?;
        let events = self.script_events.entry(script_id).or_default();
        let event = ScriptSequencer::new(events).update(event_id, draft)?;
        self.persist_script_events(script_id)?;
        Ok(event)
    }

    /// Move a script event to a new line as one atomic command; see
    /// [`ScriptSequencer::move_event`].
    pub fn move_script_event(
        &mut self,
        project_id: &ProjectId,
        script_id: ScriptId,
        event_id: ScriptEventId,
        new_position: usize,
    ) -> Result<ScriptEvent, CoreError> {
        self.script_required(project_id, script_id)?;
        let events = self.script_events.entry(script_id).or_default();
        let event = ScriptSequencer::new(events).move_event(event_id, new_position)?;
        self.persist_script_events(script_id)?;
        Ok(event)
    }

    /// Delete a script event and renumber the survivors. Idempotent,
    /// including when the script itself is gone.
    pub fn delete_script_event(
        &mut self,
        project_id: &ProjectId,
        script_id: ScriptId,
        event_id: ScriptEventId,
    ) -> Result<(), CoreError> {
        if self.script_required(project_id, script_id).is_err() {
            return Ok(());
        }
        let events = self.script_events.entry(script_id).or_default();
        if ScriptSequencer::new(events).delete(event_id) {
            self.persist_script_events(script_id)?;
        }
        Ok(())
    }

    // =========================================================================
    // Cross-reference resolution
    // =========================================================================

    /// Resolve a script event association at read time. A dangling target
    /// resolves as broken, never as an error.
    pub fn resolve_association(
        &self,
        project_id: &ProjectId,
        association: &EventAssociation,
    ) -> Result<Resolution<'_>, CoreError> {
        let project = self
            .project(project_id)
            .ok_or_else(|| CoreError::not_found("project", project_id))?;
        Ok(xref::resolve_association(
            project,
            &self.timeline_events,
            association,
        ))
    }

    // =========================================================================
    // Helpers and persistence
    // =========================================================================

    fn project_mut_required(&mut self, id: &ProjectId) -> Result<&mut Project, CoreError> {
        self.projects
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| CoreError::not_found("project", id))
    }

    fn timeline_required(
        &self,
        project_id: &ProjectId,
        timeline_id: TimelineId,
    ) -> Result<Timeline, CoreError> {
        self.project(project_id)
            .ok_or_else(|| CoreError::not_found("project", project_id))?
            .timeline(timeline_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("timeline", timeline_id))
    }

    fn script_required(
        &self,
        project_id: &ProjectId,
        script_id: ScriptId,
    ) -> Result<(), CoreError> {
        self.project(project_id)
            .ok_or_else(|| CoreError::not_found("project", project_id))?
            .script(script_id)
            .map(|_| ())
            .ok_or_else(|| CoreError::not_found("script", script_id))
    }

    /// Re-serialize the whole project list and the counter under their two
    /// stable keys. Called after every successful aggregate mutation.
    fn persist_projects(&mut self) -> Result<(), PersistError> {
        let projects = serde_json::to_vec_pretty(&self.projects)?;
        let next_id = serde_json::to_vec(&self.next_id)?;
        self.adapter.set(PROJECTS_KEY, &projects)?;
        self.adapter.set(NEXT_ID_KEY, &next_id)?;
        Ok(())
    }

    fn persist_timeline_events(&mut self, id: TimelineId) -> Result<(), PersistError> {
        let bytes = match self.timeline_events.get(&id) {
            Some(events) => serde_json::to_vec_pretty(events)?,
            None => serde_json::to_vec_pretty::<Vec<Event>>(&Vec::new())?,
        };
        self.adapter.set(&timeline_events_key(id), &bytes)
    }

    fn persist_script_events(&mut self, id: ScriptId) -> Result<(), PersistError> {
        let bytes = match self.script_events.get(&id) {
            Some(events) => serde_json::to_vec_pretty(events)?,
            None => serde_json::to_vec_pretty::<Vec<ScriptEvent>>(&Vec::new())?,
        };
        self.adapter.set(&script_events_key(id), &bytes)
    }
}
