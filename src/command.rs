//! Commands: every mutation expressed as data.
//!
//! Each variant maps onto one store method. Commands serialize, so a
//! frontend or an automation layer can describe mutations without calling
//! the store directly; `execute` applies them all-or-nothing, returning the
//! entity the mutation produced.

use crate::error::CoreError;
use crate::persist::PersistenceAdapter;
use crate::project::{
    Character, CharacterDraft, CharacterId, Event, EventDraft, EventId, Project, ProjectDraft,
    ProjectId, Script, ScriptDraft, ScriptEvent, ScriptEventDraft, ScriptEventId, ScriptId,
    Timeline, TimelineDraft, TimelineId,
};
use crate::store::ProjectStore;
use serde::{Deserialize, Serialize};

/// A single mutation of the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    CreateProject {
        draft: ProjectDraft,
    },
    /// Replace a whole project aggregate. Last writer wins.
    UpdateProject {
        project: Project,
    },
    DeleteProject {
        id: ProjectId,
    },

    /// Create a character (`id: None`) or update one (`id: Some`).
    SaveCharacter {
        project_id: ProjectId,
        id: Option<CharacterId>,
        draft: CharacterDraft,
    },
    DeleteCharacter {
        project_id: ProjectId,
        id: CharacterId,
    },
    AddRelationship {
        project_id: ProjectId,
        character_id: CharacterId,
        target_id: CharacterId,
        kind: String,
    },
    RemoveRelationship {
        project_id: ProjectId,
        character_id: CharacterId,
        index: usize,
    },

    SaveTimeline {
        project_id: ProjectId,
        id: Option<TimelineId>,
        draft: TimelineDraft,
    },
    DeleteTimeline {
        project_id: ProjectId,
        id: TimelineId,
    },
    PlaceEvent {
        project_id: ProjectId,
        timeline_id: TimelineId,
        time: i64,
        draft: EventDraft,
    },
    UpdateEvent {
        project_id: ProjectId,
        timeline_id: TimelineId,
        event_id: EventId,
        draft: EventDraft,
    },
    /// Reposition an event in one atomic step.
    MoveEvent {
        project_id: ProjectId,
        timeline_id: TimelineId,
        event_id: EventId,
        new_time: i64,
    },
    RemoveEvent {
        project_id: ProjectId,
        timeline_id: TimelineId,
        event_id: EventId,
    },

    SaveScript {
        project_id: ProjectId,
        id: Option<ScriptId>,
        draft: ScriptDraft,
    },
    DeleteScript {
        project_id: ProjectId,
        id: ScriptId,
    },
    InsertScriptEvent {
        project_id: ProjectId,
        script_id: ScriptId,
        position: usize,
        draft: ScriptEventDraft,
    },
    UpdateScriptEvent {
        project_id: ProjectId,
        script_id: ScriptId,
        event_id: ScriptEventId,
        draft: ScriptEventDraft,
    },
    MoveScriptEvent {
        project_id: ProjectId,
        script_id: ScriptId,
        event_id: ScriptEventId,
        new_position: usize,
    },
    DeleteScriptEvent {
        project_id: ProjectId,
        script_id: ScriptId,
        event_id: ScriptEventId,
    },
}

/// What a successfully executed command produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    Project(Project),
    Character(Character),
    Timeline(Timeline),
    Event(Event),
    Script(Script),
    ScriptEvent(ScriptEvent),
    /// Whether the relationship command changed anything.
    RelationshipChanged(bool),
    /// The target is gone, whether or not it existed beforehand.
    Deleted,
}

impl<A: PersistenceAdapter> ProjectStore<A> {
    /// Apply one command to the store.
    ///
    /// Validation and range failures reject the command before any state
    /// changes; deletes of already-missing targets succeed as no-ops.
    pub fn execute(&mut self, command: Command) -> Result<Outcome, CoreError> {
        match command {
            Command::CreateProject { draft } => {
                self.create_project(draft).map(Outcome::Project)
            }
            Command::UpdateProject { project } => {
                self.update_project(project).map(Outcome::Project)
            }
            Command::DeleteProject { id } => {
                self.delete_project(&id)?;
                Ok(Outcome::Deleted)
            }

            Command::SaveCharacter {
                project_id,
                id,
                draft,
            } => self
                .save_character(&project_id, id, draft)
                .map(Outcome::Character),
            Command::DeleteCharacter { project_id, id } => {
                self.delete_character(&project_id, id)?;
                Ok(Outcome::Deleted)
            }
            Command::AddRelationship {
                project_id,
                character_id,
                target_id,
                kind,
            } => self
                .add_relationship(&project_id, character_id, target_id, &kind)
                .map(Outcome::RelationshipChanged),
            Command::RemoveRelationship {
                project_id,
                character_id,
                index,
            } => self
                .remove_relationship(&project_id, character_id, index)
                .map(Outcome::RelationshipChanged),

            Command::SaveTimeline {
                project_id,
                id,
                draft,
            } => self
                .save_timeline(&project_id, id, draft)
                .map(Outcome::Timeline),
            Command::DeleteTimeline { project_id, id } => {
                self.delete_timeline(&project_id, id)?;
                Ok(Outcome::Deleted)
            }
            Command::PlaceEvent {
                project_id,
                timeline_id,
                time,
                draft,
            } => self
                .place_event(&project_id, timeline_id, time, draft)
                .map(Outcome::Event),
            Command::UpdateEvent {
                project_id,
                timeline_id,
                event_id,
                draft,
            } => self
                .update_event(&project_id, timeline_id, event_id, draft)
                .map(Outcome::Event),
            Command::MoveEvent {
                project_id,
                timeline_id,
                event_id,
                new_time,
            } => self
                .move_event(&project_id, timeline_id, event_id, new_time)
                .map(Outcome::Event),
            Command::RemoveEvent {
                project_id,
                timeline_id,
                event_id,
            } => {
                self.remove_event(&project_id, timeline_id, event_id)?;
                Ok(Outcome::Deleted)
            }

            Command::SaveScript {
                project_id,
                id,
                draft,
            } => self
                .save_script(&project_id, id, draft)
                .map(Outcome::Script),
            Command::DeleteScript { project_id, id } => {
                self.delete_script(&project_id, id)?;
                Ok(Outcome::Deleted)
            }
            Command::InsertScriptEvent {
                project_id,
                script_id,
                position,
                draft,
            } => self
                .insert_script_event(&project_id, script_id, position, draft)
                .map(Outcome::ScriptEvent),
            Command::UpdateScriptEvent {
                project_id,
                script_id,
                event_id,
                draft,
            } => self
                .update_script_event(&project_id, script_id, event_id, draft)
                .map(Outcome::ScriptEvent),
            Command::MoveScriptEvent {
                project_id,
                script_id,
                event_id,
                new_position,
            } => self
                .move_script_event(&project_id, script_id, event_id, new_position)
                .map(Outcome::ScriptEvent),
            Command::DeleteScriptEvent {
                project_id,
                script_id,
                event_id,
            } => {
                self.delete_script_event(&project_id, script_id, event_id)?;
                Ok(Outcome::Deleted)
            }
        }
    }
}
