//! Narrative-planning entity types.
//!
//! Contains the Project aggregate and everything it owns: characters with
//! their relationship edges, timelines with placed events, and scripts with
//! their sequenced events. Mutation goes through the engines and the store;
//! creation goes through the draft types, which carry a fixed field set and
//! are validated on every write.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for projects.
///
/// Projects keep the human-readable `p{n}` format backed by the persisted
/// monotonic counter; child entities use random ids instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(String);

impl ProjectId {
    pub(crate) fn from_counter(n: u64) -> Self {
        Self(format!("p{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for timelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineId(pub Uuid);

impl TimelineId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimelineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for timeline events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptId(pub Uuid);

impl ScriptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScriptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for script events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptEventId(pub Uuid);

impl ScriptEventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScriptEventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScriptEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Character gender options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "masculino")]
    Masculine,
    #[serde(rename = "feminino")]
    Feminine,
    #[serde(rename = "outros")]
    Other,
}

impl Gender {
    /// Get the display label.
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Masculine => "Masculino",
            Gender::Feminine => "Feminino",
            Gender::Other => "Outros",
        }
    }
}

/// Unit of the integer time axis of a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    pub fn name(&self) -> &'static str {
        match self {
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
            TimeUnit::Year => "year",
        }
    }
}

/// How a character participates in a timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterAction {
    /// Physically present in the event.
    #[serde(rename = "No Evento")]
    Present,
    /// Only mentioned in the event.
    #[serde(rename = "Citado")]
    Cited,
}

/// How one timeline event relates to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventLinkKind {
    #[serde(rename = "Sequencial")]
    Sequential,
    #[serde(rename = "Direto")]
    Direct,
    #[serde(rename = "Indireto")]
    Indirect,
    #[serde(rename = "Oculto")]
    Hidden,
}

/// How a script event is associated with a timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssociationKind {
    Direct,
    Indirect,
    Hidden,
}

// ============================================================================
// Characters and Relationships
// ============================================================================

/// A directed relationship edge from one character to another.
///
/// `target_name` is snapshotted when the edge is created and never refreshed
/// if the target is later renamed. Edges are not reconciled against a
/// reverse edge: two characters may describe the same relationship
/// differently, or only one of them may record it at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// The character this edge points at.
    pub target_id: CharacterId,
    /// Relationship label ("amigos", "inimigos", ...).
    pub kind: String,
    /// The target's name at the moment the edge was created.
    pub target_name: String,
}

/// A character in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    /// Free-form birth date, as entered in the form.
    pub birth_date: String,
    pub gender: Gender,
    pub biography: String,
    /// Outgoing relationship edges, in insertion order.
    pub relationships: Vec<Relationship>,
}

impl Character {
    /// Create a character from a validated draft.
    pub(crate) fn new(draft: CharacterDraft) -> Self {
        Self {
            id: CharacterId::new(),
            name: draft.name,
            birth_date: draft.birth_date,
            gender: draft.gender,
            biography: draft.biography,
            relationships: draft.relationships,
        }
    }

    /// Replace fields from a draft, keeping the id.
    pub(crate) fn apply(&mut self, draft: CharacterDraft) {
        self.name = draft.name;
        self.birth_date = draft.birth_date;
        self.gender = draft.gender;
        self.biography = draft.biography;
        self.relationships = draft.relationships;
    }
}

// ============================================================================
// Timelines and Events
// ============================================================================

/// A bounded integer time axis events are placed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub id: TimelineId,
    pub name: String,
    pub description: String,
    pub time_unit: TimeUnit,
    /// First valid time value, inclusive.
    pub start_event: i64,
    /// Last valid time value, inclusive. Always greater than `start_event`.
    pub end_event: i64,
}

impl Timeline {
    pub(crate) fn new(draft: TimelineDraft) -> Self {
        Self {
            id: TimelineId::new(),
            name: draft.name,
            description: draft.description,
            time_unit: draft.time_unit,
            start_event: draft.start_event,
            end_event: draft.end_event,
        }
    }

    pub(crate) fn apply(&mut self, draft: TimelineDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.time_unit = draft.time_unit;
        self.start_event = draft.start_event;
        self.end_event = draft.end_event;
    }

    /// Check whether a time value falls inside the timeline bounds.
    pub fn contains(&self, time: i64) -> bool {
        (self.start_event..=self.end_event).contains(&time)
    }
}

/// A character's participation in a timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRef {
    pub character_id: CharacterId,
    pub action: CharacterAction,
}

/// A typed link from one timeline event to another.
///
/// Links are not cleaned up when the target event is removed; a dangling
/// link resolves to nothing at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLink {
    pub event_id: EventId,
    pub kind: EventLinkKind,
}

/// An event placed on a timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    /// Free-text script for the event.
    pub script: String,
    /// Position on the owning timeline's axis.
    pub time: i64,
    pub characters: Vec<CharacterRef>,
    pub related_events: Vec<EventLink>,
}

impl Event {
    pub(crate) fn new(time: i64, draft: EventDraft) -> Self {
        Self {
            id: EventId::new(),
            name: draft.name,
            script: draft.script,
            time,
            characters: draft.characters,
            related_events: draft.related_events,
        }
    }

    /// Replace fields from a draft, keeping the id and the placed time.
    pub(crate) fn apply(&mut self, draft: EventDraft) {
        self.name = draft.name;
        self.script = draft.script;
        self.characters = draft.characters;
        self.related_events = draft.related_events;
    }
}

// ============================================================================
// Scripts and Script Events
// ============================================================================

/// A script whose event sequence is persisted independently of the
/// project snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub id: ScriptId,
    pub name: String,
    pub description: String,
}

impl Script {
    pub(crate) fn new(draft: ScriptDraft) -> Self {
        Self {
            id: ScriptId::new(),
            name: draft.name,
            description: draft.description,
        }
    }

    pub(crate) fn apply(&mut self, draft: ScriptDraft) {
        self.name = draft.name;
        self.description = draft.description;
    }
}

/// An association from a script event to a timeline event.
///
/// Writing an association never verifies the target exists; resolution
/// happens at read time through the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAssociation {
    pub kind: AssociationKind,
    pub timeline_id: TimelineId,
    pub event_id: EventId,
}

/// An event in a script's ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub id: ScriptEventId,
    pub title: String,
    pub description: String,
    /// Zero-based position in the script. Contiguous across the sequence:
    /// the set of values is always exactly `{0, ..., n-1}` between commands.
    pub line_index: usize,
    pub associations: Vec<EventAssociation>,
}

impl ScriptEvent {
    pub(crate) fn new(draft: ScriptEventDraft) -> Self {
        Self {
            id: ScriptEventId::new(),
            title: draft.title,
            description: draft.description,
            line_index: 0,
            associations: draft.associations,
        }
    }

    /// Replace fields from a draft, keeping the id and line index.
    pub(crate) fn apply(&mut self, draft: ScriptEventDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.associations = draft.associations;
    }
}

// ============================================================================
// Project Aggregate
// ============================================================================

/// A project and every entity it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub characters: Vec<Character>,
    pub timelines: Vec<Timeline>,
    pub scripts: Vec<Script>,
}

impl Project {
    pub(crate) fn new(id: ProjectId, draft: ProjectDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            characters: Vec::new(),
            timelines: Vec::new(),
            scripts: Vec::new(),
        }
    }

    /// Find a character by id.
    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub(crate) fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    /// Find a timeline by id.
    pub fn timeline(&self, id: TimelineId) -> Option<&Timeline> {
        self.timelines.iter().find(|t| t.id == id)
    }

    pub(crate) fn timeline_mut(&mut self, id: TimelineId) -> Option<&mut Timeline> {
        self.timelines.iter_mut().find(|t| t.id == id)
    }

    /// Find a script by id.
    pub fn script(&self, id: ScriptId) -> Option<&Script> {
        self.scripts.iter().find(|s| s.id == id)
    }

    pub(crate) fn script_mut(&mut self, id: ScriptId) -> Option<&mut Script> {
        self.scripts.iter_mut().find(|s| s.id == id)
    }

    /// Validate the aggregate's own fields and every embedded entity.
    ///
    /// Whole-aggregate writes and snapshot loads come through here, so the
    /// field invariants drafts enforce one entity at a time also hold for
    /// entities arriving in bulk.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_field(&self.name, "project name is required")?;
        for character in &self.characters {
            require_field(&character.name, "character name is required")?;
        }
        for timeline in &self.timelines {
            require_field(&timeline.name, "timeline name is required")?;
            check_timeline_bounds(timeline.start_event, timeline.end_event)?;
        }
        for script in &self.scripts {
            require_field(&script.name, "script name is required")?;
        }
        Ok(())
    }

    /// Child entity counts for dashboard display.
    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            characters: self.characters.len(),
            timelines: self.timelines.len(),
            scripts: self.scripts.len(),
        }
    }
}

/// Counts of a project's child collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub characters: usize,
    pub timelines: usize,
    pub scripts: usize,
}

// ============================================================================
// Drafts
// ============================================================================

fn require_field(value: &str, message: &'static str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(message));
    }
    Ok(())
}

fn check_timeline_bounds(start: i64, end: i64) -> Result<(), CoreError> {
    if end <= start {
        return Err(CoreError::validation(
            "timeline end must be greater than its start",
        ));
    }
    Ok(())
}

/// Fields for creating or updating a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
}

impl ProjectDraft {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_field(&self.name, "project name is required")
    }
}

/// Fields for creating or updating a character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterDraft {
    pub name: String,
    pub birth_date: String,
    pub gender: Gender,
    pub biography: String,
    pub relationships: Vec<Relationship>,
}

impl CharacterDraft {
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self {
            name: name.into(),
            birth_date: String::new(),
            gender,
            biography: String::new(),
            relationships: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        require_field(&self.name, "character name is required")
    }
}

/// Fields for creating or updating a timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineDraft {
    pub name: String,
    pub description: String,
    pub time_unit: TimeUnit,
    pub start_event: i64,
    pub end_event: i64,
}

impl TimelineDraft {
    pub fn new(name: impl Into<String>, time_unit: TimeUnit, start: i64, end: i64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            time_unit,
            start_event: start,
            end_event: end,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        require_field(&self.name, "timeline name is required")?;
        check_timeline_bounds(self.start_event, self.end_event)
    }
}

/// Fields for creating or updating a timeline event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDraft {
    pub name: String,
    pub script: String,
    pub characters: Vec<CharacterRef>,
    pub related_events: Vec<EventLink>,
}

impl EventDraft {
    pub fn new(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: script.into(),
            characters: Vec::new(),
            related_events: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        require_field(&self.name, "event name is required")?;
        require_field(&self.script, "event script is required")
    }
}

/// Fields for creating or updating a script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptDraft {
    pub name: String,
    pub description: String,
}

impl ScriptDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        require_field(&self.name, "script name is required")
    }
}

/// Fields for creating or updating a script event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptEventDraft {
    pub title: String,
    pub description: String,
    pub associations: Vec<EventAssociation>,
}

impl ScriptEventDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            associations: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        require_field(&self.title, "script event title is required")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_id_format() {
        let id = ProjectId::from_counter(1);
        assert_eq!(id.as_str(), "p1");
        assert_eq!(ProjectId::from_counter(42).to_string(), "p42");
    }

    #[test]
    fn test_gender_serialization() {
        let json = serde_json::to_string(&Gender::Masculine).unwrap();
        assert_eq!(json, "\"masculino\"");
        let back: Gender = serde_json::from_str("\"outros\"").unwrap();
        assert_eq!(back, Gender::Other);
    }

    #[test]
    fn test_character_action_serialization() {
        let json = serde_json::to_string(&CharacterAction::Present).unwrap();
        assert_eq!(json, "\"No Evento\"");
        let json = serde_json::to_string(&CharacterAction::Cited).unwrap();
        assert_eq!(json, "\"Citado\"");
    }

    #[test]
    fn test_event_link_kind_serialization() {
        let json = serde_json::to_string(&EventLinkKind::Sequential).unwrap();
        assert_eq!(json, "\"Sequencial\"");
        let back: EventLinkKind = serde_json::from_str("\"Oculto\"").unwrap();
        assert_eq!(back, EventLinkKind::Hidden);
    }

    #[test]
    fn test_timeline_contains() {
        let timeline = Timeline::new(TimelineDraft::new("Arc", TimeUnit::Day, 1, 5));
        assert!(timeline.contains(1));
        assert!(timeline.contains(5));
        assert!(!timeline.contains(0));
        assert!(!timeline.contains(6));
    }

    #[test]
    fn test_timeline_draft_rejects_inverted_bounds() {
        let draft = TimelineDraft::new("Arc", TimeUnit::Year, 5, 3);
        assert!(matches!(
            draft.validate(),
            Err(CoreError::Validation(_))
        ));

        // Equal bounds are also rejected: the invariant is strictly greater.
        let draft = TimelineDraft::new("Arc", TimeUnit::Year, 3, 3);
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_event_draft_requires_name_and_script() {
        assert!(EventDraft::new("", "something happens").validate().is_err());
        assert!(EventDraft::new("Ambush", "").validate().is_err());
        assert!(EventDraft::new("Ambush", "riders attack").validate().is_ok());
    }

    #[test]
    fn test_project_validate_checks_embedded_entities() {
        let mut project = Project::new(
            ProjectId::from_counter(1),
            ProjectDraft {
                name: "Saga".to_string(),
                description: String::new(),
            },
        );
        assert!(project.validate().is_ok());

        // Inverted and equal bounds fail the same check drafts run.
        project
            .timelines
            .push(Timeline::new(TimelineDraft::new("Arc", TimeUnit::Day, 5, 5)));
        assert!(matches!(
            project.validate(),
            Err(CoreError::Validation(_))
        ));

        project.timelines[0].end_event = 9;
        assert!(project.validate().is_ok());

        project
            .characters
            .push(Character::new(CharacterDraft::new("", Gender::Other)));
        assert!(project.validate().is_err());
    }

    #[test]
    fn test_project_serde_roundtrip_preserves_structure() {
        let mut project = Project::new(
            ProjectId::from_counter(3),
            ProjectDraft {
                name: "Saga".to_string(),
                description: "three volumes".to_string(),
            },
        );
        project
            .characters
            .push(Character::new(CharacterDraft::new("Ana", Gender::Feminine)));
        project
            .characters
            .push(Character::new(CharacterDraft::new("Bruno", Gender::Masculine)));
        project
            .timelines
            .push(Timeline::new(TimelineDraft::new("Main", TimeUnit::Day, 1, 10)));
        project.scripts.push(Script::new(ScriptDraft::new("Pilot")));

        let json = serde_json::to_string_pretty(&project).unwrap();
        let back: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(back, project);

        // Collection order is preserved through the round-trip.
        assert_eq!(back.characters[0].name, "Ana");
        assert_eq!(back.characters[1].name, "Bruno");
    }
}
