//! Narrative-planning core for fiction writers.
//!
//! This crate provides:
//! - Projects aggregating characters, timelines, and scripts
//! - Bounds-checked event placement on integer timelines
//! - Gap-free ordering of script event sequences
//! - Read-time resolution of cross-entity links
//! - Key/value snapshot persistence behind a pluggable adapter
//!
//! # Quick Start
//!
//! ```
//! use storyline_core::{
//!     MemoryAdapter, ProjectDraft, ProjectStore, TimeUnit, TimelineDraft,
//! };
//!
//! fn main() -> Result<(), storyline_core::CoreError> {
//!     let mut store = ProjectStore::open(MemoryAdapter::new())?;
//!
//!     let project = store.create_project(ProjectDraft {
//!         name: "My Saga".to_string(),
//!         description: String::new(),
//!     })?;
//!
//!     let timeline = store.save_timeline(
//!         &project.id,
//!         None,
//!         TimelineDraft::new("Main Arc", TimeUnit::Day, 1, 30),
//!     )?;
//!     assert!(store.timeline_events(timeline.id).is_empty());
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod error;
pub mod persist;
pub mod project;
pub mod relationship;
pub mod script;
pub mod store;
pub mod timeline;
pub mod xref;

// Primary public API
pub use command::{Command, Outcome};
pub use error::CoreError;
pub use persist::{FileAdapter, MemoryAdapter, PersistError, PersistenceAdapter};
pub use project::{
    AssociationKind, Character, CharacterAction, CharacterDraft, CharacterId, CharacterRef,
    Event, EventAssociation, EventDraft, EventId, EventLink, EventLinkKind, Gender, Project,
    ProjectDraft, ProjectId, ProjectSummary, Relationship, Script, ScriptDraft, ScriptEvent,
    ScriptEventDraft, ScriptEventId, ScriptId, TimeUnit, Timeline, TimelineDraft, TimelineId,
};
pub use script::ScriptSequencer;
pub use store::ProjectStore;
pub use timeline::TimelineEngine;
pub use xref::{RelationshipTarget, Resolution};
