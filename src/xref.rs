//! Read-time resolution of associative links.
//!
//! Associations and relationship edges are never verified when written, so
//! every lookup here can miss. A miss is reported as a broken reference the
//! presentation layer can render gracefully, never as a hard failure.

use crate::project::{
    Character, Event, EventAssociation, EventId, EventLink, Project, Relationship, Timeline,
    TimelineId,
};
use std::collections::HashMap;

/// Outcome of resolving a script event's association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Both the timeline and the event were found.
    Resolved {
        timeline: &'a Timeline,
        event: &'a Event,
    },
    /// The timeline or the event no longer exists; the stored ids are
    /// echoed back for display.
    Broken {
        timeline_id: TimelineId,
        event_id: EventId,
    },
}

impl Resolution<'_> {
    pub fn is_broken(&self) -> bool {
        matches!(self, Resolution::Broken { .. })
    }
}

/// Resolve a script event association against the live project state.
pub fn resolve_association<'a>(
    project: &'a Project,
    timeline_events: &'a HashMap<TimelineId, Vec<Event>>,
    association: &EventAssociation,
) -> Resolution<'a> {
    let broken = Resolution::Broken {
        timeline_id: association.timeline_id,
        event_id: association.event_id,
    };

    let Some(timeline) = project.timeline(association.timeline_id) else {
        return broken;
    };
    let Some(events) = timeline_events.get(&association.timeline_id) else {
        return broken;
    };
    match events.iter().find(|e| e.id == association.event_id) {
        Some(event) => Resolution::Resolved { timeline, event },
        None => broken,
    }
}

/// Resolve a related-event link within one timeline's event list.
///
/// Returns `None` when the link dangles.
pub fn resolve_related<'a>(events: &'a [Event], link: &EventLink) -> Option<&'a Event> {
    events.iter().find(|e| e.id == link.event_id)
}

/// Outcome of resolving a relationship edge's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipTarget<'a> {
    /// The target character still exists.
    Live(&'a Character),
    /// The target is gone; only the name snapshotted at creation remains.
    Stale { cached_name: &'a str },
}

/// Resolve a relationship edge against the project's current roster.
pub fn resolve_relationship<'a>(
    project: &'a Project,
    relationship: &'a Relationship,
) -> RelationshipTarget<'a> {
    match project.character(relationship.target_id) {
        Some(character) => RelationshipTarget::Live(character),
        None => RelationshipTarget::Stale {
            cached_name: &relationship.target_name,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{
        AssociationKind, CharacterDraft, EventDraft, EventLinkKind, Gender, ProjectDraft,
        ProjectId, ScriptDraft, Script, TimeUnit, TimelineDraft,
    };

    fn sample_project() -> (Project, HashMap<TimelineId, Vec<Event>>) {
        let mut project = Project::new(
            ProjectId::from_counter(1),
            ProjectDraft {
                name: "Saga".to_string(),
                description: String::new(),
            },
        );
        let timeline = Timeline::new(TimelineDraft::new("Main", TimeUnit::Day, 1, 10));
        let timeline_id = timeline.id;
        project.timelines.push(timeline);
        project.scripts.push(Script::new(ScriptDraft::new("Pilot")));

        let event = Event::new(3, EventDraft::new("Ambush", "riders attack"));
        let mut events = HashMap::new();
        events.insert(timeline_id, vec![event]);
        (project, events)
    }

    #[test]
    fn test_association_resolves() {
        let (project, events) = sample_project();
        let timeline_id = project.timelines[0].id;
        let event_id = events[&timeline_id][0].id;

        let association = EventAssociation {
            kind: AssociationKind::Direct,
            timeline_id,
            event_id,
        };
        let resolution = resolve_association(&project, &events, &association);
        assert!(matches!(
            resolution,
            Resolution::Resolved { event, .. } if event.id == event_id
        ));
    }

    #[test]
    fn test_association_broken_when_event_missing() {
        let (project, events) = sample_project();
        let timeline_id = project.timelines[0].id;

        let association = EventAssociation {
            kind: AssociationKind::Hidden,
            timeline_id,
            event_id: EventId::new(),
        };
        assert!(resolve_association(&project, &events, &association).is_broken());
    }

    #[test]
    fn test_association_broken_when_timeline_missing() {
        let (project, events) = sample_project();
        let association = EventAssociation {
            kind: AssociationKind::Indirect,
            timeline_id: TimelineId::new(),
            event_id: EventId::new(),
        };
        assert!(resolve_association(&project, &events, &association).is_broken());
    }

    #[test]
    fn test_related_link_dangles_quietly() {
        let (_, events) = sample_project();
        let list = events.values().next().unwrap();

        let live = EventLink {
            event_id: list[0].id,
            kind: EventLinkKind::Direct,
        };
        assert!(resolve_related(list, &live).is_some());

        let dangling = EventLink {
            event_id: EventId::new(),
            kind: EventLinkKind::Sequential,
        };
        assert!(resolve_related(list, &dangling).is_none());
    }

    #[test]
    fn test_relationship_live_and_stale() {
        let (mut project, _) = sample_project();
        let ana = Character::new(CharacterDraft::new("Ana", Gender::Feminine));
        let ana_id = ana.id;
        project.characters.push(ana);

        let relationship = Relationship {
            target_id: ana_id,
            kind: "amigos".to_string(),
            target_name: "Ana".to_string(),
        };
        assert!(matches!(
            resolve_relationship(&project, &relationship),
            RelationshipTarget::Live(c) if c.name == "Ana"
        ));

        project.characters.clear();
        assert_eq!(
            resolve_relationship(&project, &relationship),
            RelationshipTarget::Stale { cached_name: "Ana" }
        );
    }
}
