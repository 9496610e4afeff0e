//! Directed relationship edges between characters.
//!
//! Edges live on the source character and carry a label plus a snapshot of
//! the target's name taken when the edge is created. The snapshot is never
//! refreshed on rename, and no reverse edge is maintained: each character's
//! list is an independent description of its relationships.

use crate::project::{Character, CharacterId};
use tracing::debug;

/// Add a directed edge from `character_id` to `target_id`.
///
/// No-op (returns `false`) when the label is empty, the target is missing
/// from the roster (its name cannot be snapshotted), the edge would point at
/// the character itself, or an edge to the same target already exists.
pub fn add(
    characters: &mut [Character],
    character_id: CharacterId,
    target_id: CharacterId,
    kind: &str,
) -> bool {
    if kind.trim().is_empty() || character_id == target_id {
        return false;
    }

    let Some(target_name) = characters
        .iter()
        .find(|c| c.id == target_id)
        .map(|c| c.name.clone())
    else {
        return false;
    };

    let Some(character) = characters.iter_mut().find(|c| c.id == character_id) else {
        return false;
    };

    if character.relationships.iter().any(|r| r.target_id == target_id) {
        return false;
    }

    debug!(%character_id, %target_id, kind, "relationship added");
    character.relationships.push(crate::project::Relationship {
        target_id,
        kind: kind.to_string(),
        target_name,
    });
    true
}

/// Remove the edge at `index` from the character's list.
///
/// Positional removal; an out-of-range index is a no-op.
pub fn remove(character: &mut Character, index: usize) -> bool {
    if index < character.relationships.len() {
        character.relationships.remove(index);
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{CharacterDraft, Gender};

    fn roster() -> Vec<Character> {
        vec![
            Character::new(CharacterDraft::new("Ana", Gender::Feminine)),
            Character::new(CharacterDraft::new("Bruno", Gender::Masculine)),
        ]
    }

    #[test]
    fn test_add_snapshots_target_name() {
        let mut characters = roster();
        let (ana, bruno) = (characters[0].id, characters[1].id);

        assert!(add(&mut characters, ana, bruno, "irmãos"));
        let rel = &characters[0].relationships[0];
        assert_eq!(rel.target_id, bruno);
        assert_eq!(rel.kind, "irmãos");
        assert_eq!(rel.target_name, "Bruno");

        // The snapshot goes stale when the target is renamed.
        characters[1].name = "Bruno Filho".to_string();
        assert_eq!(characters[0].relationships[0].target_name, "Bruno");
    }

    #[test]
    fn test_add_is_directed() {
        let mut characters = roster();
        let (ana, bruno) = (characters[0].id, characters[1].id);

        add(&mut characters, ana, bruno, "amigos");
        assert_eq!(characters[0].relationships.len(), 1);
        assert!(characters[1].relationships.is_empty());
    }

    #[test]
    fn test_add_noop_cases() {
        let mut characters = roster();
        let (ana, bruno) = (characters[0].id, characters[1].id);

        // Empty label.
        assert!(!add(&mut characters, ana, bruno, "  "));
        // Self edge.
        assert!(!add(&mut characters, ana, ana, "amigos"));
        // Target not in the roster.
        assert!(!add(&mut characters, ana, CharacterId::new(), "amigos"));
        assert!(characters[0].relationships.is_empty());

        // Duplicate target.
        assert!(add(&mut characters, ana, bruno, "amigos"));
        assert!(!add(&mut characters, ana, bruno, "inimigos"));
        assert_eq!(characters[0].relationships.len(), 1);
    }

    #[test]
    fn test_remove_is_positional() {
        let mut characters = roster();
        characters.push(Character::new(CharacterDraft::new("Carla", Gender::Other)));
        let (ana, bruno, carla) = (characters[0].id, characters[1].id, characters[2].id);

        add(&mut characters, ana, bruno, "amigos");
        add(&mut characters, ana, carla, "inimigos");

        assert!(remove(&mut characters[0], 0));
        assert_eq!(characters[0].relationships.len(), 1);
        assert_eq!(characters[0].relationships[0].target_name, "Carla");

        // Out of range is a no-op.
        assert!(!remove(&mut characters[0], 5));
        assert_eq!(characters[0].relationships.len(), 1);
    }
}
