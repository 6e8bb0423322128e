//! Pure note-list reducer.
//!
//! # Responsibility
//! - Map `(current list, action)` to a new list without side effects.
//!
//! # Invariants
//! - The input list is only borrowed; a new `Vec` is always returned.
//! - Actions naming an unknown id leave the list unchanged.
//! - No action is rejected here; validation happens upstream.

use crate::model::note::{Note, NoteId, NotePatch};

/// State transitions accepted by [`reduce`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesAction {
    /// Fresh snapshot; becomes the new state verbatim.
    ReplaceAll(Vec<Note>),
    /// Prepends one note.
    Add(Note),
    /// Removes every note with this id.
    Delete(NoteId),
    /// Merges fields into the matching note.
    Update(NoteId, NotePatch),
    /// Flips `is_pinned` on the matching note.
    TogglePin(NoteId),
    /// Prepends imported notes, keeping their order.
    ImportMerge(Vec<Note>),
}

impl NotesAction {
    /// Short action name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReplaceAll(_) => "replace_all",
            Self::Add(_) => "add",
            Self::Delete(_) => "delete",
            Self::Update(..) => "update",
            Self::TogglePin(_) => "toggle_pin",
            Self::ImportMerge(_) => "import_merge",
        }
    }
}

/// Applies one action and returns the next list.
pub fn reduce(current: &[Note], action: NotesAction) -> Vec<Note> {
    match action {
        NotesAction::ReplaceAll(notes) => notes,
        NotesAction::Add(note) => {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.push(note);
            next.extend_from_slice(current);
            next
        }
        NotesAction::Delete(id) => current
            .iter()
            .filter(|note| note.id != id)
            .cloned()
            .collect(),
        NotesAction::Update(id, patch) => current
            .iter()
            .map(|note| {
                if note.id == id {
                    patch.merged_into(note, None)
                } else {
                    note.clone()
                }
            })
            .collect(),
        NotesAction::TogglePin(id) => current
            .iter()
            .map(|note| {
                let mut next = note.clone();
                if next.id == id {
                    next.is_pinned = !next.is_pinned;
                }
                next
            })
            .collect(),
        NotesAction::ImportMerge(imported) => {
            let mut next = imported;
            next.extend_from_slice(current);
            next
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{reduce, NotesAction};
    use crate::model::note::{Note, NoteId, NotePatch, Timestamp};

    fn note(id: &str, title: &str) -> Note {
        Note {
            id: NoteId::new(id),
            title: title.to_string(),
            content: String::new(),
            is_pinned: false,
            owner_id: "u1".to_string(),
            created_at: Timestamp::from_millis(1),
            updated_at: Timestamp::from_millis(1),
        }
    }

    #[test]
    fn add_prepends() {
        let state = vec![note("a", "A")];
        let next = reduce(&state, NotesAction::Add(note("b", "B")));
        let ids: Vec<&str> = next.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn delete_missing_id_is_noop() {
        let state = vec![note("a", "A")];
        assert_eq!(reduce(&state, NotesAction::Delete(NoteId::new("zz"))), state);
    }

    #[test]
    fn update_merges_only_given_fields() {
        let state = vec![note("a", "A"), note("b", "B")];
        let next = reduce(
            &state,
            NotesAction::Update(NoteId::new("b"), NotePatch::new().content("body")),
        );
        assert_eq!(next[0], state[0]);
        assert_eq!(next[1].title, "B");
        assert_eq!(next[1].content, "body");
    }
}
