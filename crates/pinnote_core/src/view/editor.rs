//! Note card editor and new-note composer drafts.
//!
//! # Invariants
//! - Drafts are local; only `save`/`submit` produce a store intent.
//! - Cancelling restores the text the note had when editing began.

use crate::model::note::{Note, NoteId, NotePatch};
use crate::store::DocumentStore;
use crate::sync::{NotesController, SyncResult};

/// Keys the card editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Escape,
    CtrlEnter,
    Other,
}

/// Inline editor state of one note card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEditor {
    note_id: NoteId,
    original_title: String,
    original_content: String,
    pub title: String,
    pub content: String,
    editing: bool,
}

impl NoteEditor {
    pub fn new(note: &Note) -> Self {
        Self {
            note_id: note.id.clone(),
            original_title: note.title.clone(),
            original_content: note.content.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
            editing: false,
        }
    }

    pub fn note_id(&self) -> &NoteId {
        &self.note_id
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Enters edit mode with the note's latest text.
    pub fn begin(&mut self, note: &Note) {
        self.original_title = note.title.clone();
        self.original_content = note.content.clone();
        self.title = note.title.clone();
        self.content = note.content.clone();
        self.editing = true;
    }

    /// Leaves edit mode and discards the draft.
    pub fn cancel(&mut self) {
        self.title = self.original_title.clone();
        self.content = self.original_content.clone();
        self.editing = false;
    }

    /// Leaves edit mode and returns the trimmed draft as an update.
    ///
    /// Returns `None` when not editing.
    pub fn save(&mut self) -> Option<(NoteId, NotePatch)> {
        if !self.editing {
            return None;
        }
        self.editing = false;
        let patch = NotePatch::new()
            .title(self.title.trim())
            .content(self.content.trim());
        Some((self.note_id.clone(), patch))
    }

    /// Escape cancels, Ctrl+Enter saves.
    pub fn on_key(&mut self, key: EditorKey) -> Option<(NoteId, NotePatch)> {
        match key {
            EditorKey::Escape => {
                self.cancel();
                None
            }
            EditorKey::CtrlEnter => self.save(),
            EditorKey::Other => None,
        }
    }
}

/// "Add note" panel above the list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteComposer {
    pub title: String,
    pub content: String,
    open: bool,
}

impl NoteComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closes the panel and clears the draft.
    pub fn close(&mut self) {
        self.title.clear();
        self.content.clear();
        self.open = false;
    }

    /// Sends the draft to the controller.
    ///
    /// The panel closes only when a note was actually created; a rejected or
    /// failed create keeps the draft for another attempt.
    pub fn submit<S: DocumentStore>(
        &mut self,
        controller: &NotesController<S>,
    ) -> SyncResult<Option<NoteId>> {
        let created = controller.create_note(&self.title, &self.content)?;
        if created.is_some() {
            self.close();
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::{EditorKey, NoteEditor};
    use crate::model::note::{Note, NoteId, Timestamp};

    fn note() -> Note {
        Note {
            id: NoteId::new("n1"),
            title: "Shopping".to_string(),
            content: "milk".to_string(),
            is_pinned: false,
            owner_id: "u1".to_string(),
            created_at: Timestamp::from_millis(1),
            updated_at: Timestamp::from_millis(1),
        }
    }

    #[test]
    fn escape_restores_original_text() {
        let note = note();
        let mut editor = NoteEditor::new(&note);
        editor.begin(&note);
        editor.title = "changed".to_string();
        assert!(editor.on_key(EditorKey::Escape).is_none());
        assert!(!editor.is_editing());
        assert_eq!(editor.title, "Shopping");
    }

    #[test]
    fn ctrl_enter_saves_trimmed_draft() {
        let note = note();
        let mut editor = NoteEditor::new(&note);
        editor.begin(&note);
        editor.content = "  milk, eggs \n".to_string();
        let (id, patch) = editor.on_key(EditorKey::CtrlEnter).expect("editing saves");
        assert_eq!(id, note.id);
        assert_eq!(patch.content.as_deref(), Some("milk, eggs"));
        assert_eq!(patch.title.as_deref(), Some("Shopping"));
        assert!(editor.save().is_none());
    }
}
