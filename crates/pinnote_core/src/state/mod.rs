//! Owned note-list state container.
//!
//! # Responsibility
//! - Hold the current note list and apply reducer actions to it.
//! - Hand out cheap read snapshots to views and the sync controller.
//!
//! # Invariants
//! - The list is only changed through [`NotesState::dispatch`].
//! - Every dispatch installs a new `Arc`; lists handed out earlier are never
//!   mutated, so `Arc::ptr_eq` detects change.
//! - `revision` increases by one per dispatch.

pub mod reducer;

use crate::model::note::{Note, NoteId};
use log::debug;
use reducer::{reduce, NotesAction};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Read view of the state at one revision.
#[derive(Debug, Clone)]
pub struct NotesSnapshot {
    pub notes: Arc<Vec<Note>>,
    pub revision: u64,
}

#[derive(Debug, Default)]
struct StateInner {
    notes: Arc<Vec<Note>>,
    revision: u64,
}

/// Single-writer note list shared by reference.
#[derive(Debug, Default)]
pub struct NotesState {
    inner: Mutex<StateInner>,
}

impl NotesState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one action and returns the new revision.
    pub fn dispatch(&self, action: NotesAction) -> u64 {
        let action_name = action.name();
        let mut inner = self.lock();
        let next = reduce(inner.notes.as_slice(), action);
        inner.notes = Arc::new(next);
        inner.revision += 1;
        debug!(
            "event=state_dispatch module=state status=ok action={} revision={} count={}",
            action_name,
            inner.revision,
            inner.notes.len()
        );
        inner.revision
    }

    /// Current list together with its revision.
    pub fn snapshot(&self) -> NotesSnapshot {
        let inner = self.lock();
        NotesSnapshot {
            notes: Arc::clone(&inner.notes),
            revision: inner.revision,
        }
    }

    /// Current list.
    pub fn notes(&self) -> Arc<Vec<Note>> {
        Arc::clone(&self.lock().notes)
    }

    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// Looks up one note by id in the current list.
    pub fn find(&self, id: &NoteId) -> Option<Note> {
        self.lock().notes.iter().find(|note| &note.id == id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, StateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
