//! Note sync controller.
//!
//! # Responsibility
//! - Start/stop the live query for the signed-in identity.
//! - Turn create/update/pin/delete/import intents into store writes.
//! - Build export files from the current state.
//!
//! # Invariants
//! - Writes never touch [`NotesState`] directly; the store echo does.
//! - Starting a subscription always stops the previous one first.
//! - Delete asks for confirmation before any write is attempted.

use super::subscription::SubscriptionHandle;
use super::transfer::{parse_import, ExportFile};
use super::{SyncError, SyncResult};
use crate::model::identity::Identity;
use crate::model::note::{NewNote, Note, NoteId, NotePatch};
use crate::state::reducer::NotesAction;
use crate::state::{NotesSnapshot, NotesState};
use crate::store::{DocumentStore, StoreError};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Question shown before a note is deleted.
pub const DELETE_CONFIRM_PROMPT: &str = "Delete this note?";

/// Result of a delete intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined the confirmation; nothing was written.
    Declined,
}

#[derive(Default)]
struct Session {
    identity: Option<Identity>,
    subscription: Option<SubscriptionHandle>,
}

/// Bridges a [`DocumentStore`] live query and user intents to [`NotesState`].
pub struct NotesController<S: DocumentStore> {
    store: Arc<S>,
    state: Arc<NotesState>,
    session: Mutex<Session>,
}

impl<S: DocumentStore> NotesController<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_state(store, Arc::new(NotesState::new()))
    }

    /// Uses a caller-provided state container, e.g. one shared with views.
    pub fn with_state(store: Arc<S>, state: Arc<NotesState>) -> Self {
        Self {
            store,
            state,
            session: Mutex::new(Session::default()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn state(&self) -> &Arc<NotesState> {
        &self.state
    }

    /// Current note list as last received from the store.
    pub fn notes(&self) -> Arc<Vec<Note>> {
        self.state.notes()
    }

    pub fn snapshot(&self) -> NotesSnapshot {
        self.state.snapshot()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.lock().identity.clone()
    }

    /// Whether a live query is currently feeding the state.
    pub fn is_subscribed(&self) -> bool {
        self.lock()
            .subscription
            .as_ref()
            .is_some_and(SubscriptionHandle::is_active)
    }

    /// Subscribes to `identity`'s notes, replacing any running subscription.
    ///
    /// When the identity differs from the previous one the state is cleared
    /// before the new query opens, so no other user's notes stay visible.
    /// If the query cannot be opened the controller is left signed out.
    pub fn start(&self, identity: Identity) -> SyncResult<()> {
        let mut session = self.lock();
        if let Some(previous) = session.subscription.take() {
            previous.stop(&*self.store);
        }
        let switching = session
            .identity
            .take()
            .map_or(true, |current| current.id != identity.id);
        if switching {
            self.state.dispatch(NotesAction::ReplaceAll(Vec::new()));
        }

        let handle = SubscriptionHandle::start(
            &*self.store,
            identity.id.as_str(),
            Arc::clone(&self.state),
        )
        .map_err(|err| surface("subscribe", err))?;
        session.identity = Some(identity);
        session.subscription = Some(handle);
        Ok(())
    }

    /// Stops the running subscription. Idempotent.
    pub fn stop(&self) {
        let mut session = self.lock();
        if let Some(handle) = session.subscription.take() {
            handle.stop(&*self.store);
        }
    }

    /// Stops the subscription, forgets the identity and empties the state.
    pub fn reset(&self) {
        let mut session = self.lock();
        if let Some(handle) = session.subscription.take() {
            handle.stop(&*self.store);
        }
        if session.identity.take().is_some() {
            self.state.dispatch(NotesAction::ReplaceAll(Vec::new()));
        }
    }

    /// Creates a note from composer input.
    ///
    /// Returns `Ok(None)` without writing when nobody is signed in or when
    /// title and content are both blank.
    pub fn create_note(&self, title: &str, content: &str) -> SyncResult<Option<NoteId>> {
        let Some(identity) = self.identity() else {
            debug!("event=note_create module=sync status=skipped reason=not_signed_in");
            return Ok(None);
        };
        let Some(new_note) = NewNote::from_input(identity.id, title, content) else {
            debug!("event=note_create module=sync status=skipped reason=empty_input");
            return Ok(None);
        };

        let id = self
            .store
            .create(new_note)
            .map_err(|err| surface("create", err))?;
        info!("event=note_create module=sync status=ok");
        Ok(Some(id))
    }

    /// Merges `patch` into a note and refreshes `updated_at`.
    pub fn update_note(&self, id: &NoteId, patch: NotePatch) -> SyncResult<()> {
        self.store
            .update(id, patch.touch())
            .map_err(|err| surface("update", err))?;
        info!("event=note_update module=sync status=ok");
        Ok(())
    }

    /// Flips the pin flag of a note found in the current state.
    ///
    /// Returns `Ok(false)` without writing when the note is not in state.
    pub fn toggle_pin(&self, id: &NoteId) -> SyncResult<bool> {
        let Some(note) = self.state.find(id) else {
            debug!("event=note_pin module=sync status=skipped reason=not_in_state");
            return Ok(false);
        };
        self.store
            .update(id, NotePatch::new().pinned(!note.is_pinned).touch())
            .map_err(|err| surface("pin", err))?;
        info!(
            "event=note_pin module=sync status=ok pinned={}",
            !note.is_pinned
        );
        Ok(true)
    }

    /// Deletes a note after `confirm` accepts [`DELETE_CONFIRM_PROMPT`].
    pub fn delete_note<F>(&self, id: &NoteId, confirm: F) -> SyncResult<DeleteOutcome>
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(DELETE_CONFIRM_PROMPT) {
            debug!("event=note_delete module=sync status=declined");
            return Ok(DeleteOutcome::Declined);
        }
        self.store
            .delete(id)
            .map_err(|err| surface("delete", err))?;
        info!("event=note_delete module=sync status=ok");
        Ok(DeleteOutcome::Deleted)
    }

    /// Serializes the current state into a backup dated today (UTC).
    pub fn export(&self) -> SyncResult<ExportFile> {
        let notes = self.state.notes();
        let file = ExportFile::build(notes.as_slice(), chrono::Utc::now().date_naive())?;
        info!(
            "event=notes_export module=sync status=ok count={}",
            notes.len()
        );
        Ok(file)
    }

    /// Imports a backup file as new notes of the signed-in identity.
    ///
    /// # Contract
    /// - Non-array or malformed input performs zero writes.
    /// - All notes are written in one atomic batch.
    /// - Returns the number of notes imported.
    pub fn import(&self, contents: &str) -> SyncResult<usize> {
        let identity = self.identity().ok_or(SyncError::NotSignedIn)?;
        let new_notes = parse_import(contents, &identity.id).map_err(|err| {
            warn!("event=notes_import module=sync status=error error={}", err);
            err
        })?;
        if new_notes.is_empty() {
            info!("event=notes_import module=sync status=ok count=0");
            return Ok(0);
        }

        let ids = self
            .store
            .batch_create(new_notes)
            .map_err(|err| surface("import", err))?;
        info!(
            "event=notes_import module=sync status=ok count={}",
            ids.len()
        );
        Ok(ids.len())
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: DocumentStore> Drop for NotesController<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn surface(operation: &str, err: StoreError) -> SyncError {
    warn!(
        "event=store_write module=sync status=error op={} error={}",
        operation, err
    );
    SyncError::Store(err)
}
