//! Gated live-query handle.

use crate::model::identity::OwnerId;
use crate::model::note::Note;
use crate::state::reducer::NotesAction;
use crate::state::NotesState;
use crate::store::{DocumentStore, NoteQuery, SnapshotListener, StoreResult, SubscriptionId};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, PoisonError};

/// Running live query feeding [`NotesState`].
///
/// The listener and [`SubscriptionHandle::stop`] share a gate. A delivery holds
/// the gate while dispatching and `stop` closes it under the same lock, so once
/// `stop` returns no snapshot of this subscription can reach the state, even
/// one the store had already started delivering.
#[derive(Debug)]
pub struct SubscriptionHandle {
    id: SubscriptionId,
    owner_id: OwnerId,
    open: Arc<Mutex<bool>>,
}

impl SubscriptionHandle {
    /// Opens the owner's live query; every snapshot replaces the state.
    pub(crate) fn start<S: DocumentStore + ?Sized>(
        store: &S,
        owner_id: &str,
        state: Arc<NotesState>,
    ) -> StoreResult<Self> {
        let open = Arc::new(Mutex::new(true));
        let gate = Arc::clone(&open);
        let expected_owner = owner_id.to_string();

        let listener: SnapshotListener = Arc::new(move |notes: Vec<Note>| {
            let is_open = gate.lock().unwrap_or_else(PoisonError::into_inner);
            if !*is_open {
                debug!("event=snapshot_dropped module=sync status=closed");
                return;
            }
            let notes = admit_snapshot(notes, &expected_owner);
            state.dispatch(NotesAction::ReplaceAll(notes));
        });

        let id = store.subscribe(NoteQuery::owned_by(owner_id), listener)?;
        info!(
            "event=subscription_start module=sync status=ok subscription={:?}",
            id
        );
        Ok(Self {
            id,
            owner_id: owner_id.to_string(),
            open,
        })
    }

    /// Closes the gate and the store query. Safe to call repeatedly.
    pub(crate) fn stop<S: DocumentStore + ?Sized>(&self, store: &S) {
        {
            let mut is_open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
            if !*is_open {
                return;
            }
            *is_open = false;
        }
        store.unsubscribe(self.id);
        info!(
            "event=subscription_stop module=sync status=ok subscription={:?}",
            self.id
        );
    }

    pub fn is_active(&self) -> bool {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn owner_id(&self) -> &str {
        self.owner_id.as_str()
    }
}

/// Drops snapshot entries that are invalid or belong to another owner.
fn admit_snapshot(notes: Vec<Note>, owner_id: &str) -> Vec<Note> {
    let total = notes.len();
    let admitted: Vec<Note> = notes
        .into_iter()
        .filter(|note| note.owner_id == owner_id && note.validate().is_ok())
        .collect();
    if admitted.len() != total {
        warn!(
            "event=snapshot_filtered module=sync status=warn dropped={}",
            total - admitted.len()
        );
    }
    admitted
}
