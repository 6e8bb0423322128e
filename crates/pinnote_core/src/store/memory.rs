//! In-memory document store.
//!
//! # Responsibility
//! - Back the sync controller in tests and offline sessions.
//! - Emulate server timestamps and live queries of a remote store.
//!
//! # Invariants
//! - The store clock is strictly increasing per store instance.
//! - Writes are applied and snapshots computed under one lock; listeners fire
//!   after it is released.

use super::subscribers::{Delivery, SubscriberSet};
use super::{
    generate_note_id, next_server_millis, DocumentStore, NoteQuery, SnapshotListener,
    StoreError, StoreResult, SubscriptionId, DEFAULT_COLLECTION,
};
use crate::model::note::{NewNote, Note, NoteId, NotePatch, Timestamp};
use log::{debug, info};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Documents {
    notes: BTreeMap<NoteId, Note>,
    last_clock: i64,
}

impl Documents {
    fn tick(&mut self) -> Timestamp {
        self.last_clock = next_server_millis(self.last_clock);
        Timestamp::from_millis(self.last_clock)
    }
}

/// Process-local [`DocumentStore`] keeping notes in a `BTreeMap`.
pub struct MemoryDocumentStore {
    collection: String,
    documents: Mutex<Documents>,
    subscribers: SubscriberSet,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::with_collection(DEFAULT_COLLECTION)
    }

    pub fn with_collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            documents: Mutex::new(Documents::default()),
            subscribers: SubscriberSet::default(),
        }
    }

    /// Number of stored notes across all owners.
    pub fn len(&self) -> usize {
        self.lock().notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads one stored note directly, bypassing live queries.
    pub fn get(&self, id: &NoteId) -> Option<Note> {
        self.lock().notes.get(id).cloned()
    }

    /// Number of open live queries.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Re-emits the current result set to every subscriber of `owner_id`.
    ///
    /// Mirrors a remote store pushing an unchanged snapshot, e.g. after a
    /// reconnect.
    pub fn emit_snapshot(&self, owner_id: &str) {
        let deliveries = {
            let documents = self.lock();
            self.deliveries(&documents, &[owner_id])
        };
        fire_all(deliveries);
    }

    fn deliveries(&self, documents: &Documents, owners: &[&str]) -> Vec<Delivery> {
        self.subscribers
            .deliveries_for(owners, |query| Some(query.select(documents.notes.values())))
    }

    fn lock(&self) -> MutexGuard<'_, Documents> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn collection(&self) -> &str {
        self.collection.as_str()
    }

    fn subscribe(
        &self,
        query: NoteQuery,
        listener: SnapshotListener,
    ) -> StoreResult<SubscriptionId> {
        let (id, initial) = {
            let documents = self.lock();
            let id = self.subscribers.insert(query.clone(), listener.clone());
            let notes = query.select(documents.notes.values());
            (id, SubscriberSet::initial(listener, notes))
        };
        debug!(
            "event=store_subscribe module=store status=ok backend=memory subscription={:?}",
            id
        );
        initial.fire();
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let removed = self.subscribers.remove(id);
        debug!(
            "event=store_unsubscribe module=store status=ok backend=memory subscription={:?} removed={}",
            id, removed
        );
    }

    fn create(&self, note: NewNote) -> StoreResult<NoteId> {
        let (id, deliveries) = {
            let mut documents = self.lock();
            let now = documents.tick();
            let id = generate_note_id();
            let stored = note.into_note(id.clone(), now);
            stored.validate()?;
            let owner = stored.owner_id.clone();
            documents.notes.insert(id.clone(), stored);
            let deliveries = self.deliveries(&documents, &[owner.as_str()]);
            (id, deliveries)
        };
        debug!("event=store_create module=store status=ok backend=memory");
        fire_all(deliveries);
        Ok(id)
    }

    fn update(&self, id: &NoteId, patch: NotePatch) -> StoreResult<()> {
        let deliveries = {
            let mut documents = self.lock();
            let Some(existing) = documents.notes.get(id).cloned() else {
                return Err(StoreError::NotFound(id.clone()));
            };
            let now = documents.tick();
            let merged = patch.merged_into(&existing, Some(now));
            merged.validate()?;
            let owner = merged.owner_id.clone();
            documents.notes.insert(id.clone(), merged);
            self.deliveries(&documents, &[owner.as_str()])
        };
        debug!("event=store_update module=store status=ok backend=memory");
        fire_all(deliveries);
        Ok(())
    }

    fn delete(&self, id: &NoteId) -> StoreResult<()> {
        let deliveries = {
            let mut documents = self.lock();
            match documents.notes.remove(id) {
                Some(removed) => self.deliveries(&documents, &[removed.owner_id.as_str()]),
                None => Vec::new(),
            }
        };
        debug!("event=store_delete module=store status=ok backend=memory");
        fire_all(deliveries);
        Ok(())
    }

    fn batch_create(&self, notes: Vec<NewNote>) -> StoreResult<Vec<NoteId>> {
        let count = notes.len();
        let (ids, deliveries) = {
            let mut documents = self.lock();
            let now = documents.tick();
            let mut staged = Vec::with_capacity(count);
            for note in notes {
                let stored = note.into_note(generate_note_id(), now);
                stored.validate()?;
                staged.push(stored);
            }

            let mut owners: Vec<String> = Vec::new();
            let mut ids = Vec::with_capacity(count);
            for stored in staged {
                if !owners.contains(&stored.owner_id) {
                    owners.push(stored.owner_id.clone());
                }
                ids.push(stored.id.clone());
                documents.notes.insert(stored.id.clone(), stored);
            }
            let owner_refs: Vec<&str> = owners.iter().map(String::as_str).collect();
            let deliveries = self.deliveries(&documents, &owner_refs);
            (ids, deliveries)
        };
        info!(
            "event=store_batch_create module=store status=ok backend=memory count={}",
            count
        );
        fire_all(deliveries);
        Ok(ids)
    }
}

fn fire_all(deliveries: Vec<Delivery>) {
    for delivery in deliveries {
        delivery.fire();
    }
}
