//! Live-query registry shared by the local store implementations.

use super::{NoteQuery, SnapshotListener, SubscriptionId};
use crate::model::note::Note;
use std::sync::{Mutex, MutexGuard, PoisonError};

struct Subscriber {
    id: SubscriptionId,
    query: NoteQuery,
    listener: SnapshotListener,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Subscriber>,
}

/// Registered listeners keyed by subscription id.
#[derive(Default)]
pub(crate) struct SubscriberSet {
    registry: Mutex<Registry>,
}

/// One pending delivery, computed under the store lock and fired after it.
pub(crate) struct Delivery {
    listener: SnapshotListener,
    notes: Vec<Note>,
}

impl Delivery {
    pub(crate) fn fire(self) {
        (self.listener)(self.notes);
    }
}

impl SubscriberSet {
    pub(crate) fn insert(&self, query: NoteQuery, listener: SnapshotListener) -> SubscriptionId {
        let mut registry = self.lock();
        registry.next_id += 1;
        let id = SubscriptionId::new(registry.next_id);
        registry.entries.push(Subscriber {
            id,
            query,
            listener,
        });
        id
    }

    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        let mut registry = self.lock();
        let before = registry.entries.len();
        registry.entries.retain(|entry| entry.id != id);
        registry.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Builds deliveries for subscribers whose owner is in `owners`.
    ///
    /// `run_query` produces the snapshot for one query; `None` skips that
    /// subscriber for this round.
    pub(crate) fn deliveries_for<F>(&self, owners: &[&str], mut run_query: F) -> Vec<Delivery>
    where
        F: FnMut(&NoteQuery) -> Option<Vec<Note>>,
    {
        let registry = self.lock();
        registry
            .entries
            .iter()
            .filter(|entry| owners.contains(&entry.query.owner_id.as_str()))
            .filter_map(|entry| {
                run_query(&entry.query).map(|notes| Delivery {
                    listener: entry.listener.clone(),
                    notes,
                })
            })
            .collect()
    }

    /// Builds the initial delivery for a subscriber registered just now.
    pub(crate) fn initial(listener: SnapshotListener, notes: Vec<Note>) -> Delivery {
        Delivery { listener, notes }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
