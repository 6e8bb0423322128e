//! Document store contract and local implementations.
//!
//! # Responsibility
//! - Define the live-query/write contract the sync controller depends on.
//! - Provide in-memory and SQLite-backed stores implementing it.
//!
//! # Invariants
//! - Every note in a snapshot has passed `Note::validate()`.
//! - A new subscriber receives the current result set immediately.
//! - Subscribers of an owner receive a fresh snapshot after every committed
//!   write touching that owner.
//! - `batch_create` commits all notes or none.
//! - Listeners are invoked without any store lock held.

mod memory;
mod sqlite;
mod subscribers;

pub use memory::MemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

use crate::db::DbError;
use crate::model::identity::OwnerId;
use crate::model::note::{NewNote, Note, NoteId, NotePatch, NoteValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Collection used when none is configured.
pub const DEFAULT_COLLECTION: &str = "notes";

pub type StoreResult<T> = Result<T, StoreError>;

/// Callback receiving every snapshot of a live query.
pub type SnapshotListener = Arc<dyn Fn(Vec<Note>) + Send + Sync>;

/// Store-level failures surfaced to callers.
#[derive(Debug)]
pub enum StoreError {
    PermissionDenied(String),
    NotFound(NoteId),
    Unavailable(String),
    InvalidData(String),
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied(message) => write!(f, "permission denied: {message}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
            Self::InvalidData(message) => write!(f, "invalid note data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<NoteValidationError> for StoreError {
    fn from(value: NoteValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Handle returned by [`DocumentStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }
}

/// Live query: notes of one owner, newest `updated_at` first.
///
/// Ties on `updated_at` are ordered by id ascending so snapshots are stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteQuery {
    pub owner_id: OwnerId,
}

impl NoteQuery {
    pub fn owned_by(owner_id: impl Into<OwnerId>) -> Self {
        Self {
            owner_id: owner_id.into(),
        }
    }

    /// Filters and orders `notes` the way the query specifies.
    pub fn select<'a>(&self, notes: impl IntoIterator<Item = &'a Note>) -> Vec<Note> {
        let mut selected: Vec<Note> = notes
            .into_iter()
            .filter(|note| note.owner_id == self.owner_id)
            .cloned()
            .collect();
        sort_newest_first(&mut selected);
        selected
    }
}

/// Orders by `updated_at DESC, id ASC`.
pub fn sort_newest_first(notes: &mut [Note]) {
    notes.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Remote document database as seen by the sync controller.
pub trait DocumentStore: Send + Sync {
    /// Collection this store reads and writes.
    fn collection(&self) -> &str;
    /// Opens a live query; the listener fires once immediately.
    fn subscribe(&self, query: NoteQuery, listener: SnapshotListener)
        -> StoreResult<SubscriptionId>;
    /// Closes a live query. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
    /// Creates one note and returns its assigned id.
    fn create(&self, note: NewNote) -> StoreResult<NoteId>;
    /// Merges `patch` into an existing note.
    fn update(&self, id: &NoteId, patch: NotePatch) -> StoreResult<()>;
    /// Deletes one note. Deleting a missing id succeeds.
    fn delete(&self, id: &NoteId) -> StoreResult<()>;
    /// Creates all notes atomically and returns their ids in input order.
    fn batch_create(&self, notes: Vec<NewNote>) -> StoreResult<Vec<NoteId>>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    fn collection(&self) -> &str {
        (**self).collection()
    }

    fn subscribe(
        &self,
        query: NoteQuery,
        listener: SnapshotListener,
    ) -> StoreResult<SubscriptionId> {
        (**self).subscribe(query, listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        (**self).unsubscribe(id)
    }

    fn create(&self, note: NewNote) -> StoreResult<NoteId> {
        (**self).create(note)
    }

    fn update(&self, id: &NoteId, patch: NotePatch) -> StoreResult<()> {
        (**self).update(id, patch)
    }

    fn delete(&self, id: &NoteId) -> StoreResult<()> {
        (**self).delete(id)
    }

    fn batch_create(&self, notes: Vec<NewNote>) -> StoreResult<Vec<NoteId>> {
        (**self).batch_create(notes)
    }
}

/// Generates a fresh document id.
pub(crate) fn generate_note_id() -> NoteId {
    NoteId::new(uuid::Uuid::new_v4().simple().to_string())
}

/// Monotonic store clock: wall time, but never at or before `last`.
pub(crate) fn next_server_millis(last: i64) -> i64 {
    chrono::Utc::now().timestamp_millis().max(last + 1)
}
