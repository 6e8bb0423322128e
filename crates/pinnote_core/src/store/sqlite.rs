//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist notes of one collection in the `documents` table.
//! - Serve live queries by re-running them after each committed write.
//!
//! # Invariants
//! - `batch_create` runs in one transaction; a failing element rolls back all.
//! - Rows are validated on read; invalid persisted state is an error, not a
//!   silently skipped row.
//! - The store clock resumes above the newest persisted `updated_at`.

use super::subscribers::{Delivery, SubscriberSet};
use super::{
    generate_note_id, next_server_millis, DocumentStore, NoteQuery, SnapshotListener,
    StoreError, StoreResult, SubscriptionId,
};
use crate::db::{open_db, open_db_in_memory};
use crate::model::note::{NewNote, Note, NoteId, NotePatch, Timestamp};
use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    title,
    content,
    is_pinned,
    created_at,
    updated_at
FROM documents";

const NOTE_INSERT_SQL: &str = "INSERT INTO documents (
    collection,
    id,
    owner_id,
    title,
    content,
    is_pinned,
    created_at,
    updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);";

struct Inner {
    conn: Connection,
    last_clock: i64,
}

impl Inner {
    fn tick(&mut self) -> Timestamp {
        self.last_clock = next_server_millis(self.last_clock);
        Timestamp::from_millis(self.last_clock)
    }
}

/// [`DocumentStore`] persisting notes in a local SQLite database.
pub struct SqliteDocumentStore {
    collection: String,
    inner: Mutex<Inner>,
    subscribers: SubscriberSet,
}

impl SqliteDocumentStore {
    /// Opens a database file, creating and migrating it when needed.
    pub fn open(path: impl AsRef<Path>, collection: impl Into<String>) -> StoreResult<Self> {
        Self::from_connection(open_db(path)?, collection)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory(collection: impl Into<String>) -> StoreResult<Self> {
        Self::from_connection(open_db_in_memory()?, collection)
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection, collection: impl Into<String>) -> StoreResult<Self> {
        let collection = collection.into();
        if collection.trim().is_empty() {
            return Err(StoreError::InvalidData(
                "collection name must not be empty".to_string(),
            ));
        }
        let last_clock: Option<i64> = conn.query_row(
            "SELECT MAX(updated_at) FROM documents WHERE collection = ?1;",
            [collection.as_str()],
            |row| row.get(0),
        )?;
        Ok(Self {
            collection,
            inner: Mutex::new(Inner {
                conn,
                last_clock: last_clock.unwrap_or(0),
            }),
            subscribers: SubscriberSet::default(),
        })
    }

    /// Counts stored notes of one owner.
    pub fn count_for_owner(&self, owner_id: &str) -> StoreResult<usize> {
        let inner = self.lock();
        let count: i64 = inner.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1 AND owner_id = ?2;",
            params![self.collection, owner_id],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Runs a query outside of any live subscription.
    pub fn query(&self, query: &NoteQuery) -> StoreResult<Vec<Note>> {
        let inner = self.lock();
        select_notes(&inner.conn, &self.collection, query)
    }

    fn deliveries(&self, inner: &Inner, owners: &[&str]) -> Vec<Delivery> {
        self.subscribers.deliveries_for(owners, |query| {
            match select_notes(&inner.conn, &self.collection, query) {
                Ok(notes) => Some(notes),
                Err(err) => {
                    warn!(
                        "event=store_snapshot module=store status=error backend=sqlite error={}",
                        err
                    );
                    None
                }
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn collection(&self) -> &str {
        self.collection.as_str()
    }

    fn subscribe(
        &self,
        query: NoteQuery,
        listener: SnapshotListener,
    ) -> StoreResult<SubscriptionId> {
        let (id, initial) = {
            let inner = self.lock();
            let notes = select_notes(&inner.conn, &self.collection, &query)?;
            let id = self.subscribers.insert(query, listener.clone());
            (id, SubscriberSet::initial(listener, notes))
        };
        debug!(
            "event=store_subscribe module=store status=ok backend=sqlite subscription={:?}",
            id
        );
        initial.fire();
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let removed = self.subscribers.remove(id);
        debug!(
            "event=store_unsubscribe module=store status=ok backend=sqlite subscription={:?} removed={}",
            id, removed
        );
    }

    fn create(&self, note: NewNote) -> StoreResult<NoteId> {
        let (id, deliveries) = {
            let mut inner = self.lock();
            let now = inner.tick();
            let stored = note.into_note(generate_note_id(), now);
            stored.validate()?;
            insert_note(&inner.conn, &self.collection, &stored)?;
            let deliveries = self.deliveries(&inner, &[stored.owner_id.as_str()]);
            (stored.id, deliveries)
        };
        debug!("event=store_create module=store status=ok backend=sqlite");
        fire_all(deliveries);
        Ok(id)
    }

    fn update(&self, id: &NoteId, patch: NotePatch) -> StoreResult<()> {
        let deliveries = {
            let mut inner = self.lock();
            let existing = get_note(&inner.conn, &self.collection, id)?
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            let now = inner.tick();
            let merged = patch.merged_into(&existing, Some(now));
            merged.validate()?;
            inner.conn.execute(
                "UPDATE documents
                 SET
                    title = ?3,
                    content = ?4,
                    is_pinned = ?5,
                    updated_at = ?6
                 WHERE collection = ?1 AND id = ?2;",
                params![
                    self.collection,
                    id.as_str(),
                    merged.title,
                    merged.content,
                    bool_to_int(merged.is_pinned),
                    merged.updated_at.as_millis(),
                ],
            )?;
            self.deliveries(&inner, &[merged.owner_id.as_str()])
        };
        debug!("event=store_update module=store status=ok backend=sqlite");
        fire_all(deliveries);
        Ok(())
    }

    fn delete(&self, id: &NoteId) -> StoreResult<()> {
        let deliveries = {
            let inner = self.lock();
            let owner: Option<String> = inner
                .conn
                .query_row(
                    "SELECT owner_id FROM documents WHERE collection = ?1 AND id = ?2;",
                    params![self.collection, id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            match owner {
                Some(owner) => {
                    inner.conn.execute(
                        "DELETE FROM documents WHERE collection = ?1 AND id = ?2;",
                        params![self.collection, id.as_str()],
                    )?;
                    self.deliveries(&inner, &[owner.as_str()])
                }
                None => Vec::new(),
            }
        };
        debug!("event=store_delete module=store status=ok backend=sqlite");
        fire_all(deliveries);
        Ok(())
    }

    fn batch_create(&self, notes: Vec<NewNote>) -> StoreResult<Vec<NoteId>> {
        let count = notes.len();
        let (ids, deliveries) = {
            let mut inner = self.lock();
            let now = inner.tick();
            let mut ids = Vec::with_capacity(count);
            let mut owners: Vec<String> = Vec::new();

            let tx = inner.conn.transaction()?;
            for note in notes {
                let stored = note.into_note(generate_note_id(), now);
                // Dropping `tx` on this early return rolls back earlier inserts.
                stored.validate()?;
                insert_note(&tx, &self.collection, &stored)?;
                if !owners.contains(&stored.owner_id) {
                    owners.push(stored.owner_id.clone());
                }
                ids.push(stored.id);
            }
            tx.commit()?;

            let owner_refs: Vec<&str> = owners.iter().map(String::as_str).collect();
            let deliveries = self.deliveries(&inner, &owner_refs);
            (ids, deliveries)
        };
        info!(
            "event=store_batch_create module=store status=ok backend=sqlite count={}",
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

fn insert_note(conn: &Connection, collection: &str, note: &Note) -> StoreResult<()> {
    conn.execute(
        NOTE_INSERT_SQL,
        params![
            collection,
            note.id.as_str(),
            note.owner_id,
            note.title,
            note.content,
            bool_to_int(note.is_pinned),
            note.created_at.as_millis(),
            note.updated_at.as_millis(),
        ],
    )?;
    Ok(())
}

fn get_note(conn: &Connection, collection: &str, id: &NoteId) -> StoreResult<Option<Note>> {
    let mut stmt = conn.prepare(&format!(
        "{NOTE_SELECT_SQL} WHERE collection = ?1 AND id = ?2;"
    ))?;
    let mut rows = stmt.query(params![collection, id.as_str()])?;
    let note = match rows.next()? {
        Some(row) => Some(parse_note_row(row)?),
        None => None,
    };
    Ok(note)
}

fn select_notes(conn: &Connection, collection: &str, query: &NoteQuery) -> StoreResult<Vec<Note>> {
    let mut stmt = conn.prepare(&format!(
        "{NOTE_SELECT_SQL}
         WHERE collection = ?1 AND owner_id = ?2
         ORDER BY updated_at DESC, id ASC;"
    ))?;
    let mut rows = stmt.query(params![collection, query.owner_id])?;
    let mut notes = Vec::new();
    while let Some(row) = rows.next()? {
        notes.push(parse_note_row(row)?);
    }
    Ok(notes)
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<Note> {
    let is_pinned = match row.get::<_, i64>("is_pinned")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid is_pinned value `{other}` in documents.is_pinned"
            )));
        }
    };

    let note = Note {
        id: NoteId::new(row.get::<_, String>("id")?),
        title: row.get("title")?,
        content: row.get("content")?,
        is_pinned,
        owner_id: row.get("owner_id")?,
        created_at: Timestamp::from_millis(row.get("created_at")?),
        updated_at: Timestamp::from_millis(row.get("updated_at")?),
    };
    note.validate()?;
    Ok(note)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
