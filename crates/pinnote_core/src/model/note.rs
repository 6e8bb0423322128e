//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record kept in snapshots and state.
//! - Define create/update payloads, including the server-timestamp sentinel.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused.
//! - `owner_id` and `created_at` never change after creation.
//! - `updated_at` is never earlier than `created_at`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::identity::OwnerId;

/// Title stored when a note is created with a blank title.
pub const DEFAULT_NOTE_TITLE: &str = "Untitled Note";

/// Store-assigned note identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Server-assigned ordering token, in epoch milliseconds.
///
/// Only the store produces these. Core code compares them and formats them,
/// it never derives one from the local clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

/// Timestamp value in a write payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampField {
    /// Resolved by the store's clock at commit time.
    ServerTimestamp,
    /// Explicit value, used by stores replaying persisted data.
    At(Timestamp),
}

impl TimestampField {
    /// Resolves the field against the commit-time server clock.
    pub fn resolve(self, server_now: Timestamp) -> Timestamp {
        match self {
            Self::ServerTimestamp => server_now,
            Self::At(value) => value,
        }
    }
}

/// Validation failures for note records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyId,
    EmptyOwner,
    TimestampsOutOfOrder { created_at: i64, updated_at: i64 },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "note id must not be empty"),
            Self::EmptyOwner => write!(f, "note owner must not be empty"),
            Self::TimestampsOutOfOrder {
                created_at,
                updated_at,
            } => write!(
                f,
                "updatedAt ({updated_at}) must be >= createdAt ({created_at})"
            ),
        }
    }
}

impl Error for NoteValidationError {}

/// One note document as observed in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    pub owner_id: OwnerId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Note {
    /// Checks the record-level invariants.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(NoteValidationError::EmptyId);
        }
        if self.owner_id.trim().is_empty() {
            return Err(NoteValidationError::EmptyOwner);
        }
        if self.updated_at < self.created_at {
            return Err(NoteValidationError::TimestampsOutOfOrder {
                created_at: self.created_at.as_millis(),
                updated_at: self.updated_at.as_millis(),
            });
        }
        Ok(())
    }

    /// Whether the search term occurs in title or content, ignoring case.
    pub fn matches_term(&self, lowered_term: &str) -> bool {
        self.title.to_lowercase().contains(lowered_term)
            || self.content.to_lowercase().contains(lowered_term)
    }
}

/// Create payload for one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub owner_id: OwnerId,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    pub created_at: TimestampField,
    pub updated_at: TimestampField,
}

impl NewNote {
    /// Builds a create payload from composer input.
    ///
    /// Returns `None` when title and content are both blank.
    ///
    /// # Contract
    /// - Title is trimmed and falls back to [`DEFAULT_NOTE_TITLE`].
    /// - Content is trimmed.
    /// - Both timestamps use the server sentinel.
    pub fn from_input(owner_id: impl Into<OwnerId>, title: &str, content: &str) -> Option<Self> {
        let title = title.trim();
        let content = content.trim();
        if title.is_empty() && content.is_empty() {
            return None;
        }
        Some(Self::server_stamped(owner_id, title, content, false))
    }

    /// Builds a create payload for an imported element.
    ///
    /// Imported text is kept verbatim apart from the blank-title fallback.
    pub fn imported(
        owner_id: impl Into<OwnerId>,
        title: &str,
        content: &str,
        is_pinned: bool,
    ) -> Self {
        Self::server_stamped(owner_id, title, content, is_pinned)
    }

    fn server_stamped(
        owner_id: impl Into<OwnerId>,
        title: &str,
        content: &str,
        is_pinned: bool,
    ) -> Self {
        let title = if title.trim().is_empty() {
            DEFAULT_NOTE_TITLE.to_string()
        } else {
            title.to_string()
        };
        Self {
            owner_id: owner_id.into(),
            title,
            content: content.to_string(),
            is_pinned,
            created_at: TimestampField::ServerTimestamp,
            updated_at: TimestampField::ServerTimestamp,
        }
    }

    /// Materializes the stored note once the store has assigned id and clock.
    pub fn into_note(self, id: NoteId, server_now: Timestamp) -> Note {
        let created_at = self.created_at.resolve(server_now);
        let updated_at = self.updated_at.resolve(server_now).max(created_at);
        Note {
            id,
            title: self.title,
            content: self.content,
            is_pinned: self.is_pinned,
            owner_id: self.owner_id,
            created_at,
            updated_at,
        }
    }
}

/// Partial field set merged into an existing note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_pinned: Option<bool>,
    pub updated_at: Option<TimestampField>,
}

impl NotePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn pinned(mut self, is_pinned: bool) -> Self {
        self.is_pinned = Some(is_pinned);
        self
    }

    /// Requests a refreshed `updated_at` from the store clock.
    pub fn touch(mut self) -> Self {
        self.updated_at = Some(TimestampField::ServerTimestamp);
        self
    }

    /// Returns true when the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.is_pinned.is_none()
            && self.updated_at.is_none()
    }

    /// Returns a copy of `note` with this patch merged in.
    ///
    /// `server_now` resolves a sentinel `updated_at`. With `None`, a sentinel
    /// leaves `updated_at` unchanged, which is what local reducers want.
    pub fn merged_into(&self, note: &Note, server_now: Option<Timestamp>) -> Note {
        let mut merged = note.clone();
        if let Some(title) = &self.title {
            merged.title = title.clone();
        }
        if let Some(content) = &self.content {
            merged.content = content.clone();
        }
        if let Some(is_pinned) = self.is_pinned {
            merged.is_pinned = is_pinned;
        }
        match (self.updated_at, server_now) {
            (Some(TimestampField::At(value)), _) => merged.updated_at = value,
            (Some(TimestampField::ServerTimestamp), Some(now)) => merged.updated_at = now,
            _ => {}
        }
        if merged.updated_at < merged.created_at {
            merged.updated_at = merged.created_at;
        }
        merged
    }
}
