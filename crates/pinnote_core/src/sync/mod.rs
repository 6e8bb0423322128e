//! Sync controller between the document store and the note state.
//!
//! # Responsibility
//! - Own the live-query lifecycle for the signed-in identity.
//! - Translate user intents into store writes.
//! - Export and import the note list as JSON.
//!
//! # Invariants
//! - Note state changes only through snapshots from the live query.
//! - After a subscription is stopped, none of its snapshots reach the state.
//! - A failed write leaves the note state untouched.

mod controller;
mod subscription;
pub mod transfer;

pub use controller::{DeleteOutcome, NotesController, DELETE_CONFIRM_PROMPT};
pub use subscription::SubscriptionHandle;
pub use transfer::{ExportFile, ImportedNote};

use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SyncResult<T> = Result<T, SyncError>;

/// Failures surfaced to the user by the sync controller.
#[derive(Debug)]
pub enum SyncError {
    /// The operation needs a signed-in identity.
    NotSignedIn,
    /// Import input is not a JSON array of note objects.
    ImportFormat(String),
    /// Export could not serialize the note list.
    Serialize(String),
    /// The store rejected or failed the write.
    Store(StoreError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSignedIn => write!(f, "sign in to manage notes"),
            Self::ImportFormat(message) => write!(f, "invalid import file: {message}"),
            Self::Serialize(message) => write!(f, "could not export notes: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
