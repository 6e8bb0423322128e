//! Core domain logic for PinNote.
//! This crate is the single source of truth for note invariants, sync
//! lifecycle and auth-driven session wiring.

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod session;
pub mod state;
pub mod store;
pub mod sync;
pub mod view;

pub use auth::flow::{AuthForm, AuthMode};
pub use auth::{AuthError, AuthGateway, AuthResult, IdentitySubscription, OAuthProvider};
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::identity::{Identity, OwnerId};
pub use model::note::{
    NewNote, Note, NoteId, NotePatch, NoteValidationError, Timestamp, DEFAULT_NOTE_TITLE,
};
pub use session::{Session, SessionStatus};
pub use state::reducer::{reduce, NotesAction};
pub use state::{NotesSnapshot, NotesState};
pub use store::{
    DocumentStore, MemoryDocumentStore, NoteQuery, SqliteDocumentStore, StoreError, StoreResult,
};
pub use sync::{DeleteOutcome, ExportFile, NotesController, SyncError, SyncResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
