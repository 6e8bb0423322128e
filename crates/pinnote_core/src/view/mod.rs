//! Derived view helpers.
//!
//! # Responsibility
//! - Compute what the note list renders from the current state.
//! - Hold per-card editor and composer drafts.
//!
//! # Invariants
//! - Nothing here writes to `NotesState`; intents go through the controller.

pub mod editor;
pub mod filter;
pub mod format;
