//! Domain model for notes and the signed-in identity.
//!
//! # Responsibility
//! - Define the note record shared by stores, reducer and views.
//! - Define the write-side shapes handed to a document store.
//!
//! # Invariants
//! - Every note is identified by a store-assigned `NoteId`.
//! - Every note belongs to exactly one owner.
//! - `updated_at >= created_at` for every note that leaves a store.

pub mod identity;
pub mod note;
