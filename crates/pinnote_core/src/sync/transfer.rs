//! JSON backup export and import.
//!
//! # Responsibility
//! - Serialize the current note list into a downloadable backup file.
//! - Parse a backup file into create payloads for the signed-in owner.
//!
//! # Invariants
//! - Export is a pure read; it never touches the store.
//! - Import parsing is all-or-nothing: any malformed element rejects the file.
//! - Imported `id`, owner and timestamps are never trusted.

use super::{SyncError, SyncResult};
use crate::model::note::{NewNote, Note};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

const EXPORT_FILE_PREFIX: &str = "notes_backup_";

/// Backup file ready to be saved by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// `notes_backup_<YYYY-MM-DD>.json`
    pub file_name: String,
    /// Pretty-printed UTF-8 JSON array of notes.
    pub contents: String,
}

impl ExportFile {
    pub const MIME_TYPE: &'static str = "application/json";

    /// Builds the backup for `notes`, dated `date`.
    pub fn build(notes: &[Note], date: NaiveDate) -> SyncResult<Self> {
        let contents = serde_json::to_string_pretty(notes)
            .map_err(|err| SyncError::Serialize(err.to_string()))?;
        Ok(Self {
            file_name: format!("{EXPORT_FILE_PREFIX}{}.json", date.format("%Y-%m-%d")),
            contents,
        })
    }
}

/// Fields honored from one imported element.
///
/// Unknown fields, including `id`, `ownerId`, `createdAt` and `updatedAt`,
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportedNote {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_pinned: Option<bool>,
}

impl ImportedNote {
    fn into_new_note(self, owner_id: &str) -> NewNote {
        NewNote::imported(
            owner_id,
            self.title.as_deref().unwrap_or_default(),
            self.content.as_deref().unwrap_or_default(),
            self.is_pinned.unwrap_or(false),
        )
    }
}

/// Parses backup `contents` into create payloads stamped with `owner_id`.
pub fn parse_import(contents: &str, owner_id: &str) -> SyncResult<Vec<NewNote>> {
    let value: Value = serde_json::from_str(contents)
        .map_err(|err| SyncError::ImportFormat(format!("not valid JSON: {err}")))?;
    let Value::Array(elements) = value else {
        return Err(SyncError::ImportFormat(
            "expected a JSON array of notes".to_string(),
        ));
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            if !element.is_object() {
                return Err(SyncError::ImportFormat(format!(
                    "element {index} is not a note object"
                )));
            }
            let imported: ImportedNote = serde_json::from_value(element).map_err(|err| {
                SyncError::ImportFormat(format!("element {index} is not a note: {err}"))
            })?;
            Ok(imported.into_new_note(owner_id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_import, ExportFile};
    use crate::model::note::{Note, NoteId, Timestamp, TimestampField};
    use crate::sync::SyncError;
    use chrono::NaiveDate;

    #[test]
    fn export_names_file_by_date_and_pretty_prints() {
        let note = Note {
            id: NoteId::new("n1"),
            title: "Shopping".to_string(),
            content: "milk".to_string(),
            is_pinned: true,
            owner_id: "u1".to_string(),
            created_at: Timestamp::from_millis(1),
            updated_at: Timestamp::from_millis(2),
        };
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let file = ExportFile::build(&[note], date).unwrap();

        assert_eq!(file.file_name, "notes_backup_2026-03-07.json");
        assert!(file.contents.starts_with("[\n  {"));
        let parsed: serde_json::Value = serde_json::from_str(&file.contents).unwrap();
        assert_eq!(parsed[0]["isPinned"], true);
        assert_eq!(parsed[0]["ownerId"], "u1");
        assert_eq!(parsed[0]["updatedAt"], 2);
    }

    #[test]
    fn import_ignores_identity_fields_and_stamps_owner() {
        let input = r#"[{"id":"old","ownerId":"intruder","title":"T","content":"C",
                         "isPinned":true,"createdAt":5,"updatedAt":1}]"#;
        let parsed = parse_import(input, "u1").unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].owner_id, "u1");
        assert_eq!(parsed[0].title, "T");
        assert!(parsed[0].is_pinned);
        assert_eq!(parsed[0].created_at, TimestampField::ServerTimestamp);
        assert_eq!(parsed[0].updated_at, TimestampField::ServerTimestamp);
    }

    #[test]
    fn import_rejects_non_array_and_non_object_elements() {
        assert!(matches!(
            parse_import(r#"{"title":"x"}"#, "u1"),
            Err(SyncError::ImportFormat(_))
        ));
        assert!(matches!(
            parse_import(r#"[{"title":"x"}, 3]"#, "u1"),
            Err(SyncError::ImportFormat(_))
        ));
        assert!(matches!(
            parse_import("not json", "u1"),
            Err(SyncError::ImportFormat(_))
        ));
    }

    #[test]
    fn import_rejects_mistyped_fields() {
        let err = parse_import(r#"[{"title": 12}]"#, "u1").unwrap_err();
        assert!(err.to_string().contains("element 0"));
    }
}
