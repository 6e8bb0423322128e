//! Signed-in identity as reported by the auth gateway.

use serde::{Deserialize, Serialize};

/// Owner key stamped on every note. Equal to [`Identity::id`].
pub type OwnerId = String;

/// Authenticated user context.
///
/// Owned by the auth gateway; core code only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: OwnerId,
    pub display_name: Option<String>,
    pub email: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            email: email.into(),
            photo_url: None,
        }
    }

    /// Name shown in the header: display name when set, else the email.
    pub fn label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.email.as_str(),
        }
    }
}
