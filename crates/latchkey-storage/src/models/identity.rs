use chrono::NaiveDateTime;
use latchkey_core::{Credential, IdentityId, PersonName};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// An enrolled person.
///
/// `photo_path` is stored relative to the installation's base directory
/// (for example `photos/Ana_20251018_143000.jpg`).
///
/// # Database Schema
///
/// Maps to the `identities` table; `credential` and `photo_path` are each
/// unique across all rows.
#[derive(Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Identity {
    pub id: IdentityId,
    pub name: String,
    #[serde(skip_serializing)]
    pub credential: String,
    pub photo_path: String,
    pub created_at: NaiveDateTime,
}

impl Identity {
    /// Stored photo path as a `Path`.
    pub fn photo(&self) -> &Path {
        Path::new(&self.photo_path)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("credential", &"***")
            .field("photo_path", &self.photo_path)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Identity about to be inserted.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub name: PersonName,
    pub credential: Credential,
    pub photo_path: String,
}

impl NewIdentity {
    pub fn new(name: PersonName, credential: Credential, photo_path: impl Into<String>) -> Self {
        Self {
            name,
            credential,
            photo_path: photo_path.into(),
        }
    }
}
