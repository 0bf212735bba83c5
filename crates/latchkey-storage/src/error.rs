use thiserror::Error;

/// Storage-specific error types.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Another identity already uses this credential
    #[error("Credential already registered")]
    DuplicateCredential,

    /// Another identity already points at this photo file
    #[error("Photo path already registered: {photo_path}")]
    DuplicatePhotoPath { photo_path: String },

    /// Database connection or query execution failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration execution failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Translate an INSERT failure, recognizing the unique constraints of
    /// the `identities` table.
    pub(crate) fn from_insert(error: sqlx::Error, photo_path: &str) -> Self {
        if let sqlx::Error::Database(db_error) = &error
            && db_error.is_unique_violation()
        {
            let message = db_error.message();
            if message.contains("identities.credential") {
                return Self::DuplicateCredential;
            }
            if message.contains("identities.photo_path") {
                return Self::DuplicatePhotoPath {
                    photo_path: photo_path.to_string(),
                };
            }
        }
        Self::Database(error)
    }

    /// Whether this is one of the uniqueness violations.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            Self::DuplicateCredential | Self::DuplicatePhotoPath { .. }
        )
    }
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
