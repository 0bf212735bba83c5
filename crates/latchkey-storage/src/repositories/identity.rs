#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::models::{Identity, NewIdentity};
use latchkey_core::IdentityId;
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Repository trait for identity lookups and enrollment.
pub trait IdentityRepository: Send + Sync {
    /// Find the identity whose credential equals `secret` exactly.
    ///
    /// No trimming and no case folding: `"abc"` does not match `"ABC"` or
    /// `" abc"`.
    async fn find_by_credential(&self, secret: &str) -> StorageResult<Option<Identity>>;

    /// Find an identity by its ID
    async fn find_by_id(&self, id: IdentityId) -> StorageResult<Option<Identity>>;

    /// Insert a new identity and return its ID.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCredential` or `DuplicatePhotoPath` when the row
    /// would break a uniqueness constraint.
    async fn create(&self, identity: &NewIdentity) -> StorageResult<IdentityId>;

    /// Number of enrolled identities
    async fn count(&self) -> StorageResult<i64>;
}

/// SQLite implementation of IdentityRepository
#[derive(Debug, Clone)]
pub struct SqliteIdentityRepository {
    pool: SqlitePool,
}

impl SqliteIdentityRepository {
    /// Create a new SQLite identity repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl IdentityRepository for SqliteIdentityRepository {
    async fn find_by_credential(&self, secret: &str) -> StorageResult<Option<Identity>> {
        let identity = sqlx::query_as::<_, Identity>(
            r#"
            SELECT id, name, credential, photo_path, created_at
            FROM identities
            WHERE credential = ?
            "#,
        )
        .bind(secret)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn find_by_id(&self, id: IdentityId) -> StorageResult<Option<Identity>> {
        let identity = sqlx::query_as::<_, Identity>(
            r#"
            SELECT id, name, credential, photo_path, created_at
            FROM identities
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn create(&self, identity: &NewIdentity) -> StorageResult<IdentityId> {
        let result = sqlx::query(
            r#"
            INSERT INTO identities (name, credential, photo_path)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(identity.name.as_str())
        .bind(identity.credential.expose())
        .bind(&identity.photo_path)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::from_insert(e, &identity.photo_path))?;

        let id = result.last_insert_rowid();
        info!("Enrolled identity {} ({})", id, identity.name);
        Ok(id)
    }

    async fn count(&self) -> StorageResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM identities")
            .fetch_one(&self.pool)
            .await?;
        debug!("{} identities enrolled", count.0);
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Database;
    use latchkey_core::{Credential, PersonName};

    fn new_identity(name: &str, credential: &str, photo: &str) -> NewIdentity {
        NewIdentity::new(
            PersonName::new(name).unwrap(),
            Credential::new(credential).unwrap(),
            photo,
        )
    }

    async fn repo() -> SqliteIdentityRepository {
        let db = Database::in_memory().await.unwrap();
        SqliteIdentityRepository::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_create_and_find_by_credential() {
        let repo = repo().await;

        let id = repo
            .create(&new_identity("Ana", "1234", "photos/p.jpg"))
            .await
            .unwrap();

        let found = repo.find_by_credential("1234").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.name, "Ana");
        assert_eq!(found.photo_path, "photos/p.jpg");
    }

    #[tokio::test]
    async fn test_unknown_credential_is_none() {
        let repo = repo().await;
        repo.create(&new_identity("Ana", "1234", "photos/p.jpg"))
            .await
            .unwrap();

        assert!(repo.find_by_credential("wrong").await.unwrap().is_none());
        assert!(repo.find_by_credential("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_match_is_case_and_whitespace_sensitive() {
        let repo = repo().await;
        repo.create(&new_identity("Ana", "abc", "photos/a.jpg"))
            .await
            .unwrap();

        assert!(repo.find_by_credential("ABC").await.unwrap().is_none());
        assert!(repo.find_by_credential(" abc").await.unwrap().is_none());
        assert!(repo.find_by_credential("abc").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_credential() {
        let repo = repo().await;
        repo.create(&new_identity("Ana", "1234", "photos/a.jpg"))
            .await
            .unwrap();

        let result = repo.create(&new_identity("Bob", "1234", "photos/b.jpg")).await;
        assert!(matches!(result, Err(StorageError::DuplicateCredential)));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_photo_path() {
        let repo = repo().await;
        repo.create(&new_identity("Ana", "1234", "photos/a.jpg"))
            .await
            .unwrap();

        let result = repo.create(&new_identity("Ana", "5678", "photos/a.jpg")).await;
        match result {
            Err(StorageError::DuplicatePhotoPath { photo_path }) => {
                assert_eq!(photo_path, "photos/a.jpg")
            }
            other => panic!("Expected DuplicatePhotoPath, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let repo = repo().await;
        let id = repo
            .create(&new_identity("Ana", "1234", "photos/a.jpg"))
            .await
            .unwrap();

        assert!(repo.find_by_id(id).await.unwrap().is_some());
        assert!(repo.find_by_id(id + 1).await.unwrap().is_none());
    }
}
