use crate::error::{StorageError, StorageResult};
use crate::models::{Identity, NewIdentity};
use crate::repositories::IdentityRepository;
use chrono::Utc;
use latchkey_core::{Credential, IdentityId};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    identities: Vec<Identity>,
    next_id: IdentityId,
    fail_lookups: bool,
    fail_creates: bool,
}

/// Process-local identity store with the same uniqueness rules as the SQLite
/// table, plus failure injection for tests of the workflows above it.
///
/// Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityRepository {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every lookup fail with an internal error.
    pub fn fail_lookups(&self, fail: bool) {
        self.lock().fail_lookups = fail;
    }

    /// Make every insert fail with an internal error.
    pub fn fail_creates(&self, fail: bool) {
        self.lock().fail_creates = fail;
    }

    /// Snapshot of all stored identities.
    pub fn all(&self) -> Vec<Identity> {
        self.lock().identities.clone()
    }
}

impl IdentityRepository for InMemoryIdentityRepository {
    async fn find_by_credential(&self, secret: &str) -> StorageResult<Option<Identity>> {
        let inner = self.lock();
        if inner.fail_lookups {
            return Err(StorageError::Internal("Injected lookup failure".to_string()));
        }

        let Ok(presented) = Credential::new(secret) else {
            return Ok(None);
        };
        Ok(inner
            .identities
            .iter()
            .find(|identity| presented.matches(&identity.credential))
            .cloned())
    }

    async fn find_by_id(&self, id: IdentityId) -> StorageResult<Option<Identity>> {
        Ok(self.lock().identities.iter().find(|i| i.id == id).cloned())
    }

    async fn create(&self, identity: &NewIdentity) -> StorageResult<IdentityId> {
        let mut inner = self.lock();
        if inner.fail_creates {
            return Err(StorageError::Internal("Injected create failure".to_string()));
        }
        if inner
            .identities
            .iter()
            .any(|existing| identity.credential.matches(&existing.credential))
        {
            return Err(StorageError::DuplicateCredential);
        }
        if inner
            .identities
            .iter()
            .any(|existing| existing.photo_path == identity.photo_path)
        {
            return Err(StorageError::DuplicatePhotoPath {
                photo_path: identity.photo_path.clone(),
            });
        }

        inner.next_id += 1;
        let id = inner.next_id;
        inner.identities.push(Identity {
            id,
            name: identity.name.to_string(),
            credential: identity.credential.expose().to_string(),
            photo_path: identity.photo_path.clone(),
            created_at: Utc::now().naive_utc(),
        });
        Ok(id)
    }

    async fn count(&self) -> StorageResult<i64> {
        Ok(i64::try_from(self.lock().identities.len()).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_core::PersonName;

    fn new_identity(name: &str, credential: &str, photo: &str) -> NewIdentity {
        NewIdentity::new(
            PersonName::new(name).unwrap(),
            Credential::new(credential).unwrap(),
            photo,
        )
    }

    #[tokio::test]
    async fn test_mirrors_uniqueness_rules() {
        let repo = InMemoryIdentityRepository::new();
        repo.create(&new_identity("Ana", "1234", "photos/a.jpg"))
            .await
            .unwrap();

        assert!(matches!(
            repo.create(&new_identity("Bob", "1234", "photos/b.jpg")).await,
            Err(StorageError::DuplicateCredential)
        ));
        assert!(matches!(
            repo.create(&new_identity("Bob", "5678", "photos/a.jpg")).await,
            Err(StorageError::DuplicatePhotoPath { .. })
        ));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_lookup_is_exact() {
        let repo = InMemoryIdentityRepository::new();
        repo.create(&new_identity("Ana", "abc", "photos/a.jpg"))
            .await
            .unwrap();

        assert!(repo.find_by_credential("abc").await.unwrap().is_some());
        assert!(repo.find_by_credential("abc ").await.unwrap().is_none());
        assert!(repo.find_by_credential("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let repo = InMemoryIdentityRepository::new();
        repo.fail_creates(true);
        assert!(
            repo.create(&new_identity("Ana", "1", "photos/a.jpg"))
                .await
                .is_err()
        );

        repo.fail_lookups(true);
        assert!(repo.find_by_credential("1").await.is_err());
        assert!(repo.all().is_empty());
    }
}
