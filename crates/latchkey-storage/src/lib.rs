//! Identity store for the Latchkey door controller.
//!
//! One SQLite table, `identities`, maps a shared-secret credential to a
//! person's name and the path of their enrolled photo. The schema lives in
//! the workspace `migrations/` directory and is embedded at compile time.
//!
//! # Examples
//!
//! ```no_run
//! use latchkey_core::{Credential, PersonName};
//! use latchkey_storage::{Database, DatabaseConfig, NewIdentity};
//! use latchkey_storage::repositories::{IdentityRepository, SqliteIdentityRepository};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::new("latchkey.db")).await?;
//! let identities = SqliteIdentityRepository::new(db.pool().clone());
//!
//! identities
//!     .create(&NewIdentity::new(
//!         PersonName::new("Ana")?,
//!         Credential::new("1234")?,
//!         "photos/Ana_20251018_143000.jpg",
//!     ))
//!     .await?;
//!
//! if let Some(identity) = identities.find_by_credential("1234").await? {
//!     println!("Welcome {}", identity.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Security Considerations
//!
//! Credentials are stored in plain text and matched exactly. All queries use
//! bound parameters.

pub mod connection;
pub mod error;
pub mod models;
pub mod repositories;

pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use models::{Identity, NewIdentity};
pub use repositories::{IdentityRepository, InMemoryIdentityRepository, SqliteIdentityRepository};
