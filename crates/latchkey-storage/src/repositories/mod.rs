pub mod identity;
pub mod memory;

pub use identity::{IdentityRepository, SqliteIdentityRepository};
pub use memory::InMemoryIdentityRepository;
