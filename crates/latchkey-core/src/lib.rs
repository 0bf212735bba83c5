//! Shared building blocks for the Latchkey access controller.
//!
//! Holds the identity types, the workspace-wide error type, configuration
//! loading and the photo file naming rules used by enrollment.

pub mod config;
pub mod constants;
pub mod error;
pub mod naming;
pub mod types;

pub use config::LatchkeyConfig;
pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
