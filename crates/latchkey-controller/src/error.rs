//! Errors that abort an access or enrollment workflow.
//!
//! Peripheral failures never show up here: the ports absorb them. Viewer
//! failures are logged and the session carries on.

use latchkey_capture::CaptureError;
use latchkey_storage::StorageError;
use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Identity store lookup or insert failed.
    #[error("Store error: {0}")]
    Store(#[from] StorageError),

    /// The camera did not deliver a photo.
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    /// Invalid name or credential, or an out-of-order session step.
    #[error(transparent)]
    Core(#[from] latchkey_core::Error),

    /// Reading operator input or writing the photo failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The operator's input stream ended.
    #[error("Input closed")]
    InputClosed,
}

impl SessionError {
    /// Whether the store rejected the insert because of a uniqueness rule.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_duplicate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_the_cause() {
        let error = SessionError::from(CaptureError::Timeout { timeout_ms: 15000 });
        assert_eq!(
            error.to_string(),
            "Capture failed: Camera timeout after 15000ms"
        );

        let error = SessionError::from(StorageError::DuplicateCredential);
        assert_eq!(error.to_string(), "Store error: Credential already registered");
        assert!(error.is_duplicate());
    }

    #[test]
    fn test_core_errors_are_transparent() {
        let error = SessionError::from(latchkey_core::Error::InvalidIdentity(
            "Name must not be empty".to_string(),
        ));
        assert_eq!(error.to_string(), "Invalid identity: Name must not be empty");
        assert!(!error.is_duplicate());
    }
}
