//! Error types for photo capture and the photo viewer.

use thiserror::Error;

/// Result type alias for camera operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Result type alias for viewer operations.
pub type ViewerResult<T> = Result<T, ViewerError>;

/// Failure to obtain a photo from the camera.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The camera did not answer within the request timeout.
    #[error("Camera timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Connection refused, DNS failure, reset mid-body, bad URL.
    #[error("Camera transport error: {message}")]
    Transport { message: String },

    /// The camera answered with a non-2xx status.
    #[error("Camera returned HTTP {status}")]
    NonSuccessStatus { status: u16 },

    /// The camera answered 2xx with no image data.
    #[error("Camera returned an empty image")]
    EmptyBody,
}

impl CaptureError {
    /// Create a new transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Failure to start or stop the external photo viewer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerError {
    /// The viewer program is not installed.
    #[error("Viewer program not found: {program}")]
    NotFound { program: String },

    /// The program exists but could not be started.
    #[error("Failed to launch viewer: {message}")]
    LaunchFailed { message: String },

    /// Waiting on or signalling the process failed.
    #[error("Viewer process error: {message}")]
    Process { message: String },
}

impl ViewerError {
    /// Create a new not-found error.
    pub fn not_found(program: impl Into<String>) -> Self {
        Self::NotFound {
            program: program.into(),
        }
    }

    /// Create a new launch failure.
    pub fn launch_failed(message: impl Into<String>) -> Self {
        Self::LaunchFailed {
            message: message.into(),
        }
    }

    /// Create a new process error.
    pub fn process(message: impl Into<String>) -> Self {
        Self::Process {
            message: message.into(),
        }
    }
}
