use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration {path}: {message}")]
    ConfigParse { path: String, message: String },

    // Session errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Identity errors
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message() {
        let error = Error::InvalidStateTransition {
            from: "Idle".to_string(),
            to: "HoldingOpen".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid state transition from Idle to HoldingOpen"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: Error = io.into();
        assert!(matches!(error, Error::Io(_)));
    }
}
