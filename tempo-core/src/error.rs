use std::fmt;

/// Result type alias for tempo core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for tempo core operations
#[derive(Debug)]
pub enum Error {
    /// A concurrent execution path for an action could not be started
    Launch(std::io::Error),

    /// Configuration errors
    Config(String),

    /// Statistics calculation errors
    Stats(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Launch(e) => write!(f, "Failed to launch action: {e}"),
            Error::Config(msg) => write!(f, "Configuration error: {msg}"),
            Error::Stats(msg) => write!(f, "Statistics error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Launch(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_launch_error_keeps_io_source() {
        let err = Error::Launch(std::io::Error::other("no more threads"));
        assert_eq!(err.to_string(), "Failed to launch action: no more threads");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("no more threads"));
    }

    #[test]
    fn test_config_error_has_no_source() {
        let err = Error::Config("rate must be > 0".to_string());
        assert_eq!(err.to_string(), "Configuration error: rate must be > 0");
        assert!(err.source().is_none());
    }
}
