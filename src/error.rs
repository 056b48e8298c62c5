use thiserror::Error;

/// Main error type for Attemptviz
#[derive(Error, Debug)]
pub enum VizError {
    /// Missing attempt folder, results root or requested file
    #[error("Not found: {0}")]
    NotFound(String),

    /// File system I/O errors (permissions, unreadable directories)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input (malformed ids, path traversal)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON encoding/decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VizError {
    /// Map a directory read failure onto the error kinds callers branch on:
    /// a vanished path is `NotFound`, anything else stays an I/O error.
    pub fn from_read(err: std::io::Error, what: &str) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            VizError::NotFound(what.to_string())
        } else {
            VizError::Io(err)
        }
    }
}

/// Convenient Result type using VizError
pub type Result<T> = std::result::Result<T, VizError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VizError::NotFound("attempt_10".to_string());
        assert!(err.to_string().contains("Not found"));
        assert!(err.to_string().contains("attempt_10"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let viz_err: VizError = io_err.into();
        assert!(matches!(viz_err, VizError::Io(_)));
    }

    #[test]
    fn test_from_read_maps_missing_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = VizError::from_read(io_err, "results root /tmp/x");
        assert!(matches!(err, VizError::NotFound(ref m) if m.contains("/tmp/x")));

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(VizError::from_read(io_err, "x"), VizError::Io(_)));
    }
}
