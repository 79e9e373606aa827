//! Error types for the duplicate finder
//!
//! Only the I/O wrappers around the core can fail. Fingerprinting and the
//! duplicate index are total and never produce one of these.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scanning
#[derive(Error, Debug)]
pub enum DupeError {
    /// A file could not be opened or read
    #[error("Failed to open '{}': {}", .path.display(), .source)]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file bytes matched none of the known image formats
    #[error("Failed to decode '{}': {}", .path.display(), .source)]
    DecodeFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A folder could not be listed
    #[error("Failed to list folder '{}': {}", .path.display(), .source)]
    ListFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// General I/O error
    #[error("IO error: {0}")]
    IoError(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DupeError>;

impl From<std::io::Error> for DupeError {
    fn from(err: std::io::Error) -> Self {
        DupeError::IoError(err.to_string())
    }
}

impl DupeError {
    /// Attach a path to a decode error produced from raw bytes
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            DupeError::DecodeFailed { source, .. } => DupeError::DecodeFailed {
                path: path.into(),
                source,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_list_failed_message() {
        let err = DupeError::ListFailed {
            path: PathBuf::from("/missing"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to list folder '/missing': not found"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let err: DupeError = io::Error::new(io::ErrorKind::Other, "boom").into();
        assert!(matches!(err, DupeError::IoError(ref msg) if msg == "boom"));
    }

    #[test]
    fn test_with_path_only_touches_decode_errors() {
        let decode = DupeError::DecodeFailed {
            path: PathBuf::new(),
            source: image::ImageError::IoError(io::Error::new(io::ErrorKind::Other, "bad")),
        };
        match decode.with_path("/photos/a.png") {
            DupeError::DecodeFailed { path, .. } => assert_eq!(path, PathBuf::from("/photos/a.png")),
            other => panic!("unexpected error: {other}"),
        }

        let io_err = DupeError::IoError("x".to_string()).with_path("/ignored");
        assert!(matches!(io_err, DupeError::IoError(_)));
    }
}
