//! Storage error types
//!
//! Error codes:
//! - JSONDB_VALIDATION_ERROR - empty or malformed collection/resource name
//! - JSONDB_NOT_FOUND - neither `<path>` nor `<path>.json` exists
//! - JSONDB_IO_ERROR - mkdir, open, write, rename, remove or listing failed
//! - JSONDB_DECODE_ERROR - stored bytes do not match the requested shape
//!
//! All storage errors are ERROR severity. The engine never recovers or
//! retries locally; every error goes straight back to the caller.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::Path;

use crate::observability::Severity;

type BoxedSource = Box<dyn StdError + Send + Sync + 'static>;

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Empty or malformed identifier, raised before any lock or I/O
    Validation,
    /// Target absent under both probed names
    NotFound,
    /// Underlying filesystem operation failed
    Io,
    /// Stored document does not decode into the requested type
    Decode,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::Validation => "JSONDB_VALIDATION_ERROR",
            StorageErrorCode::NotFound => "JSONDB_NOT_FOUND",
            StorageErrorCode::Io => "JSONDB_IO_ERROR",
            StorageErrorCode::Decode => "JSONDB_DECODE_ERROR",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error with code, message and optional cause
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    details: Option<String>,
    source: Option<BoxedSource>,
}

impl StorageError {
    /// Missing or malformed identifier. `field` is "collection" or "resource".
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::Validation,
            message: format!("invalid {}: {}", field, reason.into()),
            details: None,
            source: None,
        }
    }

    /// Nothing exists at `path` or `path.json`
    pub fn not_found(path: &Path) -> Self {
        Self {
            code: StorageErrorCode::NotFound,
            message: "unable to find file or directory".to_string(),
            details: Some(format!("path: {}", path.display())),
            source: None,
        }
    }

    /// Filesystem failure
    pub fn io_error(message: impl Into<String>, path: &Path, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::Io,
            message: message.into(),
            details: Some(format!("path: {}", path.display())),
            source: Some(Box::new(source)),
        }
    }

    /// The value handed to Write could not be serialized
    pub fn encode(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self {
            code: StorageErrorCode::Io,
            message: format!("{}: {}", message.into(), source),
            details: None,
            source: Some(Box::new(source)),
        }
    }

    /// A stored document could not be parsed into the requested type
    pub fn decode(path: &Path, source: serde_json::Error) -> Self {
        Self {
            code: StorageErrorCode::Decode,
            message: format!("malformed document: {}", source),
            details: Some(format!("path: {}", path.display())),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn is_not_found(&self) -> bool {
        self.code == StorageErrorCode::NotFound
    }

    pub fn is_validation(&self) -> bool {
        self.code == StorageErrorCode::Validation
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl StdError for StorageError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_codes() {
        assert_eq!(StorageErrorCode::Validation.code(), "JSONDB_VALIDATION_ERROR");
        assert_eq!(StorageErrorCode::NotFound.code(), "JSONDB_NOT_FOUND");
        assert_eq!(StorageErrorCode::Io.code(), "JSONDB_IO_ERROR");
        assert_eq!(StorageErrorCode::Decode.code(), "JSONDB_DECODE_ERROR");
    }

    #[test]
    fn test_validation_names_field() {
        let err = StorageError::validation("collection", "must not be empty");
        assert!(err.is_validation());
        assert!(err.message().contains("collection"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_not_found_display_includes_path() {
        let err = StorageError::not_found(&PathBuf::from("db/users/john"));
        let display = format!("{}", err);
        assert!(display.contains("ERROR"));
        assert!(display.contains("JSONDB_NOT_FOUND"));
        assert!(display.contains("db/users/john"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = StorageError::io_error(
            "rename failed",
            &PathBuf::from("x.json"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.code(), StorageErrorCode::Io);
        assert_eq!(err.source().unwrap().to_string(), "denied");
    }

    #[test]
    fn test_encode_message_carries_cause() {
        let mut map = std::collections::HashMap::new();
        map.insert(vec![1u8], 1);
        let json_err = serde_json::to_vec(&map).unwrap_err();
        let err = StorageError::encode("failed to serialize document", json_err);
        assert_eq!(err.code(), StorageErrorCode::Io);
        assert!(err.message().starts_with("failed to serialize document: "));
        assert!(err.to_string().contains("key must be a string"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_decode_is_distinct_from_not_found() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = StorageError::decode(&PathBuf::from("x.json"), json_err);
        assert_eq!(err.code(), StorageErrorCode::Decode);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StorageError>();
    }
}
