//! Error types for odotrack.
//!
//! This module defines all error types used throughout the odotrack crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for odotrack operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Ingestion Errors ===
    /// The recognition credential is missing.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the missing configuration.
        message: String,
    },

    /// The selected image could not be read.
    #[error("failed to read image {path}: {source}")]
    FileRead {
        /// Path of the selected image.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The recognition service answered, but the answer is not a usable reading.
    #[error("could not read an odometer value from the image (response: {response:?})")]
    Recognition {
        /// The raw response text.
        response: String,
    },

    /// The recognition service could not be reached or rejected the request.
    #[error("recognition service error: {message}")]
    RecognitionService {
        /// Description of what went wrong.
        message: String,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// The persisted reading collection could not be decoded.
    #[error("stored readings are corrupt: {source}")]
    PersistenceParse {
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for odotrack operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::RecognitionService {
            message: err.to_string(),
        }
    }
}

impl Error {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a recognition failure carrying the raw response.
    #[must_use]
    pub fn recognition(response: impl Into<String>) -> Self {
        Self::Recognition {
            response: response.into(),
        }
    }

    /// Create a recognition service error.
    #[must_use]
    pub fn recognition_service(message: impl Into<String>) -> Self {
        Self::RecognitionService {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error is a missing-credential error.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Check if this error means the image was unreadable.
    #[must_use]
    pub fn is_recognition_failure(&self) -> bool {
        matches!(self, Self::Recognition { .. })
    }

    /// Check if this error means the selected file could not be loaded.
    #[must_use]
    pub fn is_file_read_error(&self) -> bool {
        matches!(self, Self::FileRead { .. })
    }

    /// The message shown to the user when an ingestion attempt fails.
    ///
    /// Configuration errors are shown verbatim, unreadable images ask for a
    /// clearer photo, and file errors stay generic.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration { message } => message.clone(),
            Self::Recognition { .. } => {
                "Could not read the odometer. Please try a clearer photo.".to_string()
            }
            Self::FileRead { .. } => "Could not read the selected file.".to_string(),
            Self::RecognitionService { message } => {
                format!("The recognition service failed: {message}")
            }
            other => format!("An error occurred while processing the image: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::configuration("API key is not set");
        assert_eq!(err.to_string(), "configuration error: API key is not set");

        let err = Error::internal("test error");
        assert_eq!(err.to_string(), "internal error: test error");
    }

    #[test]
    fn test_error_predicates() {
        assert!(Error::configuration("missing").is_configuration_error());
        assert!(!Error::recognition("-1").is_configuration_error());

        assert!(Error::recognition("-1").is_recognition_failure());
        assert!(!Error::configuration("missing").is_recognition_failure());

        let err = Error::FileRead {
            path: PathBuf::from("odo.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.is_file_read_error());
        assert!(!Error::recognition("").is_file_read_error());
    }

    #[test]
    fn test_user_message_distinguishes_failures() {
        let config = Error::configuration("API_KEY is not configured").user_message();
        assert_eq!(config, "API_KEY is not configured");

        let unreadable = Error::recognition("-1").user_message();
        assert!(unreadable.contains("clearer photo"));

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let file = Error::FileRead {
            path: PathBuf::from("/tmp/odo.jpg"),
            source: io_err,
        }
        .user_message();
        assert!(file.contains("selected file"));

        assert_ne!(config, unreadable);
        assert_ne!(unreadable, file);
    }

    #[test]
    fn test_recognition_error_keeps_response() {
        let err = Error::recognition("12a456");
        assert!(err.to_string().contains("12a456"));
    }

    #[test]
    fn test_recognition_service_error() {
        let err = Error::recognition_service("HTTP 503");
        assert_eq!(err.to_string(), "recognition service error: HTTP 503");
        assert!(err.user_message().contains("HTTP 503"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "slot_key must not be empty".to_string(),
        };
        assert!(err.to_string().contains("slot_key"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
