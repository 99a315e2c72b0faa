//! Store error handling
//!
//! Provides typed errors for record store operations with descriptive
//! messages and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during record store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// An explicit database path was given but does not exist
    #[error("Database file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Input had the wrong shape (non-string identifier, non-object input)
    #[error("Type error: {0}")]
    Type(String),

    /// Input had missing, empty or unexpected fields
    #[error("Validation error: {0}")]
    Validation(String),

    /// The identifier counter cannot advance any further
    #[error("Cannot create record: identifier counter is at its limit ({last_id})")]
    IdsExhausted { last_id: u64 },

    /// No record with the given identifier
    #[error("No record found with identifier: {0}")]
    NotFound(String),

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Database file could not be parsed or breaks an invariant
    #[error("Invalid database format in '{path}': {details}")]
    InvalidFormat { path: PathBuf, details: String },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// Create an error from an I/O error hit while writing `path`
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StoreError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => StoreError::FileNotFound { path },
            _ if is_disk_full_error(&error) => StoreError::DiskFull {
                path,
                source: error,
            },
            _ => StoreError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Create an error from an I/O error hit while reading `path`
    pub fn from_read_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StoreError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => StoreError::FileNotFound { path },
            _ => StoreError::ReadError {
                path,
                source: error,
            },
        }
    }

    /// Whether the error comes from the caller's input rather than storage
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            StoreError::Type(_) | StoreError::Validation(_) | StoreError::NotFound(_)
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::FileNotFound { .. } => {
                Some("Check the path, or omit --file to use the default database.")
            }
            StoreError::DiskFull { .. } => Some("Free up disk space and try again."),
            StoreError::PermissionDenied { .. } => {
                Some("Check file and directory permissions. You may need to change ownership of the data directory.")
            }
            StoreError::InvalidFormat { .. } => {
                Some("The database file was edited or damaged outside liferec. Fix it by hand or move it aside to start fresh.")
            }
            StoreError::Validation(_) => Some("Records need a non-empty title and content."),
            StoreError::IdsExhausted { .. } => {
                Some("The database's last_id was edited by hand. Lower it to the highest existing record number.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
