use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    /// The import payload is not a JSON array of records.
    #[error("Invalid import file: {message}")]
    InvalidImportFile { message: String },

    /// The import file could not be read from disk.
    #[error("Failed to read import file '{path}': {message}")]
    ImportIo { path: String, message: String },

    /// One record failed to insert; the whole file was rolled back.
    #[error("Import rolled back: record #{index} failed: {message}")]
    PartialFailure { index: usize, message: String },

    #[error("{operation} did not finish within the configured deadline")]
    Timeout { operation: &'static str },
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn invalid_import_file(message: impl Into<String>) -> Self {
        Self::InvalidImportFile {
            message: message.into(),
        }
    }

    pub fn import_io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ImportIo {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn partial_failure(index: usize, message: impl Into<String>) -> Self {
        Self::PartialFailure {
            index,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn timeout(operation: &'static str) -> Self {
        Self::Timeout { operation }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
