//! Error types for document loading, access and validation

use std::path::PathBuf;

use thiserror::Error;

/// Result type for document operations
pub type Result<T> = std::result::Result<T, JsonError>;

/// Coarse classification of a [`JsonError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed document text
    Parse,
    /// The document file could not be read
    Io,
    /// An accessor found a missing member or a member of the wrong type
    Type,
    /// The schema text itself is malformed
    InvalidSchema,
    /// The document does not satisfy the schema
    SchemaViolation,
}

/// Document errors
#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Error(offset {offset}): {message}")]
    Parse { offset: usize, message: String },

    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("key '{key}' missing or not {expected} in '{node}'")]
    MissingOrMistyped {
        key: String,
        node: String,
        expected: &'static str,
    },

    #[error("'{node}' is not {expected}")]
    NotA { node: String, expected: &'static str },

    #[error("array '{key}' does not contain all strings")]
    NonStringArrayItem { key: String },

    #[error("invalid schema{}: {message}", .offset.map(|o| format!(" (offset {o})")).unwrap_or_default())]
    InvalidSchema {
        offset: Option<usize>,
        message: String,
    },

    #[error("JSON object doesn't conform to schema. Invalid schema: {schema_pointer}. Invalid keyword: {keyword}. Invalid document key: {document_pointer} ({message})")]
    SchemaViolation {
        schema_pointer: String,
        keyword: String,
        document_pointer: String,
        message: String,
    },
}

impl JsonError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            JsonError::Parse { .. } => ErrorKind::Parse,
            JsonError::Io { .. } => ErrorKind::Io,
            JsonError::MissingOrMistyped { .. }
            | JsonError::NotA { .. }
            | JsonError::NonStringArrayItem { .. } => ErrorKind::Type,
            JsonError::InvalidSchema { .. } => ErrorKind::InvalidSchema,
            JsonError::SchemaViolation { .. } => ErrorKind::SchemaViolation,
        }
    }

    /// True for missing or wrongly typed members
    pub fn is_type_error(&self) -> bool {
        self.kind() == ErrorKind::Type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_error_message() {
        let err = JsonError::MissingOrMistyped {
            key: "port".to_string(),
            node: "root".to_string(),
            expected: "an integer",
        };
        assert_eq!(err.to_string(), "key 'port' missing or not an integer in 'root'");
        assert!(err.is_type_error());
    }

    #[test]
    fn test_invalid_schema_message() {
        let with_offset = JsonError::InvalidSchema {
            offset: Some(3),
            message: "expected value".to_string(),
        };
        assert_eq!(with_offset.to_string(), "invalid schema (offset 3): expected value");

        let without = JsonError::InvalidSchema {
            offset: None,
            message: "bad type".to_string(),
        };
        assert_eq!(without.to_string(), "invalid schema: bad type");
        assert_eq!(without.kind(), ErrorKind::InvalidSchema);
    }
}
