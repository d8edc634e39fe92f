//! Error handling for MHMAT read and write operations

use thiserror::Error;

/// Result type alias for MHMAT operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading, writing or building materials
///
/// Only conditions that abort an operation live here. Recoverable problems found
/// while parsing (unknown keys, malformed lines) are reported as
/// [`Diagnostic`](crate::parser::Diagnostic)s instead.
#[derive(Error, Debug)]
pub enum Error {
    /// A float-valued key carried a value that is not a number
    #[error("Malformed float for '{key}' on line {line}: {value:?}")]
    MalformedFloat {
        key: String,
        value: String,
        line: usize,
    },

    /// A material was requested from both a source object and a file
    #[error("Cannot construct a material from both a source object and a file")]
    ConstructionConflict,

    /// Two key definitions share a name under case-insensitive comparison
    #[error("Key schema collision: '{name}' is defined more than once")]
    SchemaCollision { name: String },

    /// A settings value does not have the type its key declares
    #[error("Type mismatch for '{key}': expected {expected} value")]
    TypeMismatch {
        key: String,
        expected: &'static str,
    },

    /// Invalid file path or file not found
    #[error("File error: {message}")]
    FileError { message: String },

    /// Invalid parameters or configuration
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    IoError { message: String },

    /// A value cannot be written on a single line
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl Error {
    /// Create a new malformed float error
    pub fn malformed_float<K: Into<String>, V: Into<String>>(
        key: K,
        value: V,
        line: usize,
    ) -> Self {
        Self::MalformedFloat {
            key: key.into(),
            value: value.into(),
            line,
        }
    }

    /// Create a new schema collision error
    pub fn schema_collision<S: Into<String>>(name: S) -> Self {
        Self::SchemaCollision { name: name.into() }
    }

    /// Create a new type mismatch error
    pub fn type_mismatch<S: Into<String>>(key: S, expected: &'static str) -> Self {
        Self::TypeMismatch {
            key: key.into(),
            expected,
        }
    }

    /// Create a new file error
    pub fn file_error<S: Into<String>>(message: S) -> Self {
        Self::FileError {
            message: message.into(),
        }
    }

    /// Create a new invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io_error<S: Into<String>>(message: S) -> Self {
        Self::IoError {
            message: message.into(),
        }
    }

    /// Create a new invalid value error
    pub fn invalid_value<K: Into<String>, S: Into<String>>(key: K, message: S) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from the contents of a material file rather than
    /// from configuration or I/O
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedFloat { .. } | Self::TypeMismatch { .. } | Self::InvalidValue { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_error(err.to_string()),
            _ => Self::io_error(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = Error::malformed_float("opacity", "abc", 4);
        assert!(matches!(error, Error::MalformedFloat { line: 4, .. }));
        assert_eq!(
            error.to_string(),
            "Malformed float for 'opacity' on line 4: \"abc\""
        );
        assert!(error.is_content_error());
    }

    #[test]
    fn test_invalid_value_message() {
        let error = Error::invalid_value("description", "line breaks cannot be written");
        assert_eq!(
            error.to_string(),
            "Invalid value for 'description': line breaks cannot be written"
        );
        assert!(error.is_content_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(Error::from(missing), Error::FileError { .. }));

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let error = Error::from(denied);
        assert!(matches!(error, Error::IoError { .. }));
        assert!(!error.is_content_error());
    }

    #[test]
    fn test_construction_conflict_message() {
        assert_eq!(
            Error::ConstructionConflict.to_string(),
            "Cannot construct a material from both a source object and a file"
        );
    }
}
