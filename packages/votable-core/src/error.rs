//! Converter error types.

use std::fmt;

use thiserror::Error;

use crate::warnings::Warning;

/// Location of a cell inside a table, used to annotate diagnostics.
///
/// Both coordinates are zero-based. A default position means the location
/// is unknown (for example when a converter is used on its own).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    /// Row index within the table
    pub row: Option<usize>,
    /// Field (column) index within the row
    pub field: Option<usize>,
}

impl Position {
    /// Creates a position for the given row and field.
    pub fn new(row: usize, field: usize) -> Self {
        Self {
            row: Some(row),
            field: Some(field),
        }
    }

    /// Returns `true` if neither coordinate is known.
    pub fn is_unknown(&self) -> bool {
        self.row.is_none() && self.field.is_none()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.row, self.field) {
            (Some(row), Some(field)) => write!(f, "row {}, field {}", row, field),
            (Some(row), None) => write!(f, "row {}", row),
            (None, Some(field)) => write!(f, "field {}", field),
            (None, None) => write!(f, "unknown position"),
        }
    }
}

/// Errors raised while building converters or converting values.
///
/// Variants carrying an `E0x` code correspond to fatal VOTable
/// conformance errors; `Strict` wraps an advisory warning that was
/// escalated to an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoError {
    /// E01: arraysize attribute could not be interpreted
    #[error("E01: Invalid size specifier '{size}' for a {datatype} field (in field '{field}')")]
    InvalidArraySize {
        size: String,
        datatype: String,
        field: String,
    },

    /// E02: array text has the wrong number of elements
    #[error("E02: Incorrect number of elements in array. Expected {expected} (or a multiple), got {got}")]
    ArrayLength { expected: usize, got: usize },

    /// E03: complex value is not a pair of numbers
    #[error("E03: '{value}' does not parse as a complex number")]
    InvalidComplex { value: String },

    /// E04: bit value is neither 0 nor 1
    #[error("E04: Invalid bit value '{value}'")]
    InvalidBit { value: String },

    /// E05: boolean value is not a recognised token
    #[error("E05: Invalid boolean value '{value}'")]
    InvalidBoolean { value: String },

    /// E06: datatype attribute is not a VOTable datatype
    #[error("E06: Unknown datatype '{datatype}' on field '{field}'")]
    UnknownDatatype { datatype: String, field: String },

    /// Advisory warning escalated to an error
    #[error("{warning} ({pos})")]
    Strict { warning: Warning, pos: Position },

    /// Text does not parse as a number of the field type
    #[error("Invalid {datatype} literal '{value}'")]
    InvalidNumber { datatype: String, value: String },

    /// Integer literal does not fit in the field type
    #[error("Value {value} out of range for {datatype}")]
    OutOfRange { datatype: String, value: String },

    /// Non-ASCII text in a char field
    #[error("Non-ASCII character in char value '{value}'")]
    NonAscii { value: String },

    /// Malformed UTF-16 in a unicodeChar field
    #[error("Invalid UTF-16 data in unicodeChar value")]
    InvalidUtf16,

    /// Binary input ended in the middle of a value
    #[error("Unexpected end of binary data: needed {needed} bytes, {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// Native value does not match the converter's datatype
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// Binary row consumed no bytes while stream data remains
    #[error("Row at byte {offset} has zero width; {remaining} trailing bytes cannot be decoded")]
    ZeroWidthRow { offset: usize, remaining: usize },

    /// Row has the wrong number of cells
    #[error("Row {row} has {got} cells, schema has {expected} fields")]
    ColumnCount {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// Invalid base64 stream payload
    #[error("Base64 error: {0}")]
    Base64(String),

    /// Invalid parser configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error while reading or writing a stream
    #[error("I/O error: {0}")]
    Io(String),
}

impl VoError {
    /// Returns the VOTable error or warning code, if the error has one.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            VoError::InvalidArraySize { .. } => Some("E01"),
            VoError::ArrayLength { .. } => Some("E02"),
            VoError::InvalidComplex { .. } => Some("E03"),
            VoError::InvalidBit { .. } => Some("E04"),
            VoError::InvalidBoolean { .. } => Some("E05"),
            VoError::UnknownDatatype { .. } => Some("E06"),
            VoError::Strict { warning, .. } => Some(warning.code()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for VoError {
    fn from(error: std::io::Error) -> Self {
        VoError::Io(error.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = VoError::ArrayLength {
            expected: 4,
            got: 3,
        };
        assert_eq!(err.code(), Some("E02"));
        assert_eq!(
            err.to_string(),
            "E02: Incorrect number of elements in array. Expected 4 (or a multiple), got 3"
        );
        assert_eq!(
            Warning::ArrayLength { expected: 4, got: 3 }.to_string(),
            err.to_string()
        );

        let err = VoError::Strict {
            warning: Warning::CommaSeparator,
            pos: Position::default(),
        };
        assert_eq!(err.code(), Some("W01"));

        assert_eq!(VoError::InvalidUtf16.code(), None);
        assert_eq!(
            VoError::ZeroWidthRow {
                offset: 8,
                remaining: 3
            }
            .code(),
            None
        );
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(3, 1).to_string(), "row 3, field 1");
        assert_eq!(Position::default().to_string(), "unknown position");
        assert!(Position::default().is_unknown());
    }
}
