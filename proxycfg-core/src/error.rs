//! Error types for proxycfg

use crate::section::SectionKind;
use thiserror::Error;

/// Result type for proxycfg operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for proxycfg
#[derive(Error, Debug)]
pub enum Error {
    /// Section kind or section name not present
    #[error("Section missing: {kind} '{name}'")]
    SectionMissing { kind: SectionKind, name: String },

    /// Section name already taken within its kind
    #[error("Section already exists: {kind} '{name}'")]
    SectionAlreadyExists { kind: SectionKind, name: String },

    /// Singleton sections can neither be created nor deleted
    #[error("Section '{kind}' is a singleton and cannot be created or deleted")]
    SingletonSection { kind: SectionKind },

    /// No directive with that name, or the directive holds no value
    #[error("Attribute not found: {attribute}")]
    AttributeNotFound { attribute: String },

    /// A directive accepted a line but could not decode it
    #[error("Parse error in '{parser}' at line {line_no}: {message} ({line})")]
    Parse {
        parser: String,
        line_no: usize,
        line: String,
        message: String,
    },

    /// Index beyond the stored sequence
    #[error("Index {index} out of range for '{attribute}' (length {len})")]
    IndexOutOfRange {
        attribute: String,
        index: usize,
        len: usize,
    },

    /// Multi-valued directive addressed without an index
    #[error("Attribute '{attribute}' holds multiple values, an index is required")]
    IndexRequired { attribute: String },

    /// Value does not fit the directive
    #[error("Invalid value for '{attribute}': expected {expected}")]
    InvalidValue { attribute: String, expected: String },

    /// Operation not available on this directive
    #[error("Operation '{operation}' is not supported by '{attribute}'")]
    Unsupported {
        attribute: String,
        operation: &'static str,
    },

    /// Parser options could not be loaded
    #[error("Options error: {0}")]
    Options(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand used by directive parsers when a value has the wrong shape.
    pub fn invalid_value(attribute: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::InvalidValue {
            attribute: attribute.into(),
            expected: expected.into(),
        }
    }

    /// Shorthand for a missing directive or an unset one.
    pub fn not_found(attribute: impl Into<String>) -> Self {
        Self::AttributeNotFound {
            attribute: attribute.into(),
        }
    }

    /// True when the error means "nothing stored under that attribute".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::AttributeNotFound { .. })
    }
}
