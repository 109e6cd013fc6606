//! Error types for logix-core

use std::fmt;

use thiserror::Error;

/// Result type alias for logix-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in logix-core
///
/// Every evaluation error carries the key path (`servers[2].tags`, `$` for
/// the root) of the node being evaluated when the fault was found.
#[derive(Error, Debug)]
pub enum Error {
    /// A mapping mixes an operator key with other keys
    #[error("at {path}: key '{operator}' must be the only key; found {} keys: {}", .keys.len(), .keys.join(","))]
    MultipleOperatorKeys {
        /// Key path of the offending mapping
        path: String,
        /// The operator key that was found
        operator: String,
        /// All keys of the mapping, in document order
        keys: Vec<String>,
    },

    /// `elif` or `else` with no open `if` chain
    #[error("at {path}: found '{keyword}' before 'if'")]
    OrphanConditional {
        /// Key path of the conditional element
        path: String,
        /// `elif` or `else`
        keyword: String,
    },

    /// `if`/`elif` value is not a boolean followed by at least one value
    #[error("at {path}: '{keyword}' expects a list of a boolean followed by value(s); found {found}")]
    MalformedConditional {
        /// Key path of the conditional element
        path: String,
        /// `if` or `elif`
        keyword: String,
        /// The evaluated value that was found
        found: String,
    },

    /// `and`/`or`/`xor` found a leaf that is not a boolean
    #[error("at {path}: values for '{operator}' must be boolean; found {found}")]
    NonBooleanOperand {
        /// Key path of the offending operand
        path: String,
        /// `and`, `or` or `xor`
        operator: String,
        /// The operand that was found
        found: String,
    },

    /// Values handed to a deep merge do not share one shape
    #[error("while handling '{context}': all values to merge must be {expected}; found {found}")]
    MergeTypeMismatch {
        /// Key (or key path) the merge was performed for
        context: String,
        /// Shape every value was expected to have
        expected: String,
        /// Shape of the value that broke the expectation
        found: String,
    },

    /// A value has a shape the node model cannot represent
    #[error("at {path}: unsupported value: {found}")]
    UnsupportedType {
        /// Key path of the value
        path: String,
        /// Description of the value
        found: String,
    },

    /// Nesting exceeded the configured depth limit
    #[error("at {path}: nesting deeper than {max_depth} levels")]
    NestingTooDeep {
        /// Key path where the limit was hit
        path: String,
        /// The configured limit
        max_depth: usize,
    },

    /// Configuration file could not be found
    #[error("configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched
        path: String,
    },

    /// Invalid configuration value
    #[error("invalid configuration: {message}")]
    ConfigInvalid {
        /// Description of what's invalid
        message: String,
    },

    /// Failed to parse a YAML document
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Discriminant of [`Error`], for callers that branch on the kind of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::MultipleOperatorKeys`]
    MultipleOperatorKeys,
    /// See [`Error::OrphanConditional`]
    OrphanConditional,
    /// See [`Error::MalformedConditional`]
    MalformedConditional,
    /// See [`Error::NonBooleanOperand`]
    NonBooleanOperand,
    /// See [`Error::MergeTypeMismatch`]
    MergeTypeMismatch,
    /// See [`Error::UnsupportedType`]
    UnsupportedType,
    /// See [`Error::NestingTooDeep`]
    NestingTooDeep,
    /// Configuration could not be found or is invalid
    Config,
    /// Input could not be read or parsed
    Input,
}

impl ErrorKind {
    /// Stable kebab-case name of the kind
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MultipleOperatorKeys => "multiple-operator-keys",
            ErrorKind::OrphanConditional => "orphan-conditional",
            ErrorKind::MalformedConditional => "malformed-conditional",
            ErrorKind::NonBooleanOperand => "non-boolean-operand",
            ErrorKind::MergeTypeMismatch => "merge-type-mismatch",
            ErrorKind::UnsupportedType => "unsupported-type",
            ErrorKind::NestingTooDeep => "nesting-too-deep",
            ErrorKind::Config => "config",
            ErrorKind::Input => "input",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// The kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MultipleOperatorKeys { .. } => ErrorKind::MultipleOperatorKeys,
            Error::OrphanConditional { .. } => ErrorKind::OrphanConditional,
            Error::MalformedConditional { .. } => ErrorKind::MalformedConditional,
            Error::NonBooleanOperand { .. } => ErrorKind::NonBooleanOperand,
            Error::MergeTypeMismatch { .. } => ErrorKind::MergeTypeMismatch,
            Error::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            Error::NestingTooDeep { .. } => ErrorKind::NestingTooDeep,
            Error::ConfigNotFound { .. } | Error::ConfigInvalid { .. } => ErrorKind::Config,
            Error::Parse(_) | Error::Json(_) | Error::Io(_) => ErrorKind::Input,
        }
    }
}
