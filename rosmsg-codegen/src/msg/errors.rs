/// Error types for `.msg` parsing
use thiserror::Error;

/// Main error type for `.msg` parsing
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum ParseError {
    #[error("Invalid resource name: {name} - {reason}")]
    InvalidResourceName { name: String, reason: String },

    #[error("Cannot resolve type '{type_string}': {reason}")]
    TypeResolution { type_string: String, reason: String },

    #[error("Invalid value: {value} for type {type_info} - {reason}")]
    InvalidValue {
        value: String,
        type_info: String,
        reason: String,
    },

    #[error("Parse error at line {line} ('{text}'): {source}")]
    LineParseError {
        line: usize,
        text: String,
        #[source]
        source: Box<ParseError>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid constant definition: {reason}")]
    InvalidConstant { reason: String },

    #[error("Invalid field definition: {reason}")]
    InvalidField { reason: String },

    #[error("Invalid enum definition: {reason}")]
    InvalidEnum { reason: String },
}

impl ParseError {
    /// Attach the offending source line to an error
    #[must_use]
    pub fn at_line(self, line: usize, text: &str) -> Self {
        match self {
            // Keep the innermost line context
            err @ ParseError::LineParseError { .. } => err,
            err => ParseError::LineParseError {
                line,
                text: text.to_string(),
                source: Box::new(err),
            },
        }
    }

    /// Line number of the offending declaration, if known
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::LineParseError { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// The underlying error with any line context removed
    #[must_use]
    pub fn root_cause(&self) -> &ParseError {
        match self {
            ParseError::LineParseError { source, .. } => source.root_cause(),
            err => err,
        }
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Helper function to create `InvalidResourceName` errors
#[must_use]
pub fn invalid_resource_name(name: &str, pattern: &str) -> ParseError {
    ParseError::InvalidResourceName {
        name: name.to_string(),
        reason: format!("should match pattern: {pattern}"),
    }
}

/// Helper function to create `InvalidValue` errors
#[must_use]
pub fn invalid_value(value: &str, type_info: &str, reason: &str) -> ParseError {
    ParseError::InvalidValue {
        value: value.to_string(),
        type_info: type_info.to_string(),
        reason: reason.to_string(),
    }
}

/// Helper function to create `TypeResolution` errors
#[must_use]
pub fn unresolvable_type(type_string: &str, reason: &str) -> ParseError {
    ParseError::TypeResolution {
        type_string: type_string.to_string(),
        reason: reason.to_string(),
    }
}
