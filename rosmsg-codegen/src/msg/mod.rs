//! `.msg` message-definition parser
//!
//! This module turns the line-oriented `.msg` format into [`MessageDefinition`]s:
//! typed fields, constants, comments and the enumerations grouped from
//! integer constants.

/// Error types and handling
pub mod errors;
/// Line classification
pub mod lexer;
/// Message definition parsing
pub mod message;
/// Core data structures
pub mod types;
/// Validation utilities
pub mod validation;

// Re-export commonly used types and functions
pub use errors::{ParseError, ParseResult};
pub use lexer::{LineKind, Lines, SourceLine, classify_lines, leading_comment};
pub use message::{MessageBuilder, MessageDefinition, parse_message_file, parse_message_string};
pub use types::{ArrayKind, BaseType, EnumDefinition, EnumValue, Field, PrimitiveType, Type, Value};
pub use validation::{
    PRIMITIVE_TYPES, PrimitiveValue, is_valid_constant_name, is_valid_field_name,
    is_valid_message_name, is_valid_package_name, parse_primitive_value_string,
};
