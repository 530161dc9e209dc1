#![deny(
    unsafe_code,
    unused_must_use,
    unreachable_pub,
    rust_2018_idioms,
    missing_docs,
    clippy::pedantic
)]

//! # Message Definition Code Generator
//!
//! Parses `.msg` message-definition files and generates equivalent Rust
//! types: one struct per message, associated constants, and enums grouped
//! from integer constants.
//!
//! ## Features
//!
//! - **Message parsing**: primitive types, bounded strings, fixed/bounded/unbounded arrays,
//!   constants, default values and comments
//! - **Enum grouping**: explicit `@enum` blocks and runs of constants sharing a prefix
//! - **Code generation**: bindgen-style [`generator::Generator`] writing one module per message
//! - **Error handling**: every failure names the file and line it comes from
//! - **Serde support**: Optional serialization of the parsed model with the `serde` feature
//!
//! ## Quick Start
//!
//! ```rust
//! use rosmsg_codegen::parse_message_string;
//!
//! let msg_content = r#"
//! ## Current robot state
//! uint8 MODE_IDLE=0
//! uint8 MODE_ACTIVE=1
//! string name
//! float64 battery
//! "#;
//! let msg = parse_message_string("test_msgs", "RobotState", msg_content)?;
//! assert_eq!(msg.comment(), "Current robot state");
//! assert_eq!(msg.enums()[0].name, "Mode");
//! println!("Parsed message: {msg}");
//! # Ok::<(), rosmsg_codegen::ParseError>(())
//! ```
//!
//! ## Modules
//!
//! - [`msg`]: `.msg` parser and message model
//! - [`generator`]: Code generator for converting message definitions to Rust types

/// `.msg` parser
///
/// Line classification, type resolution and the message model.
pub mod msg;

/// Code generator for message definitions
///
/// This module provides a bindgen-style API for generating Rust code from
/// a package of `.msg` files.
pub mod generator;

// Re-export commonly used types and functions from the msg module
pub use msg::{
    ArrayKind, BaseType, EnumDefinition, EnumValue, Field, MessageBuilder, MessageDefinition,
    PRIMITIVE_TYPES, ParseError, ParseResult, PrimitiveType, PrimitiveValue, Type, Value,
    is_valid_constant_name, is_valid_field_name, is_valid_message_name, is_valid_package_name,
    parse_message_file, parse_message_string, parse_primitive_value_string,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_parse_and_generate() {
        let msg_content = r"
        # A test message
        int32 x  # X coordinate
        int32 y  # Y coordinate
        string name
        ";
        let msg = parse_message_string("geometry_msgs", "Point", msg_content).unwrap();
        assert_eq!(msg.fields().len(), 3);
        assert_eq!(msg.comment(), "A test message");

        let index = generator::PackageIndex::from_messages("geometry_msgs", [&msg]);
        let code = generator::CodeGenerator::new(generator::GeneratorConfig::new())
            .generate_message(&msg, &index)
            .unwrap();
        assert!(code.code.contains("/// X coordinate"));
        assert!(code.code.contains("pub name: ::std::string::String,"));
    }
}
