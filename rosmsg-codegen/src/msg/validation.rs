use super::errors::{ParseResult, invalid_value};
use super::types::PrimitiveType;
/// Validation utilities for `.msg` parsing
use regex::Regex;
use std::sync::LazyLock;

// Tokens of the `.msg` line grammar
#[allow(missing_docs)]
pub const PACKAGE_NAME_MESSAGE_TYPE_SEPARATOR: &str = "/";
#[allow(missing_docs)]
pub const ANNOTATION_DELIMITER: &str = "@";
#[allow(missing_docs)]
pub const ENUM_ANNOTATION: &str = "@enum";
#[allow(missing_docs)]
pub const COMMENT_DELIMITER: &str = "#";
#[allow(missing_docs)]
pub const CONSTANT_SEPARATOR: char = '=';
#[allow(missing_docs)]
pub const ARRAY_UPPER_BOUND_TOKEN: &str = "<=";
#[allow(missing_docs)]
pub const STRING_UPPER_BOUND_TOKEN: &str = "<=";
#[allow(missing_docs)]
pub const MESSAGE_FILE_EXTENSION: &str = "msg";

/// Names of the primitive types understood by the type resolver
pub const PRIMITIVE_TYPES: &[&str] = &[
    "bool", "byte", "char", "float32", "float64", "int8", "uint8", "int16", "uint16", "int32",
    "uint32", "int64", "uint64", "string", "wstring",
];

static VALID_PACKAGE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]([a-z0-9_])*$").unwrap());

static VALID_MESSAGE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]([A-Za-z0-9_])*$").unwrap());

static VALID_FIELD_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]([a-z0-9_])*$").unwrap());

static VALID_CONSTANT_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]([A-Z0-9_])*$").unwrap());

/// Validate a package name
pub fn is_valid_package_name(name: &str) -> bool {
    VALID_PACKAGE_NAME_PATTERN.is_match(name)
}

/// Validate a message name
pub fn is_valid_message_name(name: &str) -> bool {
    VALID_MESSAGE_NAME_PATTERN.is_match(name)
}

/// Validate a field name
pub fn is_valid_field_name(name: &str) -> bool {
    VALID_FIELD_NAME_PATTERN.is_match(name)
}

/// Validate a constant name
pub fn is_valid_constant_name(name: &str) -> bool {
    VALID_CONSTANT_NAME_PATTERN.is_match(name)
}

/// Parse a literal for the given primitive type
///
/// Only the literal syntax is checked. Integer values are kept as `i128`
/// without checking that they fit the declared width.
///
/// # Errors
///
/// Returns an error if the value string is not a literal of the primitive's kind.
pub fn parse_primitive_value_string(
    primitive: PrimitiveType,
    value_string: &str,
) -> ParseResult<PrimitiveValue> {
    let value_string = value_string.trim();
    match primitive {
        PrimitiveType::Bool => {
            let lower_value = value_string.to_lowercase();
            match lower_value.as_str() {
                "true" | "1" => Ok(PrimitiveValue::Bool(true)),
                "false" | "0" => Ok(PrimitiveValue::Bool(false)),
                _ => Err(invalid_value(
                    value_string,
                    primitive.name(),
                    "must be either 'true' / '1' or 'false' / '0'",
                )),
            }
        }
        PrimitiveType::Float32 | PrimitiveType::Float64 => value_string
            .parse::<f64>()
            .map(PrimitiveValue::Float)
            .map_err(|_| invalid_value(value_string, primitive.name(), "must be a valid float")),
        PrimitiveType::String | PrimitiveType::WString => {
            Ok(PrimitiveValue::String(parse_string_literal(value_string)))
        }
        _ => parse_integer_literal(value_string)
            .map(PrimitiveValue::Integer)
            .ok_or_else(|| {
                invalid_value(value_string, primitive.name(), "must be a valid integer")
            }),
    }
}

/// Parse an integer literal (decimal, `0x` hex, `0b` binary or leading-zero octal)
#[must_use]
pub fn parse_integer_literal(value_string: &str) -> Option<i128> {
    let (negative, digits) = match value_string.as_bytes().first() {
        Some(b'-') => (true, &value_string[1..]),
        Some(b'+') => (false, &value_string[1..]),
        _ => (false, value_string),
    };

    let magnitude = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i128::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        i128::from_str_radix(bin, 2).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i128::from_str_radix(&digits[1..], 8).ok()?
    } else if digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse::<i128>().ok()?
    } else {
        return None;
    };

    Some(if negative { -magnitude } else { magnitude })
}

/// Parse string literal, handling escape sequences
///
/// Quoted strings (single or double quotes) have their quotes removed and
/// escapes processed; anything else is taken verbatim.
#[must_use]
pub fn parse_string_literal(value_string: &str) -> String {
    let trimmed = value_string.trim();

    let quote_char = match trimmed.chars().next() {
        Some(c @ ('"' | '\'')) if trimmed.len() >= 2 && trimmed.ends_with(c) => c,
        _ => return trimmed.to_string(),
    };
    let content = &trimmed[1..trimmed.len() - 1];

    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.peek().copied() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('\\') => result.push('\\'),
            Some(c) if c == quote_char => result.push(c),
            _ => {
                result.push(ch);
                continue;
            }
        }
        chars.next();
    }

    result
}

/// Literal values of constants and defaults
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum PrimitiveValue {
    Bool(bool),
    Integer(i128),
    Float(f64),
    String(String),
}

impl PrimitiveValue {
    /// Integer payload, if this is an integer literal
    #[must_use]
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            PrimitiveValue::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveValue::Bool(v) => write!(f, "{v}"),
            PrimitiveValue::Integer(v) => write!(f, "{v}"),
            PrimitiveValue::Float(v) => write!(f, "{v}"),
            PrimitiveValue::String(v) => write!(f, "\"{v}\""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_name_validation() {
        assert!(is_valid_package_name("test_package"));
        assert!(is_valid_package_name("geometry_msgs"));
        assert!(!is_valid_package_name("TestPackage"));
        assert!(!is_valid_package_name("test-package"));
        assert!(!is_valid_package_name("id.jrosmessages"));
    }

    #[test]
    fn test_message_name_validation() {
        assert!(is_valid_message_name("TestMessage"));
        assert!(is_valid_message_name("Pose"));
        assert!(!is_valid_message_name("testMessage"));
        assert!(!is_valid_message_name("Point3-D"));
    }

    #[test]
    fn test_field_name_validation() {
        assert!(is_valid_field_name("my_field"));
        assert!(is_valid_field_name("x"));
        assert!(!is_valid_field_name("MyField"));
        assert!(!is_valid_field_name("my-field"));
        assert!(!is_valid_field_name(""));
    }

    #[test]
    fn test_constant_name_validation() {
        assert!(is_valid_constant_name("MY_CONSTANT"));
        assert!(is_valid_constant_name("PI"));
        assert!(!is_valid_constant_name("my_constant"));
        assert!(!is_valid_constant_name("MyConstant"));
        assert!(!is_valid_constant_name(""));
    }

    #[test]
    fn test_primitive_value_parsing() {
        assert_eq!(
            parse_primitive_value_string(PrimitiveType::Bool, "true").unwrap(),
            PrimitiveValue::Bool(true)
        );
        assert_eq!(
            parse_primitive_value_string(PrimitiveType::Bool, "0").unwrap(),
            PrimitiveValue::Bool(false)
        );
        assert_eq!(
            parse_primitive_value_string(PrimitiveType::Int32, "42").unwrap(),
            PrimitiveValue::Integer(42)
        );
        assert_eq!(
            parse_primitive_value_string(PrimitiveType::Float64, "2.5e-3").unwrap(),
            PrimitiveValue::Float(0.0025)
        );
        assert_eq!(
            parse_primitive_value_string(PrimitiveType::String, "\"hello\"").unwrap(),
            PrimitiveValue::String("hello".to_string())
        );
    }

    #[test]
    fn test_integer_literal_bases() {
        assert_eq!(parse_integer_literal("0xFF"), Some(255));
        assert_eq!(parse_integer_literal("0b101"), Some(5));
        assert_eq!(parse_integer_literal("010"), Some(8));
        assert_eq!(parse_integer_literal("-12"), Some(-12));
        assert_eq!(parse_integer_literal("+7"), Some(7));
        assert_eq!(parse_integer_literal("0"), Some(0));
        assert_eq!(parse_integer_literal("1.5"), None);
        assert_eq!(parse_integer_literal("abc"), None);
        assert_eq!(parse_integer_literal(""), None);
    }

    #[test]
    fn test_no_range_checks_on_integers() {
        assert_eq!(
            parse_primitive_value_string(PrimitiveType::UInt8, "300").unwrap(),
            PrimitiveValue::Integer(300)
        );
        assert_eq!(
            parse_primitive_value_string(PrimitiveType::UInt16, "-1").unwrap(),
            PrimitiveValue::Integer(-1)
        );
    }

    #[test]
    fn test_parse_invalid_values() {
        assert!(parse_primitive_value_string(PrimitiveType::Bool, "maybe").is_err());
        assert!(parse_primitive_value_string(PrimitiveType::Int32, "abc").is_err());
        assert!(parse_primitive_value_string(PrimitiveType::Float32, "fast").is_err());
    }

    #[test]
    fn test_parse_string_escape_sequences() {
        assert_eq!(parse_string_literal("\"hello\\nworld\""), "hello\nworld");
        assert_eq!(parse_string_literal("\"tab\\there\""), "tab\there");
        assert_eq!(parse_string_literal("\"quote\\\"test\""), "quote\"test");
        assert_eq!(parse_string_literal("'single'"), "single");
        assert_eq!(parse_string_literal("bare words"), "bare words");
        assert_eq!(parse_string_literal("\""), "\"");
    }

    #[test]
    fn test_primitive_value_display() {
        assert_eq!(PrimitiveValue::Bool(true).to_string(), "true");
        assert_eq!(PrimitiveValue::Integer(42).to_string(), "42");
        assert_eq!(PrimitiveValue::Float(1.5).to_string(), "1.5");
        assert_eq!(
            PrimitiveValue::String("test".to_string()).to_string(),
            "\"test\""
        );
    }

    #[test]
    fn test_primitive_types_constant() {
        assert!(PRIMITIVE_TYPES.contains(&"bool"));
        assert!(PRIMITIVE_TYPES.contains(&"float64"));
        assert!(!PRIMITIVE_TYPES.contains(&"CustomType"));
        for name in PRIMITIVE_TYPES {
            assert!(PrimitiveType::from_name(name).is_some(), "{name}");
        }
    }
}
