/// Core types for `.msg` message definitions
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use heck::ToUpperCamelCase;

use super::errors::{ParseError, ParseResult, invalid_resource_name, unresolvable_type};
use crate::msg::validation::{
    ARRAY_UPPER_BOUND_TOKEN, PACKAGE_NAME_MESSAGE_TYPE_SEPARATOR, PrimitiveValue,
    STRING_UPPER_BOUND_TOKEN, is_valid_constant_name, is_valid_field_name, is_valid_message_name,
    is_valid_package_name, parse_primitive_value_string,
};

/// Built-in primitive types of the `.msg` format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(missing_docs)]
pub enum PrimitiveType {
    Bool,
    Byte,
    Char,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    String,
    WString,
}

impl PrimitiveType {
    /// Look up a primitive by its `.msg` spelling
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let primitive = match name {
            "bool" => Self::Bool,
            "byte" => Self::Byte,
            "char" => Self::Char,
            "int8" => Self::Int8,
            "uint8" => Self::UInt8,
            "int16" => Self::Int16,
            "uint16" => Self::UInt16,
            "int32" => Self::Int32,
            "uint32" => Self::UInt32,
            "int64" => Self::Int64,
            "uint64" => Self::UInt64,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "string" => Self::String,
            "wstring" => Self::WString,
            _ => return None,
        };
        Some(primitive)
    }

    /// The `.msg` spelling of this primitive
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
            Self::WString => "wstring",
        }
    }

    /// Width in bits, `None` for strings
    #[must_use]
    pub fn bit_width(self) -> Option<u32> {
        match self {
            Self::Bool | Self::Byte | Self::Char | Self::Int8 | Self::UInt8 => Some(8),
            Self::Int16 | Self::UInt16 => Some(16),
            Self::Int32 | Self::UInt32 | Self::Float32 => Some(32),
            Self::Int64 | Self::UInt64 | Self::Float64 => Some(64),
            Self::String | Self::WString => None,
        }
    }

    /// Whether values of this type carry a sign
    #[must_use]
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 | Self::Float32 | Self::Float64
        )
    }

    /// Integer kinds, including `byte` and `char`
    #[must_use]
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Byte
                | Self::Char
                | Self::Int8
                | Self::UInt8
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
        )
    }

    /// `float32` or `float64`
    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// `string` or `wstring`
    #[must_use]
    pub fn is_string(self) -> bool {
        matches!(self, Self::String | Self::WString)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Base type information (without array specifiers)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BaseType {
    /// A built-in type
    Primitive {
        /// Which primitive
        primitive: PrimitiveType,
        /// Upper bound for `string<=N` / `wstring<=N`
        string_upper_bound: Option<u32>,
    },
    /// A reference to another message, resolved at generation time
    Message {
        /// Package of the referenced message, `None` for the current package
        pkg_name: Option<String>,
        /// Name of the referenced message
        type_name: String,
    },
}

impl BaseType {
    /// Resolve a type token without array specifiers
    ///
    /// A `pkg/Name` token naming `context_package_name` is normalized to a
    /// same-package reference.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TypeResolution`] if the token is neither a
    /// primitive nor a valid message name, or if a string bound is malformed.
    pub fn new(type_string: &str, context_package_name: Option<&str>) -> ParseResult<Self> {
        if let Some(primitive) = PrimitiveType::from_name(type_string) {
            return Ok(BaseType::Primitive {
                primitive,
                string_upper_bound: None,
            });
        }

        if let Some((base, bound)) = type_string.split_once(STRING_UPPER_BOUND_TOKEN) {
            return Self::parse_bounded_string(type_string, base, bound);
        }

        let separated = type_string.split_once(PACKAGE_NAME_MESSAGE_TYPE_SEPARATOR);
        let (pkg_name, type_name) = match separated {
            None => (None, type_string),
            Some((pkg, name)) => {
                if !is_valid_package_name(pkg) {
                    return Err(unresolvable_type(type_string, "invalid package name"));
                }
                let pkg = (context_package_name != Some(pkg)).then(|| pkg.to_string());
                (pkg, name)
            }
        };

        if !is_valid_message_name(type_name) {
            return Err(unresolvable_type(
                type_string,
                "not a primitive type or a valid message name",
            ));
        }

        Ok(BaseType::Message {
            pkg_name,
            type_name: type_name.to_string(),
        })
    }

    fn parse_bounded_string(type_string: &str, base: &str, bound: &str) -> ParseResult<Self> {
        let primitive = match PrimitiveType::from_name(base) {
            Some(p) if p.is_string() => p,
            _ => {
                return Err(unresolvable_type(
                    type_string,
                    "only string and wstring may have an upper bound",
                ));
            }
        };

        let upper_bound = bound.parse::<u32>().map_err(|_| {
            unresolvable_type(
                type_string,
                "string upper bound must be a valid positive integer",
            )
        })?;

        if upper_bound == 0 {
            return Err(unresolvable_type(
                type_string,
                "string upper bound must be > 0",
            ));
        }

        Ok(BaseType::Primitive {
            primitive,
            string_upper_bound: Some(upper_bound),
        })
    }

    /// The primitive kind, if this is a built-in type
    #[must_use]
    pub fn primitive(&self) -> Option<PrimitiveType> {
        match self {
            BaseType::Primitive { primitive, .. } => Some(*primitive),
            BaseType::Message { .. } => None,
        }
    }

    /// Check if this is a primitive type
    #[must_use]
    pub fn is_primitive_type(&self) -> bool {
        matches!(self, BaseType::Primitive { .. })
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseType::Primitive {
                primitive,
                string_upper_bound,
            } => {
                write!(f, "{primitive}")?;
                if let Some(bound) = string_upper_bound {
                    write!(f, "{STRING_UPPER_BOUND_TOKEN}{bound}")?;
                }
                Ok(())
            }
            BaseType::Message {
                pkg_name: Some(pkg),
                type_name,
            } => write!(f, "{pkg}{PACKAGE_NAME_MESSAGE_TYPE_SEPARATOR}{type_name}"),
            BaseType::Message {
                pkg_name: None,
                type_name,
            } => write!(f, "{type_name}"),
        }
    }
}

/// Array shape of a field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ArrayKind {
    /// `T[]`
    Unbounded,
    /// `T[N]`, exactly N elements
    Fixed(u32),
    /// `T[<=N]`, at most N elements
    Bounded(u32),
}

/// Type information including array specifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Type {
    /// Base type information
    pub base_type: BaseType,
    /// Array shape, `None` for scalars
    pub array: Option<ArrayKind>,
}

impl Type {
    /// Resolve a type token such as `int32`, `string<=8[<=4]` or `geometry_msgs/Point[]`
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TypeResolution`] if:
    /// - The bracket syntax is malformed or nested (arrays of arrays)
    /// - The array size is not numeric, or a bound is zero
    /// - The base type is neither a primitive nor a valid message name
    pub fn new(type_string: &str, context_package_name: Option<&str>) -> ParseResult<Self> {
        let Some(bracket_start) = type_string.find('[') else {
            if type_string.contains(']') {
                return Err(unresolvable_type(type_string, "unbalanced ']'"));
            }
            return Ok(Type {
                base_type: BaseType::new(type_string, context_package_name)?,
                array: None,
            });
        };

        let base_type_string = &type_string[..bracket_start];
        let Some(array_spec) = type_string[bracket_start + 1..].strip_suffix(']') else {
            return Err(unresolvable_type(
                type_string,
                "array specifier must end with ']'",
            ));
        };

        if array_spec.contains('[') || array_spec.contains(']') {
            return Err(unresolvable_type(
                type_string,
                "arrays of arrays are not supported",
            ));
        }

        let array = if array_spec.is_empty() {
            ArrayKind::Unbounded
        } else if let Some(size_str) = array_spec.strip_prefix(ARRAY_UPPER_BOUND_TOKEN) {
            let size = parse_array_size(type_string, size_str)?;
            if size == 0 {
                return Err(unresolvable_type(type_string, "array bound must be > 0"));
            }
            ArrayKind::Bounded(size)
        } else {
            ArrayKind::Fixed(parse_array_size(type_string, array_spec)?)
        };

        Ok(Type {
            base_type: BaseType::new(base_type_string, context_package_name)?,
            array: Some(array),
        })
    }

    /// A scalar primitive type
    #[must_use]
    pub fn primitive(primitive: PrimitiveType) -> Self {
        Type {
            base_type: BaseType::Primitive {
                primitive,
                string_upper_bound: None,
            },
            array: None,
        }
    }

    /// Check if this is a primitive type (or an array of one)
    #[must_use]
    pub fn is_primitive_type(&self) -> bool {
        self.base_type.is_primitive_type()
    }

    /// Check if this is an array of any shape
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.array.is_some()
    }

    /// Check if this is a dynamic array (array without fixed size)
    #[must_use]
    pub fn is_dynamic_array(&self) -> bool {
        matches!(
            self.array,
            Some(ArrayKind::Unbounded | ArrayKind::Bounded(_))
        )
    }

    /// Check if this is a bounded array (array with upper bound)
    #[must_use]
    pub fn is_bounded_array(&self) -> bool {
        matches!(self.array, Some(ArrayKind::Bounded(_)))
    }
}

fn parse_array_size(type_string: &str, size_str: &str) -> ParseResult<u32> {
    size_str.parse::<u32>().map_err(|_| {
        unresolvable_type(
            type_string,
            "array size must be a valid non-negative integer",
        )
    })
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_type)?;
        match self.array {
            None => Ok(()),
            Some(ArrayKind::Unbounded) => write!(f, "[]"),
            Some(ArrayKind::Fixed(size)) => write!(f, "[{size}]"),
            Some(ArrayKind::Bounded(size)) => write!(f, "[{ARRAY_UPPER_BOUND_TOKEN}{size}]"),
        }
    }
}

/// Value that can be assigned to fields or constants
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// Single primitive value
    Primitive(PrimitiveValue),
    /// Array of primitive values
    Array(Vec<PrimitiveValue>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Primitive(v) => write!(f, "{v}"),
            Value::Array(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Field definition: an instance member, or a constant when `value` is set
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Field {
    /// Name of the field
    pub name: String,
    /// Type of the field
    pub field_type: Type,
    /// Constant value; present only for constants
    pub value: Option<PrimitiveValue>,
    /// Default value of an instance member (if any)
    pub default_value: Option<Value>,
    /// Trailing comment of the declaration
    pub comment: Option<String>,
    /// 1-based source line of the declaration, 0 when built programmatically
    pub line: usize,
}

impl Field {
    /// Create a new instance member
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The field name doesn't follow valid naming conventions
    /// - The default value string cannot be parsed for the field's type
    pub fn new(
        field_type: Type,
        name: &str,
        default_value_string: Option<&str>,
    ) -> ParseResult<Self> {
        if !is_valid_field_name(name) {
            return Err(invalid_resource_name(name, "^[a-z][a-z0-9_]*$"));
        }

        let default_value = default_value_string
            .map(|value_str| parse_value_string(&field_type, value_str))
            .transpose()?;

        Ok(Field {
            name: name.to_string(),
            field_type,
            value: None,
            default_value,
            comment: None,
            line: 0,
        })
    }

    /// Create a new constant
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The type is an array or not a primitive
    /// - The constant name doesn't follow valid naming conventions
    /// - The value string cannot be parsed for the given primitive type
    pub fn constant(field_type: Type, name: &str, value_string: &str) -> ParseResult<Self> {
        let primitive = match (&field_type.base_type, field_type.array) {
            (BaseType::Primitive { primitive, .. }, None) => *primitive,
            _ => {
                return Err(ParseError::InvalidConstant {
                    reason: format!("constant '{name}' must have a non-array primitive type"),
                });
            }
        };

        if !is_valid_constant_name(name) {
            return Err(invalid_resource_name(name, "^[A-Z][A-Z0-9_]*$"));
        }

        let value = parse_primitive_value_string(primitive, value_string)?;

        Ok(Field {
            name: name.to_string(),
            field_type,
            value: Some(value),
            default_value: None,
            comment: None,
            line: 0,
        })
    }

    /// Attach a trailing comment
    #[must_use]
    pub fn with_comment(mut self, comment: Option<&str>) -> Self {
        self.comment = comment.map(str::to_string);
        self
    }

    /// Record the source line
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Whether this field is a constant
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.value.is_some()
    }

    /// The value of an integer constant
    #[must_use]
    pub fn integer_value(&self) -> Option<i128> {
        self.value.as_ref().and_then(PrimitiveValue::as_integer)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field_type, self.name)?;
        if let Some(ref value) = self.value {
            write!(f, "={value}")?;
        } else if let Some(ref value) = self.default_value {
            write!(f, " {value}")?;
        }
        Ok(())
    }
}

/// One member of an [`EnumDefinition`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnumValue {
    /// Constant name as declared
    pub name: String,
    /// Integer value
    pub value: i128,
    /// Trailing comment of the declaration
    pub comment: Option<String>,
}

/// A named, ordered group of integer constants rendered as one enum
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnumDefinition {
    /// Enum type name
    pub name: String,
    /// Integer type shared by every value
    pub repr: PrimitiveType,
    /// Values in declaration order
    pub values: Vec<EnumValue>,
    /// Documentation for the enum
    pub comment: Option<String>,
    /// Declared with `@enum` rather than inferred from a constant run
    pub explicit: bool,
}

impl EnumDefinition {
    /// Group integer constants into an enum
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidEnum`] if the name is not a valid type
    /// name, there are no values, a value is not an integer constant, or the
    /// constants do not share one type.
    pub fn from_constants(
        name: &str,
        constants: &[Field],
        comment: Option<String>,
        explicit: bool,
    ) -> ParseResult<Self> {
        if !is_valid_message_name(name) {
            return Err(ParseError::InvalidEnum {
                reason: format!("'{name}' is not a valid type name"),
            });
        }

        let Some(first) = constants.first() else {
            return Err(ParseError::InvalidEnum {
                reason: format!("enum '{name}' has no values"),
            });
        };

        let repr = match first.field_type.base_type.primitive() {
            Some(p) if p.is_integer() => p,
            _ => {
                return Err(ParseError::InvalidEnum {
                    reason: format!(
                        "enum '{name}' must use an integer type, not '{}'",
                        first.field_type
                    ),
                });
            }
        };

        let mut values = Vec::with_capacity(constants.len());
        for constant in constants {
            if constant.field_type.base_type.primitive() != Some(repr) {
                return Err(ParseError::InvalidEnum {
                    reason: format!(
                        "enum '{name}' mixes types: '{}' is {}, expected {repr}",
                        constant.name, constant.field_type
                    ),
                });
            }
            let value = constant
                .integer_value()
                .ok_or_else(|| ParseError::InvalidEnum {
                    reason: format!("'{}' is not an integer constant", constant.name),
                })?;
            values.push(EnumValue {
                name: constant.name.clone(),
                value,
                comment: constant.comment.clone(),
            });
        }

        Ok(EnumDefinition {
            name: name.to_string(),
            repr,
            values,
            comment,
            explicit,
        })
    }

    /// Variant names in `UpperCamelCase`, one per value
    ///
    /// Leading `_`-separated segments shared by every value name are dropped.
    /// At least one segment is kept, and every remainder must start with a
    /// letter.
    #[must_use]
    pub fn variant_names(&self) -> Vec<String> {
        let segments: Vec<Vec<&str>> = self
            .values
            .iter()
            .map(|v| v.name.split('_').collect())
            .collect();

        let max_strip = segments.iter().map(|s| s.len() - 1).min().unwrap_or(0);
        let mut common = 0;
        while common < max_strip && segments.iter().all(|s| s[common] == segments[0][common]) {
            common += 1;
        }
        while common > 0
            && !segments.iter().all(|s| {
                s[common]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic())
            })
        {
            common -= 1;
        }

        segments
            .iter()
            .map(|s| s[common..].join("_").to_upper_camel_case())
            .collect()
    }

    /// First value repeating an earlier discriminant or variant name
    ///
    /// Returns the position of the offending value and the reason.
    pub(crate) fn find_conflict(&self) -> Option<(usize, String)> {
        let variants = self.variant_names();
        for (i, value) in self.values.iter().enumerate() {
            let earlier = &self.values[..i];
            if let Some(prev) = earlier.iter().find(|v| v.value == value.value) {
                return Some((
                    i,
                    format!(
                        "'{}' repeats the value {} of '{}' in enum '{}'",
                        value.name, value.value, prev.name, self.name
                    ),
                ));
            }
            if let Some(j) = variants[..i].iter().position(|v| *v == variants[i]) {
                return Some((
                    i,
                    format!(
                        "'{}' and '{}' both map to variant '{}' in enum '{}'",
                        self.values[j].name, value.name, variants[i], self.name
                    ),
                ));
            }
        }
        None
    }
}

/// Parse value string for a given type
fn parse_value_string(type_: &Type, value_string: &str) -> ParseResult<Value> {
    let Some(primitive) = type_.base_type.primitive() else {
        return Err(ParseError::InvalidValue {
            value: value_string.to_string(),
            type_info: type_.to_string(),
            reason: "only primitive types and primitive arrays can have default values"
                .to_string(),
        });
    };

    let Some(array) = type_.array else {
        let value = parse_primitive_value_string(primitive, value_string)?;
        return Ok(Value::Primitive(value));
    };

    let trimmed = value_string.trim();
    let Some(elements_string) = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    else {
        return Err(ParseError::InvalidValue {
            value: value_string.to_string(),
            type_info: type_.to_string(),
            reason: "array value must start with '[' and end with ']'".to_string(),
        });
    };

    let value_strings: Vec<&str> = if elements_string.trim().is_empty() {
        Vec::new()
    } else {
        elements_string.split(',').collect()
    };

    let count = value_strings.len();
    let size_error = match array {
        ArrayKind::Fixed(size) if count != size as usize => {
            Some(format!("array must have exactly {size} elements, not {count}"))
        }
        ArrayKind::Bounded(size) if count > size as usize => Some(format!(
            "array must have not more than {size} elements, not {count}"
        )),
        _ => None,
    };
    if let Some(reason) = size_error {
        return Err(ParseError::InvalidValue {
            value: value_string.to_string(),
            type_info: type_.to_string(),
            reason,
        });
    }

    let values = value_strings
        .into_iter()
        .map(|element_str| parse_primitive_value_string(primitive, element_str.trim()))
        .collect::<ParseResult<Vec<_>>>()?;

    Ok(Value::Array(values))
}
