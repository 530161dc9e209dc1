//! Type mapping from `.msg` types to Rust types

#![allow(clippy::unused_self)] // Methods use &self for API consistency

use crate::msg::{ArrayKind, BaseType, PrimitiveType, Type};

/// Rust type used for `string` and `wstring`
const STRING_TYPE: &str = "::std::string::String";

/// Maps `.msg` types to Rust types
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeMapper;

impl TypeMapper {
    /// Create a new type mapper
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Map a type to a Rust type string
    ///
    /// `message_path` is the resolved Rust path for message references and is
    /// ignored for primitives. Returns `None` for an unresolved reference.
    #[must_use]
    pub fn map_type(&self, ros_type: &Type, message_path: Option<&str>) -> Option<String> {
        let base_rust_type = match &ros_type.base_type {
            BaseType::Primitive {
                primitive,
                string_upper_bound,
            } => self.map_primitive(*primitive, *string_upper_bound),
            BaseType::Message { .. } => message_path?.to_string(),
        };
        Some(self.map_array(&base_rust_type, ros_type.array))
    }

    /// Wrap an element type in its array shape
    #[must_use]
    pub fn map_array(&self, element: &str, array: Option<ArrayKind>) -> String {
        match array {
            None => element.to_string(),
            // Unbounded sequence (dynamic array)
            Some(ArrayKind::Unbounded) => format!("Vec<{element}>"),
            // Bounded sequence (dynamic array with max size)
            Some(ArrayKind::Bounded(size)) => format!("Vec<{element}> /* max_size: {size} */"),
            Some(ArrayKind::Fixed(size)) => format!("[{element}; {size}]"),
        }
    }

    /// Map a primitive to its Rust type
    #[must_use]
    pub fn map_primitive(
        &self,
        primitive: PrimitiveType,
        string_upper_bound: Option<u32>,
    ) -> String {
        let rust_type = match primitive {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Byte | PrimitiveType::Char | PrimitiveType::UInt8 => "u8",
            PrimitiveType::Int8 => "i8",
            PrimitiveType::Int16 => "i16",
            PrimitiveType::UInt16 => "u16",
            PrimitiveType::Int32 => "i32",
            PrimitiveType::UInt32 => "u32",
            PrimitiveType::Int64 => "i64",
            PrimitiveType::UInt64 => "u64",
            PrimitiveType::Float32 => "f32",
            PrimitiveType::Float64 => "f64",
            PrimitiveType::String | PrimitiveType::WString => {
                // Use fully qualified path to avoid conflicts with generated String types
                return match string_upper_bound {
                    Some(bound) => format!("{STRING_TYPE} /* max_size: {bound} */"),
                    None => STRING_TYPE.to_string(),
                };
            }
        };
        rust_type.to_string()
    }

    /// Map the type of a constant; strings become `&str`
    #[must_use]
    pub fn map_constant_type(&self, primitive: PrimitiveType) -> String {
        if primitive.is_string() {
            "&str".to_string()
        } else {
            self.map_primitive(primitive, None)
        }
    }

    /// Integer type used as an enum representation
    #[must_use]
    pub fn map_enum_repr(&self, primitive: PrimitiveType) -> String {
        self.map_primitive(primitive, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(token: &str) -> String {
        let ros_type = Type::new(token, None).unwrap();
        TypeMapper::new().map_type(&ros_type, None).unwrap()
    }

    #[test]
    fn test_map_primitive_types() {
        assert_eq!(map("bool"), "bool");
        assert_eq!(map("byte"), "u8");
        assert_eq!(map("char"), "u8");
        assert_eq!(map("uint8"), "u8");
        assert_eq!(map("int8"), "i8");
        assert_eq!(map("int16"), "i16");
        assert_eq!(map("uint16"), "u16");
        assert_eq!(map("int32"), "i32");
        assert_eq!(map("uint32"), "u32");
        assert_eq!(map("int64"), "i64");
        assert_eq!(map("uint64"), "u64");
        assert_eq!(map("float32"), "f32");
        assert_eq!(map("float64"), "f64");
        assert_eq!(map("string"), "::std::string::String");
        assert_eq!(map("wstring"), "::std::string::String");
    }

    #[test]
    fn test_every_primitive_maps() {
        let mapper = TypeMapper::new();
        for name in crate::msg::PRIMITIVE_TYPES {
            let primitive = PrimitiveType::from_name(name).unwrap();
            assert!(!mapper.map_primitive(primitive, None).is_empty(), "{name}");
        }
    }

    #[test]
    fn test_map_array_type() {
        assert_eq!(map("int32[10]"), "[i32; 10]");
        assert_eq!(map("float64[]"), "Vec<f64>");

        let bounded = map("uint8[<=100]");
        assert!(bounded.starts_with("Vec<u8>"));
        assert!(bounded.contains("100"));
    }

    #[test]
    fn test_bounded_strings() {
        let result = map("string<=256");
        assert!(result.contains("String"));
        assert!(result.contains("256"));
    }

    #[test]
    fn test_map_message_reference() {
        let mapper = TypeMapper::new();
        let ros_type = Type::new("Point[]", None).unwrap();
        assert_eq!(
            mapper.map_type(&ros_type, Some("super::point::Point")),
            Some("Vec<super::point::Point>".to_string())
        );
        assert_eq!(mapper.map_type(&ros_type, None), None);
    }

    #[test]
    fn test_constant_types() {
        let mapper = TypeMapper::new();
        assert_eq!(mapper.map_constant_type(PrimitiveType::String), "&str");
        assert_eq!(mapper.map_constant_type(PrimitiveType::UInt8), "u8");
        assert_eq!(mapper.map_enum_repr(PrimitiveType::Int16), "i16");
    }
}
