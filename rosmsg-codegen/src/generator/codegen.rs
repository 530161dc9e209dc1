//! Code generation implementation

// Allow some clippy lints for this module
#![allow(clippy::unused_self)] // Methods use &self for API consistency

use super::{
    GeneratedCode, GeneratorError, GeneratorResult,
    config::{GeneratorConfig, module_name_for, sanitize_rust_identifier},
    token_gen::{self, ConstantDef, EnumDef, FieldDefault, StructField, VariantDef},
    types::TypeMapper,
};
use crate::msg::{
    ArrayKind, BaseType, EnumDefinition, Field, MessageDefinition, PrimitiveType, PrimitiveValue,
    Value,
};
use proc_macro2::TokenStream;
use std::collections::BTreeMap;

/// Name → module lookup for the messages of one package
///
/// Built by the batch driver after every file is parsed, so references are
/// resolved against the whole package regardless of file order.
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    package: String,
    modules: BTreeMap<String, String>,
    extern_packages: BTreeMap<String, String>,
}

impl PackageIndex {
    /// Create an empty index for `package`
    #[must_use]
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Self::default()
        }
    }

    /// Index every message of a package
    #[must_use]
    pub fn from_messages<'a>(
        package: impl Into<String>,
        messages: impl IntoIterator<Item = &'a MessageDefinition>,
    ) -> Self {
        let mut index = Self::new(package);
        for message in messages {
            index.insert(message.name());
        }
        index
    }

    /// Register a message of this package, returning its module name
    pub fn insert(&mut self, message_name: &str) -> &str {
        self.modules
            .entry(message_name.to_string())
            .or_insert_with(|| module_name_for(message_name))
    }

    /// Make references into another package resolve under `rust_path`
    #[must_use]
    pub fn with_extern_package(
        mut self,
        package: impl Into<String>,
        rust_path: impl Into<String>,
    ) -> Self {
        self.extern_packages.insert(package.into(), rust_path.into());
        self
    }

    /// The package being indexed
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Module name of a message in this package
    #[must_use]
    pub fn module_of(&self, message_name: &str) -> Option<&str> {
        self.modules.get(message_name).map(String::as_str)
    }

    /// Messages in this package with their modules, sorted by message name
    pub fn messages(&self) -> impl Iterator<Item = (&str, &str)> {
        self.modules.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Rust path of a referenced message type
    ///
    /// Same-package messages resolve to a sibling module, messages of a
    /// registered extern package to its Rust path. Returns `None` otherwise.
    #[must_use]
    pub fn resolve(&self, base_type: &BaseType) -> Option<String> {
        let BaseType::Message {
            pkg_name,
            type_name,
        } = base_type
        else {
            return None;
        };

        let type_ident = sanitize_rust_identifier(type_name);
        match pkg_name {
            Some(pkg) if *pkg != self.package => self
                .extern_packages
                .get(pkg)
                .map(|path| format!("{path}::{type_ident}")),
            _ => self
                .module_of(type_name)
                .map(|module| format!("super::{module}::{type_ident}")),
        }
    }
}

/// Code generator implementation
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    config: GeneratorConfig,
    type_mapper: TypeMapper,
}

impl CodeGenerator {
    /// Create a new code generator with the given configuration
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            type_mapper: TypeMapper::new(),
        }
    }

    /// Generate the Rust source for one message
    ///
    /// Produces, in order: the struct, a `Default` impl when `Default` is in
    /// the derive list, an impl block with the constants, and one enum per
    /// [`EnumDefinition`]. Identical input yields identical output.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::UnresolvedReference`] if a field references a
    /// message that `index` cannot resolve, or [`GeneratorError::Format`] if
    /// a derive, a resolved path or the generated tokens are not valid Rust.
    pub fn generate_message(
        &self,
        message: &MessageDefinition,
        index: &PackageIndex,
    ) -> GeneratorResult<GeneratedCode> {
        let struct_name = sanitize_rust_identifier(message.name());
        let with_default = self.config.wants_default_impl();

        let mut fields: Vec<StructField> = Vec::new();
        let mut field_defaults: Vec<FieldDefault> = Vec::new();

        for member in message.members() {
            let field_name = sanitize_rust_identifier(&member.name);
            let rust_type = self.member_type(message, member, index)?;

            if with_default {
                field_defaults.push(FieldDefault {
                    name: field_name.clone(),
                    default_value: self.default_expr(member),
                });
            }

            fields.push(StructField {
                name: field_name,
                rust_type,
                doc: member.comment.clone(),
            });
        }

        let constants: Vec<ConstantDef> = message
            .constants()
            .filter_map(|constant| self.constant_def(constant))
            .collect();

        let comment = message.comment();
        let mut tokens_vec: Vec<TokenStream> = vec![token_gen::generate_struct(
            &struct_name,
            (!comment.is_empty()).then_some(comment),
            &self.config.struct_derives(),
            &fields,
        )?];

        if with_default {
            tokens_vec.push(token_gen::generate_default_impl(
                &struct_name,
                &field_defaults,
            )?);
        }

        if !constants.is_empty() {
            tokens_vec.push(token_gen::generate_constants_impl(
                &struct_name,
                &constants,
            )?);
        }

        for enum_def in message.enums() {
            tokens_vec.push(token_gen::generate_enum(&self.enum_def(enum_def))?);
        }

        let mut output = self.preamble();
        output.push_str(&token_gen::format_token_streams(tokens_vec)?);

        Ok(GeneratedCode {
            code: output,
            message_name: struct_name,
            module_name: module_name_for(message.name()),
            source_file: None,
        })
    }

    /// Header and raw lines placed above generated code
    fn preamble(&self) -> String {
        let mut output = String::new();

        // Add header
        if let Some(header) = &self.config.header {
            output.push_str(header);
            output.push_str("\n\n");
        }

        // Add raw lines
        if !self.config.raw_lines.is_empty() {
            for line in &self.config.raw_lines {
                output.push_str(line);
                output.push('\n');
            }
            output.push('\n');
        }

        output
    }

    /// Rust type of an instance member, resolving message references
    fn member_type(
        &self,
        message: &MessageDefinition,
        member: &Field,
        index: &PackageIndex,
    ) -> GeneratorResult<String> {
        let unresolved = || GeneratorError::UnresolvedReference {
            type_name: member.field_type.base_type.to_string(),
            field: member.name.clone(),
            message: message.name().to_string(),
        };

        let message_path = match &member.field_type.base_type {
            BaseType::Primitive { .. } => None,
            base_type @ BaseType::Message { .. } => {
                Some(index.resolve(base_type).ok_or_else(unresolved)?)
            }
        };

        self.type_mapper
            .map_type(&member.field_type, message_path.as_deref())
            .ok_or_else(unresolved)
    }

    fn constant_def(&self, constant: &Field) -> Option<ConstantDef> {
        let primitive = constant.field_type.base_type.primitive()?;
        let value = constant.value.as_ref()?;
        Some(ConstantDef {
            name: sanitize_rust_identifier(&constant.name),
            rust_type: self.type_mapper.map_constant_type(primitive),
            value: rust_literal(value, primitive),
            doc: constant.comment.clone(),
        })
    }

    fn enum_def(&self, enum_def: &EnumDefinition) -> EnumDef {
        let variants = enum_def
            .variant_names()
            .into_iter()
            .zip(&enum_def.values)
            .map(|(name, value)| VariantDef {
                name: sanitize_rust_identifier(&name),
                discriminant: value.value.to_string(),
                doc: value.comment.clone(),
            })
            .collect();

        EnumDef {
            name: sanitize_rust_identifier(&enum_def.name),
            repr: self.type_mapper.map_enum_repr(enum_def.repr),
            doc: enum_def.comment.clone(),
            variants,
        }
    }

    /// Initializer used by the generated `Default` impl
    fn default_expr(&self, member: &Field) -> String {
        let field_type = &member.field_type;
        let primitive = field_type.base_type.primitive();

        match (&member.default_value, primitive) {
            (Some(Value::Primitive(value)), Some(primitive)) => owned_literal(value, primitive),
            (Some(Value::Array(values)), Some(primitive)) => {
                let elements: Vec<String> = values
                    .iter()
                    .map(|value| owned_literal(value, primitive))
                    .collect();
                if matches!(field_type.array, Some(ArrayKind::Fixed(_))) {
                    format!("[{}]", elements.join(", "))
                } else {
                    format!("::std::vec![{}]", elements.join(", "))
                }
            }
            _ if matches!(field_type.array, Some(ArrayKind::Fixed(_))) => {
                "::core::array::from_fn(|_| ::core::default::Default::default())".to_string()
            }
            _ => "::core::default::Default::default()".to_string(),
        }
    }
}

/// Rust literal for a constant value
fn rust_literal(value: &PrimitiveValue, primitive: PrimitiveType) -> String {
    match value {
        PrimitiveValue::Bool(v) => v.to_string(),
        PrimitiveValue::Integer(v) => v.to_string(),
        PrimitiveValue::Float(v) => {
            let float_type = if primitive == PrimitiveType::Float32 {
                "f32"
            } else {
                "f64"
            };
            if v.is_nan() {
                format!("{float_type}::NAN")
            } else if v.is_infinite() && v.is_sign_positive() {
                format!("{float_type}::INFINITY")
            } else if v.is_infinite() {
                format!("{float_type}::NEG_INFINITY")
            } else {
                format!("{v:?}")
            }
        }
        PrimitiveValue::String(v) => format!("{v:?}"),
    }
}

/// Like [`rust_literal`], but strings become owned `String`s
fn owned_literal(value: &PrimitiveValue, primitive: PrimitiveType) -> String {
    let literal = rust_literal(value, primitive);
    if primitive.is_string() {
        format!("::std::string::String::from({literal})")
    } else {
        literal
    }
}
