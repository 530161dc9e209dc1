/// Message definition parsing
use std::fs;
use std::path::Path;

use heck::ToUpperCamelCase;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::errors::{ParseError, ParseResult, invalid_resource_name};
use super::lexer::{LineKind, SourceLine, classify_lines, leading_comment};
use super::types::{BaseType, EnumDefinition, Field, PrimitiveType, Type};
use super::validation::{MESSAGE_FILE_EXTENSION, is_valid_message_name, is_valid_package_name};

/// A parsed message definition
///
/// Built with [`MessageBuilder`] or one of the parse functions and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MessageDefinition {
    package: String,
    name: String,
    comment: String,
    fields: Vec<Field>,
    enums: Vec<EnumDefinition>,
}

impl MessageDefinition {
    /// Package name
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Message name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Leading documentation, empty when absent
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// All fields and constants in source order
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Enumerations in source order
    #[must_use]
    pub fn enums(&self) -> &[EnumDefinition] {
        &self.enums
    }

    /// Instance members (non-constant fields)
    pub fn members(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.is_constant())
    }

    /// Constants
    pub fn constants(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_constant())
    }

    /// Get field or constant by name
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get enum by name
    #[must_use]
    pub fn get_enum(&self, name: &str) -> Option<&EnumDefinition> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Distinct message types referenced by the members, in order of first use
    #[must_use]
    pub fn references(&self) -> Vec<&BaseType> {
        let mut references: Vec<&BaseType> = Vec::new();
        for field in self.members() {
            let base_type = &field.field_type.base_type;
            if !base_type.is_primitive_type() && !references.contains(&base_type) {
                references.push(base_type);
            }
        }
        references
    }
}

impl std::fmt::Display for MessageDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# {}/{}", self.package, self.name)?;
        for field in &self.fields {
            writeln!(f, "{field}")?;
        }
        Ok(())
    }
}

/// Incremental construction of a [`MessageDefinition`]
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    message: MessageDefinition,
}

impl MessageBuilder {
    /// Start a message
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidResourceName`] if the package name or message name are invalid.
    pub fn new(package: &str, name: &str) -> ParseResult<Self> {
        if !is_valid_package_name(package) {
            return Err(invalid_resource_name(package, "^[a-z][a-z0-9_]*$"));
        }

        if !is_valid_message_name(name) {
            return Err(invalid_resource_name(name, "^[A-Z][A-Za-z0-9_]*$"));
        }

        Ok(MessageBuilder {
            message: MessageDefinition {
                package: package.to_string(),
                name: name.to_string(),
                comment: String::new(),
                fields: Vec::new(),
                enums: Vec::new(),
            },
        })
    }

    /// Set the leading documentation
    pub fn set_comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.message.comment = comment.into();
        self
    }

    /// Append a field or constant
    pub fn add_field(&mut self, field: Field) -> &mut Self {
        self.message.fields.push(field);
        self
    }

    /// Append an enumeration
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidEnum`] if the name clashes with the
    /// message or with an enum already added.
    pub fn add_enum(&mut self, enum_def: EnumDefinition) -> ParseResult<&mut Self> {
        if !self.is_free_type_name(&enum_def.name) {
            return Err(ParseError::InvalidEnum {
                reason: format!(
                    "enum name '{}' is already used in message '{}'",
                    enum_def.name, self.message.name
                ),
            });
        }
        self.message.enums.push(enum_def);
        Ok(self)
    }

    /// Whether `name` can still be used for a new enum
    #[must_use]
    pub fn is_free_type_name(&self, name: &str) -> bool {
        name != self.message.name && self.message.get_enum(name).is_none()
    }

    /// Finish the message
    #[must_use]
    pub fn finish(self) -> MessageDefinition {
        self.message
    }
}

/// Parse a message file
///
/// The message name is the file name with the `.msg` extension removed.
///
/// # Errors
///
/// Returns [`ParseError`] if the file cannot be read or the message format is invalid.
pub fn parse_message_file<P: AsRef<Path>>(
    pkg_name: &str,
    interface_filename: P,
) -> ParseResult<MessageDefinition> {
    let path = interface_filename.as_ref();
    let msg_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(MESSAGE_FILE_EXTENSION))
        .and_then(|n| n.strip_suffix('.'))
        .ok_or_else(|| ParseError::InvalidResourceName {
            name: path.display().to_string(),
            reason: format!("expected a '.{MESSAGE_FILE_EXTENSION}' file"),
        })?;

    let content = fs::read_to_string(path)?;
    parse_message_string(pkg_name, msg_name, &content)
}

/// Parse a message from string content
///
/// # Errors
///
/// Returns [`ParseError`] if the message format is invalid. Errors raised
/// for a declaration carry its line number and text.
pub fn parse_message_string(
    pkg_name: &str,
    msg_name: &str,
    message_string: &str,
) -> ParseResult<MessageDefinition> {
    let mut builder = MessageBuilder::new(pkg_name, msg_name)?;
    if let Some(comment) = leading_comment(message_string) {
        builder.set_comment(comment);
    }

    let mut group = ConstantGroup::default();

    for line in classify_lines(message_string) {
        let line = line?;
        let at_line = |e: ParseError| e.at_line(line.number, line.raw);

        if line.follows_blank {
            group.close(&mut builder)?;
        }

        match line.kind {
            LineKind::EnumHeader { name } => {
                group.close(&mut builder)?;
                group.open_explicit(name, &line);
            }
            LineKind::Constant {
                type_token,
                name,
                value,
            } => {
                let field_type = Type::new(type_token, Some(pkg_name)).map_err(at_line)?;
                let constant = Field::constant(field_type, name, value)
                    .map_err(at_line)?
                    .with_comment(line.comment)
                    .with_line(line.number);
                group.push(&constant, &line, &mut builder).map_err(at_line)?;
                builder.add_field(constant);
            }
            LineKind::Field {
                type_token,
                name,
                default,
            } => {
                group.close(&mut builder)?;
                let field_type = Type::new(type_token, Some(pkg_name)).map_err(at_line)?;
                let field = Field::new(field_type, name, default)
                    .map_err(at_line)?
                    .with_comment(line.comment)
                    .with_line(line.number);
                builder.add_field(field);
            }
        }
    }

    group.close(&mut builder)?;
    Ok(builder.finish())
}

/// Header of an `@enum` block
#[derive(Debug)]
struct EnumHeader {
    name: String,
    comment: Option<String>,
    line: usize,
    text: String,
}

/// A run of consecutive constants that may become an enum
#[derive(Debug, Default)]
struct ConstantGroup {
    header: Option<EnumHeader>,
    members: Vec<Field>,
    texts: Vec<String>,
}

impl ConstantGroup {
    fn open_explicit(&mut self, name: &str, line: &SourceLine<'_>) {
        self.header = Some(EnumHeader {
            name: name.to_string(),
            comment: line.comment.map(str::to_string),
            line: line.number,
            text: line.raw.to_string(),
        });
    }

    fn push(
        &mut self,
        constant: &Field,
        line: &SourceLine<'_>,
        builder: &mut MessageBuilder,
    ) -> ParseResult<()> {
        if self.header.is_some() {
            let repr = self
                .members
                .first()
                .and_then(|m| m.field_type.base_type.primitive());
            let primitive = constant.field_type.base_type.primitive();
            if !primitive.is_some_and(PrimitiveType::is_integer) {
                return Err(ParseError::InvalidEnum {
                    reason: format!("'{}' is not an integer constant", constant.name),
                });
            }
            if repr.is_some() && repr != primitive {
                return Err(ParseError::InvalidEnum {
                    reason: format!(
                        "'{}' has type {}, other values have type {}",
                        constant.name,
                        constant.field_type,
                        self.members[0].field_type
                    ),
                });
            }
            self.members.push(constant.clone());
            self.texts.push(line.raw.to_string());
            return Ok(());
        }

        let groupable =
            constant.integer_value().is_some() && segment_prefix(&constant.name).is_some();
        let continues_run = self.members.last().is_some_and(|last| {
            last.field_type.base_type == constant.field_type.base_type
                && segment_prefix(&last.name) == segment_prefix(&constant.name)
        });

        if !continues_run {
            self.close(builder)?;
        }
        if groupable {
            self.members.push(constant.clone());
            self.texts.push(line.raw.to_string());
        }
        Ok(())
    }

    fn close(&mut self, builder: &mut MessageBuilder) -> ParseResult<()> {
        let members = std::mem::take(&mut self.members);
        let texts = std::mem::take(&mut self.texts);

        if let Some(header) = self.header.take() {
            let enum_def =
                EnumDefinition::from_constants(&header.name, &members, header.comment, true)
                    .map_err(|e| e.at_line(header.line, &header.text))?;
            if let Some((at, reason)) = enum_def.find_conflict() {
                let err = ParseError::InvalidEnum { reason };
                return Err(err.at_line(members[at].line, &texts[at]));
            }
            builder
                .add_enum(enum_def)
                .map_err(|e| e.at_line(header.line, &header.text))?;
            return Ok(());
        }

        if members.len() < 2 {
            return Ok(());
        }
        let Some(prefix) = segment_prefix(&members[0].name) else {
            return Ok(());
        };
        let starts_alphabetic = members.iter().all(|m| {
            m.name[prefix.len() + 1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic())
        });
        let name = prefix.to_upper_camel_case();
        if !starts_alphabetic || !is_valid_message_name(&name) || !builder.is_free_type_name(&name)
        {
            return Ok(());
        }

        let enum_def = EnumDefinition::from_constants(&name, &members, None, false)?;
        // aliased values stay plain constants
        if enum_def.find_conflict().is_none() {
            builder.add_enum(enum_def)?;
        }
        Ok(())
    }
}

/// First `_`-delimited segment of a constant name with a non-empty remainder
fn segment_prefix(name: &str) -> Option<&str> {
    name.split_once('_')
        .and_then(|(prefix, rest)| (!prefix.is_empty() && !rest.is_empty()).then_some(prefix))
}
