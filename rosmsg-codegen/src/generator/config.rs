//! Configuration for the code generator

use super::ConfigError;
use crate::msg::is_valid_package_name;
use heck::ToSnakeCase;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Generator configuration
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    /// Package the messages belong to
    pub package: Option<String>,

    /// Derives to add to all generated structs
    pub derives: Vec<String>,

    /// Raw lines to add at the top of generated files
    pub raw_lines: Vec<String>,

    /// Header comment to add to generated files
    pub header: Option<String>,

    /// Whether to emit cargo:rerun-if-changed directives
    pub emit_rerun_if_changed: bool,

    /// Output directory for generated files
    pub output_dir: Option<PathBuf>,

    /// Directory scanned for `.msg` files
    pub input_dir: Option<PathBuf>,

    /// Individual `.msg` files
    pub input_files: Vec<PathBuf>,

    /// Other packages that references may point into, mapped to their Rust path
    pub extern_packages: BTreeMap<String, String>,
}

impl GeneratorConfig {
    /// Create a new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the struct derive list requests `Default`
    ///
    /// `Default` is implemented by hand so field defaults can be honored.
    #[must_use]
    pub fn wants_default_impl(&self) -> bool {
        self.derives.iter().any(|d| d == "Default")
    }

    /// Derives to put on generated structs, without `Default`
    #[must_use]
    pub fn struct_derives(&self) -> Vec<String> {
        self.derives
            .iter()
            .filter(|d| *d != "Default")
            .cloned()
            .collect()
    }

    /// Check that the settings needed for a batch run are present
    ///
    /// # Errors
    ///
    /// Returns the first missing or invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let package = self.package.as_deref().ok_or(ConfigError::PackageRequired)?;
        if !is_valid_package_name(package) {
            return Err(ConfigError::InvalidPackageName {
                package: package.to_string(),
            });
        }
        if self.output_dir.is_none() {
            return Err(ConfigError::OutputDirectoryRequired);
        }
        if self.input_dir.is_none() && self.input_files.is_empty() {
            return Err(ConfigError::NoInputFiles);
        }
        if let Some(derive) = self.derives.iter().find(|d| !is_rust_path(d)) {
            return Err(ConfigError::InvalidDerive {
                derive: derive.clone(),
            });
        }
        if let Some((package, path)) = self
            .extern_packages
            .iter()
            .find(|(_, p)| !is_rust_path(p))
        {
            return Err(ConfigError::InvalidExternPath {
                package: package.clone(),
                path: path.clone(),
            });
        }
        Ok(())
    }
}

fn is_rust_path(s: &str) -> bool {
    syn::parse_str::<syn::Path>(s).is_ok()
}

/// Module name used for a message type (`RobotState` -> `robot_state`)
#[must_use]
pub fn module_name_for(message_name: &str) -> String {
    sanitize_rust_identifier(&message_name.to_snake_case())
}

/// Sanitize an identifier to be valid Rust
///
/// - Escapes Rust keywords with r# prefix
/// - Appends `_` to keywords that cannot be raw identifiers (`self`, `super`, ...)
/// - Converts invalid characters to underscores
#[must_use]
pub fn sanitize_rust_identifier(name: &str) -> String {
    if matches!(name, "self" | "Self" | "super" | "crate" | "_") {
        return format!("{name}_");
    }

    // Check if it's a Rust keyword
    if is_rust_keyword(name) {
        return format!("r#{name}");
    }

    // Replace invalid characters
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    // Ensure it doesn't start with a digit
    if sanitized.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        format!("_{sanitized}")
    } else {
        sanitized
    }
}

/// Check if a string is a Rust keyword
#[must_use]
fn is_rust_keyword(s: &str) -> bool {
    matches!(
        s,
        "as" | "break"
            | "const"
            | "continue"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "static"
            | "struct"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "async"
            | "await"
            | "dyn"
            | "abstract"
            | "become"
            | "box"
            | "do"
            | "final"
            | "gen"
            | "macro"
            | "override"
            | "priv"
            | "typeof"
            | "unsized"
            | "virtual"
            | "yield"
            | "try"
    )
}
