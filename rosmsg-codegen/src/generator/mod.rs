//! Code generator for converting `.msg` message definitions to Rust types
//!
//! This module provides a bindgen-style API for generating Rust code from a
//! package of `.msg` files. Each message generates a corresponding `.rs`
//! file, and a `mod.rs` ties the package together.
//!
//! # Example
//!
//! ```no_run
//! use rosmsg_codegen::generator::Generator;
//!
//! Generator::new()
//!     .package("test_msgs")
//!     .header("// Auto-generated code - do not edit")
//!     .derive_debug(true)
//!     .derive_clone(true)
//!     .derive_partialeq(true)
//!     .input_dir("msg")
//!     .extern_package("geometry_msgs", "crate::geometry_msgs")
//!     .output_dir("generated")
//!     .generate()
//!     .expect("Failed to generate messages");
//! ```

mod builder;
mod codegen;
mod config;
mod token_gen;
mod types;

pub use builder::Generator;
pub use codegen::{CodeGenerator, PackageIndex};
pub use config::{GeneratorConfig, module_name_for, sanitize_rust_identifier};
pub use types::TypeMapper;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::msg::ParseError;

/// Configuration error details
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Package name is required
    #[error("Package name is required but not set")]
    PackageRequired,

    /// Package name does not match the package naming rules
    #[error("Invalid package name: {package}")]
    InvalidPackageName {
        /// The rejected name
        package: String,
    },

    /// Output directory is required
    #[error("Output directory is required but not set")]
    OutputDirectoryRequired,

    /// No input files provided
    #[error("No input files provided to generator")]
    NoInputFiles,

    /// A derive is not a Rust path
    #[error("Invalid derive '{derive}': expected a path such as `Debug` or `serde::Serialize`")]
    InvalidDerive {
        /// The rejected derive
        derive: String,
    },

    /// An extern package maps to something that is not a Rust path
    #[error("Invalid Rust path '{path}' for extern package '{package}'")]
    InvalidExternPath {
        /// The extern package
        package: String,
        /// The rejected path
        path: String,
    },
}

/// Errors that can occur during code generation
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A `.msg` file failed to parse
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        /// The file being parsed
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: ParseError,
    },

    /// A field references a message outside the package and every registered extern package
    #[error("Unresolved type '{type_name}' for field '{field}' in message '{message}'")]
    UnresolvedReference {
        /// The referenced type as written
        type_name: String,
        /// The field using it
        field: String,
        /// The message declaring the field
        message: String,
    },

    /// A parsed message failed to generate
    #[error("Failed to generate {}: {source}", path.display())]
    Generate {
        /// The file the message was parsed from
        path: PathBuf,
        /// Underlying generation error
        #[source]
        source: Box<GeneratorError>,
    },

    /// I/O error
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file or directory involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generated tokens could not be parsed for formatting
    #[error("Failed to format generated code: {0}")]
    Format(#[from] syn::Error),
}

impl GeneratorError {
    /// The file an error originates from, if known
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            GeneratorError::Parse { path, .. }
            | GeneratorError::Generate { path, .. }
            | GeneratorError::Io { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type for generator operations
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Generated code output
#[derive(Debug, Clone)]
pub struct GeneratedCode {
    /// The generated Rust code
    pub code: String,

    /// Name of the generated message type
    pub message_name: String,

    /// Module name (snake case of the message name, sanitized)
    pub module_name: String,

    /// Original source file path, when generated from a file
    pub source_file: Option<PathBuf>,
}

impl GeneratedCode {
    /// Write the generated code to a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> GeneratorResult<()> {
        let path = path.as_ref();

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| GeneratorError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, &self.code).map_err(|source| GeneratorError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get the suggested output filename based on the module name
    #[must_use]
    pub fn suggested_filename(&self) -> String {
        let module = self.module_name.strip_prefix("r#").unwrap_or(&self.module_name);
        format!("{module}.rs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(module_name: &str) -> GeneratedCode {
        GeneratedCode {
            code: "pub struct A {}\n".to_string(),
            message_name: "A".to_string(),
            module_name: module_name.to_string(),
            source_file: None,
        }
    }

    #[test]
    fn test_suggested_filename() {
        assert_eq!(generated("robot_state").suggested_filename(), "robot_state.rs");
        assert_eq!(generated("r#type").suggested_filename(), "type.rs");
    }

    #[test]
    fn test_write_to_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("a.rs");
        generated("a").write_to_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "pub struct A {}\n");
    }

    #[test]
    fn test_error_messages_name_the_file() {
        let err = GeneratorError::Parse {
            path: PathBuf::from("msg/Bad.msg"),
            source: ParseError::InvalidField {
                reason: "oops".to_string(),
            },
        };
        assert!(err.to_string().contains("msg/Bad.msg"));
        assert_eq!(err.path(), Some(Path::new("msg/Bad.msg")));
        assert!(std::error::Error::source(&err).is_some());

        let err = GeneratorError::UnresolvedReference {
            type_name: "Missing".to_string(),
            field: "m".to_string(),
            message: "Holder".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Missing"));
        assert!(msg.contains("'m'"));
        assert!(err.path().is_none());

        let err = GeneratorError::Generate {
            path: PathBuf::from("msg/Holder.msg"),
            source: Box::new(err),
        };
        assert!(err.to_string().contains("msg/Holder.msg"));
        assert!(err.to_string().contains("Unresolved type 'Missing'"));
        assert_eq!(err.path(), Some(Path::new("msg/Holder.msg")));
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: GeneratorError = ConfigError::NoInputFiles.into();
        assert_eq!(err.to_string(), "No input files provided to generator");
    }
}
