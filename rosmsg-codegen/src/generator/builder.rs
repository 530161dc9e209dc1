//! Builder interface for the code generator
//!
//! A batch runs in three passes: every file is parsed, then every message is
//! generated in memory, and only then is anything written. A failure in any
//! message leaves the output directory untouched.
use super::{
    ConfigError, GeneratedCode, GeneratorError, GeneratorResult,
    codegen::{CodeGenerator, PackageIndex},
    config::GeneratorConfig,
};
use crate::msg::{
    MessageDefinition, ParseError, parse_message_file, validation::MESSAGE_FILE_EXTENSION,
};
use super::config::module_name_for;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Main generator builder (bindgen-style API)
///
/// # Example
///
/// ```no_run
/// use rosmsg_codegen::generator::Generator;
///
/// Generator::new()
///     .package("test_msgs")
///     .header("// Auto-generated - do not edit")
///     .derive_debug(true)
///     .derive_clone(true)
///     .input_dir("msg")
///     .output_dir("src/generated")
///     .emit_rerun_if_changed(true)
///     .generate()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Create a new generator with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: GeneratorConfig::new(),
        }
    }

    /// Create a generator from an existing configuration
    #[must_use]
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Set the package the messages belong to
    #[must_use]
    pub fn package<S: AsRef<str>>(mut self, package: S) -> Self {
        self.config.package = Some(package.as_ref().to_string());
        self
    }

    /// Add a header comment to generated files
    ///
    /// # Example
    ///
    /// ```
    /// use rosmsg_codegen::generator::Generator;
    ///
    /// let generator = Generator::new()
    ///     .header("// Auto-generated code - do not edit!");
    /// ```
    #[must_use]
    pub fn header<S: AsRef<str>>(mut self, header: S) -> Self {
        self.config.header = Some(header.as_ref().to_string());
        self
    }

    /// Add a derive to generated structs
    ///
    /// Accepts paths such as `serde::Serialize`. Adding the same derive twice
    /// has no effect.
    ///
    /// # Example
    ///
    /// ```
    /// use rosmsg_codegen::generator::Generator;
    ///
    /// let generator = Generator::new()
    ///     .derive("Debug")
    ///     .derive("serde::Serialize");
    /// ```
    #[must_use]
    pub fn derive<S: AsRef<str>>(mut self, derive: S) -> Self {
        let derive = derive.as_ref();
        if !self.config.derives.iter().any(|d| d == derive) {
            self.config.derives.push(derive.to_string());
        }
        self
    }

    /// Generate `Debug` implementations
    #[must_use]
    pub fn derive_debug(self, enable: bool) -> Self {
        self.derive_if(enable, "Debug")
    }

    /// Generate `Clone` implementations
    #[must_use]
    pub fn derive_clone(self, enable: bool) -> Self {
        self.derive_if(enable, "Clone")
    }

    /// Generate `Copy` implementations
    ///
    /// Note: This will fail for messages containing strings or dynamic arrays.
    #[must_use]
    pub fn derive_copy(self, enable: bool) -> Self {
        self.derive_if(enable, "Copy")
    }

    /// Generate `Default` implementations
    ///
    /// The impl is written out rather than derived, so field defaults from
    /// the `.msg` file are honored.
    ///
    /// # Example
    ///
    /// ```
    /// use rosmsg_codegen::generator::Generator;
    ///
    /// let generator = Generator::new().derive_default(true);
    /// ```
    #[must_use]
    pub fn derive_default(self, enable: bool) -> Self {
        self.derive_if(enable, "Default")
    }

    /// Generate `PartialEq` and `Eq` implementations
    ///
    /// Note: This will fail for types containing f32/f64 fields. Use `derive_partialeq()` instead.
    #[must_use]
    pub fn derive_eq(self, enable: bool) -> Self {
        self.derive_if(enable, "PartialEq").derive_if(enable, "Eq")
    }

    /// Generate `PartialEq` implementations
    #[must_use]
    pub fn derive_partialeq(self, enable: bool) -> Self {
        self.derive_if(enable, "PartialEq")
    }

    /// Generate `PartialOrd`, `Ord`, `PartialEq` and `Eq` implementations
    ///
    /// Note: This will fail for types containing f32/f64 fields.
    #[must_use]
    pub fn derive_ord(self, enable: bool) -> Self {
        self.derive_eq(enable)
            .derive_if(enable, "PartialOrd")
            .derive_if(enable, "Ord")
    }

    /// Generate `PartialOrd` implementations
    #[must_use]
    pub fn derive_partialord(self, enable: bool) -> Self {
        self.derive_if(enable, "PartialOrd")
    }

    /// Generate `Hash` implementations
    ///
    /// Note: This will fail for types containing f32/f64 fields.
    #[must_use]
    pub fn derive_hash(self, enable: bool) -> Self {
        self.derive_if(enable, "Hash")
    }

    fn derive_if(self, enable: bool, derive: &str) -> Self {
        if enable { self.derive(derive) } else { self }
    }

    /// Add a raw line of code at the top of every message file
    ///
    /// # Example
    ///
    /// ```
    /// use rosmsg_codegen::generator::Generator;
    ///
    /// let generator = Generator::new()
    ///     .raw_line("#![allow(dead_code)]");
    /// ```
    #[must_use]
    pub fn raw_line<S: AsRef<str>>(mut self, line: S) -> Self {
        self.config.raw_lines.push(line.as_ref().to_string());
        self
    }

    /// Enable/disable emitting cargo:rerun-if-changed directives
    ///
    /// When enabled, prints cargo directives that can be used in build.rs
    /// to trigger rebuilds when source files change.
    #[must_use]
    pub fn emit_rerun_if_changed(mut self, enable: bool) -> Self {
        self.config.emit_rerun_if_changed = enable;
        self
    }

    /// Add an input file to generate bindings for
    ///
    /// Can be called multiple times to add multiple files.
    #[must_use]
    pub fn include<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.input_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Add multiple input files to generate bindings for
    #[must_use]
    pub fn includes<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.config
            .input_files
            .extend(paths.into_iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    /// Set a directory whose `*.msg` files are all generated
    #[must_use]
    pub fn input_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config.input_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set output directory for generated files
    #[must_use]
    pub fn output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config.output_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Resolve references into another package under a Rust path
    ///
    /// # Example
    ///
    /// ```
    /// use rosmsg_codegen::generator::Generator;
    ///
    /// // `geometry_msgs/Point` becomes `crate::geometry_msgs::Point`
    /// let generator = Generator::new()
    ///     .extern_package("geometry_msgs", "crate::geometry_msgs");
    /// ```
    #[must_use]
    pub fn extern_package<S: AsRef<str>, R: AsRef<str>>(
        mut self,
        package: S,
        rust_path: R,
    ) -> Self {
        self.config
            .extern_packages
            .insert(package.as_ref().to_string(), rust_path.as_ref().to_string());
        self
    }

    /// The configuration built so far
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the Rust code
    ///
    /// Writes one `<module>.rs` per message and a `mod.rs` declaring and
    /// re-exporting them.
    ///
    /// # Errors
    ///
    /// Returns the first configuration, parse, resolution or I/O error.
    /// Nothing is written unless every message generates.
    pub fn generate(self) -> GeneratorResult<()> {
        self.config.validate()?;
        let package = self
            .config
            .package
            .as_deref()
            .ok_or(ConfigError::PackageRequired)?;
        let output_dir = self
            .config
            .output_dir
            .as_ref()
            .ok_or(ConfigError::OutputDirectoryRequired)?;

        let input_files = self.input_files()?;
        if input_files.is_empty() {
            return Err(ConfigError::NoInputFiles.into());
        }

        // Generate all code before touching the output directory
        let all_generated = self.generate_all_files(package, &input_files)?;

        self.write_generated_files(output_dir, &all_generated)?;

        tracing::info!(
            package,
            messages = all_generated.len(),
            output_dir = %output_dir.display(),
            "generated message package"
        );
        Ok(())
    }

    /// Files of the input directory followed by explicit includes, without duplicates
    fn input_files(&self) -> GeneratorResult<Vec<PathBuf>> {
        let mut files = match &self.config.input_dir {
            Some(dir) => find_message_files(dir)?,
            None => Vec::new(),
        };
        files.extend(self.config.input_files.iter().cloned());

        let mut seen_paths: HashSet<PathBuf> = HashSet::new();
        files.retain(|path| seen_paths.insert(path.clone()));
        Ok(files)
    }

    /// Parse every file, then generate every message
    fn generate_all_files(
        &self,
        package: &str,
        input_files: &[PathBuf],
    ) -> GeneratorResult<Vec<GeneratedCode>> {
        let mut messages: Vec<(&Path, MessageDefinition)> = Vec::with_capacity(input_files.len());
        let mut names: HashSet<String> = HashSet::new();
        let mut modules: HashMap<String, String> = HashMap::new();

        for path in input_files {
            if self.config.emit_rerun_if_changed {
                println!("cargo:rerun-if-changed={}", path.display());
            }

            tracing::debug!(path = %path.display(), "parsing message file");
            let message = parse_message_file(package, path).map_err(|source| {
                tracing::error!(
                    path = %path.display(),
                    error = %source,
                    "failed to parse message file"
                );
                GeneratorError::Parse {
                    path: path.clone(),
                    source,
                }
            })?;
            if !names.insert(message.name().to_string()) {
                return Err(GeneratorError::Parse {
                    path: path.clone(),
                    source: ParseError::InvalidResourceName {
                        name: message.name().to_string(),
                        reason: format!("duplicate message name in package '{package}'"),
                    },
                });
            }
            let module = module_name_for(message.name());
            if let Some(other) = modules.get(&module) {
                return Err(GeneratorError::Parse {
                    path: path.clone(),
                    source: ParseError::InvalidResourceName {
                        name: message.name().to_string(),
                        reason: format!("module '{module}' is already used by message '{other}'"),
                    },
                });
            }
            modules.insert(module, message.name().to_string());
            messages.push((path.as_path(), message));
        }

        let index = self.config.extern_packages.iter().fold(
            PackageIndex::from_messages(package, messages.iter().map(|(_, message)| message)),
            |index, (extern_package, rust_path)| {
                index.with_extern_package(extern_package.clone(), rust_path.clone())
            },
        );

        let generator = CodeGenerator::new(self.config.clone());
        messages
            .iter()
            .map(|(path, message)| {
                let mut code = generator
                    .generate_message(message, &index)
                    .map_err(|source| {
                        tracing::error!(
                            path = %path.display(),
                            error = %source,
                            "failed to generate message"
                        );
                        GeneratorError::Generate {
                            path: path.to_path_buf(),
                            source: Box::new(source),
                        }
                    })?;
                code.source_file = Some(path.to_path_buf());
                Ok(code)
            })
            .collect()
    }

    /// Write generated files and the package `mod.rs`
    fn write_generated_files(
        &self,
        output_dir: &Path,
        all_generated: &[GeneratedCode],
    ) -> GeneratorResult<()> {
        std::fs::create_dir_all(output_dir).map_err(|source| GeneratorError::Io {
            path: output_dir.to_path_buf(),
            source,
        })?;

        for code in all_generated {
            let output_path = output_dir.join(code.suggested_filename());
            code.write_to_file(&output_path)?;
            tracing::debug!(
                msg_type = %code.message_name,
                path = %output_path.display(),
                "wrote message module"
            );
        }

        let mod_path = output_dir.join("mod.rs");
        std::fs::write(&mod_path, self.generate_mod_rs(all_generated)).map_err(|source| {
            GeneratorError::Io {
                path: mod_path.clone(),
                source,
            }
        })
    }

    /// Generate mod.rs content (declares and re-exports every message module)
    fn generate_mod_rs(&self, all_generated: &[GeneratedCode]) -> String {
        use std::fmt::Write;

        let mut content = String::new();

        if let Some(header) = &self.config.header {
            content.push_str(header);
            content.push_str("\n\n");
        }

        let mut modules: Vec<&GeneratedCode> = all_generated.iter().collect();
        modules.sort_by(|a, b| a.module_name.cmp(&b.module_name));

        for code in &modules {
            let _ = writeln!(content, "pub mod {};", code.module_name);
        }

        content.push('\n');

        for code in &modules {
            let _ = writeln!(content, "pub use {}::{};", code.module_name, code.message_name);
        }

        content
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

/// `*.msg` files directly inside `dir`, sorted by path
fn find_message_files(dir: &Path) -> GeneratorResult<Vec<PathBuf>> {
    let io_error = |source: std::io::Error| GeneratorError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == MESSAGE_FILE_EXTENSION)
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
