//! `rosmsg-codegen`: generate a Rust module tree from a directory of `.msg` files.

mod logger;

use clap::Parser;
use rosmsg_codegen::generator::Generator;
use std::fmt::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "rosmsg-codegen", version)]
#[command(
    about = "Generate Rust types from a package of .msg message definitions",
    long_about = None
)]
struct Cli {
    /// Package the messages belong to
    package: String,

    /// Directory containing the `.msg` files
    input_dir: PathBuf,

    /// Directory receiving one `.rs` file per message and a `mod.rs`
    output_dir: PathBuf,

    /// Header placed at the top of every generated file
    #[arg(long, env = "ROSMSG_CODEGEN_HEADER")]
    header: Option<String>,

    /// Derive added to every generated struct (repeatable)
    #[arg(long = "derive", value_name = "NAME", default_values = ["Debug", "Clone", "PartialEq"])]
    derives: Vec<String>,

    /// Resolve references into another package, e.g. `geometry_msgs=crate::geometry_msgs`
    #[arg(long = "extern-package", value_name = "PKG=PATH", value_parser = parse_extern_package)]
    extern_packages: Vec<(String, String)>,
}

fn parse_extern_package(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((package, path)) if !package.is_empty() && !path.is_empty() => {
            Ok((package.to_string(), path.to_string()))
        }
        _ => Err(format!("expected PKG=PATH, got '{arg}'")),
    }
}

/// Error message followed by every cause it does not already spell out
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            let _ = write!(message, "\n  caused by: {text}");
        }
        source = cause.source();
    }
    message
}

fn main() -> ExitCode {
    logger::init_logging();
    let cli = Cli::parse();

    let mut generator = Generator::new()
        .package(&cli.package)
        .input_dir(&cli.input_dir)
        .output_dir(&cli.output_dir);

    if let Some(header) = &cli.header {
        generator = generator.header(header);
    }
    for derive in &cli.derives {
        generator = generator.derive(derive);
    }
    for (package, path) in &cli.extern_packages {
        generator = generator.extern_package(package, path);
    }

    match generator.generate() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", error_chain(&err));
            ExitCode::FAILURE
        }
    }
}
