//! Bif Translator Library
//!
//! Translates programs written in the Bif scripting language into C++,
//! and optionally drives a downstream C++ compiler and the resulting
//! executable.
//!
//! # Extending the translator
//!
//! Host programs can widen the set of importable modules or point at a
//! different downstream compiler using [`TranspilerConfig`]:
//!
//! ```rust,ignore
//! use bifc::{ModuleEntry, ModuleRegistry, TranspilerConfig};
//! use bifc::translate_source;
//!
//! let registry = ModuleRegistry::standard()
//!     .with_module("BIFNet", ModuleEntry::new("libs/BIFNet/BIFNet.h", "using bif::net::BIFNet;"));
//! let config = TranspilerConfig::new(registry).with_compiler("g++");
//!
//! let cpp = translate_source("print(1 + 1)\n", &config)?;
//! # Ok::<(), bifc::error::TranspileError>(())
//! ```

pub mod config;
pub mod emitter;
pub mod error;
pub mod registry;
pub mod rewriter;
pub mod scanner;
pub mod transpile;

pub use config::TranspilerConfig;
pub use error::{CliError, TranspileError};
pub use registry::{ModuleEntry, ModuleRegistry};
pub use transpile::{transpile, TranspileResult};

/// Split `source` into lines the way the translator's line-by-line
/// driver expects: no trailing `\n`/`\r`, blank trailing line dropped.
fn split_lines(source: &str) -> Vec<String> {
    source.lines().map(|line| line.to_string()).collect()
}

/// Translate Bif source text into a transpile result (the body lines and
/// the ordered import list), without rendering or writing C++.
pub fn translate_source(
    source: &str,
    config: &TranspilerConfig,
) -> Result<TranspileResult, TranspileError> {
    let lines = split_lines(source);
    transpile::transpile(&lines, &config.module_registry)
}

/// Translate Bif source text all the way to a rendered C++ source string.
pub fn translate_to_cpp(source: &str, config: &TranspilerConfig) -> Result<String, TranspileError> {
    let result = translate_source(source, config)?;
    Ok(emitter::render_cpp(&result, config))
}
