//! Runtime configuration for the translator, builder-style so host
//! programs can adjust the downstream toolchain and module bindings
//! without forking the core.

use crate::registry::ModuleRegistry;
use std::env;
use std::path::PathBuf;
use std::process::Command;

/// True if `command` can be found and run with `--version`.
fn compiler_is_available(command: &str) -> bool {
    Command::new(command)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Discover the downstream C++ compiler: prefer `c++`, falling back to
/// `g++` if `c++` isn't on `PATH`. Neither being available is not an
/// error here — it just means the eventual compile invocation fails
/// with its own "Compilation failed." message.
fn discover_compiler_command() -> String {
    if compiler_is_available("c++") {
        "c++".to_string()
    } else if compiler_is_available("g++") {
        "g++".to_string()
    } else {
        "c++".to_string()
    }
}

/// The directory containing the running translator binary, one level
/// up — matching the original tool's `compiler_path.parent().parent()`
/// convention for locating the repo root the bundled libraries live
/// under.
fn default_include_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()?
        .parent()?
        .parent()
        .map(PathBuf::from)
}

/// The default downstream compiler invocation, standard, and
/// optimization flag, plus the module registry the translator resolves
/// imports against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspilerConfig {
    pub compiler_command: String,
    pub std_flag: String,
    pub optimization_flag: String,
    pub include_dir: Option<PathBuf>,
    pub module_registry: ModuleRegistry,
}

impl TranspilerConfig {
    /// A config using the discovered compiler invocation (`c++`,
    /// falling back to `g++`) at `-std=c++17 -O2`, with `include_dir`
    /// defaulted to the translator binary's grandparent directory,
    /// bound to the given module registry.
    pub fn new(module_registry: ModuleRegistry) -> Self {
        TranspilerConfig {
            compiler_command: discover_compiler_command(),
            std_flag: "c++17".to_string(),
            optimization_flag: "-O2".to_string(),
            include_dir: default_include_dir(),
            module_registry,
        }
    }

    pub fn with_compiler(mut self, command: impl Into<String>) -> Self {
        self.compiler_command = command.into();
        self
    }

    pub fn with_std(mut self, std_flag: impl Into<String>) -> Self {
        self.std_flag = std_flag.into();
        self
    }

    pub fn with_optimization(mut self, flag: impl Into<String>) -> Self {
        self.optimization_flag = flag.into();
        self
    }

    pub fn with_include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dir = Some(dir.into());
        self
    }

    pub fn with_module_registry(mut self, registry: ModuleRegistry) -> Self {
        self.module_registry = registry;
        self
    }
}

impl Default for TranspilerConfig {
    fn default() -> Self {
        TranspilerConfig::new(ModuleRegistry::standard())
    }
}
