//! Assembling a transpiled body into a complete target-language source
//! file, writing it only if its content changed, and driving the
//! downstream compiler and the resulting binary.

use crate::config::TranspilerConfig;
use crate::error::CliError;
use crate::transpile::TranspileResult;
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{debug, error, info};

/// Render a [`TranspileResult`] into a complete `.cpp` source string: the
/// fixed preamble, per-import headers and `using`-declarations (ordered
/// by first appearance), the `bif_input` shim, and `body` wrapped in
/// `main`.
pub fn render_cpp(result: &TranspileResult, config: &TranspilerConfig) -> String {
    let mut lines: Vec<String> = vec![
        "#include <iostream>".to_string(),
        "#include <string>".to_string(),
        "#include <vector>".to_string(),
        String::new(),
    ];

    for module_name in &result.imports {
        if let Some(entry) = config.module_registry.get(module_name) {
            lines.push(format!("#include \"{}\"", entry.header));
        }
    }

    lines.push(String::new());
    for module_name in &result.imports {
        if let Some(entry) = config.module_registry.get(module_name) {
            lines.push(entry.using_decl.clone());
        }
    }

    lines.extend([
        String::new(),
        "std::string bif_input(const std::string& prompt) {".to_string(),
        "    if (!prompt.empty()) {".to_string(),
        "        std::cout << prompt;".to_string(),
        "    }".to_string(),
        "    std::string value;".to_string(),
        "    std::getline(std::cin, value);".to_string(),
        "    return value;".to_string(),
        "}".to_string(),
        String::new(),
        "int main() {".to_string(),
    ]);

    for line in &result.body {
        lines.push(format!("    {}", line));
    }
    lines.push("    return 0;".to_string());
    lines.push("}".to_string());

    let mut joined = lines.join("\n");
    joined.push('\n');
    joined
}

/// Write `content` to `path` only if the file doesn't already hold it
/// byte-for-byte. Returns whether the file was (re)written.
pub fn write_if_different(path: &Path, content: &str) -> Result<bool, CliError> {
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == content {
            debug!(path = %path.display(), "cpp output unchanged, skipping write");
            return Ok(false);
        }
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| CliError::Compile(format!("Could not create {}: {}", parent.display(), e)))?;
    }
    fs::write(path, content)
        .map_err(|e| CliError::Compile(format!("Could not write {}: {}", path.display(), e)))?;
    info!(path = %path.display(), "wrote cpp output");
    Ok(true)
}

/// True if `exe_path` is newer than both `cpp_path` and `self_path` (the
/// running translator binary) — i.e. a rebuild can be skipped.
pub fn is_build_up_to_date(exe_path: &Path, cpp_path: &Path, self_path: &Path) -> bool {
    let (Ok(exe_meta), Ok(cpp_meta)) = (fs::metadata(exe_path), fs::metadata(cpp_path)) else {
        return false;
    };
    let (Ok(exe_time), Ok(cpp_time)) = (exe_meta.modified(), cpp_meta.modified()) else {
        return false;
    };
    if exe_time < cpp_time {
        return false;
    }
    match fs::metadata(self_path).and_then(|m| m.modified()) {
        Ok(self_time) => exe_time >= self_time,
        Err(_) => true,
    }
}

/// Invoke the configured C++ compiler on `cpp_path`, producing `exe_path`.
/// Returns `Ok(())` on a zero exit status, `Err` otherwise (process
/// spawn failure and non-zero exit are both reported the same way, per
/// the "Compilation failed." contract).
pub fn compile_cpp(cpp_path: &Path, exe_path: &Path, config: &TranspilerConfig) -> Result<(), CliError> {
    let mut command = Command::new(&config.compiler_command);
    command
        .arg(format!("-std={}", config.std_flag))
        .arg(&config.optimization_flag)
        .arg(cpp_path)
        .arg("-o")
        .arg(exe_path);

    if let Some(include_dir) = &config.include_dir {
        command.arg("-I").arg(include_dir);
    }

    debug!(?command, "invoking downstream compiler");
    let status = command.status().map_err(|e| {
        error!(error = %e, "failed to spawn downstream compiler");
        CliError::Compile(format!("Compilation failed: {}", e))
    })?;

    if !status.success() {
        error!(?status, "downstream compiler exited non-zero");
        return Err(CliError::Compile("Compilation failed.".to_string()));
    }
    Ok(())
}

/// Run the compiled executable, returning its exit status code (or an
/// error if it couldn't be spawned).
pub fn run_exe(exe_path: &Path) -> Result<i32, CliError> {
    let status = Command::new(exe_path)
        .status()
        .map_err(|e| CliError::Compile(format!("Could not run {}: {}", exe_path.display(), e)))?;
    Ok(status.code().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModuleRegistry;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn sample_result() -> TranspileResult {
        TranspileResult {
            body: vec!["auto x = 1;".to_string(), "std::cout << x << std::endl;".to_string()],
            imports: vec!["BIFMath".to_string()],
        }
    }

    #[test]
    fn render_includes_preamble_and_module_and_body() {
        let config = TranspilerConfig::default();
        let rendered = render_cpp(&sample_result(), &config);
        assert!(rendered.starts_with("#include <iostream>\n"));
        assert!(rendered.contains("#include \"libs/BIFMath/BIFMath.h\"\n"));
        assert!(rendered.contains("using bif::math::BIFMath;\n"));
        assert!(rendered.contains("std::string bif_input(const std::string& prompt) {"));
        assert!(rendered.contains("int main() {\n    auto x = 1;\n    std::cout << x << std::endl;\n    return 0;\n}\n"));
    }

    #[test]
    fn render_omits_unregistered_module_includes() {
        let config = TranspilerConfig::new(ModuleRegistry::empty());
        let rendered = render_cpp(&sample_result(), &config);
        assert!(!rendered.contains("#include \""));
    }

    #[test]
    fn write_if_different_only_writes_on_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.cpp");

        assert!(write_if_different(&path, "content-a").unwrap());
        assert!(!write_if_different(&path, "content-a").unwrap());
        assert!(write_if_different(&path, "content-b").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "content-b");
    }

    #[test]
    fn build_is_stale_when_exe_missing() {
        let dir = tempdir().unwrap();
        let cpp = dir.path().join("a.cpp");
        let exe = dir.path().join("a.exe");
        fs::write(&cpp, "x").unwrap();
        assert!(!is_build_up_to_date(&exe, &cpp, &cpp));
    }

    #[test]
    fn build_is_fresh_when_exe_newer_than_both() {
        let dir = tempdir().unwrap();
        let cpp = dir.path().join("a.cpp");
        let exe = dir.path().join("a.exe");
        let translator = dir.path().join("bifc");
        fs::write(&cpp, "x").unwrap();
        fs::write(&translator, "y").unwrap();
        fs::write(&exe, "z").unwrap();

        let future = SystemTime::now() + Duration::from_secs(10);
        let file = fs::File::open(&exe).unwrap();
        file.set_modified(future).unwrap();

        assert!(is_build_up_to_date(&exe, &cpp, &translator));
    }
}
