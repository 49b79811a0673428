//! Bif Translator CLI
//!
//! Command-line interface for translating Bif programs to C++ and
//! optionally compiling and running the result.

use bifc::config::TranspilerConfig;
use bifc::emitter;
use bifc::error::CliError;
use bifc::{transpile, TranspileResult};
use clap::{CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::{generate, Shell};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "bifc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Translate Bif programs to C++ and optionally build and run them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a .bif file to C++, compile it, and (optionally) run it
    Build {
        /// Input .bif source file
        input: PathBuf,

        /// Run the resulting executable after a successful build
        #[arg(long)]
        run: bool,

        /// Directory to write the generated .cpp and executable into
        #[arg(long, default_value = "build")]
        outdir: PathBuf,

        /// Downstream C++ compiler to invoke (defaults to a discovered
        /// `c++`, falling back to `g++`)
        #[arg(long)]
        compiler: Option<String>,

        /// C++ standard to compile against
        #[arg(long, default_value = "c++17")]
        std: String,

        /// Keep the generated .cpp file (it is always kept; this flag is
        /// accepted for symmetry with tooling that expects to opt in)
        #[arg(long)]
        keep_cpp: bool,
    },

    /// Parse one or more .bif files without compiling, reporting the
    /// first error encountered per file
    Check {
        /// Input .bif files to check
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Build {
            input,
            run,
            outdir,
            compiler,
            std,
            keep_cpp,
        } => {
            let _ = keep_cpp;
            run_build(&input, &outdir, run, compiler.as_deref(), &std)
        }
        Commands::Check { inputs } => run_check(&inputs),
        Commands::Completions { shell } => {
            run_completions(shell);
            Ok(())
        }
    };

    if let Err(err) = result {
        error!(exit_code = err.exit_code(), "{}", err);
        eprintln!("{}", err);
        process::exit(err.exit_code());
    }
}

fn init_logging() {
    let filter = env::var("BIFC_LOG")
        .or_else(|_| env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(io::stderr)
        .init();
}

fn read_source(input: &Path) -> Result<String, CliError> {
    fs::read_to_string(input).map_err(|_| CliError::InputNotFound(input.to_path_buf()))
}

fn run_build(
    input: &Path,
    outdir: &Path,
    run: bool,
    compiler: Option<&str>,
    std: &str,
) -> Result<(), CliError> {
    let source = read_source(input)?;

    let self_path = env::current_exe().unwrap_or_else(|_| PathBuf::from(env::args().next().unwrap()));
    let mut config = TranspilerConfig::default().with_std(std.to_string());
    if let Some(compiler) = compiler {
        config = config.with_compiler(compiler.to_string());
    }
    if config.include_dir.is_none() {
        if let Some(repo_root) = self_path.parent().and_then(Path::parent) {
            config = config.with_include_dir(repo_root);
        }
    }

    debug!(input = %input.display(), "transpiling");
    let lines: Vec<String> = source.lines().map(|l| l.to_string()).collect();
    let result: TranspileResult = transpile(&lines, &config.module_registry)?;

    let outdir_path = absolute_path(outdir);
    if !outdir_path.exists() {
        warn!(outdir = %outdir_path.display(), "outdir did not exist, creating it");
    }
    fs::create_dir_all(&outdir_path)
        .map_err(|e| CliError::Compile(format!("Could not create {}: {}", outdir_path.display(), e)))?;

    let base_name = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    let cpp_path = outdir_path.join(format!("{}.cpp", base_name));
    let exe_path = outdir_path.join(format!("{}.exe", base_name));

    let rendered = emitter::render_cpp(&result, &config);
    let cpp_changed = emitter::write_if_different(&cpp_path, &rendered)?;

    let up_to_date = emitter::is_build_up_to_date(&exe_path, &cpp_path, &self_path);

    if cpp_changed || !up_to_date {
        info!(cpp = %cpp_path.display(), exe = %exe_path.display(), "compiling");
        emitter::compile_cpp(&cpp_path, &exe_path, &config)?;
    } else {
        debug!(exe = %exe_path.display(), "build is up to date, skipping compile");
    }

    if run {
        let code = emitter::run_exe(&exe_path)?;
        if code != 0 {
            error!(exit_code = code, exe = %exe_path.display(), "executable exited non-zero");
            process::exit(code);
        }
    }

    Ok(())
}

fn run_check(inputs: &[PathBuf]) -> Result<(), CliError> {
    let registry = TranspilerConfig::default().module_registry;
    let mut had_error = false;

    for input in inputs {
        let source = match read_source(input) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("{}: {}", input.display(), err);
                had_error = true;
                continue;
            }
        };
        let lines: Vec<String> = source.lines().map(|l| l.to_string()).collect();
        match transpile(&lines, &registry) {
            Ok(_) => println!("{}: ok", input.display()),
            Err(err) => {
                eprintln!("{}: {}", input.display(), err);
                had_error = true;
            }
        }
    }

    if had_error {
        Err(CliError::Compile("One or more files failed to check.".to_string()))
    } else {
        Ok(())
    }
}

fn run_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
