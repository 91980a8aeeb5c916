//! tsbind: bind serialized syntax trees and report binder diagnostics.
//!
//! Usage:
//!   tsbind [options] [file.json...]
//!
//! Each input is a `SourceFile` serialized as JSON. Options come from a
//! tsconfig.json (`--project`, or `./tsconfig.json` when no inputs are
//! given) and command-line flags override them.

mod report;

use clap::Parser as ClapParser;
use miette::IntoDiagnostic;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use tsbind_ast::SourceFile;
use tsbind_binder::{bind_program, BoundFile, ProgramBindStats};
use tsbind_options::{CompilerOptions, ConfigError, ScriptTarget, TsConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(ClapParser, Debug)]
#[command(name = "tsbind", version, about = "Bind TypeScript syntax trees and report binder diagnostics")]
struct Cli {
    /// Serialized source files to bind.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Path to tsconfig.json.
    #[arg(short = 'p', long = "project")]
    project: Option<PathBuf>,

    /// Bind all files in strict mode.
    #[arg(long)]
    strict: bool,

    /// Language level, e.g. ES5 or ES2015.
    #[arg(long)]
    target: Option<ScriptTarget>,

    /// Report unreachable code as an error.
    #[arg(long = "noUnreachableCode")]
    no_unreachable_code: bool,

    /// Record fallthrough between switch clauses.
    #[arg(long = "noFallthroughCasesInSwitch")]
    no_fallthrough_cases_in_switch: bool,

    /// Also print suggestions.
    #[arg(long)]
    suggestions: bool,

    /// Print per-file counts as JSON on stdout.
    #[arg(long)]
    stats: bool,

    /// Render diagnostics with source excerpts.
    #[arg(long)]
    pretty: bool,

    /// Log binder activity to stderr.
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
enum CliError {
    #[error(transparent)]
    #[diagnostic(code(tsbind::config))]
    Config(#[from] ConfigError),

    #[error("Cannot read input file '{}'", path.display())]
    #[diagnostic(code(tsbind::io))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input file '{}' is not a serialized source file", path.display())]
    #[diagnostic(code(tsbind::input), help("inputs are JSON produced by serializing a SourceFile"))]
    Input {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No input files found.")]
    #[diagnostic(code(tsbind::no_inputs))]
    NoInputs,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let start = Instant::now();
    let (inputs, config) = resolve_inputs(&cli)?;
    let options = effective_options(&cli, config);
    tracing::debug!(?options, files = inputs.len(), "resolved inputs");

    let files = inputs
        .iter()
        .map(|path| load_source_file(path).map(BoundFile::new))
        .collect::<Result<Vec<_>, _>>()?;

    let stats = bind_program(&files, &options);
    print_diagnostics(&cli, &files);

    if cli.stats {
        let json = serde_json::to_string_pretty(&stats).into_diagnostic()?;
        println!("{}", json);
    }
    print_summary(&stats);
    tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "done");

    if stats.has_errors() {
        process::exit(1);
    }
    Ok(())
}

/// `TSBIND_LOG` follows `RUST_LOG` syntax; `--verbose` turns on debug
/// output when it is unset.
fn init_tracing(verbose: bool) {
    let filter = match std::env::var("TSBIND_LOG") {
        Ok(directives) => EnvFilter::builder().parse_lossy(directives),
        Err(_) if verbose => EnvFilter::new("debug"),
        Err(_) => EnvFilter::new("warn"),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn resolve_inputs(cli: &Cli) -> Result<(Vec<PathBuf>, Option<TsConfig>), CliError> {
    let project = match &cli.project {
        Some(path) => Some(path.clone()),
        None if cli.files.is_empty() && Path::new("tsconfig.json").exists() => Some(PathBuf::from("tsconfig.json")),
        None => None,
    };
    let config = match &project {
        Some(path) => Some(tsbind_options::parse_tsconfig_file(path)?),
        None => None,
    };

    let mut inputs = cli.files.clone();
    if inputs.is_empty() {
        if let (Some(path), Some(files)) = (&project, config.as_ref().and_then(|c| c.files.as_ref())) {
            let root = path.parent().unwrap_or_else(|| Path::new("."));
            inputs = files.iter().map(|file| root.join(file)).collect();
        }
    }
    if inputs.is_empty() {
        return Err(CliError::NoInputs);
    }
    Ok((inputs, config))
}

fn effective_options(cli: &Cli, config: Option<TsConfig>) -> CompilerOptions {
    let mut options = config.map(|c| c.compiler_options).unwrap_or_default();
    if cli.strict {
        options.strict = Some(true);
    }
    if cli.target.is_some() {
        options.target = cli.target;
    }
    if cli.no_unreachable_code {
        options.allow_unreachable_code = Some(false);
    }
    if cli.no_fallthrough_cases_in_switch {
        options.no_fallthrough_cases_in_switch = Some(true);
    }
    options
}

fn load_source_file(path: &Path) -> Result<SourceFile, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::Input {
        path: path.to_path_buf(),
        source,
    })
}

fn print_diagnostics(cli: &Cli, files: &[BoundFile]) {
    for file in files {
        let Some(binding) = file.binding() else {
            continue;
        };
        let source = &file.source;
        for diagnostic in binding.diagnostics() {
            eprintln!("{}", report::render(diagnostic, &source.file_name, &source.text, cli.pretty));
        }
        if cli.suggestions {
            for suggestion in binding.suggestions() {
                eprintln!("{}", report::render(suggestion, &source.file_name, &source.text, cli.pretty));
            }
        }
    }
}

fn print_summary(stats: &ProgramBindStats) {
    if !stats.has_errors() {
        return;
    }
    let files_with_errors = stats.files.iter().filter(|file| file.error_count > 0).count();
    eprintln!();
    eprintln!("{}", report::summary(stats.error_count(), files_with_errors));
}
