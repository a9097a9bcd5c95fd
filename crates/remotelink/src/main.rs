//! Binary entry point for the rlink CLI.
//!
//! Answers remote-link queries against a model snapshot exported by the host.
//!
//! ## Usage
//!
//! ```bash
//! # Which implementation class does an annotated interface point at?
//! rlink resolve pkg.Api
//!
//! # Implementation methods of an interface method
//! rlink navigate 'pkg.Api#op/1'
//!
//! # Gutter markers of a file
//! rlink markers src/pkg/Api.java
//!
//! # Interface declarations that use an implementation method, outside tests
//! rlink usages src/pkg/Impl.java:4:15 -- '!test/**'
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use remotelink::cli::{load_snapshot, run_markers, run_navigate, run_resolve, run_usages};
use remotelink::config::{CliOverrides, OutputFormat, ResolvedConfig};
use remotelink::{ErrorResponse, LinkError, OutputErrorCode};
use remotelink_core::output::{emit_response, emit_text};

// ============================================================================
// CLI Structure
// ============================================================================

/// Navigation and usage search for annotation-linked remote interfaces.
///
/// A remote interface names its implementation class in an annotation
/// string. rlink follows that link in both directions.
#[derive(Parser, Debug)]
#[command(
    name = "rlink",
    version,
    about = "Navigation and usage search for annotation-linked remote interfaces"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Model snapshot to load (default: rlink-snapshot.json).
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Project config file (default: rlink.json in the current directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format (default: json).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the remote class named by an annotated class.
    Resolve {
        /// Fully-qualified class name.
        class: String,
    },
    /// List implementation methods of a remote interface method.
    Navigate {
        /// `pkg.Api#method[/arity]` or `path:line:col`.
        method: String,
    },
    /// List gutter markers of a file.
    Markers {
        /// File path as recorded in the snapshot.
        file: String,
    },
    /// Find remote interface declarations that use an implementation method.
    Usages {
        /// `pkg.Impl#method[/arity]` or `path:line:col`.
        method: String,
        /// Glob patterns restricting the search (`!` excludes).
        #[arg(last = true)]
        scope: Vec<String>,
    },
}

// ============================================================================
// Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.global.log_level);

    let overrides = CliOverrides {
        snapshot: cli.global.snapshot.clone(),
        config: cli.global.config.clone(),
        format: cli.global.format,
        scope: match &cli.command {
            Command::Usages { scope, .. } => scope.clone(),
            _ => Vec::new(),
        },
    };
    let fallback_format = cli.global.format.unwrap_or_default();

    let config = match resolve_config(&overrides) {
        Ok(config) => config,
        Err(err) => return report_error(&err, fallback_format),
    };

    match execute(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err, config.format.value),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn resolve_config(overrides: &CliOverrides) -> Result<ResolvedConfig, LinkError> {
    let workspace_root = std::env::current_dir()
        .map_err(|e| LinkError::internal(format!("cannot determine working directory: {}", e)))?;
    ResolvedConfig::resolve(&workspace_root, overrides).map_err(LinkError::from)
}

/// Emit an error response and map it to the exit code.
fn report_error(err: &LinkError, format: OutputFormat) -> ExitCode {
    let error_code = OutputErrorCode::from(err);
    let response = ErrorResponse::from_error(err);

    // Errors go to stdout like any other response
    let mut stdout = io::stdout();
    let _ = match format {
        OutputFormat::Json => emit_response(&response, &mut stdout),
        OutputFormat::Text => emit_text(&response.text_lines(), &mut stdout),
    };
    let _ = stdout.flush();

    ExitCode::from(error_code.code())
}

/// Execute the CLI command.
fn execute(command: Command, config: &ResolvedConfig) -> Result<(), LinkError> {
    let index = load_snapshot(&config.snapshot.value)?;
    let format = config.format.value;
    match command {
        Command::Resolve { class } => {
            let response = run_resolve(&index, &class)?;
            emit(&response, response.text_lines(), format)
        }
        Command::Navigate { method } => {
            let response = run_navigate(&index, &method)?;
            emit(&response, response.text_lines(), format)
        }
        Command::Markers { file } => {
            let response = run_markers(&index, &file)?;
            emit(&response, response.text_lines(), format)
        }
        Command::Usages { method, .. } => {
            let response = run_usages(&index, &method, &config.scope.value)?;
            emit(&response, response.text_lines(), format)
        }
    }
}

fn emit<T: Serialize>(
    response: &T,
    lines: Vec<String>,
    format: OutputFormat,
) -> Result<(), LinkError> {
    let mut stdout = io::stdout();
    match format {
        OutputFormat::Json => emit_response(response, &mut stdout),
        OutputFormat::Text => emit_text(&lines, &mut stdout),
    }
    .and_then(|()| stdout.flush())
    .map_err(|e| LinkError::internal(format!("cannot write output: {}", e)))
}
