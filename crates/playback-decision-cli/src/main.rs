// crates/playback-decision-cli/src/main.rs
// ============================================================================
// Module: Playback Decision CLI Entry Point
// Description: Command dispatcher for offline playback decisions and replay.
// Purpose: Decide, classify, hash, and replay requests from files or stdin.
// Dependencies: clap, playback-decision-config, playback-decision-core, serde,
//               serde_jcs, serde_json, thiserror, tracing, tracing-subscriber.
// ============================================================================

//! ## Overview
//! The CLI wraps the decision engine for operators. Requests are read from a
//! file or stdin under a hard size limit, decided once, and written to stdout
//! as JSON. Logs go to stderr through `tracing-subscriber`. The exit code is
//! zero only when the engine answered with status 200.
//!
//! Security posture: request bodies and config files are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use playback_decision_config::DecisionConfig;
use playback_decision_config::LogFormat;
use playback_decision_config::LoggingConfig;
use playback_decision_core::Decision;
use playback_decision_core::DecisionEngine;
use playback_decision_core::DecisionObserver;
use playback_decision_core::DecisionReport;
use playback_decision_core::HashAlgorithm;
use playback_decision_core::HashError;
use playback_decision_core::NoopObserver;
use playback_decision_core::Problem;
use playback_decision_core::TracingObserver;
use playback_decision_core::canonical_input_json;
use playback_decision_core::classify_schema;
use playback_decision_core::input_hash;
use playback_decision_core::runtime::decode_request;
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path argument selecting stdin.
const STDIN_PATH: &str = "-";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "playback-decision", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Config file path (defaults to playback-decision.toml or env override).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Decide a playback request.
    Decide(DecideCommand),
    /// Report the root schema family of a request.
    Classify(InputArgs),
    /// Print the semantic hash and canonical form of a request.
    Hash(InputArgs),
    /// Decide a canonical replay artifact and recompute its hash.
    Replay(ReplayCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Request input selection shared by subcommands.
#[derive(Args, Debug, Default)]
struct InputArgs {
    /// Request JSON file; `-` or omitted reads stdin.
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,
}

/// Arguments for the decide command.
#[derive(Args, Debug)]
struct DecideCommand {
    /// Request input.
    #[command(flatten)]
    input: InputArgs,
    /// Pretty-print the JSON output.
    #[arg(long, action = ArgAction::SetTrue)]
    pretty: bool,
}

/// Arguments for the replay command.
#[derive(Args, Debug)]
struct ReplayCommand {
    /// Canonical request JSON produced by `hash`.
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    /// Expected input hash; a mismatch fails the command.
    #[arg(long, value_name = "HEX")]
    expect_hash: Option<String>,
    /// Pretty-print the JSON output.
    #[arg(long, action = ArgAction::SetTrue)]
    pretty: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the resolved config file.
    Validate,
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// JSON body written for decide and replay.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DecideOutput<'a> {
    /// HTTP-equivalent status.
    status: u16,
    /// Decision when the request was answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    decision: Option<&'a Decision>,
    /// Problem when the request was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    problem: Option<&'a Problem>,
    /// Semantic input hash when the request decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    input_hash: Option<&'a str>,
    /// Root schema family when the request decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'static str>,
}

impl<'a> DecideOutput<'a> {
    /// Builds the output body for an engine report.
    fn from_report(report: &'a DecisionReport) -> Self {
        Self {
            status: report.status(),
            decision: report.outcome.decision(),
            problem: report.outcome.problem(),
            input_hash: report.input_hash.as_ref().map(|digest| digest.value.as_str()),
            schema: report.schema.map(|schema| schema.as_str()),
        }
    }

    /// Builds the output body for a decode problem.
    const fn from_problem(problem: &'a Problem) -> Self {
        Self {
            status: problem.status,
            decision: None,
            problem: Some(problem),
            input_hash: None,
            schema: None,
        }
    }
}

/// JSON body written for the hash command.
#[derive(Debug, Serialize)]
struct HashOutput {
    /// Hash algorithm.
    algorithm: HashAlgorithm,
    /// Lowercase hex digest.
    hash: String,
    /// Canonical request JSON, itself a valid compact request.
    canonical: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for operator-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Engine type used by the CLI; the observer is chosen from config at runtime.
type CliEngine = DecisionEngine<Arc<dyn DecisionObserver>>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("playback-decision {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let config = DecisionConfig::load_or_default(cli.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    init_logging(&config.logging)?;
    tracing::debug!(
        max_input_bytes = config.engine.max_input_bytes,
        telemetry = config.telemetry.enabled,
        "configuration loaded"
    );
    let engine = build_engine(&config);

    match command {
        Commands::Decide(command) => command_decide(&engine, &command),
        Commands::Classify(command) => command_classify(&engine, &command),
        Commands::Hash(command) => command_hash(&engine, &command),
        Commands::Replay(command) => command_replay(&engine, &command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Installs the stderr log subscriber. `RUST_LOG` overrides the configured level.
fn init_logging(config: &LoggingConfig) -> CliResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let result = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|err| CliError::new(format!("failed to initialize logging: {err}")))
}

/// Builds the engine with the configured observer.
fn build_engine(config: &DecisionConfig) -> CliEngine {
    let observer: Arc<dyn DecisionObserver> = if config.telemetry.enabled {
        Arc::new(TracingObserver)
    } else {
        Arc::new(NoopObserver)
    };
    DecisionEngine::new(observer, config.engine_config())
}

/// Returns the byte limit for reading a request body.
///
/// One byte past the engine limit is admitted so oversize bodies reach the
/// engine's own size check and come back as a problem.
const fn input_read_limit(engine: &CliEngine) -> usize {
    engine.config().max_input_bytes.saturating_add(1)
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the decide command.
fn command_decide(engine: &CliEngine, command: &DecideCommand) -> CliResult<ExitCode> {
    let bytes = read_input(command.input.input.as_deref(), input_read_limit(engine))?;
    let report = engine.decide_bytes(&bytes);
    write_json(&DecideOutput::from_report(&report), command.pretty)?;
    Ok(exit_code_for(report.status()))
}

/// Executes the classify command.
fn command_classify(engine: &CliEngine, command: &InputArgs) -> CliResult<ExitCode> {
    let bytes = read_input(command.input.as_deref(), input_read_limit(engine))?;
    let schema = classify_schema(&bytes);
    write_stdout_line(schema.as_str()).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the hash command.
fn command_hash(engine: &CliEngine, command: &InputArgs) -> CliResult<ExitCode> {
    let bytes = read_input(command.input.as_deref(), input_read_limit(engine))?;
    let config = engine.config();
    let decoded = match decode_request(&bytes, config.max_input_bytes) {
        Ok(decoded) => decoded,
        Err(problem) => {
            write_json(&DecideOutput::from_problem(&problem), false)?;
            return Ok(ExitCode::FAILURE);
        }
    };
    let digest = input_hash(&decoded.input, config.hash_algorithm).map_err(hash_error)?;
    let canonical = canonical_input_json(&decoded.input).map_err(hash_error)?;
    let canonical = String::from_utf8(canonical)
        .map_err(|err| CliError::new(format!("canonical json is not utf-8: {err}")))?;
    write_json(
        &HashOutput {
            algorithm: digest.algorithm,
            hash: digest.value,
            canonical,
        },
        false,
    )?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the replay command.
fn command_replay(engine: &CliEngine, command: &ReplayCommand) -> CliResult<ExitCode> {
    let bytes = read_input(Some(command.input.as_path()), input_read_limit(engine))?;
    let report = engine.decide_bytes(&bytes);
    write_json(&DecideOutput::from_report(&report), command.pretty)?;
    if let Some(expected) = &command.expect_hash {
        check_replay_hash(expected, &report)?;
    }
    Ok(exit_code_for(report.status()))
}

/// Fails when a replayed report does not carry the expected hash.
fn check_replay_hash(expected: &str, report: &DecisionReport) -> CliResult<()> {
    let actual = report.input_hash.as_ref().map_or("", |digest| digest.value.as_str());
    if actual.eq_ignore_ascii_case(expected.trim()) {
        return Ok(());
    }
    tracing::warn!(expected = expected, actual = actual, "replay hash mismatch");
    Err(CliError::new(format!("replay hash mismatch: expected {expected}, got {actual}")))
}

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => {
            write_stdout_line("config ok")
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Maps an engine status to a process exit code.
fn exit_code_for(status: u16) -> ExitCode {
    if status == 200 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Formats a hashing failure.
fn hash_error(err: HashError) -> CliError {
    CliError::new(format!("failed to hash request: {err}"))
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded reads.
#[derive(Debug)]
enum ReadLimitError {
    /// I/O failure.
    Io(std::io::Error),
    /// Input size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads the request body from a file, or stdin for `-` or no path.
fn read_input(path: Option<&Path>, max_bytes: usize) -> CliResult<Vec<u8>> {
    match path {
        Some(path) if path != Path::new(STDIN_PATH) => read_bytes_with_limit(path, max_bytes)
            .map_err(|err| CliError::new(read_error(&path.display().to_string(), &err))),
        _ => read_reader_with_limit(std::io::stdin().lock(), max_bytes)
            .map_err(|err| CliError::new(read_error("stdin", &err))),
    }
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    read_reader_with_limit(file, max_bytes)
}

/// Reads a stream to the end, failing once it passes `max_bytes`.
fn read_reader_with_limit<R: Read>(reader: R, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let read_limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut limited = reader.take(read_limit);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Formats a bounded read failure.
fn read_error(source: &str, error: &ReadLimitError) -> String {
    match error {
        ReadLimitError::Io(err) => format!("failed to read {source}: {err}"),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => format!("{source} exceeds size limit ({size} > {limit} bytes)"),
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Serializes a value as canonical JSON, or pretty JSON when requested.
fn render_json<T: Serialize>(value: &T, pretty: bool) -> CliResult<Vec<u8>> {
    let mut bytes = if pretty {
        serde_json::to_vec_pretty(value)
            .map_err(|err| CliError::new(format!("failed to render json: {err}")))?
    } else {
        serde_jcs::to_vec(value)
            .map_err(|err| CliError::new(format!("failed to render json: {err}")))?
    };
    bytes.push(b'\n');
    Ok(bytes)
}

/// Writes a JSON value to stdout.
fn write_json<T: Serialize>(value: &T, pretty: bool) -> CliResult<()> {
    let bytes = render_json(value, pretty)?;
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
