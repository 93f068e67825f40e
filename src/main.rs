//! Purpose: `ocarina-bridge` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Every successful command writes exactly one JSON document to stdout.
//! Invariants: Errors go to stderr (text on a TTY, JSON otherwise).
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: Tracing writes to stderr and is never active inside a capture region.
use std::error::Error as StdError;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use bstr::ByteSlice;
use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod selftest;

use command_dispatch::dispatch_command;
use ocarina_bridge::api::{Error, ErrorKind, to_exit_code};

const LOG_ENV: &str = "OCARINA_BRIDGE_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Run `ocarina-bridge --help` for usage."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    init_tracing();
    let color_mode = cli.color;
    dispatch_command(cli.command, color_mode).map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "ocarina-bridge",
    version,
    about = "Capture and classify output from native Ocarina engine calls",
    long_about = None,
    after_help = r#"EXAMPLES
  $ ocarina ... 2> diag.txt; ocarina-bridge classify diag.txt
  $ ocarina-bridge extract-fault fault.txt
  $ ocarina-bridge probe --stderr 'Warning: unused' --fault 'cannot open foo.aadl'
  $ ocarina-bridge selftest

ENVIRONMENT
  OCARINA_BRIDGE_LOG   tracing filter for stderr logs (default: warn)"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics and pretty-print JSON: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Split captured stderr text into warnings and errors")]
    Classify {
        #[arg(help = "Input file (default: stdin)", value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },
    #[command(about = "Extract the message section from a rendered native fault")]
    ExtractFault {
        #[arg(help = "Input file (default: stdin)", value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },
    #[command(about = "Run one wrapped call against the C probe engine")]
    Probe(ProbeArgs),
    #[command(about = "Check stream capture end to end against the C probe engine")]
    Selftest,
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    #[command(about = "Print version info")]
    Version,
}

#[derive(Args)]
struct ProbeArgs {
    #[arg(long, value_enum, default_value = "load", help = "Entry point to invoke")]
    call: ProbeCall,
    #[arg(
        long,
        default_value = "model.aadl",
        help = "Argument for load/instantiate/generate"
    )]
    arg: String,
    #[arg(long, default_value = "", help = "Text the probe writes to stdout")]
    stdout: String,
    #[arg(long, default_value = "", help = "Text the probe writes to stderr")]
    stderr: String,
    #[arg(long, help = "Write with write(2) instead of C stdio")]
    raw: bool,
    #[arg(long, help = "Fail the call with this fault message")]
    fault: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ProbeCall {
    Version,
    Status,
    Reset,
    Load,
    Analyze,
    Instantiate,
    Generate,
    Root,
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .try_init();
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    rendered
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_start_matches("error:").trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

fn read_input(file: Option<&Path>) -> Result<String, Error> {
    let mut bytes = Vec::new();
    match file {
        Some(path) => {
            bytes = std::fs::read(path).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message(format!("failed to read {}", path.display()))
                    .with_source(err)
            })?;
        }
        None => {
            io::stdin().read_to_end(&mut bytes).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
        }
    }
    Ok(bytes.to_str_lossy().into_owned())
}

fn emit_json(value: Value, color_mode: ColorMode) {
    let pretty = color_mode.use_color(io::stdout().is_terminal());
    println!("{}", render_json(&value, pretty));
}

fn render_json(value: &Value, pretty: bool) -> String {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
}

fn emit_version_output(color_mode: ColorMode) {
    if io::stdout().is_terminal() {
        println!("ocarina-bridge {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(
            json!({
                "name": "ocarina-bridge",
                "version": env!("CARGO_PKG_VERSION"),
            }),
            color_mode,
        );
    }
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Busy => "capture region is busy".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
        ErrorKind::Unavailable => "not available on this platform".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = vec![format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    )];
    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    for cause in error_causes(err) {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }
    lines.join("\n")
}
