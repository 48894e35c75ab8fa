//! Purpose: `flashmark` CLI entry point; thin host adapter around the renderer.
//! Role: Binary crate root; parses args, reads message batches, writes markup on stdout.
//! Invariants: stdout carries only command output (markup or palette data).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `flashmark::to_exit_code`.
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use flashmark::{
    Error, ErrorKind, InputFormat, RenderOptions, Severity, SeverityPolicy, decode_batch,
    render_with, to_exit_code,
};

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
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse_from(std::env::args_os()) {
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
                        .with_hint("Try `flashmark --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    command_dispatch::dispatch_command(cli.command).map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "flashmark",
    version,
    about = "Render flash messages as HTML alert fragments",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Reads queued messages as JSON and prints ready-to-embed markup.

Message fields:
  - `severity`   info | warning | danger | confirmation (or 0-3)
  - `title`      optional, always escaped
  - `body`       required, escaped unless `is_markup` is true
"#,
    after_help = r#"EXAMPLES
  $ flashmark render messages.json
  $ echo '{"severity":"danger","title":"Oops","body":"Save failed"}' | flashmark render
  $ flashmark render --no-dismiss --input jsonl queue.jsonl
  $ flashmark palette --json"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        help = "Colorize stderr diagnostics: auto | always | never"
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

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum InputMode {
    Auto,
    Json,
    Jsonl,
}

impl From<InputMode> for InputFormat {
    fn from(mode: InputMode) -> Self {
        match mode {
            InputMode::Auto => InputFormat::Auto,
            InputMode::Json => InputFormat::Json,
            InputMode::Jsonl => InputFormat::Jsonl,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Render a batch of messages to HTML",
        long_about = r#"Render a batch of messages to HTML.

Input is a JSON array of message objects, a single object, or one object
per line (JSON Lines). Messages are rendered in input order with no
separators between alerts."#
    )]
    Render {
        #[arg(
            help = "Input file (default: stdin; `-` also means stdin)",
            value_hint = ValueHint::FilePath
        )]
        input: Option<PathBuf>,
        #[arg(long = "no-dismiss", help = "Omit the close control from each alert")]
        no_dismiss: bool,
        #[arg(
            long = "input",
            value_enum,
            default_value = "auto",
            help = "Input framing: auto | json | jsonl"
        )]
        input_mode: InputMode,
        #[arg(
            long,
            help = "Reject unrecognized severities instead of presenting them as info"
        )]
        strict_severity: bool,
    },
    #[command(about = "Show the severity palette (color token per severity)")]
    Palette {
        #[arg(long, help = "Emit JSON instead of a table")]
        json: bool,
    },
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn read_input(path: Option<&Path>) -> Result<String, Error> {
    let mut text = String::new();
    match path {
        Some(path) if path != Path::new("-") => {
            text = std::fs::read_to_string(path).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message(format!("failed to read {}", path.display()))
                    .with_hint("Check that the file exists and is readable UTF-8.")
                    .with_source(err)
            })?;
        }
        _ => {
            io::stdin().read_to_string(&mut text).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
        }
    }
    Ok(text)
}

fn render_input(
    text: &str,
    input_mode: InputMode,
    policy: SeverityPolicy,
    options: &RenderOptions,
) -> Result<String, Error> {
    let messages = decode_batch(text, input_mode.into(), policy)?;
    tracing::debug!(count = messages.len(), dismissable = options.dismissable, "rendering");
    Ok(render_with(&messages, options))
}

fn write_stdout(markup: &str) -> Result<(), Error> {
    if markup.is_empty() {
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{markup}")
        .and_then(|()| stdout.flush())
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to write output")
                .with_source(err)
        })
}

fn palette_json() -> Value {
    let entries = Severity::ALL
        .iter()
        .map(|severity| {
            json!({
                "severity": severity,
                "code": severity.code(),
                "color_token": severity.color_token(),
            })
        })
        .collect::<Vec<_>>();
    json!({ "palette": entries })
}

fn emit_palette_human() {
    println!("{:<14}{:<6}TOKEN", "SEVERITY", "CODE");
    for severity in Severity::ALL {
        println!(
            "{:<14}{:<6}{}",
            severity.as_str(),
            severity.code(),
            severity.color_token()
        );
    }
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
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

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
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
        ErrorKind::Invalid => "invalid input".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
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
    if let Some(index) = err.index() {
        inner.insert("index".to_string(), json!(index));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
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
    if let Some(index) = err.index() {
        lines.push(format!(
            "{} {index}",
            colorize_label("record:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(line) = err.line() {
        lines.push(format!(
            "{} {line}",
            colorize_label("line:", use_color, AnsiColor::Yellow)
        ));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
