use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use glob::glob;
use rustnav_core::{InspectOptions, Report};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rustnav")]
#[command(version)]
#[command(
    about = "Offline decoder for game server traffic captures.",
    long_about = None,
    after_help = "Examples:\n  rustnav pcap inspect capture.pcapng -o report.json\n  rustnav pcap analyse capture.pcap --stdout --port 28015\n  rustnav decode --pretty 0000000000000000000000000000000000000000000000000000009b0a020801"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on PCAP/PCAPNG inputs (offline-first).
    Pcap {
        #[command(subcommand)]
        command: PcapCommands,
    },
    /// Decode a single UDP application payload given as hex.
    Decode {
        /// Payload bytes as hex (whitespace and a leading 0x are ignored)
        #[arg(num_args = 1.., required = true)]
        hex: Vec<String>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Subcommand, Debug)]
enum PcapCommands {
    /// Inspect a capture file and generate a versioned JSON report.
    #[command(alias = "analyse")]
    #[command(
        after_help = "Examples:\n  rustnav pcap inspect capture.pcapng -o report.json\n  rustnav pcap analyse 'captures/*.pcapng' --stdout --include-unhandled"
    )]
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Path to a .pcap or .pcapng file (a glob matching one file is accepted)
    input: PathBuf,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if any datagram failed to decode
    #[arg(long)]
    strict: bool,

    /// List decode error kinds after inspection
    #[arg(long)]
    list_errors: bool,

    /// Only dispatch datagrams to or from this UDP port (bare flag: game default)
    #[arg(long, value_name = "PORT", num_args = 0..=1, default_missing_value = "28015")]
    port: Option<u16>,

    /// Emit report entries for packet types without a decoder
    #[arg(long)]
    include_unhandled: bool,

    /// Maximum number of packet entries in the report
    #[arg(long, value_name = "N")]
    max_records: Option<usize>,
}

impl InspectArgs {
    fn options(&self) -> InspectOptions {
        InspectOptions {
            server_port: self.port,
            include_unhandled: self.include_unhandled,
            max_records: self.max_records,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let quiet = matches!(
        &cli.command,
        Commands::Pcap {
            command: PcapCommands::Inspect(args)
        } if args.quiet
    );
    init_logging(cli.verbose, quiet);

    let result = match cli.command {
        Commands::Pcap { command } => match command {
            PcapCommands::Inspect(args) => cmd_pcap_inspect(args),
        },
        Commands::Decode { hex, pretty } => cmd_decode(&hex.concat(), pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_pcap_inspect(args: InspectArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    let report_path = if args.stdout {
        None
    } else {
        let report_path = args.report.clone().ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?;
        ensure_distinct_output(&report_path, &input_abs)?;
        Some(report_path)
    };

    let meta = fs::metadata(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;
    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", args.input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }

    let rep = rustnav_core::inspect_pcap_file(&resolved_input, &args.options())
        .context("PCAP/PCAPNG inspection failed")?;
    let json = serialize_json(&rep, args.pretty, args.compact)?;

    match report_path {
        None => print!("{}", json),
        Some(report_path) => {
            if let Some(parent) = report_path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report_path, json)
                .with_context(|| format!("Failed to write report: {}", report_path.display()))?;
            if !args.quiet {
                eprintln!("OK: report written -> {}", report_path.display());
            }
        }
    }

    if args.list_errors && !args.quiet {
        print_decode_errors(&rep);
    }
    if args.strict && has_decode_errors(&rep) {
        return Err(CliError::new(
            "decode errors detected",
            Some("use --list-errors to inspect".to_string()),
        ));
    }
    Ok(())
}

fn cmd_decode(hex: &str, pretty: bool) -> Result<(), CliError> {
    let payload = parse_hex(hex)?;
    let decoded = rustnav_core::decode_datagram(&payload).map_err(|err| {
        CliError::new(
            format!("decode failed ({} at byte {}): {}", err.kind(), err.offset(), err),
            Some(format!("payload is {} bytes long", payload.len())),
        )
    })?;
    let json = serialize_json(&decoded, pretty, false)?;
    println!("{}", json);
    Ok(())
}

fn parse_hex(input: &str) -> Result<Vec<u8>, CliError> {
    let digits: String = input.split_whitespace().collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);
    let invalid = |detail: String| {
        CliError::new(
            format!("invalid hex payload: {detail}"),
            Some("pass bytes as hex pairs, e.g. 8c0a02".to_string()),
        )
    };
    if digits.len() % 2 != 0 {
        return Err(invalid(format!("odd number of digits ({})", digits.len())));
    }
    (0..digits.len())
        .step_by(2)
        .map(|idx| {
            digits
                .get(idx..idx + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| invalid(format!("bad digit pair at position {idx}")))
        })
        .collect()
}

fn serialize_json<T: serde::Serialize>(
    value: &T,
    pretty: bool,
    compact: bool,
) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn has_decode_errors(rep: &Report) -> bool {
    rep.decode_errors.iter().any(|entry| entry.count > 0)
}

fn print_decode_errors(rep: &Report) {
    eprintln!("Decode errors:");
    for entry in &rep.decode_errors {
        eprintln!("  {} ({})", entry.kind, entry.count);
        for example in &entry.examples {
            eprintln!("    {}", example);
        }
    }
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let report_dir = match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::canonicalize(parent),
        _ => fs::canonicalize("."),
    };
    // A missing output directory cannot contain the input.
    let Ok(report_dir) = report_dir else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report_path.display()))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap or .pcapng".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut message = format!("multiple files match pattern '{}' ({} matches)", pattern, count);
            let listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            message.push_str("; matches: ");
            message.push_str(&listed);
            if count > 3 {
                message.push_str(", ...");
            }
            Err(CliError::new(
                message,
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
