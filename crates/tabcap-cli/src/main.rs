use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tabcap_core::{CaptureSource, LiveConfig, LiveStream, OfflineStream, PacketStream};

mod output;
use output::OutputFormat;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("TABCAP_BUILD_COMMIT"),
    " ",
    env!("TABCAP_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "tabcap")]
#[command(version = VERSION)]
#[command(
    about = "Tabulate captured IP traffic into a typed table.",
    long_about = None,
    after_help = "Examples:\n  tabcap file capture.pcap --proto tcp --limit 100\n  tabcap live eth0 --payload --limit 50 --format json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct CaptureArgs {
    /// Keep only this IP protocol (e.g. tcp, udp, icmp)
    #[arg(long = "proto")]
    protocol: Option<String>,

    /// Include the transport payload column
    #[arg(long)]
    payload: bool,

    /// Stop after this many frames; -1 reads until the source is exhausted
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    limit: i64,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Capture from a network interface in real time.
    Live {
        /// Interface name (e.g. eth0)
        interface: String,

        #[command(flatten)]
        capture: CaptureArgs,

        /// Maximum captured bytes per frame
        #[arg(long, default_value_t = 65536)]
        max_packet: i32,

        /// Read timeout in milliseconds
        #[arg(long, default_value_t = 1000)]
        timeout_ms: i32,
    },
    /// Replay a previously saved capture file.
    File {
        /// Path to a .pcap file
        input: PathBuf,

        #[command(flatten)]
        capture: CaptureArgs,
    },
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Live {
            interface,
            capture,
            max_packet,
            timeout_ms,
        } => cmd_live(&interface, capture, max_packet, timeout_ms),
        Commands::File { input, capture } => cmd_file(&input, capture),
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

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
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
        CliError::new(err.to_string(), None)
    }
}

fn cmd_live(
    interface: &str,
    capture: CaptureArgs,
    max_packet: i32,
    timeout_ms: i32,
) -> Result<(), CliError> {
    let config = LiveConfig {
        max_packet,
        timeout_ms,
    };
    let stream = LiveStream::live(
        interface,
        capture.protocol.as_deref(),
        capture.payload,
        &config,
    )
    .map_err(|err| {
        let message = format!("cannot open interface {interface}: {err}");
        let hint = if err.to_string().to_lowercase().contains("permission") {
            Some("live capture needs CAP_NET_RAW; try sudo".to_string())
        } else {
            None
        };
        CliError::new(message, hint)
    })?;

    run(stream, &capture)
}

fn cmd_file(input: &PathBuf, capture: CaptureArgs) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a capture file saved by libpcap".to_string()),
        ));
    }

    let stream = OfflineStream::offline(input, capture.protocol.as_deref(), capture.payload)
        .map_err(|err| {
            CliError::new(
                format!("cannot open {}: {err}", input.display()),
                Some("use a capture file saved by libpcap".to_string()),
            )
        })?;

    run(stream, &capture)
}

fn run<S: CaptureSource>(mut stream: PacketStream<S>, capture: &CaptureArgs) -> Result<(), CliError> {
    let batch = stream
        .to_dataframe(capture.limit)
        .map_err(|err| CliError::new(format!("capture failed: {err}"), None))?;

    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    output::write(&batch, capture.format, &mut writer)
        .context("write output")
        .map_err(CliError::from)
}
