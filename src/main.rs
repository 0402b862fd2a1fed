use std::io::{Write, stdin, stdout};

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

use zcl::attr::ZclDataType;

use zigfred::capture::CaptureDecoder;
use zigfred::cluster::{ZIGFRED_BUTTONS_ATTRIBUTE_ID, ZIGFRED_CLUSTER_ID, ZIGFRED_CLUSTER_NAME};
use zigfred::config::{self, AppConfig};
use zigfred::decoder::ButtonEventDecoder;
use zigfred::error::ZigfredResult;
use zigfred::event::JsonLineSink;
use zigfred::reporting::{ReportingRegistry, ReportingRequest};
use zigfred::transport::DryRunTransport;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Configuration file (yaml)
    #[arg(short, long, default_value = "zigfred.yaml")]
    config: Utf8PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode captured zcl messages (json lines on stdin) into button events
    Decode,

    /// Show the reporting configuration request sent to the device
    Configure,
}

/*
 * Formatter function to output in syslog format. This makes sense when running
 * as a service (where output might go to a log file, or the system journal)
 */
#[allow(clippy::match_same_arms)]
fn syslog_format(
    buf: &mut pretty_env_logger::env_logger::fmt::Formatter,
    record: &log::Record,
) -> std::io::Result<()> {
    writeln!(
        buf,
        "<{}>{}: {}",
        match record.level() {
            log::Level::Error => 3,
            log::Level::Warn => 4,
            log::Level::Info => 6,
            log::Level::Debug => 7,
            log::Level::Trace => 7,
        },
        record.target(),
        record.args()
    )
}

fn init_logging() -> ZigfredResult<()> {
    /* Try to provide reasonable default filters, when RUST_LOG is not specified */
    const DEFAULT_LOG_FILTERS: &[&str] = &["info", "zcl=debug"];

    let log_filters = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTERS.join(","));

    /* Detect if we need syslog or human-readable formatting */
    if std::env::var("SYSTEMD_EXEC_PID").is_ok_and(|pid| pid == std::process::id().to_string()) {
        Ok(pretty_env_logger::env_logger::builder()
            .format(syslog_format)
            .parse_filters(&log_filters)
            .try_init()?)
    } else {
        Ok(pretty_env_logger::formatted_timed_builder()
            .parse_filters(&log_filters)
            .try_init()?)
    }
}

fn decode(config: &AppConfig) -> ZigfredResult<()> {
    let endpoint = config.decoder.endpoint()?;
    log::info!("Decoding {ZIGFRED_CLUSTER_NAME} reports on endpoint {endpoint}");

    let decoder = ButtonEventDecoder::new(JsonLineSink::new(stdout()))
        .with_strict_manufacturer(config.decoder.strict_manufacturer);
    let capture = CaptureDecoder::new(decoder, endpoint);

    for line in stdin().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        if let Err(err) = capture.process_line(&line) {
            log::error!("Failed to process message: {err}");
            eprintln!("    {line:<40}");
        }
    }

    Ok(())
}

async fn configure() -> ZigfredResult<()> {
    let registry = ReportingRegistry::default();
    let transport = DryRunTransport::new();

    // what a generic stack would ask for; the zigfred strategy replaces it
    let req = ReportingRequest {
        attr: ZIGFRED_BUTTONS_ATTRIBUTE_ID,
        dtype: ZclDataType::ZclU32,
        min_interval: 1,
        max_interval: 300,
        reportable_change: 1,
        mfcode: None,
    };

    let resp = registry
        .configure_reporting(&transport, ZIGFRED_CLUSTER_ID, req)
        .await?;

    for req in transport.take_sent() {
        println!("{:04x} {}", req.cluster, hex::encode(req.to_bytes()?));
    }
    println!("{resp:?}");

    Ok(())
}

async fn run() -> ZigfredResult<()> {
    init_logging()?;

    let args = Args::parse();

    let config = config::parse(&args.config)?;
    log::debug!("Configuration loaded successfully");

    match args.command {
        Command::Decode => decode(&config),
        Command::Configure => configure().await,
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        log::error!("Zigfred error: {err}");
        log::error!("Fatal error encountered, cannot continue.");
    }
}
