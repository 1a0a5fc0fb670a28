//! Console front end for bplink.
//!
//! ```text
//! bp_monitor ports
//! bp_monitor live --port /dev/ttyUSB0 --baud 9600
//! bp_monitor simulate --interval 2 --duration 30
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bplink::serial::{self, pick_default};
use bplink::{
    BaudRate, EventReceiver, Monitor, MonitorConfig, Reading, ReadingHistory, ReadingSnapshot, Sink,
    Source, run_sink,
};

#[derive(Parser, Debug)]
#[command(name = "bp_monitor", version, about = "Blood-pressure monitor serial reader")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long, global = true)]
    duration: Option<u64>,

    /// Print every raw read as hex
    #[arg(long, global = true)]
    raw: bool,

    /// Print the latest reading as a JSON snapshot on exit
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List serial ports
    Ports,
    /// Read from a connected monitor
    Live {
        /// Serial endpoint; defaults to the configured or preferred port
        #[arg(long)]
        port: Option<String>,
        /// Baud rate (9600, 19200, 38400, 57600, 115200)
        #[arg(long)]
        baud: Option<u32>,
        /// Read timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Generate simulated readings
    Simulate {
        /// Seconds between readings (minimum 1)
        #[arg(long)]
        interval: Option<f64>,
    },
}

/// Prints events and keeps the recent history.
struct ConsoleSink {
    history: ReadingHistory,
    show_raw: bool,
    last_status: String,
}

impl Sink for ConsoleSink {
    fn on_reading(&mut self, reading: Reading) {
        println!(
            "{}  SYS {}  DIA {}",
            reading,
            reading.systolic_category().label(),
            reading.diastolic_category().label()
        );
        self.history.push(reading);
    }

    fn on_raw_bytes(&mut self, bytes: Vec<u8>) {
        if self.show_raw {
            println!("  raw {} bytes: {}", bytes.len(), hex::encode(&bytes));
        }
    }

    fn on_status(&mut self, status: String) {
        println!("[{status}]");
        self.last_status = status;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => MonitorConfig::load(path),
        None => MonitorConfig::default(),
    };

    let problems = config.validate();
    if !problems.is_empty() {
        bail!("Invalid configuration:\n  {}", problems.join("\n  "));
    }

    let (events, receiver) = Monitor::event_channel(config.pipeline.event_capacity);

    match &cli.command {
        Command::Ports => {
            drop(events);
            list_ports()
        }
        Command::Live { port, baud, timeout_ms } => {
            let baud = BaudRate::try_from(baud.unwrap_or(config.serial.baud_rate))?;
            let timeout = timeout_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.serial.io_timeout());
            let endpoint = resolve_endpoint(port.as_deref(), &config)?;

            let mut source = Monitor::live(&events);
            drop(events);

            if let Err(e) = source.connect(&endpoint, baud, timeout).await {
                for suggestion in e.recovery_suggestions() {
                    warn!("  - {}", suggestion);
                }
                return Err(e).with_context(|| format!("could not open {endpoint}"));
            }

            run(source, receiver, &cli, &config).await
        }
        Command::Simulate { interval } => {
            let interval = interval.unwrap_or(config.simulation.interval_secs);
            let source = Monitor::simulate(&events, interval);
            drop(events);
            run(source, receiver, &cli, &config).await
        }
    }
}

fn list_ports() -> anyhow::Result<()> {
    let ports = serial::list_ports()?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        println!("{port}");
    }
    Ok(())
}

fn resolve_endpoint(requested: Option<&str>, config: &MonitorConfig) -> anyhow::Result<String> {
    if let Some(port) = requested {
        return Ok(port.to_string());
    }
    if !config.serial.port.is_empty() {
        return Ok(config.serial.port.clone());
    }

    let ports = serial::list_ports()?;
    match pick_default(&ports, &config.serial.preferred_port) {
        Some(port) => {
            info!(endpoint = %port.name, description = %port.description, "Selected serial port");
            Ok(port.name.clone())
        }
        None => bail!("No serial ports found; pass --port"),
    }
}

/// Deliver events until the source stops, then print a summary.
async fn run<S>(
    mut source: S,
    receiver: EventReceiver,
    cli: &Cli,
    config: &MonitorConfig,
) -> anyhow::Result<()>
where
    S: Source + 'static,
{
    let duration = cli.duration.map(Duration::from_secs);

    // The control task owns the source; dropping it closes the event channel
    // and lets `run_sink` finish after delivering the final status.
    let control = tokio::spawn(async move {
        let mut states = source.state_updates();
        tokio::select! {
            _ = shutdown_signal(duration) => info!("Stopping"),
            _ = async {
                while let Some(state) = states.next().await {
                    if state.is_error() {
                        break;
                    }
                }
            } => warn!("Source stopped on error"),
        }
        source.shutdown().await;
    });

    let mut sink = ConsoleSink {
        history: ReadingHistory::new(config.pipeline.history_capacity),
        show_raw: cli.raw,
        last_status: String::new(),
    };
    let delivered = run_sink(receiver, config.pipeline.drain_tick(), &mut sink).await;
    control.await.context("control task failed")?;

    info!(delivered, readings = sink.history.len(), "Session finished");
    if cli.json {
        let snapshot = match sink.history.latest() {
            Some(reading) => ReadingSnapshot::from_reading(reading, sink.last_status.clone()),
            None => ReadingSnapshot::offline(sink.last_status.clone()),
        };
        println!("{}", snapshot.to_json()?);
    }

    Ok(())
}

async fn shutdown_signal(duration: Option<Duration>) {
    match duration {
        Some(limit) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = tokio::time::sleep(limit) => {}
            }
        }
        None => {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Could not listen for Ctrl-C: {}", e);
            }
        }
    }
}
